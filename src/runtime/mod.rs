//! Runtime data provider: the live data completions are built from
//!
//! The completion core consumes directory listings, a snapshot of the shell
//! environment, and generator output through [`RuntimeDataProvider`]. Failures
//! are reported as errors here and turned into "no suggestions" by the core.

mod local;
mod snapshot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spec::{GeneratorSpec, Suggestion};

pub use local::{LocalRuntime, TYPED_TEXT_VAR};
pub use snapshot::StaticRuntime;

/// Trait for providing runtime data to the completion core
#[async_trait]
pub trait RuntimeDataProvider: Send + Sync {
    /// List the entries of a directory
    ///
    /// Directory entries carry a trailing `/`. The listing may include the
    /// synthetic `./` and `../` entries.
    async fn list_directory(&self, path: &str) -> Result<Vec<String>>;

    /// Take a snapshot of the shell environment
    async fn shell_environment(&self) -> Result<ShellEnvironment>;

    /// Run a generator and turn its output into suggestions
    ///
    /// # Arguments
    /// * `generator` - Generator to run
    /// * `typed` - Text of the token being completed
    async fn run_generator(&self, generator: &GeneratorSpec, typed: &str)
    -> Result<Vec<Suggestion>>;
}

/// Snapshot of the interactive shell's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellEnvironment {
    /// Environment variable names
    pub envs: Vec<String>,
    /// Reserved words
    pub keywords: Vec<String>,
    pub builtins: Vec<String>,
    pub functions: Vec<String>,
    /// Executables reachable through `PATH`
    pub commands: Vec<String>,
    pub aliases: Vec<ShellAlias>,
}

/// A shell alias and the text it expands to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellAlias {
    pub name: String,
    pub definition: String,
}

impl ShellAlias {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }

    /// Command word the alias expands to (`ll` -> `ls -la` gives `ls`)
    pub fn command_word(&self) -> Option<&str> {
        self.definition.split_whitespace().next()
    }
}

impl ShellEnvironment {
    /// Find an alias by name
    pub fn alias(&self, name: &str) -> Option<&ShellAlias> {
        self.aliases.iter().find(|alias| alias.name == name)
    }
}
