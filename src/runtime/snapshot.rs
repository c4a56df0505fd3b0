//! Runtime data served from memory
//!
//! Useful when the runtime data was captured elsewhere (for example by a shell
//! integration script) and for exercising the completion core without
//! touching the real machine.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{RuntimeDataProvider, ShellEnvironment};
use crate::error::{Result, RuntimeError};
use crate::spec::{GeneratorSpec, Suggestion, SuggestionKind};

/// Runtime data provider answering from fixed data
#[derive(Debug, Clone, Default)]
pub struct StaticRuntime {
    /// Directory listings keyed by normalized path
    directories: HashMap<String, Vec<String>>,
    environment: ShellEnvironment,
    /// Generator output lines keyed by script
    generators: HashMap<String, Vec<String>>,
    /// Number of environment snapshots handed out
    environment_requests: Arc<AtomicUsize>,
}

impl StaticRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entries` when `path` is listed
    pub fn with_directory<I, S>(mut self, path: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directories.insert(
            normalize(path),
            entries.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn with_environment(mut self, environment: ShellEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Serve `lines` when the generator running `script` is invoked
    pub fn with_generator<I, S>(mut self, script: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generators.insert(
            script.to_string(),
            lines.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// How many times the environment snapshot was requested
    pub fn environment_requests(&self) -> usize {
        self.environment_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeDataProvider for StaticRuntime {
    async fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        self.directories
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| {
                RuntimeError::DirectoryUnreadable {
                    path: path.to_string(),
                    message: "not in snapshot".to_string(),
                }
                .into()
            })
    }

    async fn shell_environment(&self) -> Result<ShellEnvironment> {
        self.environment_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.environment.clone())
    }

    async fn run_generator(
        &self,
        generator: &GeneratorSpec,
        _typed: &str,
    ) -> Result<Vec<Suggestion>> {
        let lines = self
            .generators
            .get(&generator.script)
            .ok_or_else(|| RuntimeError::GeneratorFailed(generator.script.clone()))?;
        let kind = generator.kind.unwrap_or(SuggestionKind::Argument);
        Ok(lines
            .iter()
            .map(|line| Suggestion::new(line.as_str()).with_kind(kind))
            .collect())
    }
}

/// `src/` and `src` name the same directory; `./` is the working directory
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" if path.starts_with('/') => "/".to_string(),
        "" | "." => ".".to_string(),
        _ => trimmed.to_string(),
    }
}
