//! Runtime data from the local machine
//!
//! Directory listings come from the filesystem, the environment snapshot from
//! the process environment and `PATH`, and generators run as `sh -c` scripts.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{RuntimeDataProvider, ShellAlias, ShellEnvironment};
use crate::error::{Result, RuntimeError};
use crate::spec::{GeneratorSpec, Suggestion, SuggestionKind};

/// Default time a generator may run
const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_millis(5000);

/// Environment variable carrying the typed text into generator scripts
pub const TYPED_TEXT_VAR: &str = "CMDCOMPLETE_TYPED";

/// POSIX special and common regular builtins
const BUILTINS: &[&str] = &[
    "alias", "bg", "break", "cd", "command", "continue", "echo", "eval", "exec", "exit",
    "export", "false", "fg", "getopts", "hash", "jobs", "kill", "printf", "pwd", "read",
    "readonly", "return", "set", "shift", "source", "test", "times", "trap", "true", "type",
    "ulimit", "umask", "unalias", "unset", "wait",
];

/// Shell grammar keywords
const KEYWORDS: &[&str] = &[
    "case", "do", "done", "elif", "else", "esac", "fi", "for", "function", "if", "in",
    "select", "then", "until", "while",
];

/// Runtime data provider backed by the local machine
#[derive(Debug, Clone)]
pub struct LocalRuntime {
    /// Directory relative paths are resolved against
    working_directory: PathBuf,
    /// Upper bound on generator run time
    generator_timeout: Duration,
    /// Aliases reported in the environment snapshot
    aliases: Vec<ShellAlias>,
}

impl LocalRuntime {
    /// Create a runtime rooted at `working_directory`
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            generator_timeout: DEFAULT_GENERATOR_TIMEOUT,
            aliases: Vec::new(),
        }
    }

    pub fn with_generator_timeout(mut self, timeout: Duration) -> Self {
        self.generator_timeout = timeout;
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<ShellAlias>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Resolve a typed path against the working directory, expanding `~`
    fn resolve(&self, path: &str) -> PathBuf {
        if path == "~" {
            return dirs::home_dir().unwrap_or_else(|| self.working_directory.clone());
        }
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory.join(path)
        }
    }

    /// Collect executables from every `PATH` directory
    async fn path_commands() -> Vec<String> {
        let Some(path_var) = std::env::var_os("PATH") else {
            return Vec::new();
        };

        let mut commands = BTreeSet::new();
        for dir in std::env::split_paths(&path_var) {
            let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
                trace!("skipping unreadable PATH entry {}", dir.display());
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let Ok(metadata) = tokio::fs::metadata(entry.path()).await else {
                    continue;
                };
                if metadata.is_file() && is_executable(&metadata) {
                    commands.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        commands.into_iter().collect()
    }
}

impl Default for LocalRuntime {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd)
    }
}

#[async_trait]
impl RuntimeDataProvider for LocalRuntime {
    async fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        let resolved = self.resolve(path);
        let unreadable = |e: std::io::Error| RuntimeError::DirectoryUnreadable {
            path: path.to_string(),
            message: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(&resolved).await.map_err(unreadable)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks so linked directories complete as directories
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        let mut listing = vec!["./".to_string(), "../".to_string()];
        listing.extend(names);
        debug!("listed {} entries in {}", listing.len(), resolved.display());
        Ok(listing)
    }

    async fn shell_environment(&self) -> Result<ShellEnvironment> {
        let mut envs: Vec<String> = std::env::vars_os()
            .map(|(key, _)| key.to_string_lossy().into_owned())
            .collect();
        envs.sort();

        Ok(ShellEnvironment {
            envs,
            keywords: KEYWORDS.iter().map(|s| s.to_string()).collect(),
            builtins: BUILTINS.iter().map(|s| s.to_string()).collect(),
            functions: Vec::new(),
            commands: Self::path_commands().await,
            aliases: self.aliases.clone(),
        })
    }

    async fn run_generator(
        &self,
        generator: &GeneratorSpec,
        typed: &str,
    ) -> Result<Vec<Suggestion>> {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&generator.script)
            .current_dir(&self.working_directory)
            .env(TYPED_TEXT_VAR, typed)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.generator_timeout, command.output())
            .await
            .map_err(|_| RuntimeError::GeneratorTimeout(generator.script.clone()))?
            .map_err(|e| RuntimeError::GeneratorFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::GeneratorFailed(format!(
                "'{}' exited with {}: {}",
                generator.script,
                output.status,
                stderr.trim()
            ))
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(split_output(&stdout, generator))
    }
}

/// Turn generator output into suggestions, one per non-empty entry
fn split_output(output: &str, generator: &GeneratorSpec) -> Vec<Suggestion> {
    let separator = if generator.split_on.is_empty() {
        "\n"
    } else {
        generator.split_on.as_str()
    };
    let kind = generator.kind.unwrap_or(SuggestionKind::Argument);

    output
        .split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| Suggestion::new(entry).with_kind(kind))
        .collect()
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}
