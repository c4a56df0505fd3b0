use std::{fmt, io};

/// Crate-wide `Result` type using [`CompletionError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is used by the
/// spec/runtime boundaries, configuration loading, and the CLI.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Top-level error type for cmdcomplete operations.
///
/// The completion core never hands one of these to its caller: it is what
/// collaborators (spec loading, runtime data, configuration) report, and the
/// core degrades it into an empty result.
#[derive(Debug)]
pub enum CompletionError {
    /// Spec loading or resolution errors.
    Spec(SpecError),

    /// Runtime data provider errors (filesystem, environment, generators).
    Runtime(RuntimeError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Spec-specific errors.
#[derive(Debug)]
pub enum SpecError {
    /// No spec is registered under this name.
    NotFound(String),

    /// A spec document could not be parsed.
    InvalidFormat { name: String, message: String },

    /// A deferred spec reference points to nothing.
    DeferredUnresolved(String),
}

/// Runtime data provider errors.
#[derive(Debug)]
pub enum RuntimeError {
    /// A directory could not be listed.
    DirectoryUnreadable { path: String, message: String },

    /// A generator exited unsuccessfully or could not be spawned.
    GeneratorFailed(String),

    /// A generator did not finish in time.
    GeneratorTimeout(String),

    /// The shell environment snapshot could not be taken.
    EnvironmentUnavailable(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Spec(e) => write!(f, "Spec error: {e}"),
            CompletionError::Runtime(e) => write!(f, "Runtime error: {e}"),
            CompletionError::Config(e) => write!(f, "Configuration error: {e}"),
            CompletionError::Io(e) => write!(f, "I/O error: {e}"),
            CompletionError::Json(e) => write!(f, "JSON error: {e}"),
            CompletionError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::NotFound(name) => write!(f, "No spec found for '{name}'"),
            SpecError::InvalidFormat { name, message } => {
                write!(f, "Invalid spec '{name}': {message}")
            }
            SpecError::DeferredUnresolved(reference) => {
                write!(f, "Deferred spec reference '{reference}' could not be resolved")
            }
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DirectoryUnreadable { path, message } => {
                write!(f, "Cannot list directory '{path}': {message}")
            }
            RuntimeError::GeneratorFailed(msg) => write!(f, "Generator failed: {msg}"),
            RuntimeError::GeneratorTimeout(script) => {
                write!(f, "Generator timed out: {script}")
            }
            RuntimeError::EnvironmentUnavailable(msg) => {
                write!(f, "Shell environment unavailable: {msg}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for CompletionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionError::Io(e) => Some(e),
            CompletionError::Json(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for SpecError {}
impl std::error::Error for RuntimeError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to CompletionError ========================= */

impl From<io::Error> for CompletionError {
    fn from(err: io::Error) -> Self {
        CompletionError::Io(err)
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::Json(err)
    }
}

impl From<SpecError> for CompletionError {
    fn from(err: SpecError) -> Self {
        CompletionError::Spec(err)
    }
}

impl From<RuntimeError> for CompletionError {
    fn from(err: RuntimeError) -> Self {
        CompletionError::Runtime(err)
    }
}

impl From<ConfigError> for CompletionError {
    fn from(err: ConfigError) -> Self {
        CompletionError::Config(err)
    }
}

impl From<String> for CompletionError {
    fn from(msg: String) -> Self {
        CompletionError::Generic(msg)
    }
}

impl From<&str> for CompletionError {
    fn from(msg: &str) -> Self {
        CompletionError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_display() {
        let err: CompletionError = SpecError::InvalidFormat {
            name: "git".to_string(),
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Spec error: Invalid spec 'git': expected value"
        );
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::GeneratorTimeout("git branch".to_string());
        assert_eq!(err.to_string(), "Generator timed out: git branch");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err: CompletionError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
