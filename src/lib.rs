//! cmdcomplete library
//!
//! Spec-driven completion for shell command lines. Given a declarative spec of
//! a command's subcommands, options, and arguments, and the tokens typed so
//! far, it parses the complete tokens into a typed tree and computes the
//! candidates for the token being typed.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Parse tree, tree builder, suggestion provider, and engine
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting of suggestion lists
//! - `runtime`: Filesystem, shell environment, and generator access
//! - `spec`: Command spec model and spec loading
//!
//! # Example
//!
//! ```no_run
//! use cmdcomplete::{CompletionEngine, LocalRuntime, SpecRegistry};
//! use cmdcomplete::spec::{ArgumentSpec, CommandSpec, OptionSpec};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let git = CommandSpec::new("git").with_subcommand(
//!         CommandSpec::new("add")
//!             .with_option(OptionSpec::new(["--all", "-A"]))
//!             .with_argument(ArgumentSpec::file().variadic()),
//!     );
//!     let engine = CompletionEngine::new(
//!         Arc::new(SpecRegistry::new().with_spec(git)),
//!         Arc::new(LocalRuntime::default()),
//!     );
//!
//!     let tokens: Vec<String> = ["git", "add", ""].iter().map(|s| s.to_string()).collect();
//!     if let Some(suggestions) = engine.compute_completions("git", &tokens).await {
//!         for suggestion in suggestions {
//!             println!("{}", suggestion.insert_text());
//!         }
//!     }
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod formatter;
pub mod runtime;
pub mod spec;

// Re-export commonly used types
pub use completion::{CompletionEngine, ParseTree};
pub use config::Config;
pub use error::{CompletionError, Result};
pub use formatter::Formatter;
pub use runtime::{LocalRuntime, RuntimeDataProvider, StaticRuntime};
pub use spec::{CommandSpec, SpecManager, SpecRegistry, Suggestion};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
