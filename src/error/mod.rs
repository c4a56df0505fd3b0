//! Error handling module for cmdcomplete.
//!
//! Errors only exist at the boundaries of the completion core:
//! - Spec loading and deferred-spec resolution
//! - Runtime data (directory listings, shell environment, generators)
//! - Configuration loading
//!
//! The core itself converts every boundary failure into an empty or partial
//! suggestion list, so callers of the completion facade never see these types.
//!
//! # Example
//!
//! ```rust
//! use cmdcomplete::error::{CompletionError, Result, SpecError};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(SpecError::NotFound(name.to_string()).into())
//! }
//!
//! assert!(matches!(lookup("git"), Err(CompletionError::Spec(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CompletionError, ConfigError, Result, RuntimeError, SpecError};
