//! Completion core
//!
//! Given a command's spec and the tokens typed so far, this module parses the
//! complete tokens into a typed tree and computes the candidates for the token
//! being typed.
//!
//! # Architecture
//!
//! - **Tree**: Arena-backed parse tree with typed nodes
//! - **Builder**: Recursive-descent parsing of the complete tokens
//! - **Suggestions**: What may come next at a node of the tree
//! - **Commands**: Live command, alias, builtin and function names
//! - **Paths**: File and directory entries for path arguments
//! - **Engine**: Orchestrates a request from spec lookup to suggestions
//!
//! # Examples
//!
//! ```no_run
//! use cmdcomplete::completion::CompletionEngine;
//! use cmdcomplete::runtime::LocalRuntime;
//! use cmdcomplete::spec::SpecRegistry;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let engine = CompletionEngine::new(
//!     Arc::new(SpecRegistry::with_directory("/usr/share/cmdcomplete/specs")),
//!     Arc::new(LocalRuntime::default()),
//! );
//!
//! let tokens = vec!["git".to_string(), "comm".to_string()];
//! if let Some(suggestions) = engine.compute_completions("git", &tokens).await {
//!     for suggestion in suggestions {
//!         println!("{}", suggestion.name());
//!     }
//! }
//! # }
//! ```

mod builder;
mod commands;
mod context;
mod engine;
mod paths;
mod suggestions;
mod tree;

#[cfg(test)]
mod tests;

pub use builder::TreeBuilder;
pub use commands::available_commands;
pub use context::RequestContext;
pub use engine::{CompletionEngine, filter_by_prefix};
pub use paths::{path_suggestions, split_path};
pub use suggestions::SuggestionsProvider;
pub use tree::{NodeId, NodeKind, ParseNode, ParseTree, Scope};
