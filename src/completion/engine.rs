//! Completion engine: the entry point for completion requests
//!
//! Resolves the spec for the invoked command, parses the complete tokens,
//! and asks the suggestion provider for candidates for the token being typed.

use std::sync::Arc;
use tracing::debug;

use super::builder::TreeBuilder;
use super::commands::available_commands;
use super::context::RequestContext;
use super::paths::{path_suggestions, split_path};
use super::suggestions::SuggestionsProvider;
use super::tree::ParseTree;
use crate::runtime::RuntimeDataProvider;
use crate::spec::{ArgumentSpec, SpecManager, Suggestion, SuggestionKind};

/// Completion engine shared across requests
pub struct CompletionEngine {
    specs: Arc<dyn SpecManager>,
    runtime: Arc<dyn RuntimeDataProvider>,
}

impl CompletionEngine {
    /// Create a new completion engine
    ///
    /// # Arguments
    /// * `specs` - Source of command specs
    /// * `runtime` - Source of directory listings, shell state, and generator output
    pub fn new(specs: Arc<dyn SpecManager>, runtime: Arc<dyn RuntimeDataProvider>) -> Self {
        Self { specs, runtime }
    }

    fn request(&self) -> RequestContext {
        RequestContext::new(Arc::clone(&self.specs), Arc::clone(&self.runtime))
    }

    /// Suggestions for the last token of a command line
    ///
    /// `tokens[0]` is the command word as typed and the last token is the one
    /// being completed. Returns `None` when there is nothing to say: no tokens,
    /// a single blank token, or no spec for `command`.
    ///
    /// # Arguments
    /// * `command` - Name the command spec is looked up by
    /// * `tokens` - Tokens of the command line
    pub async fn compute_completions(
        &self,
        command: &str,
        tokens: &[String],
    ) -> Option<Vec<Suggestion>> {
        let (typed, complete) = tokens.split_last()?;
        if complete.is_empty() && typed.trim().is_empty() {
            return None;
        }

        let ctx = self.request();
        let spec = ctx.command_spec(command).await?;
        if complete.is_empty() {
            // Still typing the command word
            return Some(visible(available_commands(&ctx).await));
        }

        let tree = TreeBuilder::new(&ctx)
            .build(&complete[0], spec, &complete[1..])
            .await;
        debug!(
            "completing '{}' at '{}' ({} nodes)",
            typed,
            tree.text(tree.position()),
            tree.len()
        );

        let suggestions = SuggestionsProvider::new(&ctx)
            .suggestions_at(&tree, tree.position(), typed)
            .await;
        Some(visible(suggestions))
    }

    /// Path suggestions for the last token, without any command context
    pub async fn compute_file_suggestions(&self, tokens: &[String]) -> Option<Vec<Suggestion>> {
        let typed = tokens.last()?;
        let ctx = self.request();
        let argument = Arc::new(ArgumentSpec::file());
        Some(path_suggestions(&ctx, &argument, typed, false).await)
    }

    /// Parse tree of the complete tokens, `None` if `command` has no spec
    ///
    /// Takes the same tokens as [`compute_completions`](Self::compute_completions)
    /// and parses all of them except the last one.
    pub async fn parse(&self, command: &str, tokens: &[String]) -> Option<ParseTree> {
        let (_, complete) = tokens.split_last()?;
        let (command_word, arguments) = complete.split_first()?;
        let ctx = self.request();
        let spec = ctx.command_spec(command).await?;
        Some(
            TreeBuilder::new(&ctx)
                .build(command_word, spec, arguments)
                .await,
        )
    }
}

fn visible(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    suggestions.into_iter().filter(|s| !s.hidden).collect()
}

/// Keep suggestions with a name starting with `prefix`, in order
///
/// Paths are compared by their last component only, as that is all a path
/// suggestion names.
pub fn filter_by_prefix(suggestions: Vec<Suggestion>, prefix: &str) -> Vec<Suggestion> {
    let (_, leaf) = split_path(prefix);
    suggestions
        .into_iter()
        .filter(|suggestion| {
            let wanted = match suggestion.kind {
                SuggestionKind::File | SuggestionKind::Folder => leaf,
                _ => prefix,
            };
            suggestion.names.iter().any(|name| name.starts_with(wanted))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SpecError};
    use crate::runtime::{ShellAlias, ShellEnvironment, StaticRuntime};
    use crate::spec::{CommandSpec, OptionSpec, SpecRegistry};
    use async_trait::async_trait;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn names(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name()).collect()
    }

    fn git_spec() -> CommandSpec {
        CommandSpec::new("git")
            .with_subcommand(
                CommandSpec::new("commit")
                    .with_option(OptionSpec::new(["--amend"]))
                    .with_option(OptionSpec::new(["--internal"]).hidden()),
            )
            .with_subcommand(CommandSpec::new("push"))
            .with_subcommand(CommandSpec::new("gc").hidden())
    }

    fn engine(runtime: StaticRuntime) -> CompletionEngine {
        CompletionEngine::new(
            Arc::new(SpecRegistry::new().with_spec(git_spec())),
            Arc::new(runtime),
        )
    }

    /// Spec manager whose lookups always fail
    struct FailingSpecs;

    #[async_trait]
    impl SpecManager for FailingSpecs {
        async fn get_command_spec(&self, name: &str) -> Result<Option<Arc<CommandSpec>>> {
            Err(SpecError::NotFound(name.to_string()).into())
        }

        async fn resolve_full(&self, spec: Arc<CommandSpec>) -> Result<Arc<CommandSpec>> {
            Ok(spec)
        }
    }

    #[tokio::test]
    async fn test_no_opinion_cases() {
        let engine = engine(StaticRuntime::new());

        assert!(engine.compute_completions("git", &[]).await.is_none());
        assert!(engine.compute_completions("git", &tokens(&[""])).await.is_none());
        assert!(engine.compute_completions("git", &tokens(&["  "])).await.is_none());
        assert!(
            engine
                .compute_completions("hg", &tokens(&["hg", ""]))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_subcommands_exclude_hidden() {
        let engine = engine(StaticRuntime::new());

        let suggestions = engine
            .compute_completions("git", &tokens(&["git", ""]))
            .await
            .unwrap();
        assert_eq!(names(&suggestions), vec!["commit", "push"]);
    }

    #[tokio::test]
    async fn test_completes_inside_subcommand() {
        let engine = engine(StaticRuntime::new());

        let suggestions = engine
            .compute_completions("git", &tokens(&["git", "commit", "--a"]))
            .await
            .unwrap();
        assert_eq!(names(&suggestions), vec!["--amend"]);

        let suggestions = engine
            .compute_completions("git", &tokens(&["git", "commit", "--amend", ""]))
            .await
            .unwrap();
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_command_word_completion() {
        let runtime = StaticRuntime::new().with_environment(ShellEnvironment {
            commands: vec!["git".to_string(), "grep".to_string()],
            ..ShellEnvironment::default()
        });
        let engine = engine(runtime);

        let suggestions = engine
            .compute_completions("git", &tokens(&["gi"]))
            .await
            .unwrap();
        assert_eq!(names(&suggestions), vec!["git", "grep"]);
    }

    #[tokio::test]
    async fn test_command_word_without_spec_is_no_opinion() {
        let runtime = StaticRuntime::new().with_environment(ShellEnvironment {
            commands: vec!["hg".to_string()],
            ..ShellEnvironment::default()
        });
        let engine = engine(runtime);

        assert!(engine.compute_completions("hg", &tokens(&["hg"])).await.is_none());
    }

    #[tokio::test]
    async fn test_alias_resolves_to_spec() {
        let runtime = StaticRuntime::new().with_environment(ShellEnvironment {
            aliases: vec![ShellAlias::new("g", "git")],
            ..ShellEnvironment::default()
        });
        let engine = engine(runtime);

        let suggestions = engine
            .compute_completions("g", &tokens(&["g", ""]))
            .await
            .unwrap();
        assert_eq!(names(&suggestions), vec!["commit", "push"]);
    }

    #[tokio::test]
    async fn test_failing_spec_manager_means_no_opinion() {
        let engine = CompletionEngine::new(Arc::new(FailingSpecs), Arc::new(StaticRuntime::new()));
        let result = engine
            .compute_completions("git", &tokens(&["git", ""]))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_file_suggestions() {
        let runtime = StaticRuntime::new().with_directory("src", ["main.rs", "lib.rs"]);
        let engine = engine(runtime);

        let suggestions = engine
            .compute_file_suggestions(&tokens(&["cat", "src/"]))
            .await
            .unwrap();
        assert_eq!(names(&suggestions), vec!["main.rs", "lib.rs", ""]);
        assert!(engine.compute_file_suggestions(&[]).await.is_none());
    }

    #[tokio::test]
    async fn test_parse_returns_tree() {
        let engine = engine(StaticRuntime::new());

        let tree = engine
            .parse("git", &tokens(&["git", "commit", "--amend", ""]))
            .await
            .unwrap();
        assert_eq!(tree.dump(), "git [subcommand]\n  commit [subcommand] <\n    --amend [option]\n");
        assert!(engine.parse("git", &tokens(&["git"])).await.is_none());
    }

    #[test]
    fn test_filter_by_prefix() {
        let suggestions = vec![
            Suggestion::new("commit"),
            Suggestion::new("checkout"),
            Suggestion::new("push"),
            Suggestion::new("main.rs").with_kind(SuggestionKind::File),
        ];

        let filtered = filter_by_prefix(suggestions.clone(), "c");
        assert_eq!(names(&filtered), vec!["commit", "checkout"]);

        let filtered = filter_by_prefix(suggestions.clone(), "src/ma");
        assert_eq!(names(&filtered), vec!["main.rs"]);

        assert_eq!(filter_by_prefix(suggestions, "").len(), 4);
    }

    #[test]
    fn test_blocking_usage() {
        let engine = engine(StaticRuntime::new());
        let result = tokio_test::block_on(engine.compute_completions("git", &tokens(&["git", "p"])));
        assert_eq!(result.map(|s| s.len()), Some(2));
    }
}
