//! Tree builder
//!
//! Turns the complete tokens of a command line into a [`ParseTree`]. The
//! builder alternates between two states: at a subcommand, where a token may
//! be a subcommand, an option, a flag cluster, an `--opt=value` pair, or an
//! argument; and at an option, where tokens fill the option's argument slots
//! until none are left. Every token is consumed exactly once, in order, and a
//! token nothing accounts for becomes an unknown node. Building never fails.

use std::sync::Arc;
use tracing::{debug, trace};

use super::context::RequestContext;
use super::paths::{contains_separator, matches_leaf};
use super::suggestions::{ArgumentWindow, SuggestionsProvider};
use super::tree::{NodeId, NodeKind, ParseTree, Scope};
use crate::spec::{ArgumentSpec, CommandSpec, ParserDirectives, Suggestion, SuggestionSource};

/// Where parsing continues after a token at a subcommand
enum Step {
    /// Next token is parsed at the same subcommand
    Stay,
    /// Next token is parsed at a newly entered command node
    Descend(NodeId),
    /// Next token first tries to fill the option's arguments
    EnterOption(NodeId),
}

/// Outcome of offering a token to an open option
enum OptionStep {
    /// The token became one of the option's values
    Consumed,
    /// The token became a command node that parsing continues in
    Descend(NodeId),
    /// The option takes nothing more; the token goes back to the subcommand
    Returned,
}

/// Builds parse trees by asking the suggestion provider what each token is
pub struct TreeBuilder<'a> {
    ctx: &'a RequestContext,
    provider: SuggestionsProvider<'a>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            provider: SuggestionsProvider::new(ctx),
        }
    }

    /// Parse `tokens` (every token except the one being typed)
    ///
    /// # Arguments
    /// * `command_name` - Command word as typed
    /// * `spec` - Full spec of the command
    /// * `tokens` - Complete argument tokens, in order
    pub async fn build(
        &self,
        command_name: &str,
        spec: Arc<CommandSpec>,
        tokens: &[String],
    ) -> ParseTree {
        let mut tree = ParseTree::new(command_name, spec);
        let mut current = tree.root();
        let mut open_option: Option<NodeId> = None;
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            if let Some(option) = open_option {
                match self.option_step(&mut tree, option, token).await {
                    OptionStep::Consumed => index += 1,
                    OptionStep::Descend(node) => {
                        current = node;
                        open_option = None;
                        index += 1;
                    }
                    OptionStep::Returned => open_option = None,
                }
                continue;
            }

            match self.subcommand_step(&mut tree, current, token).await {
                Step::Stay => {}
                Step::Descend(node) => current = node,
                Step::EnterOption(option) => open_option = Some(option),
            }
            index += 1;
        }

        tree.set_position(open_option.unwrap_or(current));
        trace!("parse tree:\n{}", tree.dump());
        tree
    }

    async fn subcommand_step(&self, tree: &mut ParseTree, node: NodeId, token: &str) -> Step {
        let candidates = self.provider.suggestions_at(tree, node, token).await;

        if let Some(matched) = find_match(&candidates, token) {
            return self.attach(tree, node, matched, token).await;
        }

        let directives = tree.merged_directives(node);
        if !directives.flags_are_posix_noncompliant && is_flag_cluster(token) {
            return self.attach_cluster(tree, node, token).await;
        }

        if attach_separated(tree, node, &candidates, token, &directives) {
            return Step::Stay;
        }

        debug!("unknown token '{}' under '{}'", token, tree.text(node));
        tree.add_child(node, NodeKind::Unknown, token);
        Step::Stay
    }

    async fn option_step(&self, tree: &mut ParseTree, option: NodeId, token: &str) -> OptionStep {
        let NodeKind::Option { spec } = tree.kind(option) else {
            return OptionStep::Returned;
        };
        let spec = Arc::clone(spec);
        let window = ArgumentWindow::compute(tree, option, &spec.arguments);

        let candidates = if window.is_empty() {
            Vec::new()
        } else {
            self.provider.window_suggestions(&window, token).await
        };
        if let Some(matched) = find_match(&candidates, token) {
            return match self.attach(tree, option, matched, token).await {
                Step::Descend(node) => OptionStep::Descend(node),
                Step::Stay | Step::EnterOption(_) => OptionStep::Consumed,
            };
        }

        if let Some(required) = window.first_unmet_required {
            tree.add_child(option, NodeKind::Argument { spec: required }, token);
            return OptionStep::Consumed;
        }
        OptionStep::Returned
    }

    /// Attach `token` under `parent` as whatever `matched` was produced from
    async fn attach(
        &self,
        tree: &mut ParseTree,
        parent: NodeId,
        matched: &Suggestion,
        token: &str,
    ) -> Step {
        match &matched.source {
            SuggestionSource::Subcommand(spec) => {
                let spec = self.ctx.resolve_full(Arc::clone(spec)).await;
                let node = tree.add_child(
                    parent,
                    NodeKind::Subcommand {
                        spec,
                        scope: Scope::Declared,
                    },
                    token,
                );
                Step::Descend(node)
            }
            SuggestionSource::Option(spec) => {
                let node = tree.add_child(
                    parent,
                    NodeKind::Option {
                        spec: Arc::clone(spec),
                    },
                    token,
                );
                if spec.arguments.is_empty() {
                    Step::Stay
                } else {
                    Step::EnterOption(node)
                }
            }
            SuggestionSource::Argument(spec) => {
                if let Some(node) = self.nested_command(tree, parent, spec, matched, token).await {
                    return Step::Descend(node);
                }
                tree.add_child(
                    parent,
                    NodeKind::Argument {
                        spec: Arc::clone(spec),
                    },
                    token,
                );
                Step::Stay
            }
            SuggestionSource::None => {
                tree.add_child(parent, NodeKind::Unknown, token);
                Step::Stay
            }
        }
    }

    /// A command typed where an argument accepts one, if its spec is known
    async fn nested_command(
        &self,
        tree: &mut ParseTree,
        parent: NodeId,
        argument: &ArgumentSpec,
        matched: &Suggestion,
        token: &str,
    ) -> Option<NodeId> {
        if !argument.accepts_nested_command || !matched.kind.is_command() {
            return None;
        }
        let spec = self.ctx.command_spec(token).await?;
        debug!("descending into nested command '{}'", token);
        Some(tree.add_child(
            parent,
            NodeKind::Subcommand {
                spec,
                scope: Scope::NestedCommand,
            },
            token,
        ))
    }

    /// Split `-abc` into `-a`, `-b`, `-c`
    ///
    /// Every flag is matched against the candidates offered before the
    /// cluster, so `-vv` attaches `-v` twice.
    async fn attach_cluster(&self, tree: &mut ParseTree, node: NodeId, token: &str) -> Step {
        let candidates = self.provider.suggestions_at(tree, node, token).await;
        let mut step = Step::Stay;
        for flag in token.chars().skip(1) {
            let flag = format!("-{flag}");
            let option = candidates.iter().find_map(|candidate| match &candidate.source {
                SuggestionSource::Option(spec) if candidate.matches(&flag) => Some(Arc::clone(spec)),
                _ => None,
            });

            step = match option {
                Some(spec) => {
                    let takes_arguments = !spec.arguments.is_empty();
                    let id = tree.add_child(node, NodeKind::Option { spec }, flag);
                    if takes_arguments {
                        Step::EnterOption(id)
                    } else {
                        Step::Stay
                    }
                }
                None => {
                    tree.add_child(node, NodeKind::Unknown, flag);
                    Step::Stay
                }
            };
        }
        step
    }
}

/// Exact name match, or for path-like tokens a match on the last component
fn find_match<'s>(candidates: &'s [Suggestion], token: &str) -> Option<&'s Suggestion> {
    candidates
        .iter()
        .find(|candidate| candidate.matches(token))
        .or_else(|| {
            if contains_separator(token) {
                candidates
                    .iter()
                    .find(|candidate| matches_leaf(candidate, token))
            } else {
                None
            }
        })
}

/// `-` followed by a non-dash and at least two more characters
fn is_flag_cluster(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-')
        && chars.next().is_some_and(|c| c != '-')
        && chars.count() >= 2
}

/// Attach `--opt=value` as an option node holding its value
///
/// Returns false if no candidate option is spelled with a separator here.
fn attach_separated(
    tree: &mut ParseTree,
    node: NodeId,
    candidates: &[Suggestion],
    token: &str,
    directives: &ParserDirectives,
) -> bool {
    for candidate in candidates {
        let SuggestionSource::Option(spec) = &candidate.source else {
            continue;
        };
        let separators = spec
            .arg_separator
            .iter()
            .chain(directives.option_arg_separators.iter())
            .filter(|separator| !separator.is_empty());

        for separator in separators {
            for name in &spec.names {
                let Some(value) = token
                    .strip_prefix(name.as_str())
                    .and_then(|rest| rest.strip_prefix(separator.as_str()))
                else {
                    continue;
                };

                let option = tree.add_child(
                    node,
                    NodeKind::Option {
                        spec: Arc::clone(spec),
                    },
                    name.as_str(),
                );
                match spec.arguments.first() {
                    Some(argument) => tree.add_child(
                        option,
                        NodeKind::Argument {
                            spec: Arc::clone(argument),
                        },
                        value,
                    ),
                    // Separator declared on an option without arguments
                    None => tree.add_child(option, NodeKind::Unknown, value),
                };
                return true;
            }
        }
    }
    false
}
