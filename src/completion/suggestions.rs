//! Suggestion provider
//!
//! Answers "what could come next at this node of the parse tree" for a
//! possibly partial token. Subcommand nodes offer their subcommands, the
//! options still allowed in their scope, and values for the active argument
//! window; option nodes offer values for their own arguments and, once those
//! are satisfied, whatever their owning subcommand offers.

use futures::future::join_all;
use std::sync::Arc;
use tracing::trace;

use super::commands::available_commands;
use super::context::RequestContext;
use super::paths::{contains_separator, path_suggestions};
use super::tree::{NodeId, NodeKind, ParseTree, Scope};
use crate::spec::{ArgumentSpec, CommandSpec, OptionSpec, PathKind, Suggestion, SuggestionSource};

/// Computes candidate suggestions at a position in a parse tree
pub struct SuggestionsProvider<'a> {
    ctx: &'a RequestContext,
}

impl<'a> SuggestionsProvider<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Suggestions for the token following `node`
    ///
    /// # Arguments
    /// * `tree` - Parse tree of the complete tokens
    /// * `node` - Node the next token would attach to
    /// * `next_text` - Text typed so far for the next token, possibly empty
    pub async fn suggestions_at(
        &self,
        tree: &ParseTree,
        node: NodeId,
        next_text: &str,
    ) -> Vec<Suggestion> {
        // An argument contributes nothing beyond its owner
        let node = match tree.kind(node) {
            NodeKind::Argument { .. } => tree.parent(node).unwrap_or(node),
            _ => node,
        };

        match tree.kind(node) {
            NodeKind::Subcommand { spec, .. } => {
                self.subcommand_suggestions(tree, node, spec, next_text).await
            }
            NodeKind::Option { spec } => self.option_suggestions(tree, node, spec, next_text).await,
            NodeKind::Argument { .. } | NodeKind::Unknown => Vec::new(),
        }
    }

    async fn subcommand_suggestions(
        &self,
        tree: &ParseTree,
        node: NodeId,
        spec: &Arc<CommandSpec>,
        next_text: &str,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        if tree.children(node).is_empty() && !contains_separator(next_text) {
            suggestions.extend(spec.subcommands.iter().map(|sub| sub.to_suggestion()));
        }
        if spec.requires_subcommand {
            return suggestions;
        }

        if options_allowed(tree, node) {
            let options = available_options(tree, node, spec);
            trace!("{} options available at '{}'", options.len(), tree.text(node));
            suggestions.extend(options.iter().map(|option| option.to_suggestion()));
        }

        let window = ArgumentWindow::compute(tree, node, &spec.arguments);
        suggestions.extend(self.window_suggestions(&window, next_text).await);
        suggestions
    }

    async fn option_suggestions(
        &self,
        tree: &ParseTree,
        node: NodeId,
        spec: &Arc<OptionSpec>,
        next_text: &str,
    ) -> Vec<Suggestion> {
        let window = ArgumentWindow::compute(tree, node, &spec.arguments);
        let mut suggestions = self.window_suggestions(&window, next_text).await;

        if window.first_unmet_required.is_none() && window.allows_interruption() {
            let owner = tree.enclosing_subcommand(node);
            if let NodeKind::Subcommand { spec, .. } = tree.kind(owner) {
                suggestions.extend(
                    self.subcommand_suggestions(tree, owner, spec, next_text)
                        .await,
                );
            }
        }
        suggestions
    }

    /// Value suggestions for every slot of an argument window
    pub(crate) async fn window_suggestions(
        &self,
        window: &ArgumentWindow<'_>,
        next_text: &str,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for argument in window.slots {
            let source = SuggestionSource::Argument(Arc::clone(argument));

            if argument.accepts_nested_command {
                let commands = available_commands(self.ctx).await;
                suggestions.extend(
                    commands
                        .into_iter()
                        .map(|command| command.with_source(source.clone())),
                );
            }

            if let Some(kind) = argument.path_kind {
                let only_directories = kind == PathKind::Folder;
                suggestions.extend(
                    path_suggestions(self.ctx, argument, next_text, only_directories).await,
                );
                if contains_separator(next_text) {
                    continue;
                }
            }

            suggestions.extend(
                argument
                    .static_suggestions
                    .iter()
                    .map(|suggestion| suggestion.clone().with_source(source.clone())),
            );

            let generated = join_all(
                argument
                    .generators
                    .iter()
                    .map(|generator| self.ctx.run_generator(generator, next_text)),
            )
            .await;
            suggestions.extend(
                generated
                    .into_iter()
                    .flatten()
                    .map(|suggestion| suggestion.with_source(source.clone())),
            );
        }

        suggestions
    }
}

/// Whether options may be offered under the subcommand `node`
fn options_allowed(tree: &ParseTree, node: NodeId) -> bool {
    let Some(last) = tree.argument_children(node).last() else {
        return true;
    };
    if tree.merged_directives(node).options_must_precede_arguments {
        return false;
    }
    !last.is_variadic || last.options_can_interrupt_variadic
}

/// Options valid under `node`, minus those ruled out by what was already used
///
/// Persistent options are inherited only along genuinely declared subcommand
/// nesting; a command typed into a nested-command argument starts afresh.
fn available_options(
    tree: &ParseTree,
    node: NodeId,
    spec: &CommandSpec,
) -> Vec<Arc<OptionSpec>> {
    let mut candidates: Vec<Arc<OptionSpec>> = spec.options.clone();

    let mut current = node;
    while let NodeKind::Subcommand {
        scope: Scope::Declared,
        ..
    } = tree.kind(current)
    {
        let Some(parent) = tree.parent(current) else {
            break;
        };
        if let NodeKind::Subcommand { spec, .. } = tree.kind(parent) {
            candidates.extend(
                spec.options
                    .iter()
                    .filter(|option| option.is_persistent)
                    .cloned(),
            );
        }
        current = parent;
    }

    let used: Vec<&Arc<OptionSpec>> = tree.option_children(node).collect();
    candidates
        .into_iter()
        .filter(|option| {
            let count = used.iter().filter(|u| same_option(u, option)).count();
            if option.repeat_limit > 0 && count >= option.repeat_limit {
                return false;
            }

            let excluded = used.iter().any(|u| {
                u.exclusive_with.iter().any(|name| option.has_name(name))
                    || option.exclusive_with.iter().any(|name| u.has_name(name))
            });
            if excluded {
                return false;
            }

            option
                .requires_presence_of
                .iter()
                .all(|name| used.iter().any(|u| u.has_name(name)))
        })
        .collect()
}

fn same_option(a: &Arc<OptionSpec>, b: &Arc<OptionSpec>) -> bool {
    Arc::ptr_eq(a, b) || a.names == b.names
}

/// The argument slots that can take the next value under some owner node
#[derive(Debug)]
pub(crate) struct ArgumentWindow<'s> {
    /// Slots open for the next value, in declaration order
    pub slots: &'s [Arc<ArgumentSpec>],
    /// Most recently filled slot
    pub last_used: Option<Arc<ArgumentSpec>>,
    /// First required slot still waiting for a value
    pub first_unmet_required: Option<Arc<ArgumentSpec>>,
}

impl<'s> ArgumentWindow<'s> {
    /// Window of `declared` given the arguments already attached under `owner`
    ///
    /// The window starts after the last filled slot (or at it, if it is
    /// variadic) and runs up to and including the next required slot.
    pub fn compute(tree: &ParseTree, owner: NodeId, declared: &'s [Arc<ArgumentSpec>]) -> Self {
        let used: Vec<&Arc<ArgumentSpec>> = tree.argument_children(owner).collect();
        let last_used = used.last().map(|last| Arc::clone(last));

        let last_index = last_used.as_ref().map(|last| {
            declared
                .iter()
                .position(|slot| Arc::ptr_eq(slot, last))
                .unwrap_or(used.len() - 1)
        });

        let (start, after_last) = match last_index {
            None => (0, 0),
            Some(index) if declared.get(index).is_some_and(|slot| slot.is_variadic) => {
                (index, index + 1)
            }
            Some(index) => (index + 1, index + 1),
        };

        let required_index =
            (after_last..declared.len()).find(|&index| !declared[index].is_optional);
        let start = start.min(declared.len());
        let end = required_index.map_or(declared.len(), |index| index + 1).max(start);

        Self {
            slots: &declared[start..end],
            last_used,
            first_unmet_required: required_index.map(|index| Arc::clone(&declared[index])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A variadic slot that refuses interruption keeps the owner's options away
    pub fn allows_interruption(&self) -> bool {
        match &self.last_used {
            Some(last) => !last.is_variadic || last.options_can_interrupt_variadic,
            None => true,
        }
    }
}
