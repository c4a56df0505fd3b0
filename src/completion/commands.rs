//! Commands the shell could run next
//!
//! The list is built from the request's environment snapshot: aliases first,
//! then builtins, functions, and executables. An alias shadows both a
//! same-named entry and the command it expands to.

use futures::future::join_all;
use std::collections::HashSet;

use super::context::RequestContext;
use crate::spec::{Suggestion, SuggestionKind};

/// Every command name available in the current shell, deduplicated
pub async fn available_commands(ctx: &RequestContext) -> Vec<Suggestion> {
    let environment = ctx.environment().await;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut suggestions = Vec::new();

    for alias in &environment.aliases {
        let target = alias.definition.trim();
        let is_new = seen.insert(alias.name.as_str());
        seen.insert(target);
        if is_new {
            suggestions.push(
                Suggestion::new(alias.name.as_str())
                    .with_kind(SuggestionKind::Alias)
                    .with_description(target),
            );
        }
    }

    let others = [
        (&environment.builtins, SuggestionKind::Builtin),
        (&environment.functions, SuggestionKind::Function),
        (&environment.commands, SuggestionKind::Command),
    ];
    let mut pending = Vec::new();
    for (names, kind) in others {
        for name in names {
            if seen.insert(name.as_str()) {
                pending.push((name.as_str(), kind));
            }
        }
    }

    let upgrades = join_all(pending.iter().map(|(name, _)| ctx.short_spec(name))).await;
    for ((name, kind), short) in pending.into_iter().zip(upgrades) {
        let mut suggestion = Suggestion::new(name).with_kind(kind);
        if let Some(short) = short {
            suggestion.description = short.description;
        }
        suggestions.push(suggestion);
    }

    suggestions
}
