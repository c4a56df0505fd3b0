//! File and directory suggestions
//!
//! The in-progress token is split on its last separator: the part up to and
//! including the separator is the directory to list, the rest is the leaf
//! being typed. Suggestions carry only the leaf names of the entries.

use std::sync::Arc;

use super::context::RequestContext;
use crate::spec::{ArgumentSpec, Suggestion, SuggestionKind, SuggestionSource};

/// Separator between path components
pub const PATH_SEPARATOR: char = '/';

/// Whether the text names something below a directory
pub fn contains_separator(text: &str) -> bool {
    text.contains(PATH_SEPARATOR)
}

/// Split into `(base directory, leaf)`; the base keeps its trailing separator
///
/// `"src/ma"` gives `(Some("src/"), "ma")`, `"ma"` gives `(None, "ma")`.
pub fn split_path(text: &str) -> (Option<&str>, &str) {
    match text.rfind(PATH_SEPARATOR) {
        Some(index) => (Some(&text[..=index]), &text[index + 1..]),
        None => (None, text),
    }
}

/// Whether a suggestion names the last component of a complete path token
///
/// A token ending in a separator accepts the directory itself, which is what
/// the synthetic empty-name entry stands for.
pub fn matches_leaf(suggestion: &Suggestion, token: &str) -> bool {
    if token.ends_with(PATH_SEPARATOR) {
        return suggestion.matches("");
    }
    let (_, leaf) = split_path(token);
    !leaf.is_empty()
        && suggestion
            .names
            .iter()
            .any(|name| name.trim_end_matches(PATH_SEPARATOR) == leaf)
}

/// `"./"` names the working directory just like no base at all
fn is_working_dir(base_dir: Option<&str>) -> bool {
    match base_dir {
        None => true,
        Some(base) => base.len() > 1 && base.trim_end_matches(PATH_SEPARATOR) == ".",
    }
}

fn is_self_or_parent(entry: &str) -> bool {
    matches!(entry.trim_end_matches(PATH_SEPARATOR), "." | "..")
}

/// Entries of the directory `next_text` points into
///
/// # Arguments
/// * `ctx` - Request context used to list the directory
/// * `argument` - Argument the suggestions are offered for
/// * `next_text` - Partially typed path
/// * `only_directories` - Drop everything but directories
pub async fn path_suggestions(
    ctx: &RequestContext,
    argument: &Arc<ArgumentSpec>,
    next_text: &str,
    only_directories: bool,
) -> Vec<Suggestion> {
    let (base_dir, _) = split_path(next_text);
    let in_working_dir = is_working_dir(base_dir);
    let listed = match base_dir {
        Some(base) if !in_working_dir => base,
        _ => ".",
    };
    let entries = ctx.list_directory(listed).await;

    let mut suggestions: Vec<Suggestion> = entries
        .into_iter()
        .filter(|entry| !only_directories || entry.ends_with(PATH_SEPARATOR))
        .filter(|entry| in_working_dir || !is_self_or_parent(entry))
        .map(|entry| {
            let kind = if entry.ends_with(PATH_SEPARATOR) {
                SuggestionKind::Folder
            } else {
                SuggestionKind::File
            };
            Suggestion::new(entry)
                .with_kind(kind)
                .with_source(SuggestionSource::Argument(Arc::clone(argument)))
        })
        .collect();

    if !in_working_dir {
        // Accepts the typed directory as it is
        suggestions.push(
            Suggestion::new("")
                .with_kind(SuggestionKind::Folder)
                .with_source(SuggestionSource::Argument(Arc::clone(argument))),
        );
    }
    suggestions
}
