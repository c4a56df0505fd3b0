//! Table formatting for suggestion lists using tabled

use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::spec::Suggestion;

/// Maximum width of the description column (characters)
const DEFAULT_MAX_DESCRIPTION_WIDTH: usize = 60;

/// Table formatter for suggestions
pub struct TableFormatter {
    /// Maximum description column width
    max_description_width: usize,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_description_width: DEFAULT_MAX_DESCRIPTION_WIDTH,
        }
    }

    /// Set maximum description column width
    pub fn with_max_description_width(mut self, width: usize) -> Self {
        self.max_description_width = width;
        self
    }

    /// Format suggestions as a name / kind / description table
    pub fn format(&self, suggestions: &[Suggestion]) -> String {
        if suggestions.is_empty() {
            return "(no suggestions)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(["name", "kind", "description"].map(String::from));
        for suggestion in suggestions {
            builder.push_record([
                display_name(suggestion).to_string(),
                suggestion.kind.as_str().to_string(),
                suggestion.description.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern());
        table.with(Modify::new(Columns::new(2..=2)).with(Width::wrap(self.max_description_width)));
        table.with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Name shown for a suggestion; the accept-directory entry has none
fn display_name(suggestion: &Suggestion) -> &str {
    if let Some(display) = suggestion.display_name.as_deref() {
        return display;
    }
    match suggestion.name() {
        "" => ".",
        name => name,
    }
}
