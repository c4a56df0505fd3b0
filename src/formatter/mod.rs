//! Output formatting for suggestion lists
//!
//! - Plain: one insert value per line, for shell integration scripts
//! - JSON: pretty-printed array, for editors and other tools
//! - Table: human-readable name / kind / description layout

mod table;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::spec::Suggestion;

pub use table::TableFormatter;

/// Main formatter for suggestion lists
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,
}

impl Formatter {
    /// Create a new formatter
    pub fn new(format_type: OutputFormat) -> Self {
        Self { format_type }
    }

    pub fn format_type(&self) -> OutputFormat {
        self.format_type
    }

    /// Format suggestions according to the configured format
    pub fn format(&self, suggestions: &[Suggestion]) -> Result<String> {
        let output = match self.format_type {
            OutputFormat::Plain => suggestions
                .iter()
                .map(Suggestion::insert_text)
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(suggestions)?,
            OutputFormat::Table => TableFormatter::new().format(suggestions),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SuggestionKind;

    fn sample() -> Vec<Suggestion> {
        let mut push = Suggestion::new("push").with_kind(SuggestionKind::Subcommand);
        push.insert_value = Some("push ".to_string());
        vec![Suggestion::new("commit"), push]
    }

    #[test]
    fn test_plain_uses_insert_text() {
        let output = Formatter::new(OutputFormat::Plain).format(&sample()).unwrap();
        assert_eq!(output, "commit\npush ");
    }

    #[test]
    fn test_json_output() {
        let output = Formatter::new(OutputFormat::Json).format(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[1]["names"][0], "push");
        assert_eq!(value[1]["kind"], "subcommand");
        assert_eq!(value[0]["priority"], 50);
    }

    #[test]
    fn test_empty_plain_output() {
        let output = Formatter::new(OutputFormat::Plain).format(&[]).unwrap();
        assert!(output.is_empty());
    }
}
