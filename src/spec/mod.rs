//! Spec model: the declarative grammar of a command
//!
//! A [`CommandSpec`] describes a command's subcommands, options, and positional
//! arguments. Specs are immutable once loaded and are shared through `Arc` so
//! parse nodes and suggestions can point back into them cheaply.
//!
//! Specs are plain JSON documents (camelCase keys, every field optional):
//!
//! ```json
//! {
//!   "names": ["git"],
//!   "requiresSubcommand": true,
//!   "subcommands": [
//!     { "names": ["commit"],
//!       "options": [{ "names": ["-m", "--message"], "arguments": [{}] }] }
//!   ]
//! }
//! ```

pub mod manager;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use manager::{SpecManager, SpecRegistry};

/// Declarative description of a command (or subcommand)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandSpec {
    /// Names the command can be invoked by (first one is primary)
    pub names: Vec<String>,

    /// Human-readable description
    pub description: Option<String>,

    /// Nested subcommands
    pub subcommands: Vec<Arc<CommandSpec>>,

    /// Options accepted at this level
    pub options: Vec<Arc<OptionSpec>>,

    /// Positional arguments, in declaration order
    pub arguments: Vec<Arc<ArgumentSpec>>,

    /// When set, nothing but a subcommand is offered until one is chosen
    pub requires_subcommand: bool,

    /// Tokenizing rules for this command and everything nested in it
    pub parser_directives: ParserDirectives,

    /// Forward pointer to the full definition, resolved by the spec manager
    pub deferred_spec_ref: Option<String>,

    /// Parsed normally but never offered as a suggestion
    pub hidden: bool,
}

/// Grammar-wide tokenizing rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserDirectives {
    /// `-abc` is a single flag rather than `-a -b -c`
    pub flags_are_posix_noncompliant: bool,

    /// No option may follow the first positional argument
    pub options_must_precede_arguments: bool,

    /// Separators joining an option with its value (`--opt=value`)
    pub option_arg_separators: Vec<String>,
}

/// An option (flag) a command accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionSpec {
    pub names: Vec<String>,
    pub description: Option<String>,
    pub arguments: Vec<Arc<ArgumentSpec>>,

    /// Also valid inside subcommands nested below the declaring command
    pub is_persistent: bool,

    /// How many times the option may appear; 0 means unlimited
    pub repeat_limit: usize,

    /// Options that cannot be combined with this one
    pub exclusive_with: Vec<String>,

    /// Options that must already be present before this one is offered
    pub requires_presence_of: Vec<String>,

    /// Separator between name and value, e.g. `=`
    pub arg_separator: Option<String>,

    pub hidden: bool,
}

/// A positional argument slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArgumentSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_optional: bool,
    pub is_variadic: bool,
    pub options_can_interrupt_variadic: bool,

    /// The slot holds another command line (`sudo <command>`)
    pub accepts_nested_command: bool,

    pub path_kind: Option<PathKind>,
    pub static_suggestions: Vec<Suggestion>,
    pub generators: Vec<GeneratorSpec>,
}

/// Which filesystem entries a path argument accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Folder,
}

/// External source of dynamic suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorSpec {
    /// Shell script whose output becomes suggestions
    pub script: String,

    /// Separator splitting the script output into entries
    pub split_on: String,

    /// Kind assigned to produced suggestions
    pub kind: Option<SuggestionKind>,
}

/// Minimal spec used to decorate command-name suggestions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShortCommandSpec {
    pub names: Vec<String>,
    pub description: Option<String>,
}

/// A candidate completion for the in-progress token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
    pub names: Vec<String>,
    pub kind: SuggestionKind,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub insert_value: Option<String>,
    pub priority: i32,
    pub hidden: bool,

    /// Spec element this suggestion was produced from
    #[serde(skip)]
    pub source: SuggestionSource,
}

/// Kind of a suggestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Subcommand,
    Option,
    #[default]
    Argument,
    File,
    Folder,
    Command,
    Alias,
    Builtin,
    Function,
}

/// Back-reference from a suggestion to the spec element that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SuggestionSource {
    #[default]
    None,
    Subcommand(Arc<CommandSpec>),
    Option(Arc<OptionSpec>),
    Argument(Arc<ArgumentSpec>),
}

/// Default priority of a suggestion without an explicit one
pub const DEFAULT_PRIORITY: i32 = 50;

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Self::default()
        }
    }

    /// Parse a spec from its JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Primary name, or an empty string for an unnamed spec
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_subcommand(mut self, subcommand: CommandSpec) -> Self {
        self.subcommands.push(Arc::new(subcommand));
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(Arc::new(option));
        self
    }

    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(Arc::new(argument));
        self
    }

    pub fn with_directives(mut self, directives: ParserDirectives) -> Self {
        self.parser_directives = directives;
        self
    }

    pub fn with_deferred_ref(mut self, reference: impl Into<String>) -> Self {
        self.deferred_spec_ref = Some(reference.into());
        self
    }

    pub fn requiring_subcommand(mut self) -> Self {
        self.requires_subcommand = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Build the suggestion offering this command as a subcommand
    pub fn to_suggestion(self: &Arc<Self>) -> Suggestion {
        Suggestion {
            names: self.names.clone(),
            kind: SuggestionKind::Subcommand,
            description: self.description.clone(),
            hidden: self.hidden,
            source: SuggestionSource::Subcommand(Arc::clone(self)),
            ..Suggestion::default()
        }
    }
}

impl ParserDirectives {
    /// Combine with an ancestor's directives; nothing set by either side is lost
    pub fn merge(&mut self, other: &ParserDirectives) {
        self.flags_are_posix_noncompliant |= other.flags_are_posix_noncompliant;
        self.options_must_precede_arguments |= other.options_must_precede_arguments;
        for separator in &other.option_arg_separators {
            if !self.option_arg_separators.contains(separator) {
                self.option_arg_separators.push(separator.clone());
            }
        }
    }
}

impl Default for OptionSpec {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            description: None,
            arguments: Vec::new(),
            is_persistent: false,
            repeat_limit: 1,
            exclusive_with: Vec::new(),
            requires_presence_of: Vec::new(),
            arg_separator: None,
            hidden: false,
        }
    }
}

impl OptionSpec {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(Arc::new(argument));
        self
    }

    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    pub fn with_repeat_limit(mut self, limit: usize) -> Self {
        self.repeat_limit = limit;
        self
    }

    pub fn exclusive_with<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_with = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires_presence_of = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.arg_separator = Some(separator.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn to_suggestion(self: &Arc<Self>) -> Suggestion {
        Suggestion {
            names: self.names.clone(),
            kind: SuggestionKind::Option,
            description: self.description.clone(),
            hidden: self.hidden,
            source: SuggestionSource::Option(Arc::clone(self)),
            ..Suggestion::default()
        }
    }
}

impl Default for ArgumentSpec {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            is_optional: false,
            is_variadic: false,
            options_can_interrupt_variadic: true,
            accepts_nested_command: false,
            path_kind: None,
            static_suggestions: Vec::new(),
            generators: Vec::new(),
        }
    }
}

impl ArgumentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A required file argument, used for completion without a command spec
    pub fn file() -> Self {
        Self::new().with_path_kind(PathKind::File)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    /// Once a value is given, options may no longer follow
    pub fn uninterruptible(mut self) -> Self {
        self.options_can_interrupt_variadic = false;
        self
    }

    pub fn nested_command(mut self) -> Self {
        self.accepts_nested_command = true;
        self
    }

    pub fn with_path_kind(mut self, kind: PathKind) -> Self {
        self.path_kind = Some(kind);
        self
    }

    pub fn with_suggestions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_suggestions
            .extend(names.into_iter().map(Suggestion::new));
        self
    }

    pub fn with_generator(mut self, generator: GeneratorSpec) -> Self {
        self.generators.push(generator);
        self
    }
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        Self {
            script: String::new(),
            split_on: "\n".to_string(),
            kind: None,
        }
    }
}

impl GeneratorSpec {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }
}

impl Default for Suggestion {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            kind: SuggestionKind::default(),
            description: None,
            display_name: None,
            insert_value: None,
            priority: DEFAULT_PRIORITY,
            hidden: false,
            source: SuggestionSource::None,
        }
    }
}

impl Suggestion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: SuggestionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: SuggestionSource) -> Self {
        self.source = source;
        self
    }

    /// Primary name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    /// Exact match against any of the names
    pub fn matches(&self, text: &str) -> bool {
        self.names.iter().any(|n| n == text)
    }

    /// Text to insert when the suggestion is accepted
    pub fn insert_text(&self) -> &str {
        self.insert_value.as_deref().unwrap_or_else(|| self.name())
    }
}

impl SuggestionKind {
    /// Entries of the live command list
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            SuggestionKind::Command
                | SuggestionKind::Alias
                | SuggestionKind::Builtin
                | SuggestionKind::Function
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Subcommand => "subcommand",
            SuggestionKind::Option => "option",
            SuggestionKind::Argument => "argument",
            SuggestionKind::File => "file",
            SuggestionKind::Folder => "folder",
            SuggestionKind::Command => "command",
            SuggestionKind::Alias => "alias",
            SuggestionKind::Builtin => "builtin",
            SuggestionKind::Function => "function",
        }
    }
}
