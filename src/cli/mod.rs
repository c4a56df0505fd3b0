//! Command-line interface for cmdcomplete
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and overriding from arguments
//! - Building the completion engine from the effective configuration
//! - Dispatching subcommands

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::completion::{CompletionEngine, filter_by_prefix};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::formatter::Formatter;
use crate::runtime::LocalRuntime;
use crate::spec::{SpecRegistry, Suggestion};

/// cmdcomplete - spec-driven command-line completion
#[derive(Parser, Debug)]
#[command(
    name = "cmdcomplete",
    version,
    about = "Spec-driven shell command-line completion",
    long_about = "Parses a partially typed command line against a declarative command spec
and prints the candidates for the token being typed."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Directory holding command spec documents
    #[arg(long, value_name = "DIR")]
    pub specs: Option<PathBuf>,

    /// Directory relative paths are completed against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Print every suggestion instead of only those matching the typed text
    #[arg(long)]
    pub all: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for cmdcomplete
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Complete the last token of a command line
    Complete {
        /// Command the spec is looked up for
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Tokens after the command word; the last one is being typed
        #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Complete the last token as a file path
    Files {
        #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Print the parse tree of a command line
    Tree {
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Complete tokens after the command word
        #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply command-line arguments on top of the loaded configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
        Self::apply_source_args(config, args);
    }

    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if let Some(format) = args.format {
            config.display.format = format;
        }
        if args.all {
            config.display.filter_by_prefix = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        use crate::config::LogLevel;

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    fn apply_source_args(config: &mut Config, args: &CliArgs) {
        if let Some(specs) = &args.specs {
            config.specs.directory = specs.clone();
        }
        if let Some(cwd) = &args.cwd {
            config.runtime.working_directory = Some(cwd.clone());
        }
    }

    /// Build a completion engine from the effective configuration
    pub fn engine(&self) -> CompletionEngine {
        let specs = SpecRegistry::with_directory(self.config.specs.directory.clone());
        let runtime = match &self.config.runtime.working_directory {
            Some(dir) => LocalRuntime::new(dir.clone()),
            None => LocalRuntime::default(),
        }
        .with_generator_timeout(self.config.generator_timeout())
        .with_aliases(self.config.shell_aliases());

        CompletionEngine::new(Arc::new(specs), Arc::new(runtime))
    }

    /// Run the selected subcommand
    pub async fn handle_subcommand(&self) -> Result<()> {
        match &self.args.command {
            Commands::Complete { command, tokens } => self.complete(command, tokens).await,
            Commands::Files { tokens } => self.files(tokens).await,
            Commands::Tree { command, tokens } => self.tree(command, tokens).await,
            Commands::Completion { shell } => completion::generate_completion(shell),
            Commands::Config { show, validate } => self.handle_config_command(*show, *validate),
        }
    }

    async fn complete(&self, command: &str, tokens: &[String]) -> Result<()> {
        let line = command_line(command, tokens);
        let Some(suggestions) = self.engine().compute_completions(command, &line).await else {
            return Ok(());
        };
        let typed = line.last().map(String::as_str).unwrap_or("");
        self.print_suggestions(suggestions, typed)
    }

    async fn files(&self, tokens: &[String]) -> Result<()> {
        let Some(suggestions) = self.engine().compute_file_suggestions(tokens).await else {
            return Ok(());
        };
        let typed = tokens.last().map(String::as_str).unwrap_or("");
        self.print_suggestions(suggestions, typed)
    }

    async fn tree(&self, command: &str, tokens: &[String]) -> Result<()> {
        // Every given token is complete; the empty one stands for the next
        let mut line = command_line(command, tokens);
        line.push(String::new());

        match self.engine().parse(command, &line).await {
            Some(tree) => print!("{}", tree.dump()),
            None => eprintln!("No spec found for '{}'", command),
        }
        Ok(())
    }

    fn print_suggestions(&self, suggestions: Vec<Suggestion>, typed: &str) -> Result<()> {
        let suggestions = if self.config.display.filter_by_prefix {
            filter_by_prefix(suggestions, typed)
        } else {
            suggestions
        };

        let output = Formatter::new(self.config.display.format).format(&suggestions)?;
        if !output.is_empty() {
            println!("{}", output);
        }
        Ok(())
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }
        if show {
            self.show_config()?;
        }
        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist");
            return;
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_string()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

/// The command word followed by its tokens, as the engine expects them
fn command_line(command: &str, tokens: &[String]) -> Vec<String> {
    std::iter::once(command.to_string())
        .chain(tokens.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_complete_accepts_hyphen_tokens() {
        let args = parse(&["cmdcomplete", "complete", "git", "commit", "--am"]);
        match args.command {
            Commands::Complete { command, tokens } => {
                assert_eq!(command, "git");
                assert_eq!(tokens, vec!["commit", "--am"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_args_override_config() {
        let args = parse(&[
            "cmdcomplete",
            "--format",
            "json",
            "--all",
            "--vv",
            "--specs",
            "/tmp/specs",
            "--cwd",
            "/tmp",
            "files",
            "src/",
        ]);
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);

        assert_eq!(config.display.format, OutputFormat::Json);
        assert!(!config.display.filter_by_prefix);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.specs.directory, PathBuf::from("/tmp/specs"));
        assert_eq!(config.runtime.working_directory, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_quiet_lowers_log_level() {
        let args = parse(&["cmdcomplete", "-q", "config", "--show"]);
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_command_line() {
        let line = command_line("git", &["commit".to_string()]);
        assert_eq!(line, vec!["git", "commit"]);
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let args = parse(&["cmdcomplete", "-c", "/nonexistent/cmdcomplete.toml", "config"]);
        assert!(CliInterface::from_args(args).is_err());
    }
}
