//! cmdcomplete - spec-driven command-line completion
//!
//! Prints the completions for the last token of a command line, computed
//! from declarative command specs. Meant to be called from shell integration
//! scripts and editors.
//!
//! # Usage
//!
//! ```bash
//! # Suggestions for "git comm"
//! cmdcomplete complete git comm
//!
//! # Suggestions after "git commit " as a table
//! cmdcomplete --format table complete git commit ""
//! ```

use tracing_subscriber::EnvFilter;

use cmdcomplete::cli::CliInterface;
use cmdcomplete::error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the selected subcommand
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);
    cli.handle_subcommand().await
}

/// Initialize logging on stderr so stdout carries only suggestions
///
/// `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
