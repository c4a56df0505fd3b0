//! Shell completion generation for cmdcomplete
//!
//! Generates completion scripts for the `cmdcomplete` binary itself (bash, zsh,
//! fish), with a bash addition that completes `complete <COMMAND>` from the
//! specs directory.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

const BIN_NAME: &str = "cmdcomplete";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
pub fn generate_completion(shell_name: &str) -> Result<()> {
    write_completion(shell_name, &mut io::stdout())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::InvalidValue {
            field: "shell".to_string(),
            value: format!("{} (supported: bash, zsh, fish)", shell_name),
        }
        .into()),
    }
}

fn render(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);
    let script = String::from_utf8_lossy(&buffer).into_owned();

    match shell {
        Shell::Bash => format!("{}{}", script, BASH_SPEC_NAMES),
        _ => script,
    }
}

/// Complete `cmdcomplete complete <COMMAND>` with the spec documents on disk
const BASH_SPEC_NAMES: &str = r#"
_cmdcomplete_spec_names() {
    local dir="${CMDCOMPLETE_SPECS:-$HOME/.cmdcomplete/specs}"
    [ -d "$dir" ] || return
    local f
    for f in "$dir"/*.json; do
        [ -e "$f" ] && basename "$f" .json
    done
}

_cmdcomplete_enhanced() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    if [[ $COMP_CWORD -ge 2 && "${COMP_WORDS[COMP_CWORD-1]}" == "complete" ]]; then
        COMPREPLY=($(compgen -W "$(_cmdcomplete_spec_names)" -- "$cur"))
        return
    fi
    _cmdcomplete "$@"
}

complete -F _cmdcomplete_enhanced -o bashdefault -o default cmdcomplete
"#;

/// Write a completion script to any writer
pub fn write_completion(shell_name: &str, out: &mut impl io::Write) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    out.write_all(render(shell).as_bytes())?;
    Ok(())
}
