//! Shell completion generation.

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;
use std::io::Write;

/// Writes the completion script for `shell` to `out`.
pub fn generate(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "gopack", out);
}

/// Prints the completion script for `shell` to stdout.
pub fn execute(shell: Shell) {
    generate(shell, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_generation() {
        for shell in [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Elvish,
        ] {
            let mut output = Vec::new();
            generate(shell, &mut output);
            let script = String::from_utf8_lossy(&output);
            assert!(script.contains("gopack"), "no command name for {shell:?}");
            assert!(script.contains("snapshot"), "no flags for {shell:?}");
        }
    }
}
