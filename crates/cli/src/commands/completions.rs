//! Shell completion generation
//!
//! Prints completion scripts for the supported shells to stdout.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completions and print to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    write_completions(args.shell, &mut std::io::stdout());
    ExitCode::Success
}

/// Write the completion script for `shell`, named after the binary
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_completions_per_shell() {
        for (shell, marker) in [
            (Shell::Bash, "complete"),
            (Shell::Zsh, "compdef"),
            (Shell::Fish, "complete"),
            (Shell::PowerShell, "Register-ArgumentCompleter"),
        ] {
            let output = script(shell);
            assert!(output.contains("spa-deploy"), "{shell} script names the binary");
            assert!(output.contains(marker), "{shell} script contains {marker}");
        }
    }

    #[test]
    fn test_completions_offer_deploy_flags() {
        let output = script(Shell::Bash);
        assert!(output.contains("--bucket"));
        assert!(output.contains("--region"));
    }
}
