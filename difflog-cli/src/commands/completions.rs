//! Shell completions command - Generate shell completion scripts

use std::io;

use clap::Command;
use clap_complete::generate;
use colored::Colorize;
use serde::Serialize;

use crate::output::{Output, OutputConfig, TableDisplay};

const BIN_NAME: &str = "difflog";

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Shell {
    fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::PowerShell => "powershell",
            Shell::Elvish => "elvish",
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Instructions for installing completions
#[derive(Debug, Serialize)]
pub struct CompletionInstructions {
    pub shell: String,
    pub instructions: Vec<String>,
}

impl TableDisplay for CompletionInstructions {
    fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} completions for {}\n\n",
            BIN_NAME.cyan().bold(),
            self.shell.yellow()
        ));
        output.push_str(&format!("{}\n", "Installation:".cyan().bold()));
        for instruction in &self.instructions {
            output.push_str(&format!("  {}\n", instruction));
        }
        output
    }
}

fn get_instructions(shell: Shell) -> Vec<String> {
    let lines: &[&str] = match shell {
        Shell::Bash => &[
            "# Add to ~/.bashrc:",
            "eval \"$(difflog completions bash)\"",
            "",
            "# Or save to a file:",
            "difflog completions bash > ~/.local/share/bash-completion/completions/difflog",
        ],
        Shell::Zsh => &[
            "# Add to ~/.zshrc:",
            "eval \"$(difflog completions zsh)\"",
            "",
            "# Or save to a file in fpath:",
            "difflog completions zsh > ~/.zfunc/_difflog",
            "# Then add to ~/.zshrc before compinit:",
            "fpath=(~/.zfunc $fpath)",
        ],
        Shell::Fish => &[
            "# Save to fish completions directory:",
            "difflog completions fish > ~/.config/fish/completions/difflog.fish",
        ],
        Shell::PowerShell => &[
            "# Add to $PROFILE:",
            "Invoke-Expression (& difflog completions powershell | Out-String)",
        ],
        Shell::Elvish => &[
            "# Add to ~/.elvish/rc.elv:",
            "eval (difflog completions elvish | slurp)",
        ],
    };
    lines.iter().map(|line| line.to_string()).collect()
}

/// Write the completion script for `cmd` to stdout.
pub fn generate_completions_with_cmd(shell: Shell, cmd: &mut Command) {
    generate(clap_complete::Shell::from(shell), cmd, BIN_NAME, &mut io::stdout());
}

/// Run the completions command
pub fn run(
    shell: Shell,
    show_instructions: bool,
    cmd: &mut Command,
    config: OutputConfig,
) -> anyhow::Result<()> {
    if show_instructions {
        let instructions = CompletionInstructions {
            shell: shell.to_string(),
            instructions: get_instructions(shell),
        };
        Output::with_config(instructions, config).render()
    } else {
        generate_completions_with_cmd(shell, cmd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_names_match_clap_complete() {
        for shell in [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Elvish,
        ] {
            assert_eq!(shell.to_string(), clap_complete::Shell::from(shell).to_string());
        }
    }

    #[test]
    fn test_get_instructions() {
        let bash_instructions = get_instructions(Shell::Bash);
        assert!(bash_instructions.iter().any(|i| i.contains("bashrc")));

        let fish_instructions = get_instructions(Shell::Fish);
        assert!(fish_instructions.iter().any(|i| i.ends_with("difflog.fish")));
    }
}
