use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::CliError;

/// Run the `completions` command: print the completion script for a shell.
pub fn run(args: CompletionsArgs) -> Result<(), CliError> {
    let mut command = Cli::command();
    let bin = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, bin, &mut std::io::stdout());
    Ok(())
}
