use crate::cli::GlobalOpts;
use crate::config::Overrides;
use crate::error::CliError;
use crate::output::OutputContext;
use crate::progress::with_spinner;

/// Run the `build` command: hand off to the configured image build command.
pub fn run(global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let agent = super::open_agent(global, Overrides::default())?;
    with_spinner(
        output,
        &format!("Building {}...", agent.identity()),
        "Build finished",
        || agent.build(),
    )?;
    output.success(&format!("Built {}.", agent.identity()));
    Ok(())
}
