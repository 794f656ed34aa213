pub mod build;
pub mod completions;
pub mod deploy;
pub mod init;
pub mod load;
pub mod questions;
pub mod sync;

use route_forge_agent::GatewayAgent;
use route_forge_store::FsRouteStore;

use crate::cli::GlobalOpts;
use crate::config::{build_agent, load_config, Overrides};
use crate::error::CliError;

/// Load the config and build the agent it describes.
pub fn open_agent(
    global: &GlobalOpts,
    overrides: Overrides,
) -> Result<GatewayAgent<FsRouteStore>, CliError> {
    let config = load_config(global.config.as_deref())?;
    let agent = build_agent(&config, global, overrides);
    tracing::debug!(
        service = %agent.identity(),
        routing = %agent.paths().routing.display(),
        "agent opened"
    );
    Ok(agent)
}
