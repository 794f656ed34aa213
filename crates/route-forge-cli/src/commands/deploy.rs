use crate::cli::{DeployArgs, GlobalOpts};
use crate::config::Overrides;
use crate::error::CliError;
use crate::input::read_network;
use crate::output::{OutputContext, OutputMode};
use crate::progress::with_spinner;

/// Run the `deploy` command: synthesize the gateway config, write it with the
/// API document and run the configured deploy command.
///
/// With `--dry-run`, the config is printed to stdout and nothing is written.
pub fn run(args: DeployArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let network = read_network(&args.network)?;
    let mut agent = super::open_agent(
        global,
        Overrides {
            port: args.port,
            ..Overrides::default()
        },
    )?;

    if args.dry_run {
        let rendered = agent.render(&network)?;
        match output.mode {
            OutputMode::Json => output.report(&rendered.config, |_| (), || ()),
            OutputMode::Human | OutputMode::Plain => {
                print!("{}", String::from_utf8_lossy(&rendered.config_bytes));
            }
        }
        output.success(&format!(
            "Dry run: {} forwarding rules would be written.",
            rendered.config.rest_group.len()
        ));
        return Ok(());
    }

    let report = with_spinner(
        output,
        &format!("Deploying {}...", agent.identity()),
        "Deploy finished",
        || agent.deploy(&network),
    )?;

    output.report(
        &report,
        |out| {
            out.status(&format!("  gateway config: {}", report.config_path));
            out.status(&format!("  API document:   {}", report.openapi_path));
            if !report.auth_providers.is_empty() {
                out.status(&format!(
                    "  auth providers: {}",
                    report.auth_providers.join(", ")
                ));
            }
            out.success(&format!(
                "Deployed {} forwarding rules ({} protected).",
                report.rules, report.protected
            ));
        },
        || println!("{}\t{}\t{}", report.rules, report.protected, report.config_path),
    );
    Ok(())
}
