use crate::cli::{GlobalOpts, LoadArgs};
use crate::config::Overrides;
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `load` command: read the route store and summarize it.
pub fn run(args: LoadArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let mut agent = super::open_agent(
        global,
        Overrides {
            watch: args.watch,
            ..Overrides::default()
        },
    )?;
    let report = agent.load()?;

    output.report(
        &report,
        |out| {
            out.status(&format!(
                "Routing directory: {}",
                agent.paths().routing.display()
            ));
            for group in agent.routes() {
                out.status(&format!(
                    "  {:<40} {} routes, {} exposed",
                    group.gateway_target(),
                    group.len(),
                    group.exposed_routes().count()
                ));
            }
            if report.pending_session {
                out.warn("a decision session is open; run 'route-forge sync'");
            }
            let auth = if report.requires_auth {
                ", auth required"
            } else {
                ""
            };
            out.success(&format!(
                "{} groups, {} routes{auth}.",
                report.groups, report.routes
            ));
        },
        || {
            println!(
                "{}\t{}\t{}\t{}",
                report.groups, report.routes, report.requires_auth, report.watch
            );
        },
    );
    Ok(())
}
