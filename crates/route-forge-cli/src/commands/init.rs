use crate::cli::{GlobalOpts, InitArgs};
use crate::config::Overrides;
use crate::error::CliError;
use crate::input::read_endpoints;
use crate::output::OutputContext;

/// Run the `init` command: reconcile against dependency endpoints.
pub fn run(args: InitArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let endpoints = read_endpoints(&args.endpoints)?;
    output.status(&format!(
        "Reconciling against {} dependency endpoints...",
        endpoints.len()
    ));

    let mut agent = super::open_agent(global, Overrides::default())?;
    let report = agent.init(&endpoints)?;

    output.report(
        &report,
        |out| {
            for step in &report.plan.steps {
                out.status(&format!("  {step}"));
            }
            if report.questions.is_empty() {
                out.success("Routes are up to date; no decisions needed.");
                return;
            }
            for q in &report.questions {
                out.question(q);
            }
            out.success(&format!(
                "{} routes need a decision; run 'route-forge sync'.",
                report.questions.len()
            ));
        },
        || {
            for q in &report.questions {
                println!("{}", q.id);
            }
        },
    );
    Ok(())
}
