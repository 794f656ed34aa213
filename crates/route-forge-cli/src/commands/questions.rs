use crate::cli::GlobalOpts;
use crate::config::Overrides;
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `questions` command: show the open session's questions.
pub fn run(global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let agent = super::open_agent(global, Overrides::default())?;
    let questions = agent.pending_questions()?;

    output.report(
        &questions,
        |out| {
            if questions.is_empty() {
                out.success("No open decision session.");
            }
            for q in &questions {
                out.question(q);
            }
        },
        || {
            for q in &questions {
                println!("{}", q.id);
            }
        },
    );
    Ok(())
}
