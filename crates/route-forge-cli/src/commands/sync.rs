use route_forge_core::session::{Answers, Question};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config::Overrides;
use crate::error::CliError;
use crate::input::collect_answers;
use crate::output::OutputContext;

/// Run the `sync` command: answer the open session and save the decisions.
///
/// Answers come from `--answers` and `--answer`; on a terminal, any question
/// left unanswered is asked interactively.
pub fn run(args: SyncArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let mut agent = super::open_agent(global, Overrides::default())?;
    let questions = agent.pending_questions()?;
    let mut answers = collect_answers(args.answers.as_deref(), &args.answer)?;

    if !questions.is_empty() {
        let unanswered: Vec<&Question> = questions
            .iter()
            .filter(|q| answers.get(&q.id).is_none())
            .collect();
        if !unanswered.is_empty() {
            if output.can_prompt() {
                prompt(&unanswered, &mut answers)?;
            } else if answers.is_empty() {
                return Err(CliError::Usage(format!(
                    "{} questions need answers; pass --answers or --answer when not on a terminal",
                    questions.len()
                )));
            }
        }
    }

    let report = agent.sync(&answers)?;

    output.report(
        &report,
        |out| {
            if !report.applied {
                out.success("No open decision session; nothing to apply.");
                return;
            }
            for decision in &report.decisions {
                out.status(&format!(
                    "  {:<48} {}",
                    decision.identity.to_string(),
                    out.exposure(decision.exposure())
                ));
            }
            out.success(&format!("Applied {} decisions.", report.decisions.len()));
        },
        || {
            for decision in &report.decisions {
                println!("{}\t{}", decision.identity, decision.exposure());
            }
        },
    );
    Ok(())
}

fn prompt(questions: &[&Question], answers: &mut Answers) -> Result<(), CliError> {
    for q in questions {
        let labels: Vec<&str> = q.options.iter().map(|o| o.label.as_str()).collect();
        let selected = dialoguer::Select::new()
            .with_prompt(format!("{}\n  {}", q.message, q.description))
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|_| CliError::Cancelled)?
            .ok_or(CliError::Cancelled)?;
        answers.insert(q.id.clone(), q.options[selected].key.clone());
    }
    Ok(())
}
