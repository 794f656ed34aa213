use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::OutputContext;

/// Create a spinner for an external command, ticking on stderr every 80ms.
///
/// Hidden when the output context does not show progress.
pub fn create_spinner(output: &OutputContext, message: &str) -> ProgressBar {
    if !output.show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish a spinner with a success message.
pub fn finish_spinner(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(message.to_string());
}

/// Finish a spinner with an error message.
pub fn finish_spinner_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("ERROR: {message}"));
}

/// Run `f` under a spinner, finishing it according to the outcome.
pub fn with_spinner<T, E: std::fmt::Display>(
    output: &OutputContext,
    message: &str,
    done: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let pb = create_spinner(output, message);
    let result = f();
    match &result {
        Ok(_) => finish_spinner(&pb, done),
        Err(e) => finish_spinner_error(&pb, &e.to_string()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;

    fn quiet() -> OutputContext {
        OutputContext {
            mode: OutputMode::Human,
            quiet: true,
            use_color: false,
        }
    }

    #[test]
    fn finish_spinner_completes() {
        let pb = create_spinner(&quiet(), "working...");
        finish_spinner(&pb, "done");
        assert!(pb.is_finished());
    }

    #[test]
    fn with_spinner_passes_result_through() {
        let ok: Result<u8, String> = with_spinner(&quiet(), "a", "b", || Ok(7));
        assert_eq!(ok, Ok(7));
        let err: Result<u8, String> = with_spinner(&quiet(), "a", "b", || Err("boom".into()));
        assert_eq!(err, Err("boom".to_string()));
    }
}
