use console::{Style, Term};
use route_forge_core::session::Question;
use route_forge_core::types::Exposure;
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::diagnostic;
use crate::error::CliError;

/// How command results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Styled progress and summaries on stderr.
    Human,
    /// One pretty JSON document per command on stdout.
    Json,
    /// Tab-separated lines on stdout, for scripts.
    Plain,
}

impl OutputMode {
    fn from_flag(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        Self {
            mode: OutputMode::from_flag(&global.format),
            quiet: global.quiet,
            use_color: !global.no_color && console::colors_enabled_stderr(),
        }
    }

    fn human(&self) -> bool {
        self.mode == OutputMode::Human && !self.quiet
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Writes a command's result in the selected mode.
    ///
    /// `human` runs only in human mode outside `--quiet`; `plain` prints the
    /// script-friendly lines.
    pub fn report<T: Serialize>(
        &self,
        value: &T,
        human: impl FnOnce(&Self),
        plain: impl FnOnce(),
    ) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    human(self);
                }
            }
            OutputMode::Json => {
                if let Ok(text) = serde_json::to_string_pretty(value) {
                    println!("{text}");
                }
            }
            OutputMode::Plain => plain(),
        }
    }

    /// A progress or detail line (human mode).
    pub fn status(&self, msg: &str) {
        if self.human() {
            eprintln!("{msg}");
        }
    }

    /// The closing line of a command that went well (human mode).
    pub fn success(&self, msg: &str) {
        if self.human() {
            eprintln!("{} {msg}", self.paint(Style::new().green().bold(), "done"));
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                eprintln!("{} {msg}", self.paint(Style::new().yellow().bold(), "warning:"));
            }
            OutputMode::Json => eprintln!("{}", serde_json::json!({ "warning": msg })),
            OutputMode::Plain => eprintln!("warning\t{msg}"),
        }
    }

    /// Errors are never silenced. In human mode, errors pointing into a file
    /// render as a miette report.
    pub fn print_error(&self, err: &CliError) {
        match self.mode {
            OutputMode::Human => match diagnostic::diagnostic_for(err) {
                Some(report) => eprintln!("{report:?}"),
                None => eprintln!("{} {err}", self.paint(Style::new().red().bold(), "error:")),
            },
            OutputMode::Json => eprintln!("{}", err.to_json()),
            OutputMode::Plain => eprintln!("error\t{err}"),
        }
    }

    /// Exposure label, colored by how far the route is opened up.
    pub fn exposure(&self, exposure: Exposure) -> String {
        let style = match exposure {
            Exposure::Hidden => Style::new().dim(),
            Exposure::Public => Style::new().green(),
            Exposure::Protected => Style::new().yellow(),
        };
        self.paint(style, &exposure.to_string())
    }

    /// A question with the choices `--answer` accepts for it.
    pub fn question(&self, q: &Question) {
        self.status(&format!("  {} {}", self.paint(Style::new().cyan(), "?"), q.message));
        self.status(&format!("    {}", q.description));
        for option in &q.options {
            self.status(&format!("      - {}", option.choice.as_str()));
        }
    }

    pub fn show_progress(&self) -> bool {
        self.human() && Term::stderr().is_term()
    }

    /// Answer prompts need a terminal on both ends and human mode.
    pub fn can_prompt(&self) -> bool {
        self.mode == OutputMode::Human && Term::stderr().is_term() && Term::stdout().is_term()
    }
}
