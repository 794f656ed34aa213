use std::path::PathBuf;

use route_forge_agent::AgentError;
use route_forge_store::StoreError;

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / usage or configuration error
/// - 3: parse error (descriptor or input file)
/// - 10+: phase-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
    SessionError = 11,
    SynthesisError = 12,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An agent call failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// An input file (endpoints, network mappings, answers) could not be decoded.
    #[error("cannot parse {}: {message}", path.display())]
    Input {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Wrong or missing arguments that clap cannot catch.
    #[error("{0}")]
    Usage(String),

    /// The answer prompt was interrupted.
    #[error("answer prompt cancelled")]
    Cancelled,
}

impl CliError {
    pub(crate) fn yaml(path: &std::path::Path, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Input {
            path: path.to_path_buf(),
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }

    pub(crate) fn json(path: &std::path::Path, err: &serde_json::Error) -> Self {
        Self::Input {
            path: path.to_path_buf(),
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }

    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Agent(AgentError::Session(_)) => ExitCode::SessionError,
            Self::Agent(AgentError::Synthesis(_)) => ExitCode::SynthesisError,
            Self::Agent(e) => match e.store_error() {
                Some(StoreError::Parse { .. } | StoreError::DuplicateGroup { .. }) => {
                    ExitCode::ParseError
                }
                _ => ExitCode::GeneralError,
            },
            Self::Input { .. } => ExitCode::ParseError,
            Self::Config { .. } | Self::Usage(_) => ExitCode::InvalidArguments,
            Self::Io { .. } | Self::Cancelled => ExitCode::GeneralError,
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Agent(e) => {
                let mut json = serde_json::json!({
                    "error": "agent_error",
                    "phase": e.phase(),
                    "message": e.to_string(),
                });
                if let Some(path) = e.store_error().and_then(StoreError::path) {
                    json["path"] = serde_json::Value::from(path);
                }
                json
            }
            Self::Input {
                path,
                message,
                line,
                column,
            } => serde_json::json!({
                "error": "parse_error",
                "file": path.display().to_string(),
                "message": message,
                "line": line,
                "column": column,
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            Self::Usage(message) => serde_json::json!({
                "error": "usage_error",
                "message": message,
            }),
            Self::Cancelled => serde_json::json!({
                "error": "cancelled",
                "message": self.to_string(),
            }),
        }
    }
}
