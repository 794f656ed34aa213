use std::fmt;

/// Errors that abort gateway config synthesis.
///
/// Synthesis is all-or-nothing: when one of these is returned, nothing has
/// been produced for the caller to write.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SynthesisError {
    /// No network mapping exists for a service with exposed routes.
    UnresolvedBackend { service: String },
    /// A network mapping exists but lists no address.
    EmptyAddresses { service: String },
    /// A protected route exists but no auth provider is configured.
    MissingAuthProvider { route: String },
    /// The selected auth provider is not among the configured ones.
    UnknownAuthProvider { name: String },
    /// The config document could not be encoded.
    Encode { message: String },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedBackend { service } => {
                write!(f, "no network mapping for service '{service}'")
            }
            Self::EmptyAddresses { service } => {
                write!(f, "network mapping for service '{service}' has no address")
            }
            Self::MissingAuthProvider { route } => {
                write!(
                    f,
                    "route '{route}' is protected but no auth provider is configured"
                )
            }
            Self::UnknownAuthProvider { name } => {
                write!(f, "auth provider '{name}' is not configured")
            }
            Self::Encode { message } => write!(f, "cannot encode gateway config: {message}"),
        }
    }
}

impl std::error::Error for SynthesisError {}
