use std::fmt;

/// Errors that occur when constructing or validating route types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// Module name failed segment validation.
    InvalidModuleName(String),
    /// Service name failed segment validation.
    InvalidServiceName(String),
    /// Route path must start with '/' and contain no whitespace.
    InvalidPath(String),
    /// HTTP method is not one of the supported verbs.
    InvalidMethod(String),
    /// Text form of a route identity could not be parsed.
    InvalidIdentity(String),
    /// `protected` was set on a route that is not exposed.
    ProtectedButHidden { method: String },
    /// The same method appears twice within one route group.
    DuplicateMethod { path: String, method: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModuleName(s) => {
                write!(f, "invalid module name '{s}': must match [A-Za-z0-9_.-]+")
            }
            Self::InvalidServiceName(s) => {
                write!(f, "invalid service name '{s}': must match [A-Za-z0-9_.-]+")
            }
            Self::InvalidPath(s) => {
                write!(f, "invalid route path '{s}': must start with '/', no whitespace")
            }
            Self::InvalidMethod(s) => write!(f, "invalid HTTP method '{s}'"),
            Self::InvalidIdentity(s) => write!(
                f,
                "invalid route identity '{s}': expected '<module>/<service> <path> <METHOD>'"
            ),
            Self::ProtectedButHidden { method } => {
                write!(f, "route {method} is protected but not exposed")
            }
            Self::DuplicateMethod { path, method } => {
                write!(f, "duplicate method {method} for path '{path}'")
            }
        }
    }
}

impl std::error::Error for RouteError {}
