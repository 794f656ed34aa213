use std::fmt;

/// Errors raised while loading or saving persisted routing state.
///
/// Uses `String` for external error details to maintain `Clone` + `Eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A file or directory could not be read, written or removed.
    Io { path: String, message: String },
    /// A file could not be decoded.
    Parse {
        path: String,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    /// Two descriptor files describe the same `(module, service, path)`.
    DuplicateGroup {
        group: String,
        first: String,
        second: String,
    },
    /// In-memory state could not be encoded.
    Encode { path: String, message: String },
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn yaml(path: impl AsRef<std::path::Path>, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Parse {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }

    pub(crate) fn json(path: impl AsRef<std::path::Path>, err: &serde_json::Error) -> Self {
        Self::Parse {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }

    /// The file the error is about, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Encode { path, .. } => {
                Some(path)
            }
            Self::DuplicateGroup { second, .. } => Some(second),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot access '{path}': {message}"),
            Self::Parse {
                path,
                message,
                line: Some(line),
                column: Some(column),
            } => write!(f, "cannot parse '{path}' at {line}:{column}: {message}"),
            Self::Parse { path, message, .. } => write!(f, "cannot parse '{path}': {message}"),
            Self::DuplicateGroup {
                group,
                first,
                second,
            } => {
                write!(
                    f,
                    "route group '{group}' is described by both '{first}' and '{second}'"
                )
            }
            Self::Encode { path, message } => write!(f, "cannot encode '{path}': {message}"),
        }
    }
}

impl std::error::Error for StoreError {}
