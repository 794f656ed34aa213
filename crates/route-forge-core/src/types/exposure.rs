use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// The human decision attached to a route.
///
/// Replaces the loose `exposed`/`protected` flag pair: a protected route is
/// always exposed, so the meaningless "protected but hidden" state has no
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    /// Known but not forwarded by the gateway.
    #[default]
    Hidden,
    /// Forwarded without authentication.
    Public,
    /// Forwarded only with a valid token.
    Protected,
}

impl Exposure {
    /// Builds an exposure from the on-disk flag pair.
    pub fn from_flags(exposed: bool, protected: bool, method: &str) -> Result<Self, RouteError> {
        match (exposed, protected) {
            (false, false) => Ok(Self::Hidden),
            (true, false) => Ok(Self::Public),
            (true, true) => Ok(Self::Protected),
            (false, true) => Err(RouteError::ProtectedButHidden {
                method: method.to_string(),
            }),
        }
    }

    pub fn is_exposed(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected)
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => write!(f, "hidden"),
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
        }
    }
}
