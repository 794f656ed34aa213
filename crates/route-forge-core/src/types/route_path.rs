use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// A URL template such as `/users/{id}`.
///
/// Must start with `/` and contain no whitespace. Parameters are kept
/// verbatim; the gateway and the backend share the same template syntax.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePath(String);

impl RoutePath {
    pub fn new(s: impl Into<String>) -> Result<Self, RouteError> {
        let s = s.into();
        if !s.starts_with('/') || s.chars().any(char::is_whitespace) {
            return Err(RouteError::InvalidPath(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-friendly rendering of the path, used for descriptor names.
    ///
    /// Not injective on its own (`/a/b` and `/a_b` collide); the store
    /// disambiguates with a digest of the full path.
    pub fn slug(&self) -> String {
        let trimmed = self.0.trim_matches('/');
        if trimmed.is_empty() {
            return "_root".to_string();
        }
        trimmed
            .chars()
            .map(|c| match c {
                '/' => '_',
                c if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') => c,
                _ => '-',
            })
            .collect()
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RoutePath> for String {
    fn from(p: RoutePath) -> String {
        p.0
    }
}

impl TryFrom<String> for RoutePath {
    type Error = RouteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for RoutePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_paths() {
        for p in ["/", "/users", "/users/{id}", "/v1/orders/{order_id}/items"] {
            assert!(RoutePath::new(p).is_ok(), "expected valid: {p}");
        }
    }

    #[test]
    fn invalid_paths() {
        for p in ["", "users", "/users list", "/a\tb"] {
            assert!(RoutePath::new(p).is_err(), "expected invalid: {p:?}");
        }
    }

    #[test]
    fn slug_rendering() {
        assert_eq!(RoutePath::new("/").unwrap().slug(), "_root");
        assert_eq!(RoutePath::new("/users").unwrap().slug(), "users");
        assert_eq!(RoutePath::new("/users/{id}").unwrap().slug(), "users_-id-");
    }

    #[test]
    fn serde_rejects_relative() {
        assert!(serde_json::from_str::<RoutePath>("\"users\"").is_err());
    }
}
