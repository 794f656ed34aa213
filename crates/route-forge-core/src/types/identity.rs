use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

use super::http_method::HttpMethod;
use super::route_path::RoutePath;
use super::service_key::ServiceKey;

/// The `(module, service, path, method)` tuple that identifies a route.
///
/// The canonical text form is `module/service path METHOD`, for example
/// `app/users /users/{id} GET`. It round-trips through [`FromStr`], which is
/// what lets a persisted question be matched back to its route without any
/// in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteIdentity {
    pub key: ServiceKey,
    pub path: RoutePath,
    pub method: HttpMethod,
}

impl RouteIdentity {
    pub fn new(key: ServiceKey, path: RoutePath, method: HttpMethod) -> Self {
        Self { key, path, method }
    }

    /// Convenience constructor that validates each part.
    pub fn parse_parts(
        module: &str,
        service: &str,
        path: &str,
        method: &str,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            key: ServiceKey::new(module, service)?,
            path: RoutePath::new(path)?,
            method: method.parse()?,
        })
    }

    /// External path on the gateway: `/{module}/{service}{path}`.
    pub fn gateway_target(&self) -> String {
        gateway_target(&self.key, &self.path)
    }
}

pub(crate) fn gateway_target(key: &ServiceKey, path: &RoutePath) -> String {
    format!("/{}/{}{}", key.module(), key.service(), path)
}

impl fmt::Display for RouteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.path, self.method)
    }
}

impl FromStr for RouteIdentity {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RouteError::InvalidIdentity(s.to_string());
        let mut parts = s.split(' ');
        let (Some(key), Some(path), Some(method), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let key: ServiceKey = key.parse().map_err(|_| invalid())?;
        let path = RoutePath::new(path).map_err(|_| invalid())?;
        let method: HttpMethod = method.parse().map_err(|_| invalid())?;
        Ok(Self { key, path, method })
    }
}

impl From<RouteIdentity> for String {
    fn from(id: RouteIdentity) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for RouteIdentity {
    type Error = RouteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
