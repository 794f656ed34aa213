use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// The `(module, service)` identity shared by endpoints and route groups.
///
/// Both segments are validated against `[A-Za-z0-9_.-]+` so the text form
/// `module/service` is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceKey {
    module: String,
    service: String,
}

impl ServiceKey {
    /// Creates a new `ServiceKey`, validating both segments.
    pub fn new(module: impl Into<String>, service: impl Into<String>) -> Result<Self, RouteError> {
        let module = module.into();
        let service = service.into();
        if !is_valid_segment(&module) {
            return Err(RouteError::InvalidModuleName(module));
        }
        if !is_valid_segment(&service) {
            return Err(RouteError::InvalidServiceName(service));
        }
        Ok(Self { module, service })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

pub(crate) fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.service)
    }
}

impl FromStr for ServiceKey {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((module, service)) => Self::new(module, service),
            None => Err(RouteError::InvalidIdentity(s.to_string())),
        }
    }
}

impl From<ServiceKey> for String {
    fn from(k: ServiceKey) -> String {
        k.to_string()
    }
}

impl TryFrom<String> for ServiceKey {
    type Error = RouteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
