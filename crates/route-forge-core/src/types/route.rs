use serde::{Deserialize, Serialize};

use crate::error::RouteError;

use super::exposure::Exposure;
use super::http_method::HttpMethod;

/// One method of a route group together with its decision.
///
/// Serialized as `{ method, exposed, protected }` so descriptor files keep
/// the flag pair operators are used to editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord", into = "RouteRecord")]
pub struct Route {
    pub method: HttpMethod,
    pub exposure: Exposure,
}

impl Route {
    pub fn new(method: HttpMethod, exposure: Exposure) -> Self {
        Self { method, exposure }
    }
}

#[derive(Serialize, Deserialize)]
struct RouteRecord {
    method: HttpMethod,
    #[serde(default)]
    exposed: bool,
    #[serde(default)]
    protected: bool,
}

impl TryFrom<RouteRecord> for Route {
    type Error = RouteError;

    fn try_from(r: RouteRecord) -> Result<Self, Self::Error> {
        let exposure = Exposure::from_flags(r.exposed, r.protected, r.method.as_str())?;
        Ok(Self {
            method: r.method,
            exposure,
        })
    }
}

impl From<Route> for RouteRecord {
    fn from(r: Route) -> Self {
        Self {
            method: r.method,
            exposed: r.exposure.is_exposed(),
            protected: r.exposure.is_protected(),
        }
    }
}
