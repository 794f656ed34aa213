use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

use super::http_method::HttpMethod;
use super::identity::RouteIdentity;
use super::route_path::RoutePath;
use super::service_key::ServiceKey;

/// Name given to an endpoint that does not declare one.
pub const DEFAULT_ENDPOINT_NAME: &str = "rest";

/// Who may reach an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Reachable from outside the module.
    #[default]
    Public,
    /// Reachable only by services of the same module.
    Module,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// A single declared operation of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub path: RoutePath,
    pub method: HttpMethod,
}

impl Operation {
    pub fn new(path: RoutePath, method: HttpMethod) -> Self {
        Self { path, method }
    }
}

/// A dependency service's published REST API.
///
/// Operations are kept in declared order, duplicates included; the
/// reconciliation engine decides what a duplicate means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EndpointRecord", into = "EndpointRecord")]
pub struct Endpoint {
    pub key: ServiceKey,
    pub name: String,
    pub visibility: Visibility,
    pub operations: Vec<Operation>,
    /// Embedded OpenAPI document, if the service publishes one.
    pub openapi: Option<serde_json::Value>,
}

impl Endpoint {
    /// Creates a public endpoint named `rest` with no operations.
    pub fn new(key: ServiceKey) -> Self {
        Self {
            key,
            name: DEFAULT_ENDPOINT_NAME.to_string(),
            visibility: Visibility::Public,
            operations: Vec::new(),
            openapi: None,
        }
    }

    /// Builder-style helper appending one operation.
    pub fn with_operation(mut self, path: RoutePath, method: HttpMethod) -> Self {
        self.operations.push(Operation::new(path, method));
        self
    }

    pub fn with_openapi(mut self, doc: serde_json::Value) -> Self {
        self.openapi = Some(doc);
        self
    }

    /// Identities of every declared operation, in declared order.
    pub fn identities(&self) -> impl Iterator<Item = RouteIdentity> + '_ {
        self.operations
            .iter()
            .map(|op| RouteIdentity::new(self.key.clone(), op.path.clone(), op.method))
    }

    /// Whether the endpoint declares `path` with `method`.
    pub fn declares(&self, path: &RoutePath, method: HttpMethod) -> bool {
        self.operations
            .iter()
            .any(|op| &op.path == path && op.method == method)
    }
}

#[derive(Serialize, Deserialize)]
struct EndpointRecord {
    #[serde(alias = "application")]
    module: String,
    service: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    routes: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openapi: Option<serde_json::Value>,
}

fn default_name() -> String {
    DEFAULT_ENDPOINT_NAME.to_string()
}

impl TryFrom<EndpointRecord> for Endpoint {
    type Error = RouteError;

    fn try_from(r: EndpointRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            key: ServiceKey::new(r.module, r.service)?,
            name: r.name,
            visibility: r.visibility,
            operations: r.routes,
            openapi: r.openapi,
        })
    }
}

impl From<Endpoint> for EndpointRecord {
    fn from(e: Endpoint) -> Self {
        Self {
            module: e.key.module().to_string(),
            service: e.key.service().to_string(),
            name: e.name,
            visibility: e.visibility,
            routes: e.operations,
            openapi: e.openapi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{
            "module": "app",
            "service": "users",
            "routes": [
                { "path": "/users", "method": "get" },
                { "path": "/users/{id}", "method": "DELETE" }
            ]
        }"#;
        let e: Endpoint = serde_json::from_str(json).unwrap();
        assert_eq!(e.name, "rest");
        assert_eq!(e.visibility, Visibility::Public);
        assert_eq!(e.operations.len(), 2);
        assert_eq!(e.operations[1].method, HttpMethod::Delete);
        assert!(e.openapi.is_none());
    }

    #[test]
    fn identities_follow_declared_order() {
        let e = Endpoint::new(ServiceKey::new("app", "users").unwrap())
            .with_operation(RoutePath::new("/b").unwrap(), HttpMethod::Post)
            .with_operation(RoutePath::new("/a").unwrap(), HttpMethod::Get);
        let ids: Vec<String> = e.identities().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["app/users /b POST", "app/users /a GET"]);
    }

    #[test]
    fn declares_matches_path_and_method() {
        let path = RoutePath::new("/users").unwrap();
        let e = Endpoint::new(ServiceKey::new("app", "users").unwrap())
            .with_operation(path.clone(), HttpMethod::Get);
        assert!(e.declares(&path, HttpMethod::Get));
        assert!(!e.declares(&path, HttpMethod::Post));
    }

    #[test]
    fn module_visibility() {
        let json = r#"{ "application": "app", "service": "s", "visibility": "module" }"#;
        let e: Endpoint = serde_json::from_str(json).unwrap();
        assert_eq!(e.visibility, Visibility::Module);
        assert!(e.operations.is_empty());
    }
}
