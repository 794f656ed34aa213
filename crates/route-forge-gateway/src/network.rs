use std::collections::BTreeMap;

use route_forge_core::error::RouteError;
use route_forge_core::types::ServiceKey;
use serde::{Deserialize, Serialize};

/// Resolves a dependency service to the addresses the gateway forwards to.
pub trait NetworkResolver {
    /// Addresses for `key`, or `None` when the service is unknown.
    fn resolve(&self, key: &ServiceKey) -> Option<&[String]>;
}

/// One `{module, service, addresses}` entry of a mappings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMapping {
    #[serde(alias = "application")]
    pub module: String,
    pub service: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Static resolver built from a list of mappings.
///
/// A later entry for the same service replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkMappings {
    by_key: BTreeMap<ServiceKey, Vec<String>>,
}

impl NetworkMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<NetworkMapping>) -> Result<Self, RouteError> {
        let mut mappings = Self::new();
        for entry in entries {
            let key = ServiceKey::new(entry.module, entry.service)?;
            mappings.insert(key, entry.addresses);
        }
        Ok(mappings)
    }

    pub fn insert(&mut self, key: ServiceKey, addresses: Vec<String>) {
        self.by_key.insert(key, addresses);
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl NetworkResolver for NetworkMappings {
    fn resolve(&self, key: &ServiceKey) -> Option<&[String]> {
        self.by_key.get(key).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_resolve() {
        let entries: Vec<NetworkMapping> = serde_json::from_str(
            r#"[
                { "module": "app", "service": "users", "addresses": ["users:8080"] },
                { "application": "app", "service": "orders", "addresses": [] }
            ]"#,
        )
        .unwrap();
        let mappings = NetworkMappings::from_entries(entries).unwrap();
        let users = ServiceKey::new("app", "users").unwrap();
        assert_eq!(mappings.resolve(&users), Some(&["users:8080".to_string()][..]));
        let orders = ServiceKey::new("app", "orders").unwrap();
        assert_eq!(mappings.resolve(&orders), Some(&[][..]));
        let missing = ServiceKey::new("app", "billing").unwrap();
        assert!(mappings.resolve(&missing).is_none());
    }

    #[test]
    fn invalid_service_name_is_rejected() {
        let entries = vec![NetworkMapping {
            module: "app".into(),
            service: "bad name".into(),
            addresses: vec![],
        }];
        assert!(NetworkMappings::from_entries(entries).is_err());
    }
}
