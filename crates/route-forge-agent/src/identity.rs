use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The gateway service the agent works for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub module: String,
    pub name: String,
    pub version: String,
}

impl ServiceIdentity {
    pub fn new(
        module: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self::new("default", "gateway", "0.0.0")
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.name)
    }
}

/// Filesystem locations the agent reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPaths {
    /// Service root; collaborator commands run here.
    pub root: PathBuf,
    /// Route descriptor directory.
    pub routing: PathBuf,
    /// Session record and endpoint snapshot.
    pub state: PathBuf,
    pub gateway_config: PathBuf,
    pub openapi: PathBuf,
}

impl AgentPaths {
    /// Default layout under a service root.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root: root.to_path_buf(),
            routing: root.join("routing"),
            state: root.join(".route-forge"),
            gateway_config: root.join("config/settings/routing.json"),
            openapi: root.join("openapi/api.json"),
        }
    }
}

impl Default for AgentPaths {
    fn default() -> Self {
        Self::under(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let paths = AgentPaths::under("/srv/gw");
        assert_eq!(paths.routing, PathBuf::from("/srv/gw/routing"));
        assert_eq!(
            paths.gateway_config,
            PathBuf::from("/srv/gw/config/settings/routing.json")
        );
        assert_eq!(paths.openapi, PathBuf::from("/srv/gw/openapi/api.json"));
    }

    #[test]
    fn identity_display() {
        assert_eq!(ServiceIdentity::new("app", "gw", "1").to_string(), "app/gw");
    }
}
