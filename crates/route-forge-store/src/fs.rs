use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use route_forge_core::reconcile::RetiredLedger;
use route_forge_core::types::{RouteGroup, RoutePath, RouteSet, ServiceKey};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::atomic::{remove_if_exists, write_atomic};
use crate::error::StoreError;
use crate::traits::RouteStore;

/// Suffix of route descriptor files.
pub const DESCRIPTOR_SUFFIX: &str = ".route.yaml";

/// Name of the retired ledger file inside the routing root.
pub const RETIRED_FILE: &str = ".retired.yaml";

/// Route store backed by a directory of YAML descriptors.
///
/// Layout: `<root>/<module>/<service>/<path-slug>.<digest>.route.yaml`, one
/// file per group, plus `<root>/.retired.yaml` for the retired ledger.
/// Descriptors found elsewhere under the root are loaded too and keep their
/// location on save.
#[derive(Debug)]
pub struct FsRouteStore {
    root: PathBuf,
    set: RouteSet,
    retired: RetiredLedger,
    /// Where each loaded or saved group lives on disk.
    origins: BTreeMap<(ServiceKey, RoutePath), PathBuf>,
}

impl FsRouteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            set: RouteSet::new(),
            retired: RetiredLedger::new(),
            origins: BTreeMap::new(),
        }
    }

    /// Creates the store and loads it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(root);
        store.load()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical descriptor location for a group.
    ///
    /// The digest keeps paths whose slugs collide (`/a/b` and `/a_b`) apart.
    pub fn descriptor_path(&self, key: &ServiceKey, path: &RoutePath) -> PathBuf {
        let digest = Sha256::digest(path.as_str().as_bytes());
        let short = hex::encode(&digest[..4]);
        self.root
            .join(key.module())
            .join(key.service())
            .join(format!("{}.{short}{DESCRIPTOR_SUFFIX}", path.slug()))
    }

    fn retired_path(&self) -> PathBuf {
        self.root.join(RETIRED_FILE)
    }

    fn descriptor_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let pattern = format!(
            "{}/**/*",
            glob::Pattern::escape(&self.root.display().to_string())
        );
        let entries = glob::glob(&pattern).map_err(|e| StoreError::Io {
            path: self.root.display().to_string(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::Io {
                path: e.path().display().to_string(),
                message: e.error().to_string(),
            })?;
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.ends_with(DESCRIPTOR_SUFFIX) {
                files.push(path);
            } else if name != RETIRED_FILE {
                warn!(file = %path.display(), "ignoring unknown file in routing directory");
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_retired(&self) -> Result<RetiredLedger, StoreError> {
        let path = self.retired_path();
        match std::fs::read_to_string(&path) {
            Ok(text) => serde_yaml::from_str(&text).map_err(|e| StoreError::yaml(&path, &e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RetiredLedger::new()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn remove_empty_parents(&self, file: &Path) {
        let mut dir = file.parent();
        while let Some(d) = dir {
            if d == self.root || !d.starts_with(&self.root) {
                break;
            }
            if std::fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}

impl RouteStore for FsRouteStore {
    fn load(&mut self) -> Result<&RouteSet, StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let mut set = RouteSet::new();
        let mut origins: BTreeMap<(ServiceKey, RoutePath), PathBuf> = BTreeMap::new();
        for file in self.descriptor_files()? {
            let text = std::fs::read_to_string(&file).map_err(|e| StoreError::io(&file, e))?;
            let group: RouteGroup =
                serde_yaml::from_str(&text).map_err(|e| StoreError::yaml(&file, &e))?;
            let k = (group.key().clone(), group.path().clone());
            if let Some(first) = origins.get(&k) {
                return Err(StoreError::DuplicateGroup {
                    group: format!("{} {}", k.0, k.1),
                    first: first.display().to_string(),
                    second: file.display().to_string(),
                });
            }
            origins.insert(k, file);
            set.add_group(group);
        }

        self.retired = self.load_retired()?;
        self.set = set;
        self.origins = origins;
        debug!(
            root = %self.root.display(),
            groups = self.set.len(),
            routes = self.set.route_count(),
            retired = self.retired.len(),
            "route store loaded"
        );
        Ok(&self.set)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let mut written = BTreeMap::new();
        for group in self.set.iter() {
            let k = (group.key().clone(), group.path().clone());
            let target = self
                .origins
                .get(&k)
                .cloned()
                .unwrap_or_else(|| self.descriptor_path(group.key(), group.path()));
            let text = serde_yaml::to_string(group).map_err(|e| StoreError::Encode {
                path: target.display().to_string(),
                message: e.to_string(),
            })?;
            let unchanged = std::fs::read_to_string(&target).is_ok_and(|old| old == text);
            if !unchanged {
                write_atomic(&target, text.as_bytes())?;
                debug!(file = %target.display(), "route descriptor written");
            }
            written.insert(k, target);
        }

        for (k, file) in &self.origins {
            if !written.contains_key(k) {
                remove_if_exists(file)?;
                self.remove_empty_parents(file);
                info!(file = %file.display(), "route descriptor deleted");
            }
        }
        self.origins = written;

        let retired_path = self.retired_path();
        if self.retired.is_empty() {
            remove_if_exists(&retired_path)?;
        } else {
            let text = serde_yaml::to_string(&self.retired).map_err(|e| StoreError::Encode {
                path: retired_path.display().to_string(),
                message: e.to_string(),
            })?;
            write_atomic(&retired_path, text.as_bytes())?;
        }
        Ok(())
    }

    fn route_set(&self) -> &RouteSet {
        &self.set
    }

    fn route_set_mut(&mut self) -> &mut RouteSet {
        &mut self.set
    }

    fn retired(&self) -> &RetiredLedger {
        &self.retired
    }

    fn retired_mut(&mut self) -> &mut RetiredLedger {
        &mut self.retired
    }
}
