use std::path::{Path, PathBuf};

use route_forge_core::session::Session;
use route_forge_core::types::Endpoint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::atomic::{remove_if_exists, write_atomic};
use crate::error::StoreError;

const SESSION_FILE: &str = "session.json";
const ENDPOINTS_FILE: &str = "endpoints.json";

/// Agent state that lives between calls but is not part of the route store:
/// the open decision session and the last endpoint snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn endpoints_path(&self) -> PathBuf {
        self.dir.join(ENDPOINTS_FILE)
    }

    /// The persisted session record, if one is open.
    pub fn load_session(&self) -> Result<Option<Session>, StoreError> {
        read_json(&self.session_path())
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        write_json(&self.session_path(), session)?;
        debug!(session = %session.id, "session record saved");
        Ok(())
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        remove_if_exists(&self.session_path())
    }

    /// The endpoints passed to the last successful init; empty when none.
    pub fn load_endpoints(&self) -> Result<Vec<Endpoint>, StoreError> {
        Ok(read_json(&self.endpoints_path())?.unwrap_or_default())
    }

    pub fn save_endpoints(&self, endpoints: &[Endpoint]) -> Result<(), StoreError> {
        write_json(&self.endpoints_path(), &endpoints)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::json(path, &e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    text.push('\n');
    write_atomic(path, text.as_bytes())
}
