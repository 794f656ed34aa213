use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// A file written next to its target but not yet renamed into place.
///
/// Dropping it without [`StagedFile::commit`] removes the temporary file and
/// leaves the target untouched.
pub struct StagedFile {
    tmp: tempfile::NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Writes `bytes` to a synced temporary sibling of `path`.
    ///
    /// Parent directories are created as needed.
    pub fn stage(path: &Path, bytes: &[u8]) -> Result<Self, StoreError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        tmp.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(path, e))?;
        Ok(Self {
            tmp,
            target: path.to_path_buf(),
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Renames the staged file over its target.
    pub fn commit(self) -> Result<(), StoreError> {
        let target = self.target;
        self.tmp
            .persist(&target)
            .map_err(|e| StoreError::io(&target, e.error))?;
        Ok(())
    }
}

/// Writes `bytes` to `path` through a temporary sibling and a rename.
///
/// Readers see either the old content or the new one, never a prefix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    StagedFile::stage(path, bytes)?.commit()
}

/// Removes `path` if it exists.
pub fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.json");
        write_atomic(&target, b"one").unwrap();
        write_atomic(&target, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "two");
        let siblings = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[test]
    fn dropped_stage_leaves_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        std::fs::write(&target, "old").unwrap();
        let staged = StagedFile::stage(&target, b"new").unwrap();
        assert_eq!(staged.target(), target.as_path());
        drop(staged);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn stage_under_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        assert!(StagedFile::stage(&blocker.join("out.json"), b"x").is_err());
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_if_exists(&dir.path().join("missing")).unwrap();
    }
}
