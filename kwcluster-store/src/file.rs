//! File-backed slot store.
//!
//! Each slot lives in its own file under a directory, so the cache survives
//! process restarts.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use kwcluster_core::error::{ClusterError, Result};
use kwcluster_core::traits::Store;

/// File-backed slot store.
///
/// # Layout
///
/// ```text
/// <dir>/<key>.json      slot contents
/// <dir>/.tmpXXXXXX      in-flight write, renamed over the slot when complete
/// ```
///
/// Every write gets its own uniquely named temp file, so concurrent writers
/// (even from separate processes) never clobber each other's partial data.
///
/// The directory is created on the first write.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing a slot.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn validate_key(key: &str) -> Result<()> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if !valid {
            return Err(ClusterError::Validation(format!("invalid slot key: {:?}", key)));
        }
        Ok(())
    }
}

impl Store for FileStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 bytes are corrupt data, not a missing slot.
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(ClusterError::Deserialization(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| ClusterError::Persistence(format!("create {}: {}", self.dir.display(), e)))?;

        // Write atomically (write to temp, then rename). The temp file
        // deletes itself if anything fails before `persist`.
        let write = || -> std::io::Result<()> {
            let mut temp = NamedTempFile::new_in(&self.dir)?;
            temp.write_all(value.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };

        write().map_err(|e| ClusterError::Persistence(format!("write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_dir_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("not-yet"));
        assert!(store.get("keyword_clusters_v1").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_dir_and_persists() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cache");

        FileStore::new(&root).set("keyword_clusters_v1", "{\"a\":1}").unwrap();

        // Reopen to simulate a restart
        let reopened = FileStore::new(&root);
        assert_eq!(
            reopened.get("keyword_clusters_v1").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_atomic_set_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("slot", "value").unwrap();

        let path = store.slot_path("slot").unwrap();
        assert!(path.exists());

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["slot.json".to_string()]);
    }

    #[test]
    fn test_concurrent_sets_never_tear() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(FileStore::new(dir.path()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let value = format!("{{\"writer\":{}}}", i).repeat(64);
                    store.set("slot", &value).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Whichever writer won, its value is intact
        let value = store.get("slot").unwrap().unwrap();
        let unit = &value[..value.find('}').unwrap() + 1];
        assert_eq!(value, unit.repeat(64));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("slot", "value").unwrap();
        store.remove("slot").unwrap();
        store.remove("slot").unwrap();
        assert!(store.get("slot").unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.set("../escape", "x").is_err());
        assert!(store.set("a/b", "x").is_err());
        assert!(store.set("", "x").is_err());
        assert!(store.get(".hidden").is_err());
    }

    #[test]
    fn test_non_utf8_is_deserialization_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.slot_path("slot").unwrap(), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(store.get("slot"), Err(ClusterError::Deserialization(_))));
    }
}
