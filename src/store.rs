use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Key the theme controller persists its preference under.
pub const PREFERENCE_KEY: &str = "theme-toggle";

/// Minimal key-value persistence standing in for the browser's
/// localStorage. Reads never fail; absent keys are `None`.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// JSON-file-backed store. The whole file is rewritten on every
/// mutation; it only ever holds a handful of entries.
pub struct FileStore {
    path: PathBuf,
    state: StoreFile,
}

impl FileStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let state = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    fn persist(&self) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(&self.state).context("serialize store")?;
        std::fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.state.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.state
            .entries
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        if self.state.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// In-memory store for unit tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_empty() {
        let tmp = tempdir().unwrap();
        let store = FileStore::open(&tmp.path().join("state.json")).unwrap();
        assert_eq!(store.get(PREFERENCE_KEY), None);
    }

    #[test]
    fn set_then_reopen_round_trips() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(PREFERENCE_KEY, "dark-mode").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(PREFERENCE_KEY).as_deref(), Some("dark-mode"));
    }

    #[test]
    fn remove_clears_entry_and_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(PREFERENCE_KEY, "light-mode").unwrap();
        store.remove(PREFERENCE_KEY).unwrap();
        assert_eq!(store.get(PREFERENCE_KEY), None);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(PREFERENCE_KEY), None);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::open(&tmp.path().join("state.json")).unwrap();
        store.remove(PREFERENCE_KEY).unwrap();
    }
}
