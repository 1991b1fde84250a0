//! Key-value persistence
//!
//! The portal mirrors its state into a simple string key-value store after
//! every mutation. `FileStore` keeps one JSON file per key on disk;
//! `MemoryStore` backs the per-run session scope and tests.
//!
//! Reads are forgiving: a missing key, an unreadable file or corrupted JSON
//! all load as "absent" so startup can fall back to defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::model::{Exercise, Subject, UserProgress};
use crate::error::Result;

/// Key holding the learner's progress record
pub const USER_KEY: &str = "eduquest_user";
/// Key holding the subject collection
pub const SUBJECTS_KEY: &str = "eduquest_subjects";
/// Key holding the exercise collection
pub const EXERCISES_KEY: &str = "eduquest_exercises";
/// Session-scoped key holding the elevated-mode flag
pub const ELEVATED_KEY: &str = "eduquest_is_admin";

/// Minimal string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Backends
// ─────────────────────────────────────────────────────────────────────────────

/// In-process store; contents vanish when it is dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Write to a sibling file first so a crash never leaves half a record
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Typed load/save of portal state on top of two key-value scopes:
/// `local` survives restarts, `session` lives for one run.
#[derive(Debug)]
pub struct PortalStore<S: KeyValueStore> {
    local: S,
    session: MemoryStore,
}

impl<S: KeyValueStore> PortalStore<S> {
    pub fn new(local: S) -> Self {
        Self {
            local,
            session: MemoryStore::new(),
        }
    }

    /// Access the persistent backend
    pub fn local(&self) -> &S {
        &self.local
    }

    pub fn load_user(&self) -> Option<UserProgress> {
        read_json(&self.local, USER_KEY)
    }

    pub fn load_subjects(&self) -> Option<Vec<Subject>> {
        read_json(&self.local, SUBJECTS_KEY)
    }

    pub fn load_exercises(&self) -> Option<Vec<Exercise>> {
        read_json(&self.local, EXERCISES_KEY)
    }

    pub fn load_elevated(&self) -> bool {
        matches!(self.session.get(ELEVATED_KEY), Ok(Some(v)) if v == "true")
    }

    pub fn save_user(&mut self, user: &UserProgress) -> Result<()> {
        write_json(&mut self.local, USER_KEY, user)
    }

    pub fn save_subjects(&mut self, subjects: &[Subject]) -> Result<()> {
        write_json(&mut self.local, SUBJECTS_KEY, &subjects)
    }

    pub fn save_exercises(&mut self, exercises: &[Exercise]) -> Result<()> {
        write_json(&mut self.local, EXERCISES_KEY, &exercises)
    }

    pub fn save_elevated(&mut self, elevated: bool) -> Result<()> {
        if elevated {
            self.session.set(ELEVATED_KEY, "true")
        } else {
            self.session.remove(ELEVATED_KEY)
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read stored value, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value is corrupted, ignoring it");
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    tracing::trace!(key, bytes = json.len(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::defaults::default_subjects;
    use chrono::NaiveDate;

    fn sample_user() -> UserProgress {
        UserProgress {
            name: "Ana".into(),
            total_points: 45,
            daily_goal: 3,
            completed_today_ids: vec!["m1".into(), "p2".into()],
            last_active_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        }
    }

    #[test]
    fn test_file_store_get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "value").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("value"));
        assert!(dir.path().join("data").join("k.json").exists());

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // Removing again is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_portal_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = PortalStore::new(FileStore::open(dir.path()).unwrap());
            store.save_user(&sample_user()).unwrap();
            store.save_subjects(&default_subjects()).unwrap();
        }
        let store = PortalStore::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(store.load_user(), Some(sample_user()));
        assert_eq!(store.load_subjects().map(|s| s.len()), Some(6));
        assert_eq!(store.load_exercises(), None);
    }

    #[test]
    fn test_corrupted_json_loads_as_absent() {
        let mut local = MemoryStore::new();
        local.set(USER_KEY, "{not json").unwrap();
        local.set(SUBJECTS_KEY, "[{\"name\": 3}]").unwrap();
        let store = PortalStore::new(local);
        assert_eq!(store.load_user(), None);
        assert_eq!(store.load_subjects(), None);
    }

    #[test]
    fn test_reads_portuguese_difficulty_records() {
        let mut local = MemoryStore::new();
        local
            .set(
                EXERCISES_KEY,
                r#"[{"id":"1700000000000","title":"Jogo","description":"","url":"https://x.y","subject":"Arte","difficulty":"Médio","points":10}]"#,
            )
            .unwrap();
        let store = PortalStore::new(local);
        let exercises = store.load_exercises().unwrap();
        assert_eq!(exercises[0].difficulty, crate::core::model::Difficulty::Medium);
    }

    #[test]
    fn test_elevated_flag_is_session_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PortalStore::new(FileStore::open(dir.path()).unwrap());
        assert!(!store.load_elevated());
        store.save_elevated(true).unwrap();
        assert!(store.load_elevated());
        assert!(!dir.path().join(format!("{}.json", ELEVATED_KEY)).exists());

        store.save_elevated(false).unwrap();
        assert!(!store.load_elevated());
    }
}
