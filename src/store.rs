use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::models::{
    BusinessProfile, HubReminder, HubTask, JobAlert, SavedJob, SavedResume,
};
use crate::session::Session;

/// Write-side failures are reported explicitly so callers never assume
/// durability that was not achieved. Reads degrade instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize collection '{collection}': {source}")]
    Serialize {
        collection: String,
        source: serde_json::Error,
    },
    #[error("could not write collection '{collection}': {source}")]
    Write {
        collection: String,
        source: std::io::Error,
    },
}

/// A record persisted in its own per-type collection file.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Fixed, stable file stem for the collection.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Called by the store when a record is first saved with an empty id.
    fn assign_identity(&mut self, id: String, now: DateTime<Utc>);
}

/// Key-value persistence: one JSON array file per entity type. Every
/// mutation rewrites the whole collection, which is fine at the tens of
/// records this tool holds and is the key constraint on scaling it.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(Self::default_dir())
    }

    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn default_dir() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pivot") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("pivot-data")
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    /// Full collection in stored order. A missing file or an unreadable or
    /// corrupt one degrades to the empty collection rather than failing.
    pub fn list<T: Entity>(&self) -> Vec<T> {
        let raw = match fs::read_to_string(self.collection_path(T::COLLECTION)) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Insert or replace. An empty id means "new": the store assigns a
    /// fresh uuid and creation timestamp and appends. A set id replaces the
    /// matching entry in place, preserving its position; caller-keyed
    /// records (e.g. jobs keyed by URL) whose id is absent are appended.
    pub fn upsert<T: Entity>(&self, record: &mut T) -> Result<(), StoreError> {
        let mut all = self.list::<T>();
        if record.id().is_empty() {
            record.assign_identity(Uuid::new_v4().to_string(), Utc::now());
            all.push(record.clone());
        } else if let Some(slot) = all.iter_mut().find(|e| e.id() == record.id()) {
            *slot = record.clone();
        } else {
            all.push(record.clone());
        }
        self.write_collection(T::COLLECTION, &all)
    }

    /// Delete by id. Absence is a no-op, not an error.
    pub fn remove<T: Entity>(&self, id: &str) -> Result<(), StoreError> {
        let mut all = self.list::<T>();
        let before = all.len();
        all.retain(|e| e.id() != id);
        if all.len() == before {
            return Ok(());
        }
        self.write_collection(T::COLLECTION, &all)
    }

    fn write_collection<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|source| {
            StoreError::Serialize {
                collection: collection.to_string(),
                source,
            }
        })?;
        fs::write(self.collection_path(collection), json).map_err(|source| {
            StoreError::Write {
                collection: collection.to_string(),
                source,
            }
        })
    }

    // --- Session ---

    pub fn load_session(&self) -> Session {
        let raw = match fs::read_to_string(self.dir.join("session.json")) {
            Ok(raw) => raw,
            Err(_) => return Session::default(),
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(session).map_err(|source| StoreError::Serialize {
                collection: "session".to_string(),
                source,
            })?;
        fs::write(self.dir.join("session.json"), json).map_err(|source| StoreError::Write {
            collection: "session".to_string(),
            source,
        })
    }
}

impl Entity for BusinessProfile {
    const COLLECTION: &'static str = "business_profiles";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

impl Entity for SavedJob {
    const COLLECTION: &'static str = "saved_jobs";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        // Jobs are normally keyed by their application URL; this only
        // applies when a caller saves one without a URL.
        self.id = id;
        self.saved_at = now;
    }
}

impl Entity for JobAlert {
    const COLLECTION: &'static str = "job_alerts";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

impl Entity for SavedResume {
    const COLLECTION: &'static str = "saved_resumes";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.saved_at = now;
    }
}

impl Entity for HubTask {
    const COLLECTION: &'static str = "hub_tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

impl Entity for HubReminder {
    const COLLECTION: &'static str = "hub_reminders";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(dir.path()).unwrap();
        (dir, store)
    }

    fn job(url: &str, title: &str) -> SavedJob {
        SavedJob {
            id: url.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            status: JobStatus::Interested,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_empty_when_nothing_persisted() {
        let (_dir, store) = test_store();
        assert!(store.list::<SavedJob>().is_empty());
    }

    #[test]
    fn test_list_degrades_to_empty_on_corrupt_file() {
        let (_dir, store) = test_store();
        fs::write(store.dir().join("saved_jobs.json"), "{not json").unwrap();
        assert!(store.list::<SavedJob>().is_empty());
    }

    #[test]
    fn test_upsert_assigns_id_and_timestamp_when_unset() {
        let (_dir, store) = test_store();
        let mut task = HubTask {
            id: String::new(),
            title: "Update LinkedIn".to_string(),
            done: false,
            created_at: Utc::now(),
        };
        store.upsert(&mut task).unwrap();
        assert!(!task.id.is_empty());

        let listed = store.list::<HubTask>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, task.id);
    }

    #[test]
    fn test_upsert_with_caller_key_appends_then_replaces() {
        let (_dir, store) = test_store();
        let mut a = job("https://jobs.example/1", "Backend Engineer");
        let mut b = job("https://jobs.example/2", "Data Analyst");
        store.upsert(&mut a).unwrap();
        store.upsert(&mut b).unwrap();

        // Replace the first entry; its position must be preserved.
        a.status = JobStatus::Applied;
        store.upsert(&mut a).unwrap();

        let listed = store.list::<SavedJob>();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "https://jobs.example/1");
        assert_eq!(listed[0].status, JobStatus::Applied);
        assert_eq!(listed[1].id, "https://jobs.example/2");
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let (_dir, store) = test_store();
        let mut a = job("https://jobs.example/1", "Backend Engineer");
        store.upsert(&mut a).unwrap();

        store.remove::<SavedJob>("https://jobs.example/nope").unwrap();
        assert_eq!(store.list::<SavedJob>().len(), 1);

        store.remove::<SavedJob>("https://jobs.example/1").unwrap();
        assert!(store.list::<SavedJob>().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let (_dir, store) = test_store();
        let urls = ["u3", "u1", "u2"];
        for url in urls {
            store.upsert(&mut job(url, "Role")).unwrap();
        }
        let listed = store.list::<SavedJob>();
        let got: Vec<&str> = listed.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(got, urls);

        // Field-for-field through a second read.
        assert_eq!(store.list::<SavedJob>(), listed);
    }

    #[test]
    fn test_session_round_trip_and_default() {
        let (_dir, store) = test_store();
        assert_eq!(store.load_session(), Session::default());

        let mut session = Session::default();
        session.select("profile-1".to_string());
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session(), session);
    }
}
