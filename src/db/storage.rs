use rusqlite::{params, Connection, OptionalExtension};

use crate::error::TrackerError;
use crate::store::WorkoutStore;

use super::{store_from_blob, Persistence};

/// Workouts persisted as a single JSON blob in the `local_storage` table.
pub struct SqliteStorage {
    conn: Connection,
    key: String,
}

impl SqliteStorage {
    pub fn new<S: Into<String>>(conn: Connection, key: S) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or fully overwrite the value stored under `key`.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl Persistence for SqliteStorage {
    fn load(&self) -> Result<WorkoutStore, TrackerError> {
        store_from_blob(self.get_item(&self.key)?)
    }

    fn save(&mut self, store: &WorkoutStore) -> Result<(), TrackerError> {
        let blob = crate::codec::encode(store)?;
        self.set_item(&self.key, &blob)?;
        log::debug!("saved {} workouts under '{}'", store.len(), self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{ensure_schema, open_in_memory, DB_FILE_NAME};
    use crate::models::{Coordinates, WorkoutKind, WorkoutRecord};

    fn store_with_run() -> WorkoutStore {
        let run = WorkoutRecord::create(
            WorkoutKind::Running,
            Coordinates::new(40.0, -3.0),
            5.0,
            25.0,
            180.0,
        )
        .unwrap();
        WorkoutStore::from_records([run]).unwrap()
    }

    #[test]
    fn missing_key_loads_empty_store() {
        let storage = SqliteStorage::new(open_in_memory().unwrap(), "workouts");
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE_NAME);
        let store = store_with_run();
        let id = store.all().next().unwrap().id().clone();

        {
            let mut storage = SqliteStorage::new(ensure_schema(&path).unwrap(), "workouts");
            storage.save(&store).unwrap();
        }

        let storage = SqliteStorage::new(ensure_schema(&path).unwrap(), "workouts");
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.find(&id).unwrap().pace_min_per_km(), Some(5.0));
    }

    #[test]
    fn save_overwrites_previous_blob() {
        let mut storage = SqliteStorage::new(open_in_memory().unwrap(), "workouts");
        storage.save(&store_with_run()).unwrap();
        storage.save(&WorkoutStore::new()).unwrap();

        assert_eq!(storage.get_item("workouts").unwrap().as_deref(), Some("[]"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let storage = SqliteStorage::new(open_in_memory().unwrap(), "workouts");
        storage.set_item("workouts", "{not json").unwrap();

        assert!(matches!(storage.load(), Err(TrackerError::CorruptData(_))));
    }
}
