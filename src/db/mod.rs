//! Persistence port and its adapters.

mod connection;
mod memory;
mod storage;

pub use connection::{ensure_schema, DB_FILE_NAME};
pub use memory::MemoryStorage;
pub use storage::SqliteStorage;

use crate::codec;
use crate::error::TrackerError;
use crate::store::WorkoutStore;

/// Where the controller reads workouts from at startup and writes them back
/// after every mutation.
pub trait Persistence {
    fn load(&self) -> Result<WorkoutStore, TrackerError>;
    fn save(&mut self, store: &WorkoutStore) -> Result<(), TrackerError>;
}

/// An absent blob is a first launch, not corruption.
fn store_from_blob(blob: Option<String>) -> Result<WorkoutStore, TrackerError> {
    match blob {
        None => Ok(WorkoutStore::new()),
        Some(blob) => WorkoutStore::from_records(codec::decode(&blob)?),
    }
}
