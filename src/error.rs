//! Error taxonomy shared by the domain, codec and persistence layers.

use thiserror::Error;

use crate::models::WorkoutId;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// A numeric input was non-finite or not strictly positive. The message is
    /// shown to the user verbatim.
    #[error("Inputs have to be positive numbers! ({field} was {value})")]
    InvalidInput { field: &'static str, value: f64 },

    /// A view referenced a workout the store no longer knows about.
    #[error("workout {0} not found")]
    NotFound(WorkoutId),

    #[error("workout {0} already exists")]
    DuplicateId(WorkoutId),

    /// Persisted data could not be read back into valid records.
    #[error("stored workouts are corrupt: {0}")]
    CorruptData(String),

    #[error("could not get your current position: {0}")]
    GeolocationUnavailable(String),

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode workouts: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TrackerError {
    pub(crate) fn corrupt<S: Into<String>>(reason: S) -> Self {
        TrackerError::CorruptData(reason.into())
    }
}
