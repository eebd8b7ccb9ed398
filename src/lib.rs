//! Core library surface for the workout mapper.
//!
//! Workouts are logged against map coordinates, listed newest first and kept
//! in a local key/value store between sessions. The controller is front-end
//! agnostic; the `ui` module drives it from a terminal.
pub mod codec;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod ui;
pub mod view;

/// Persistence entry points used by `main.rs` to open the local store.
pub use db::{ensure_schema, Persistence, SqliteStorage};

/// The domain types other layers manipulate.
pub use error::TrackerError;
pub use models::{Coordinates, WorkoutId, WorkoutKind, WorkoutRecord};
pub use store::WorkoutStore;

pub use config::Config;
pub use controller::{ConfiguredLocation, Controller, Event};

/// The interactive application entry point and its display state.
pub use ui::{run_app, App, Frontend};
