use std::collections::HashMap;

use crate::models::{Coordinates, WorkoutId};
use crate::store::WorkoutStore;
use crate::view::FormValues;

/// Zoom level used when the map is created and whenever it pans to a workout.
pub const DEFAULT_ZOOM: u8 = 13;

/// Handle returned by the map widget for a marker it drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Where the map is looking. Recorded so later position fixes pan instead of
/// recreating the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: u8,
}

/// At most one workout is edited at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Editing(WorkoutId),
}

/// The controller's copy of the form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    /// Mirrors what the form view shows; Escape only acts on a visible form.
    pub visible: bool,
    /// Latest values typed into the form, kept current by `FormEdited` so an
    /// edit can be committed when the user jumps to another workout.
    pub values: FormValues,
    /// Map position picked for a new workout.
    pub target: Option<Coordinates>,
}

/// Everything the reducer needs to decide what an event means. Views hold no
/// state the reducer relies on; they only render effects.
#[derive(Debug)]
pub struct AppState {
    /// Source of truth for the workouts; the list and markers follow it.
    pub store: WorkoutStore,
    /// `None` until a position is known and the map has been created.
    pub map: Option<MapViewport>,
    pub mode: EditMode,
    pub form: FormState,
    /// Marker handles keyed by the workout they belong to.
    pub markers: HashMap<WorkoutId, MarkerId>,
    /// Zoom applied when the map is created or pans to a workout.
    pub zoom: u8,
}

impl AppState {
    pub fn new(store: WorkoutStore, zoom: u8) -> Self {
        Self {
            store,
            map: None,
            mode: EditMode::Idle,
            form: FormState::default(),
            markers: HashMap::new(),
            zoom,
        }
    }

    /// Id of the workout being edited, if any.
    pub fn editing(&self) -> Option<&WorkoutId> {
        match &self.mode {
            EditMode::Editing(id) => Some(id),
            EditMode::Idle => None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(WorkoutStore::new(), DEFAULT_ZOOM)
    }
}
