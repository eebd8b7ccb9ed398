use crate::error::TrackerError;
use crate::models::{Coordinates, WorkoutId};
use crate::view::{FormMode, FormValues, ListEntry, Notice};

use super::state::MarkerId;

pub trait MapView {
    fn create_view(&mut self, center: Coordinates, zoom: u8);
    fn add_marker(&mut self, at: Coordinates, popup: &str) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    fn pan_to(&mut self, at: Coordinates, zoom: u8);
}

pub trait ListView {
    fn add_entry(&mut self, entry: ListEntry);
    /// Redraw an existing entry in place.
    fn replace_entry(&mut self, entry: ListEntry);
    fn remove_entry(&mut self, id: &WorkoutId);
}

pub trait FormView {
    fn show_form(&mut self, mode: FormMode, values: FormValues);
    /// Hide the form and clear its fields.
    fn hide_form(&mut self);
    fn lock_kind(&mut self, locked: bool);
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

pub trait Geolocator {
    fn current_position(&self) -> Result<Coordinates, TrackerError>;
}

/// Reports the position set in the configuration, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredLocation(pub Option<Coordinates>);

impl Geolocator for ConfiguredLocation {
    fn current_position(&self) -> Result<Coordinates, TrackerError> {
        self.0.ok_or_else(|| {
            TrackerError::GeolocationUnavailable(
                "no home position set (WORKOUT_MAPPER_HOME=lat,lng)".to_string(),
            )
        })
    }
}
