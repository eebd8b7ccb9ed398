use std::mem;

use log::{error, info, warn};

use crate::db::Persistence;
use crate::error::TrackerError;
use crate::store::WorkoutStore;
use crate::view::{ListEntry, Notice};

use super::event::{Effect, Event};
use super::ports::{FormView, Geolocator, ListView, MapView, Notifier};
use super::reducer::dispatch;
use super::state::AppState;

/// Owns the application state and carries out every effect of an event before
/// `handle` returns, persistence writes included.
pub struct Controller<P, V> {
    state: AppState,
    persistence: P,
    view: V,
}

impl<P, V> Controller<P, V>
where
    P: Persistence,
    V: MapView + ListView + FormView + Notifier,
{
    /// Load stored workouts and render them into the list. A blob that no
    /// longer decodes is reported and replaced by an empty list; any other
    /// load failure is returned, since the first save would otherwise
    /// overwrite data that may still be intact.
    pub fn start(persistence: P, mut view: V, zoom: u8) -> Result<Self, TrackerError> {
        let store = match persistence.load() {
            Ok(store) => {
                info!("loaded {} workouts", store.len());
                store
            }
            Err(err @ TrackerError::CorruptData(_)) => {
                warn!("starting with an empty list: {err}");
                view.notify(Notice::error(format!(
                    "{err}. Starting with an empty list."
                )));
                WorkoutStore::new()
            }
            Err(err) => {
                error!("could not load workouts: {err:?}");
                return Err(err);
            }
        };

        for record in store.all() {
            view.add_entry(ListEntry::from_record(record));
        }

        Ok(Self {
            state: AppState::new(store, zoom),
            persistence,
            view,
        })
    }

    /// Ask for the current position and create the map from it.
    pub fn locate<G: Geolocator>(&mut self, geolocator: &G) {
        let event = match geolocator.current_position() {
            Ok(center) => Event::PositionAcquired(center),
            Err(TrackerError::GeolocationUnavailable(reason)) => Event::PositionUnavailable(reason),
            Err(other) => Event::PositionUnavailable(other.to_string()),
        };
        self.handle(event);
    }

    pub fn handle(&mut self, event: Event) {
        let state = mem::take(&mut self.state);
        let (state, effects) = dispatch(state, event);
        self.state = state;

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::CreateMapView { center, zoom } => self.view.create_view(center, zoom),
            Effect::AddListEntry(entry) => self.view.add_entry(entry),
            Effect::ReplaceListEntry(entry) => self.view.replace_entry(entry),
            Effect::RemoveListEntry(id) => self.view.remove_entry(&id),
            Effect::AddMarker { id, at, popup } => {
                let marker = self.view.add_marker(at, &popup);
                if let Some(stale) = self.state.markers.insert(id, marker) {
                    self.view.remove_marker(stale);
                }
            }
            Effect::RemoveMarker(id) => match self.state.markers.remove(&id) {
                Some(marker) => self.view.remove_marker(marker),
                None => error!("no marker registered for workout {id}"),
            },
            Effect::PanTo { at, zoom } => self.view.pan_to(at, zoom),
            Effect::ShowForm { mode, values } => self.view.show_form(mode, values),
            Effect::HideForm => self.view.hide_form(),
            Effect::LockKind(locked) => self.view.lock_kind(locked),
            Effect::Persist => {
                if let Err(err) = self.persistence.save(&self.state.store) {
                    error!("failed to persist workouts: {err:?}");
                    self.view
                        .notify(Notice::error(format!("Could not save workouts: {err}")));
                }
            }
            Effect::Notify(notice) => self.view.notify(notice),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}
