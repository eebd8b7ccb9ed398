use log::{debug, error, info, warn};

use crate::error::TrackerError;
use crate::models::{Coordinates, WorkoutId, WorkoutRecord};
use crate::view::{marker_popup, FormMode, FormValues, ListEntry, Notice};

use super::event::{Effect, Event, ListControl};
use super::state::{AppState, EditMode, FormState, MapViewport};

/// Shown when something other than save, discard or another edit is tried
/// while a workout is being edited.
const FINISH_EDITING: &str = "Finish editing first (Enter to save, Ctrl+X to discard).";
const FINISH_NEW_WORKOUT: &str = "Please fill in the new workout first (Esc to discard it).";

/// Apply one event to the state and list the effects the views must perform.
pub fn dispatch(mut state: AppState, event: Event) -> (AppState, Vec<Effect>) {
    debug!("dispatching {event:?} while {:?}", state.mode);
    let mut effects = Vec::new();

    match event {
        Event::PositionAcquired(center) => on_position(&mut state, center, &mut effects),
        Event::PositionUnavailable(reason) => {
            warn!("geolocation unavailable, running without a map: {reason}");
            let err = TrackerError::GeolocationUnavailable(reason);
            effects.push(Effect::Notify(Notice::error(err.to_string())));
        }
        Event::MapClicked(at) => on_map_click(&mut state, at, &mut effects),
        Event::FormEdited(values) => state.form.values = values,
        Event::FormSubmitted(values) => {
            state.form.values = values;
            match state.mode.clone() {
                EditMode::Idle => submit_new(&mut state, &mut effects),
                EditMode::Editing(id) => {
                    if commit_edit(&mut state, &id, &mut effects) {
                        leave_edit(&mut state, &mut effects);
                        effects.push(Effect::Notify(Notice::info("Workout updated.")));
                    }
                }
            }
        }
        Event::ListClicked { id, control } => on_list_click(&mut state, id, control, &mut effects),
        Event::EscapePressed => match state.mode {
            EditMode::Editing(_) => debug!("escape ignored while editing"),
            EditMode::Idle if state.form.visible => hide_form(&mut state, &mut effects),
            EditMode::Idle => {}
        },
        Event::CancelEdit => {
            if let EditMode::Editing(id) = &state.mode {
                info!("discarded edit of workout {id}");
                leave_edit(&mut state, &mut effects);
                effects.push(Effect::Notify(Notice::info("Edit discarded.")));
            }
        }
        Event::ClearAll => clear_all(&mut state, &mut effects),
    }

    (state, effects)
}

/// The first fix creates the map and places markers for workouts loaded from
/// storage; later fixes just recenter it.
fn on_position(state: &mut AppState, center: Coordinates, effects: &mut Vec<Effect>) {
    let first_fix = state.map.is_none();
    state.map = Some(MapViewport {
        center,
        zoom: state.zoom,
    });

    if first_fix {
        info!("map created at {center}");
        effects.push(Effect::CreateMapView {
            center,
            zoom: state.zoom,
        });
        for record in state.store.all() {
            effects.push(add_marker(record));
        }
    } else {
        effects.push(Effect::PanTo {
            at: center,
            zoom: state.zoom,
        });
    }
}

/// A map click opens the new-workout form at that spot. It is refused while
/// editing so the kind lock and pending values are not lost.
fn on_map_click(state: &mut AppState, at: Coordinates, effects: &mut Vec<Effect>) {
    if state.map.is_none() {
        effects.push(Effect::Notify(Notice::error(
            "The map is not loaded; workouts can't be placed yet.",
        )));
        return;
    }
    if state.editing().is_some() {
        effects.push(Effect::Notify(Notice::info(FINISH_EDITING)));
        return;
    }

    state.form.visible = true;
    state.form.target = Some(at);
    effects.push(Effect::ShowForm {
        mode: FormMode::Create { at },
        values: state.form.values,
    });
}

/// Create a workout from the form and its picked position. Nothing is stored
/// or persisted unless validation passes.
fn submit_new(state: &mut AppState, effects: &mut Vec<Effect>) {
    let at = match state.form.target {
        Some(at) if state.form.visible => at,
        _ => {
            effects.push(Effect::Notify(Notice::info(
                "Pick a spot on the map to add a workout.",
            )));
            return;
        }
    };

    let FormValues {
        kind,
        distance_km,
        duration_min,
        metric,
    } = state.form.values;
    let record = match WorkoutRecord::create(kind, at, distance_km, duration_min, metric) {
        Ok(record) => record,
        Err(err) => {
            effects.push(Effect::Notify(Notice::error(err.to_string())));
            return;
        }
    };

    let entry = ListEntry::from_record(&record);
    let marker = add_marker(&record);
    let id = record.id().clone();
    if let Err(err) = state.store.add(record) {
        error!("new workout collided with an existing one: {err}");
        effects.push(Effect::Notify(Notice::error(err.to_string())));
        return;
    }
    info!("created {} workout {id} at {at}", kind.label());

    effects.push(Effect::AddListEntry(entry));
    if state.map.is_some() {
        effects.push(marker);
    }
    effects.push(Effect::Persist);
    hide_form(state, effects);
}

/// Write the form into the workout being edited. Returns `false` and leaves
/// the record untouched when the values are invalid.
/// Apply the form values to the workout being edited. Returns `false` when
/// the values are invalid so the caller stays in `Editing`.
fn commit_edit(state: &mut AppState, id: &WorkoutId, effects: &mut Vec<Effect>) -> bool {
    let values = state.form.values;
    let record = match state.store.find_mut(id) {
        Ok(record) => record,
        Err(err) => {
            error!("edit target is gone from the store: {err}");
            effects.push(Effect::Notify(Notice::error(err.to_string())));
            leave_edit(state, effects);
            return false;
        }
    };

    if let Err(err) =
        record.update_measurements(values.distance_km, values.duration_min, values.metric)
    {
        effects.push(Effect::Notify(Notice::error(err.to_string())));
        return false;
    }

    info!("updated workout {id}");
    effects.push(Effect::ReplaceListEntry(ListEntry::from_record(record)));
    effects.push(Effect::Persist);
    true
}

/// Load a workout into the form and lock the kind selector.
fn begin_edit(state: &mut AppState, id: WorkoutId, effects: &mut Vec<Effect>) {
    let (values, kind) = match state.store.find(&id) {
        Ok(record) => (FormValues::from_record(record), record.kind()),
        Err(err) => {
            error!("cannot edit: {err}");
            effects.push(Effect::Notify(Notice::error(err.to_string())));
            return;
        }
    };

    state.form = FormState {
        visible: true,
        values,
        target: None,
    };
    state.mode = EditMode::Editing(id.clone());
    effects.push(Effect::ShowForm {
        mode: FormMode::Edit { id, kind },
        values,
    });
    effects.push(Effect::LockKind(true));
}

/// Route a click on a list entry. The id is checked first so a stale entry
/// is reported before any state changes.
fn on_list_click(
    state: &mut AppState,
    id: WorkoutId,
    control: ListControl,
    effects: &mut Vec<Effect>,
) {
    if !state.store.contains(&id) {
        let err = TrackerError::NotFound(id);
        error!("list entry out of sync with the store: {err}");
        effects.push(Effect::Notify(Notice::error(err.to_string())));
        return;
    }

    match control {
        ListControl::Delete => delete(state, id, effects),
        ListControl::Edit => match state.mode.clone() {
            EditMode::Idle if state.form.visible => {
                effects.push(Effect::Notify(Notice::info(FINISH_NEW_WORKOUT)));
            }
            EditMode::Idle => begin_edit(state, id, effects),
            EditMode::Editing(current) if current == id => {}
            EditMode::Editing(current) => {
                if commit_edit(state, &current, effects) {
                    begin_edit(state, id, effects);
                }
            }
        },
        ListControl::Body => {
            if state.editing().is_some() {
                effects.push(Effect::Notify(Notice::info(FINISH_EDITING)));
            } else {
                focus(state, &id, effects);
            }
        }
    }
}

/// Count the interaction and pan the map to the workout.
fn focus(state: &mut AppState, id: &WorkoutId, effects: &mut Vec<Effect>) {
    let Ok(record) = state.store.find_mut(id) else {
        return;
    };
    record.touch();
    let at = record.coordinates();

    if let Some(map) = state.map.as_mut() {
        map.center = at;
        map.zoom = state.zoom;
        effects.push(Effect::PanTo {
            at,
            zoom: state.zoom,
        });
    }
}

/// Remove a workout from every view and persist straight away.
fn delete(state: &mut AppState, id: WorkoutId, effects: &mut Vec<Effect>) {
    let record = match state.store.remove(&id) {
        Ok(record) => record,
        Err(err) => {
            error!("cannot delete: {err}");
            effects.push(Effect::Notify(Notice::error(err.to_string())));
            return;
        }
    };
    info!("deleted workout {id} ({})", record.description());

    effects.push(Effect::RemoveListEntry(id.clone()));
    if state.map.is_some() {
        effects.push(Effect::RemoveMarker(id.clone()));
    }
    if state.editing() == Some(&id) {
        leave_edit(state, effects);
    }
    effects.push(Effect::Persist);
}

/// Drop every workout. The empty list is persisted like any other change.
fn clear_all(state: &mut AppState, effects: &mut Vec<Effect>) {
    let removed = state.store.clear();
    for record in &removed {
        effects.push(Effect::RemoveListEntry(record.id().clone()));
        if state.map.is_some() {
            effects.push(Effect::RemoveMarker(record.id().clone()));
        }
    }
    if state.editing().is_some() {
        leave_edit(state, effects);
    }
    effects.push(Effect::Persist);

    info!("cleared {} workouts", removed.len());
    let plural = if removed.len() == 1 { "" } else { "s" };
    effects.push(Effect::Notify(Notice::info(format!(
        "Removed {} workout{plural}.",
        removed.len()
    ))));
}

/// Hide the form and forget its values and target.
fn hide_form(state: &mut AppState, effects: &mut Vec<Effect>) {
    state.form = FormState::default();
    effects.push(Effect::HideForm);
}

/// Back to `Idle`: hide the form and release the kind selector.
fn leave_edit(state: &mut AppState, effects: &mut Vec<Effect>) {
    state.mode = EditMode::Idle;
    hide_form(state, effects);
    effects.push(Effect::LockKind(false));
}

fn add_marker(record: &WorkoutRecord) -> Effect {
    Effect::AddMarker {
        id: record.id().clone(),
        at: record.coordinates(),
        popup: marker_popup(record),
    }
}
