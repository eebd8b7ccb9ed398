use crate::models::{Coordinates, WorkoutId};
use crate::view::{FormMode, FormValues, ListEntry, Notice};

/// Which part of a list entry was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListControl {
    Edit,
    Delete,
    /// Anywhere else on the entry.
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PositionAcquired(Coordinates),
    PositionUnavailable(String),
    MapClicked(Coordinates),
    /// The user changed a form field.
    FormEdited(FormValues),
    FormSubmitted(FormValues),
    ListClicked { id: WorkoutId, control: ListControl },
    EscapePressed,
    CancelEdit,
    ClearAll,
}

/// Side effects requested by the reducer, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateMapView { center: Coordinates, zoom: u8 },
    AddListEntry(ListEntry),
    ReplaceListEntry(ListEntry),
    RemoveListEntry(WorkoutId),
    AddMarker {
        id: WorkoutId,
        at: Coordinates,
        popup: String,
    },
    RemoveMarker(WorkoutId),
    PanTo { at: Coordinates, zoom: u8 },
    ShowForm { mode: FormMode, values: FormValues },
    HideForm,
    LockKind(bool),
    Persist,
    Notify(Notice),
}
