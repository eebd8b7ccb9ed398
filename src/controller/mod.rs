//! Keeps the store, the workout list and the map markers in step.
//!
//! [`dispatch`] is a pure reducer from `(AppState, Event)` to a new state plus
//! the [`Effect`]s the views must perform. [`Controller`] owns the state and
//! runs those effects against the view and persistence ports right away, so
//! the store and both views never disagree between events.

mod event;
mod ports;
mod reducer;
mod runtime;
mod state;

pub use event::{Effect, Event, ListControl};
pub use ports::{ConfiguredLocation, FormView, Geolocator, ListView, MapView, Notifier};
pub use reducer::dispatch;
pub use runtime::Controller;
pub use state::{AppState, EditMode, FormState, MapViewport, MarkerId, DEFAULT_ZOOM};
