//! Ratatui front-end: a workout list and form beside a canvas world map.

mod app;
mod forms;
mod helpers;
mod panes;
mod terminal;

pub use app::App;
pub use panes::Frontend;
pub use terminal::run_app;
