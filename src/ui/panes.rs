use std::collections::BTreeMap;

use crate::controller::{FormView, ListView, MapView, MarkerId, Notifier};
use crate::models::{Coordinates, WorkoutId};
use crate::view::{FormMode, FormValues, ListEntry, Notice};

use super::forms::WorkoutForm;

const MIN_ZOOM: u8 = 1;
const MAX_ZOOM: u8 = 19;
/// Fraction of the visible span moved by one arrow key press.
const PAN_FRACTION: f64 = 0.1;

/// Workout cards, newest first, plus the highlighted row.
#[derive(Debug, Default)]
pub(crate) struct ListPane {
    pub(crate) entries: Vec<ListEntry>,
    pub(crate) selected: usize,
}

impl ListPane {
    pub(crate) fn current(&self) -> Option<&ListEntry> {
        self.entries.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.entries.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.entries.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    fn ensure_in_bounds(&mut self) {
        if self.entries.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.entries.len() {
            self.selected = self.entries.len() - 1;
        }
    }
}

/// Viewport and markers of the canvas map.
#[derive(Debug)]
pub(crate) struct MapPane {
    pub(crate) center: Coordinates,
    pub(crate) zoom: u8,
    pub(crate) markers: BTreeMap<MarkerId, (Coordinates, String)>,
    next_marker: u64,
}

impl MapPane {
    fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            markers: BTreeMap::new(),
            next_marker: 0,
        }
    }

    /// Visible `(longitude, latitude)` extent in degrees. Each zoom level
    /// halves it, as with web map tiles.
    pub(crate) fn span(&self) -> (f64, f64) {
        let lng_span = 360.0 / 2f64.powi(i32::from(self.zoom) - 1);
        (lng_span, lng_span / 2.0)
    }

    pub(crate) fn x_bounds(&self) -> [f64; 2] {
        let (lng_span, _) = self.span();
        [self.center.lng - lng_span / 2.0, self.center.lng + lng_span / 2.0]
    }

    pub(crate) fn y_bounds(&self) -> [f64; 2] {
        let (_, lat_span) = self.span();
        [self.center.lat - lat_span / 2.0, self.center.lat + lat_span / 2.0]
    }

    /// Move the crosshair by whole steps north/east.
    pub(crate) fn pan(&mut self, north: i8, east: i8) {
        let (lng_span, lat_span) = self.span();
        let lat = self.center.lat + f64::from(north) * lat_span * PAN_FRACTION;
        let mut lng = self.center.lng + f64::from(east) * lng_span * PAN_FRACTION;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        self.center = Coordinates::new(lat.clamp(-85.0, 85.0), lng);
    }

    pub(crate) fn zoom_by(&mut self, delta: i8) {
        let zoom = (i16::from(self.zoom) + i16::from(delta))
            .clamp(i16::from(MIN_ZOOM), i16::from(MAX_ZOOM));
        self.zoom = zoom as u8;
    }
}

/// Everything the terminal shows, driven by controller effects.
#[derive(Debug, Default)]
pub struct Frontend {
    pub(crate) list: ListPane,
    pub(crate) map: Option<MapPane>,
    pub(crate) form: Option<WorkoutForm>,
    pub(crate) status: Option<Notice>,
    kind_locked: bool,
}

impl Frontend {
    pub(crate) fn clear_status(&mut self) {
        self.status = None;
    }
}

impl MapView for Frontend {
    fn create_view(&mut self, center: Coordinates, zoom: u8) {
        self.map = Some(MapPane::new(center, zoom));
    }

    fn add_marker(&mut self, at: Coordinates, popup: &str) -> MarkerId {
        let Some(map) = self.map.as_mut() else {
            log::warn!("marker requested before the map exists");
            return MarkerId(0);
        };
        map.next_marker += 1;
        let marker = MarkerId(map.next_marker);
        map.markers.insert(marker, (at, popup.to_string()));
        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if let Some(map) = self.map.as_mut() {
            map.markers.remove(&marker);
        }
    }

    fn pan_to(&mut self, at: Coordinates, zoom: u8) {
        if let Some(map) = self.map.as_mut() {
            map.center = at;
            map.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }
}

impl ListView for Frontend {
    fn add_entry(&mut self, entry: ListEntry) {
        self.list.entries.insert(0, entry);
        self.list.selected = 0;
    }

    fn replace_entry(&mut self, entry: ListEntry) {
        match self.list.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None => log::warn!("no list entry to replace for workout {}", entry.id),
        }
    }

    fn remove_entry(&mut self, id: &WorkoutId) {
        self.list.entries.retain(|entry| &entry.id != id);
        self.list.ensure_in_bounds();
    }
}

impl FormView for Frontend {
    fn show_form(&mut self, mode: FormMode, values: FormValues) {
        // A second map click only moves the target of an open new-workout form.
        if let (Some(form), FormMode::Create { .. }) = (self.form.as_mut(), &mode) {
            if matches!(form.mode, FormMode::Create { .. }) {
                form.mode = mode;
                return;
            }
        }
        let mut form = WorkoutForm::new(mode, values);
        form.kind_locked = self.kind_locked;
        self.form = Some(form);
    }

    fn hide_form(&mut self) {
        self.form = None;
    }

    fn lock_kind(&mut self, locked: bool) {
        self.kind_locked = locked;
        if let Some(form) = self.form.as_mut() {
            form.kind_locked = locked;
        }
    }
}

impl Notifier for Frontend {
    fn notify(&mut self, notice: Notice) {
        self.status = Some(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkoutKind, WorkoutRecord};

    fn entry(distance: f64) -> ListEntry {
        let record = WorkoutRecord::create(
            WorkoutKind::Running,
            Coordinates::new(40.0, -3.0),
            distance,
            25.0,
            180.0,
        )
        .unwrap();
        ListEntry::from_record(&record)
    }

    #[test]
    fn newest_entry_is_listed_first() {
        let mut frontend = Frontend::default();
        frontend.add_entry(entry(5.0));
        frontend.add_entry(entry(6.0));

        assert_eq!(frontend.list.entries[0].distance_km, 6.0);
        assert_eq!(frontend.list.current().unwrap().distance_km, 6.0);
    }

    #[test]
    fn selection_stays_in_bounds_after_removal() {
        let mut frontend = Frontend::default();
        let first = entry(5.0);
        let first_id = first.id.clone();
        frontend.add_entry(first);
        frontend.add_entry(entry(6.0));
        frontend.list.move_selection(5);
        assert_eq!(frontend.list.selected, 1);

        frontend.remove_entry(&first_id);
        assert_eq!(frontend.list.selected, 0);
        assert_eq!(frontend.list.entries.len(), 1);
    }

    #[test]
    fn zoom_halves_the_visible_span() {
        let mut map = MapPane::new(Coordinates::new(40.0, -3.0), 13);
        let (wide, _) = map.span();
        map.zoom_by(1);
        let (narrow, _) = map.span();
        assert!((wide / narrow - 2.0).abs() < 1e-9);

        map.zoom_by(100);
        assert_eq!(map.zoom, MAX_ZOOM);
    }

    #[test]
    fn panning_moves_center_by_a_tenth_of_the_span() {
        let mut map = MapPane::new(Coordinates::new(40.0, -3.0), 13);
        let (lng_span, lat_span) = map.span();
        map.pan(1, -2);

        assert!((map.center.lat - (40.0 + lat_span * 0.1)).abs() < 1e-9);
        assert!((map.center.lng - (-3.0 - lng_span * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn lock_applies_to_open_and_future_forms() {
        let mut frontend = Frontend::default();
        frontend.lock_kind(true);
        frontend.show_form(
            FormMode::Edit {
                id: "1".into(),
                kind: WorkoutKind::Running,
            },
            FormValues::new(WorkoutKind::Running, 5.0, 25.0, 180.0),
        );
        assert!(frontend.form.as_ref().unwrap().kind_locked);

        frontend.lock_kind(false);
        assert!(!frontend.form.as_ref().unwrap().kind_locked);
    }

    #[test]
    fn second_map_click_keeps_typed_values() {
        let mut frontend = Frontend::default();
        let first = Coordinates::new(40.0, -3.0);
        let second = Coordinates::new(41.0, -3.0);
        frontend.show_form(FormMode::Create { at: first }, FormValues::default());
        frontend.form.as_mut().unwrap().distance = "5".to_string();

        frontend.show_form(FormMode::Create { at: second }, FormValues::default());
        let form = frontend.form.as_ref().unwrap();
        assert_eq!(form.distance, "5");
        assert_eq!(form.mode, FormMode::Create { at: second });
    }
}
