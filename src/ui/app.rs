use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Map as WorldMap, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::controller::{Controller, Event, ListControl, Notifier};
use crate::db::Persistence;
use crate::models::Coordinates;
use crate::view::Notice;

use super::forms::{FormField, WorkoutForm};
use super::helpers::{centered_rect, entry_lines, notice_style, surface_error};
use super::panes::Frontend;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows taken by the workout form above the list.
const FORM_HEIGHT: u16 = 7;
const SIDEBAR_PERCENT: u16 = 40;
const MARKER_COLOR: Color = Color::LightMagenta;

/// Which pane receives navigation keys while no form is open.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    List,
    Map,
}

/// Modal overlays on top of the normal layout.
enum Mode {
    Normal,
    ConfirmClear { count: usize },
}

/// Terminal front-end around the workout controller.
pub struct App<P: Persistence> {
    controller: Controller<P, Frontend>,
    focus: Focus,
    mode: Mode,
}

impl<P: Persistence> App<P> {
    pub fn new(controller: Controller<P, Frontend>) -> Self {
        let focus = if controller.view().map.is_some() {
            Focus::Map
        } else {
            Focus::List
        };
        Self {
            controller,
            focus,
            mode: Mode::Normal,
        }
    }

    /// Handle a plain key press. Returns `true` once the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal if self.frontend().form.is_some() => {
                self.handle_form_key(code);
                Mode::Normal
            }
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmClear { count } => self.handle_confirm_clear(code, count),
        };

        Ok(exit)
    }

    /// Control-key shortcuts, available whether or not the form is open.
    pub(crate) fn handle_ctrl(&mut self, code: KeyCode) -> Result<bool> {
        if !matches!(self.mode, Mode::Normal) {
            return Ok(false);
        }
        match code {
            KeyCode::Char('c') => return Ok(true),
            KeyCode::Char('e') => self.click_selected(ListControl::Edit),
            KeyCode::Char('d') => self.click_selected(ListControl::Delete),
            KeyCode::Char('x') => {
                if self.controller.state().editing().is_some() {
                    self.controller.handle(Event::CancelEdit);
                } else {
                    self.set_status(Notice::error("Not editing a workout."));
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        self.frontend_mut().clear_status();

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::List if self.frontend().map.is_some() => Focus::Map,
                    _ => Focus::List,
                };
            }
            KeyCode::Char('o') => self.open_in_browser(),
            KeyCode::Char('C') => {
                let count = self.controller.state().store.len();
                if count == 0 {
                    self.set_status(Notice::info("There are no workouts to remove."));
                } else {
                    return Ok(Mode::ConfirmClear { count });
                }
            }
            _ => match self.focus {
                Focus::List => self.handle_list_key(code),
                Focus::Map => self.handle_map_key(code),
            },
        }

        Ok(Mode::Normal)
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.frontend_mut().list.move_selection(-1),
            KeyCode::Down => self.frontend_mut().list.move_selection(1),
            KeyCode::Enter => self.click_selected(ListControl::Body),
            KeyCode::Char('e') => self.click_selected(ListControl::Edit),
            KeyCode::Char('d') => self.click_selected(ListControl::Delete),
            _ => {}
        }
    }

    fn handle_map_key(&mut self, code: KeyCode) {
        let Some(map) = self.frontend_mut().map.as_mut() else {
            return;
        };
        match code {
            KeyCode::Up => map.pan(1, 0),
            KeyCode::Down => map.pan(-1, 0),
            KeyCode::Left => map.pan(0, -1),
            KeyCode::Right => map.pan(0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => map.zoom_by(1),
            KeyCode::Char('-') => map.zoom_by(-1),
            KeyCode::Enter => {
                let at = map.center;
                self.controller.handle(Event::MapClicked(at));
            }
            _ => {}
        }
    }

    /// Keys routed to the open workout form. List navigation stays live so
    /// another workout can be picked for editing.
    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.controller.handle(Event::EscapePressed);
                return;
            }
            KeyCode::Enter => {
                if let Some(values) = self.frontend().form.as_ref().map(WorkoutForm::values) {
                    self.frontend_mut().clear_status();
                    self.controller.handle(Event::FormSubmitted(values));
                }
                return;
            }
            KeyCode::Up => {
                self.frontend_mut().list.move_selection(-1);
                return;
            }
            KeyCode::Down => {
                self.frontend_mut().list.move_selection(1);
                return;
            }
            _ => {}
        }

        let Some(form) = self.frontend_mut().form.as_mut() else {
            return;
        };
        let changed = match code {
            KeyCode::Tab => {
                form.toggle_field();
                false
            }
            KeyCode::BackTab => {
                form.previous_field();
                false
            }
            KeyCode::Left | KeyCode::Right if form.active == FormField::Kind => form.toggle_kind(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => false,
        };

        if changed {
            let values = form.values();
            self.controller.handle(Event::FormEdited(values));
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode, count: usize) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.controller.handle(Event::ClearAll);
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status(Notice::info("Nothing was removed."));
                Mode::Normal
            }
            _ => Mode::ConfirmClear { count },
        }
    }

    fn click_selected(&mut self, control: ListControl) {
        match self.frontend().list.current().map(|entry| entry.id.clone()) {
            Some(id) => self.controller.handle(Event::ListClicked { id, control }),
            None => self.set_status(Notice::error("No workout selected.")),
        }
    }

    /// Open the selected workout, or the map crosshair, on openstreetmap.org.
    fn open_in_browser(&mut self) {
        let frontend = self.frontend();
        let target = match self.focus {
            Focus::List => frontend.list.current().map(|entry| entry.coordinates),
            Focus::Map => frontend.map.as_ref().map(|map| map.center),
        };
        let zoom = frontend
            .map
            .as_ref()
            .map_or(self.controller.state().zoom, |map| map.zoom);

        let Some(at) = target else {
            self.set_status(Notice::error("Nothing to show in the browser."));
            return;
        };

        let url = osm_url(at, zoom);
        match open_link(&url).with_context(|| format!("failed to open {url}")) {
            Ok(()) => self.set_status(Notice::info("Opened map in browser.")),
            Err(err) => {
                log::warn!("{err:#}");
                self.set_status(Notice::error(surface_error(&err)));
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(SIDEBAR_PERCENT),
                Constraint::Percentage(100 - SIDEBAR_PERCENT),
            ])
            .split(content_area);

        self.draw_sidebar(frame, columns[0]);
        self.draw_map(frame, columns[1]);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::ConfirmClear { count } = self.mode {
            self.draw_confirm_clear(frame, area, count);
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = self.frontend().form.as_ref() else {
            self.draw_list(frame, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(0)])
            .split(area);
        self.draw_form(frame, chunks[0], form);
        self.draw_list(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &WorkoutForm) {
        let block = Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);

        let lines = vec![
            form.build_line(FormField::Kind),
            form.build_line(FormField::Distance),
            form.build_line(FormField::Duration),
            form.build_line(FormField::Metric),
            Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to close",
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if let Some((column, row)) = form.cursor_offset() {
            frame.set_cursor_position((inner.x + column, inner.y + row));
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let list = &self.frontend().list;
        let focused = self.focus == Focus::List || self.frontend().form.is_some();
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("Workouts ({})", list.entries.len()))
            .borders(Borders::ALL)
            .border_style(border_style);

        if list.entries.is_empty() {
            let message = Paragraph::new("No workouts yet. Pick a spot on the map and press Enter.")
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = list
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| ListItem::new(entry_lines(entry, idx == list.selected)))
            .collect();

        let widget = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▌");

        let mut state = ListState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn draw_map(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::Map && self.frontend().form.is_none() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let Some(map) = self.frontend().map.as_ref() else {
            let block = Block::default()
                .title("Map")
                .borders(Borders::ALL)
                .border_style(border_style);
            let message = Paragraph::new(
                "Map unavailable. Set WORKOUT_MAPPER_HOME=lat,lng to place workouts.",
            )
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        };

        let block = Block::default()
            .title(format!("Map {} z{}", map.center, map.zoom))
            .borders(Borders::ALL)
            .border_style(border_style);
        let canvas = Canvas::default()
            .block(block)
            .marker(symbols::Marker::Braille)
            .x_bounds(map.x_bounds())
            .y_bounds(map.y_bounds())
            .paint(|ctx| {
                ctx.draw(&WorldMap {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();

                for (at, popup) in map.markers.values() {
                    ctx.draw(&Points {
                        coords: &[(at.lng, at.lat)],
                        color: MARKER_COLOR,
                    });
                    ctx.print(
                        at.lng,
                        at.lat,
                        Span::styled(format!(" {popup}"), Style::default().fg(MARKER_COLOR)),
                    );
                }

                ctx.print(
                    map.center.lng,
                    map.center.lat,
                    Span::styled(
                        "+",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                );
            });
        frame.render_widget(canvas, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.frontend().status {
            Line::from(vec![Span::styled(
                status.text.clone(),
                notice_style(status.level),
            )])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let form_open = self.frontend().form.is_some();
        let hints: &[(&'static str, &'static str)] = match (&self.mode, form_open, self.focus) {
            (Mode::ConfirmClear { .. }, _, _) => &[("[Y]", "Remove all"), ("[N/Esc]", "Keep")],
            (_, true, _) => &[
                ("[Enter]", "Save"),
                ("[Tab]", "Next field"),
                ("[↑↓]", "Select workout"),
                ("[Ctrl+E]", "Edit selected"),
                ("[Ctrl+X]", "Discard edit"),
                ("[Esc]", "Close"),
            ],
            (_, false, Focus::List) => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Show on map"),
                ("[e]", "Edit"),
                ("[d]", "Delete"),
                ("[o]", "Open in browser"),
                ("[C]", "Clear all"),
                ("[Tab]", "Map"),
                ("[q]", "Quit"),
            ],
            (_, false, Focus::Map) => &[
                ("[←↑↓→]", "Pan"),
                ("[+/-]", "Zoom"),
                ("[Enter]", "Log workout here"),
                ("[o]", "Open in browser"),
                ("[Tab]", "List"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, action) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect, count: usize) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        let lines = vec![
            Line::from(format!("Remove all {count} workout(s)?")),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn set_status(&mut self, notice: Notice) {
        self.frontend_mut().notify(notice);
    }

    fn frontend(&self) -> &Frontend {
        self.controller.view()
    }

    fn frontend_mut(&mut self) -> &mut Frontend {
        self.controller.view_mut()
    }
}

fn osm_url(at: Coordinates, zoom: u8) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.5}&mlon={lng:.5}#map={zoom}/{lat:.5}/{lng:.5}",
        lat = at.lat,
        lng = at.lng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ConfiguredLocation, EditMode};
    use crate::db::MemoryStorage;
    use crate::models::WorkoutKind;

    const HOME: Coordinates = Coordinates {
        lat: 40.0,
        lng: -3.0,
    };

    fn app_with(storage: MemoryStorage, home: Option<Coordinates>) -> App<MemoryStorage> {
        let mut controller = Controller::start(storage, Frontend::default(), 13).unwrap();
        controller.locate(&ConfiguredLocation(home));
        App::new(controller)
    }

    fn press(app: &mut App<MemoryStorage>, keys: &str) {
        for ch in keys.chars() {
            let code = match ch {
                '\t' => KeyCode::Tab,
                '\n' => KeyCode::Enter,
                other => KeyCode::Char(other),
            };
            app.handle_key(code).unwrap();
        }
    }

    fn log_run(app: &mut App<MemoryStorage>) {
        press(app, "\n5\t25\t180\n");
    }

    #[test]
    fn logging_a_workout_from_the_map() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        assert_eq!(app.focus, Focus::Map);

        log_run(&mut app);

        let frontend = app.frontend();
        assert!(frontend.form.is_none());
        assert_eq!(frontend.list.entries.len(), 1);
        assert_eq!(frontend.list.entries[0].coordinates, HOME);
        assert_eq!(frontend.map.as_ref().unwrap().markers.len(), 1);
        assert_eq!(app.controller.persistence().saves(), 1);
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        press(&mut app, "\n5\n");

        assert!(app.frontend().form.is_some());
        assert!(app.frontend().list.entries.is_empty());
        assert_eq!(
            app.frontend().status.as_ref().unwrap().level,
            crate::view::NoticeLevel::Error
        );
    }

    #[test]
    fn edit_locks_kind_and_updates_entry() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        log_run(&mut app);
        press(&mut app, "\t");
        assert_eq!(app.focus, Focus::List);

        press(&mut app, "e");
        assert!(matches!(app.controller.state().mode, EditMode::Editing(_)));
        let form = app.frontend().form.as_ref().unwrap();
        assert!(form.kind_locked);
        assert_eq!(form.distance, "5");

        app.handle_key(KeyCode::Backspace).unwrap();
        press(&mut app, "8\n");

        assert_eq!(app.controller.state().mode, EditMode::Idle);
        assert_eq!(app.frontend().list.entries[0].distance_km, 8.0);
        assert_eq!(app.frontend().list.entries[0].kind, WorkoutKind::Running);
    }

    #[test]
    fn ctrl_x_discards_an_edit() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        log_run(&mut app);
        app.handle_ctrl(KeyCode::Char('e')).unwrap();
        assert!(app.frontend().form.is_some());

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.frontend().form.is_some());

        app.handle_ctrl(KeyCode::Char('x')).unwrap();
        assert!(app.frontend().form.is_none());
        assert_eq!(app.controller.state().mode, EditMode::Idle);
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        log_run(&mut app);
        log_run(&mut app);

        press(&mut app, "C");
        assert!(matches!(app.mode, Mode::ConfirmClear { count: 2 }));
        press(&mut app, "n");
        assert_eq!(app.frontend().list.entries.len(), 2);

        press(&mut app, "Cy");
        assert!(app.frontend().list.entries.is_empty());
        assert!(app.frontend().map.as_ref().unwrap().markers.is_empty());
        assert!(app.controller.state().store.is_empty());
    }

    #[test]
    fn map_keys_pan_and_zoom_the_view() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        app.handle_key(KeyCode::Up).unwrap();
        press(&mut app, "+");

        let map = app.frontend().map.as_ref().unwrap();
        assert!(map.center.lat > HOME.lat);
        assert_eq!(map.zoom, 14);
    }

    #[test]
    fn without_home_the_list_still_works() {
        let mut app = app_with(MemoryStorage::new("workouts"), None);
        assert_eq!(app.focus, Focus::List);
        press(&mut app, "\t");
        assert_eq!(app.focus, Focus::List);

        press(&mut app, "d");
        assert_eq!(app.frontend().status.as_ref().unwrap().text, "No workout selected.");
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with(MemoryStorage::new("workouts"), Some(HOME));
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_ctrl(KeyCode::Char('c')).unwrap());
    }

    #[test]
    fn osm_link_points_at_coordinates() {
        assert_eq!(
            osm_url(HOME, 13),
            "https://www.openstreetmap.org/?mlat=40.00000&mlon=-3.00000#map=13/40.00000/-3.00000"
        );
    }
}
