use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::WorkoutKind;
use crate::view::{ListEntry, NoticeLevel};

/// Accent colour for each workout kind, shared by the list and the map.
pub(crate) fn kind_color(kind: WorkoutKind) -> Color {
    match kind {
        WorkoutKind::Running => Color::Green,
        WorkoutKind::Cycling => Color::LightRed,
    }
}

pub(crate) fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => Style::default().fg(Color::Green),
        NoticeLevel::Error => Style::default().fg(Color::Red),
    }
}

/// Two-line card for a workout: the title, then the stat cells.
pub(crate) fn entry_lines(entry: &ListEntry, selected: bool) -> Vec<Line<'static>> {
    let mut title_style = Style::default().fg(kind_color(entry.kind));
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }

    let mut cells = Vec::with_capacity(8);
    for (icon, value, unit) in entry.details() {
        if !cells.is_empty() {
            cells.push(Span::raw("  "));
        }
        cells.push(Span::raw(format!("{icon} {value} {unit}")));
    }

    vec![
        Line::from(Span::styled(entry.title.clone(), title_style)),
        Line::from(cells),
    ]
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
