use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::WorkoutKind;
use crate::view::{FormMode, FormValues};

/// Text buffers behind the workout form.
#[derive(Clone, Debug)]
pub(crate) struct WorkoutForm {
    pub(crate) mode: FormMode,
    pub(crate) kind: WorkoutKind,
    pub(crate) distance: String,
    pub(crate) duration: String,
    pub(crate) metric: String,
    pub(crate) active: FormField,
    pub(crate) kind_locked: bool,
}

/// Fields available within the workout form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum FormField {
    Kind,
    #[default]
    Distance,
    Duration,
    Metric,
}

impl WorkoutForm {
    /// Seed the buffers from controller values. Zero means "not entered yet".
    pub(crate) fn new(mode: FormMode, values: FormValues) -> Self {
        Self {
            mode,
            kind: values.kind,
            distance: number_text(values.distance_km),
            duration: number_text(values.duration_min),
            metric: number_text(values.metric),
            active: FormField::default(),
            kind_locked: false,
        }
    }

    pub(crate) fn title(&self) -> String {
        match &self.mode {
            FormMode::Create { at } => format!("New workout at {at}"),
            FormMode::Edit { kind, .. } => format!("Edit {} workout", kind.label().to_lowercase()),
        }
    }

    /// Move focus to the next field.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            FormField::Kind => FormField::Distance,
            FormField::Distance => FormField::Duration,
            FormField::Duration => FormField::Metric,
            FormField::Metric => FormField::Kind,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            FormField::Kind => FormField::Metric,
            FormField::Distance => FormField::Kind,
            FormField::Duration => FormField::Distance,
            FormField::Metric => FormField::Duration,
        };
    }

    /// Switch between running and cycling unless an edit pinned the kind.
    pub(crate) fn toggle_kind(&mut self) -> bool {
        if self.kind_locked {
            return false;
        }
        self.kind = self.kind.toggled();
        true
    }

    /// Append a character to the active field. Numeric fields take digits and
    /// a decimal point; a space on the kind field flips the kind.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let buffer = match self.active {
            FormField::Kind => return ch == ' ' && self.toggle_kind(),
            FormField::Distance => &mut self.distance,
            FormField::Duration => &mut self.duration,
            FormField::Metric => &mut self.metric,
        };
        if ch.is_ascii_digit() || (ch == '.' && !buffer.contains('.')) {
            buffer.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) -> bool {
        let buffer = match self.active {
            FormField::Kind => return false,
            FormField::Distance => &mut self.distance,
            FormField::Duration => &mut self.duration,
            FormField::Metric => &mut self.metric,
        };
        buffer.pop().is_some()
    }

    /// Current values for the controller. Blank reads as zero and junk as NaN,
    /// so both fail validation there.
    pub(crate) fn values(&self) -> FormValues {
        FormValues::new(
            self.kind,
            parse_number(&self.distance),
            parse_number(&self.duration),
            parse_number(&self.metric),
        )
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let is_active = self.active == field;
        let (name, value) = match field {
            FormField::Kind => {
                let suffix = if self.kind_locked { " (locked)" } else { " ◂▸" };
                ("Type", format!("{} {}{suffix}", self.kind.icon(), self.kind.label()))
            }
            FormField::Distance => ("Distance (km)", self.distance.clone()),
            FormField::Duration => ("Duration (min)", self.duration.clone()),
            FormField::Metric => (self.metric_label(), self.metric.clone()),
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field == FormField::Kind && self.kind_locked {
            Style::default().add_modifier(Modifier::DIM)
        } else if display == "<required>" {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active field.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        let (prefix, value, row) = match self.active {
            FormField::Kind => return None,
            FormField::Distance => ("Distance (km): ".len(), &self.distance, 1),
            FormField::Duration => ("Duration (min): ".len(), &self.duration, 2),
            FormField::Metric => (self.metric_label().len() + 2, &self.metric, 3),
        };
        Some(((prefix + value.chars().count()) as u16, row))
    }

    fn metric_label(&self) -> &'static str {
        match self.kind {
            WorkoutKind::Running => "Cadence (spm)",
            WorkoutKind::Cycling => "Elev Gain (m)",
        }
    }
}

fn number_text(value: f64) -> String {
    if value.is_finite() && value > 0.0 {
        value.to_string()
    } else {
        String::new()
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{validate_measurements, Coordinates};

    fn create_form() -> WorkoutForm {
        WorkoutForm::new(
            FormMode::Create {
                at: Coordinates::new(40.0, -3.0),
            },
            FormValues::default(),
        )
    }

    fn type_text(form: &mut WorkoutForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn typing_fills_numeric_fields() {
        let mut form = create_form();
        assert_eq!(form.distance, "");

        type_text(&mut form, "5.2a.");
        form.toggle_field();
        type_text(&mut form, "24");
        form.toggle_field();
        type_text(&mut form, "178");

        assert_eq!(
            form.values(),
            FormValues::new(WorkoutKind::Running, 5.2, 24.0, 178.0)
        );
    }

    #[test]
    fn blank_and_junk_fail_validation() {
        let mut form = create_form();
        let values = form.values();
        assert_eq!(values.distance_km, 0.0);
        assert!(
            validate_measurements(values.distance_km, values.duration_min, values.metric).is_err()
        );

        form.distance = ".".to_string();
        assert!(form.values().distance_km.is_nan());
    }

    #[test]
    fn locked_kind_cannot_toggle() {
        let mut form = create_form();
        form.active = FormField::Kind;
        assert!(form.push_char(' '));
        assert_eq!(form.kind, WorkoutKind::Cycling);

        form.kind_locked = true;
        assert!(!form.toggle_kind());
        assert!(!form.push_char(' '));
        assert_eq!(form.kind, WorkoutKind::Cycling);
    }

    #[test]
    fn edit_form_starts_from_record_values() {
        let form = WorkoutForm::new(
            FormMode::Edit {
                id: "1".into(),
                kind: WorkoutKind::Cycling,
            },
            FormValues::new(WorkoutKind::Cycling, 27.0, 95.0, 523.0),
        );

        assert_eq!(form.distance, "27");
        assert_eq!(form.metric, "523");
        assert_eq!(form.title(), "Edit cycling workout");
    }

    #[test]
    fn backspace_edits_active_field_only() {
        let mut form = create_form();
        type_text(&mut form, "12");
        assert!(form.backspace());
        assert_eq!(form.distance, "1");

        form.active = FormField::Kind;
        assert!(!form.backspace());
    }
}
