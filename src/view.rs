//! Plain data handed from the controller to whatever renders it.

use crate::models::{Coordinates, WorkoutId, WorkoutKind, WorkoutRecord};

/// Current contents of the workout form. Unparseable text arrives as NaN and
/// fails validation like any other bad number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormValues {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub metric: f64,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance_km: 0.0,
            duration_min: 0.0,
            metric: 0.0,
        }
    }
}

impl FormValues {
    pub fn new(kind: WorkoutKind, distance_km: f64, duration_min: f64, metric: f64) -> Self {
        Self {
            kind,
            distance_km,
            duration_min,
            metric,
        }
    }

    pub fn from_record(record: &WorkoutRecord) -> Self {
        Self {
            kind: record.kind(),
            distance_km: record.distance_km(),
            duration_min: record.duration_min(),
            metric: record.metric().value(),
        }
    }
}

/// What the form is being shown for.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create { at: Coordinates },
    Edit { id: WorkoutId, kind: WorkoutKind },
}

/// One row of the workout list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub coordinates: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    pub derived: f64,
    pub metric: f64,
}

impl ListEntry {
    pub fn from_record(record: &WorkoutRecord) -> Self {
        Self {
            id: record.id().clone(),
            kind: record.kind(),
            title: record.description().to_string(),
            coordinates: record.coordinates(),
            distance_km: record.distance_km(),
            duration_min: record.duration_min(),
            derived: record.derived().value(),
            metric: record.metric().value(),
        }
    }

    /// `(icon, value, unit)` cells in display order.
    pub fn details(&self) -> [(&'static str, String, &'static str); 4] {
        let metric_icon = match self.kind {
            WorkoutKind::Running => "🦶",
            WorkoutKind::Cycling => "⛰",
        };
        [
            (self.kind.icon(), self.distance_km.to_string(), "km"),
            ("⏱", self.duration_min.to_string(), "min"),
            ("⚡", format!("{:.1}", self.derived), self.kind.derived_unit()),
            (metric_icon, self.metric.to_string(), self.kind.metric_unit()),
        ]
    }
}

pub fn marker_popup(record: &WorkoutRecord) -> String {
    format!("{} {}", record.kind().icon(), record.description())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info<S: Into<String>>(text: S) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error<S: Into<String>>(text: S) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
