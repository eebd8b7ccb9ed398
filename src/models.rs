//! Domain models for recorded workouts. A record carries its raw measurements
//! plus the metric derived from them; the derived metric and the description
//! are never set directly, only recomputed from the other fields.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Highest id handed out by this process. Ids are millisecond timestamps, bumped
/// forward when two workouts are created within the same millisecond.
static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// Opaque identifier shared by a record, its list entry and its map marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Issue a fresh id derived from `now`. Never returns the same id twice
    /// within one process.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        let previous = LAST_ISSUED_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(millis.max(last + 1)))
            .unwrap_or_else(|previous| previous);
        Self(millis.max(previous + 1).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A `[lat, lng]` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Cycling => "🚴",
        }
    }

    /// Name of the kind-specific form field.
    pub fn metric_name(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Cadence",
            WorkoutKind::Cycling => "Elev Gain",
        }
    }

    pub fn metric_unit(self) -> &'static str {
        match self {
            WorkoutKind::Running => "spm",
            WorkoutKind::Cycling => "m",
        }
    }

    pub fn derived_unit(self) -> &'static str {
        match self {
            WorkoutKind::Running => "min/km",
            WorkoutKind::Cycling => "km/h",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            WorkoutKind::Running => WorkoutKind::Cycling,
            WorkoutKind::Cycling => WorkoutKind::Running,
        }
    }
}

/// The measurement only one kind of workout carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindMetric {
    Running { cadence_spm: f64 },
    Cycling { elevation_gain_m: f64 },
}

impl KindMetric {
    pub fn new(kind: WorkoutKind, value: f64) -> Self {
        match kind {
            WorkoutKind::Running => KindMetric::Running { cadence_spm: value },
            WorkoutKind::Cycling => KindMetric::Cycling {
                elevation_gain_m: value,
            },
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            KindMetric::Running { .. } => WorkoutKind::Running,
            KindMetric::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            KindMetric::Running { cadence_spm } => cadence_spm,
            KindMetric::Cycling { elevation_gain_m } => elevation_gain_m,
        }
    }
}

/// Metric computed from distance and duration, chosen by workout kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derived {
    Pace { min_per_km: f64 },
    Speed { km_per_h: f64 },
}

impl Derived {
    fn compute(kind: WorkoutKind, distance_km: f64, duration_min: f64) -> Self {
        match kind {
            WorkoutKind::Running => Derived::Pace {
                min_per_km: duration_min / distance_km,
            },
            WorkoutKind::Cycling => Derived::Speed {
                km_per_h: distance_km / (duration_min / 60.0),
            },
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Derived::Pace { min_per_km } => min_per_km,
            Derived::Speed { km_per_h } => km_per_h,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    metric: KindMetric,
    derived: Derived,
    description: String,
    interaction_count: u32,
}

impl WorkoutRecord {
    /// Build a brand new record stamped with the current time and a fresh id.
    pub fn create(
        kind: WorkoutKind,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        metric_value: f64,
    ) -> Result<Self, TrackerError> {
        let now = Utc::now();
        Self::rehydrate(
            WorkoutId::generate(now),
            now,
            kind,
            coordinates,
            distance_km,
            duration_min,
            metric_value,
        )
    }

    /// Rebuild a record that already has an identity, e.g. one read back from
    /// storage. Runs the same validation as [`WorkoutRecord::create`].
    pub fn rehydrate(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        kind: WorkoutKind,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        metric_value: f64,
    ) -> Result<Self, TrackerError> {
        validate_measurements(distance_km, duration_min, metric_value)?;
        ensure_finite("latitude", coordinates.lat)?;
        ensure_finite("longitude", coordinates.lng)?;

        let mut record = Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            metric: KindMetric::new(kind, metric_value),
            derived: Derived::compute(kind, distance_km, duration_min),
            description: String::new(),
            interaction_count: 0,
        };
        record.recompute_derived();
        Ok(record)
    }

    /// Refresh the derived metric and the description from the current fields.
    pub fn recompute_derived(&mut self) {
        let kind = self.kind();
        self.derived = Derived::compute(kind, self.distance_km, self.duration_min);
        self.description = describe(kind, self.created_at);
    }

    /// Apply an edit. The kind is fixed for the lifetime of the record, so the
    /// new metric value is read in the record's own unit.
    pub fn update_measurements(
        &mut self,
        distance_km: f64,
        duration_min: f64,
        metric_value: f64,
    ) -> Result<(), TrackerError> {
        validate_measurements(distance_km, duration_min, metric_value)?;
        self.distance_km = distance_km;
        self.duration_min = duration_min;
        self.metric = KindMetric::new(self.kind(), metric_value);
        self.recompute_derived();
        Ok(())
    }

    /// Count one more focus of this workout on the map.
    pub fn touch(&mut self) {
        self.interaction_count = self.interaction_count.saturating_add(1);
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> WorkoutKind {
        self.metric.kind()
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn metric(&self) -> KindMetric {
        self.metric
    }

    pub fn derived(&self) -> Derived {
        self.derived
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.derived {
            Derived::Pace { min_per_km } => Some(min_per_km),
            Derived::Speed { .. } => None,
        }
    }

    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.derived {
            Derived::Speed { km_per_h } => Some(km_per_h),
            Derived::Pace { .. } => None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }
}

/// Shared numeric check for create, edit and decode.
pub fn validate_measurements(
    distance_km: f64,
    duration_min: f64,
    metric_value: f64,
) -> Result<(), TrackerError> {
    ensure_positive("distance", distance_km)?;
    ensure_positive("duration", duration_min)?;
    ensure_positive("kind metric", metric_value)?;
    Ok(())
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), TrackerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::InvalidInput { field, value })
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), TrackerError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TrackerError::InvalidInput { field, value })
    }
}

/// `"Running on April 14"`, using the local calendar day of `created_at`.
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!(
        "{} on {}",
        kind.label(),
        created_at.with_timezone(&Local).format("%B %-d")
    )
}
