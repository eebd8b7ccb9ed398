//! JSON encoding of the workout list as stored under the local storage key.
//!
//! Only identity and raw measurements are written. Derived metrics and the
//! description are recomputed on load, and interaction counts start over at
//! zero for every session.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::models::{Coordinates, WorkoutId, WorkoutKind, WorkoutRecord};
use crate::store::WorkoutStore;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    kind: WorkoutKind,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    kind_specific_value: f64,
}

impl From<&WorkoutRecord> for StoredWorkout {
    fn from(record: &WorkoutRecord) -> Self {
        Self {
            id: record.id().clone(),
            created_at: record.created_at(),
            kind: record.kind(),
            coordinates: record.coordinates(),
            distance_km: record.distance_km(),
            duration_min: record.duration_min(),
            kind_specific_value: record.metric().value(),
        }
    }
}

/// Layout written by the browser version of the tracker, which serialized its
/// workout objects wholesale.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyWorkout {
    id: WorkoutId,
    date: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: WorkoutKind,
    coords: Coordinates,
    distance: f64,
    duration: f64,
    cadence: Option<f64>,
    elevation_gane: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Current(StoredWorkout),
    Legacy(LegacyWorkout),
}

impl StoredEntry {
    fn into_record(self) -> Result<WorkoutRecord, TrackerError> {
        match self {
            StoredEntry::Current(stored) => WorkoutRecord::rehydrate(
                stored.id,
                stored.created_at,
                stored.kind,
                stored.coordinates,
                stored.distance_km,
                stored.duration_min,
                stored.kind_specific_value,
            ),
            StoredEntry::Legacy(legacy) => {
                let metric = match legacy.kind {
                    WorkoutKind::Running => legacy.cadence,
                    WorkoutKind::Cycling => legacy.elevation_gane,
                }
                .ok_or_else(|| {
                    TrackerError::corrupt(format!(
                        "{} workout {} has no {}",
                        legacy.kind.label(),
                        legacy.id,
                        legacy.kind.metric_name().to_lowercase()
                    ))
                })?;
                WorkoutRecord::rehydrate(
                    legacy.id,
                    legacy.date,
                    legacy.kind,
                    legacy.coords,
                    legacy.distance,
                    legacy.duration,
                    metric,
                )
            }
        }
    }
}

pub fn encode(store: &WorkoutStore) -> Result<String, TrackerError> {
    let stored: Vec<StoredWorkout> = store.all().map(StoredWorkout::from).collect();
    Ok(serde_json::to_string(&stored)?)
}

/// Decode every record or none of them. A single invalid record rejects the
/// whole blob.
pub fn decode(blob: &str) -> Result<Vec<WorkoutRecord>, TrackerError> {
    if blob.trim().is_empty() {
        return Err(TrackerError::corrupt("blob is empty"));
    }

    let entries: Vec<StoredEntry> =
        serde_json::from_str(blob).map_err(|err| TrackerError::corrupt(err.to_string()))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut records = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        let record = entry.into_record().map_err(|err| match err {
            TrackerError::CorruptData(reason) => TrackerError::CorruptData(reason),
            other => TrackerError::corrupt(format!("record {position}: {other}")),
        })?;
        if !seen.insert(record.id().clone()) {
            return Err(TrackerError::corrupt(format!(
                "record {position}: duplicate id {}",
                record.id()
            )));
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_store() -> WorkoutStore {
        let run = WorkoutRecord::create(
            WorkoutKind::Running,
            Coordinates::new(40.0, -3.0),
            5.0,
            25.0,
            180.0,
        )
        .unwrap();
        let ride = WorkoutRecord::rehydrate(
            WorkoutId::from("0000000042"),
            Utc.with_ymd_and_hms(2023, 11, 2, 8, 30, 0).unwrap(),
            WorkoutKind::Cycling,
            Coordinates::new(39.5, -12.25),
            27.0,
            95.0,
            523.0,
        )
        .unwrap();
        WorkoutStore::from_records([run, ride]).unwrap()
    }

    #[test]
    fn round_trip_preserves_records_in_order() {
        let mut store = sample_store();
        let first_id = store.all().next().unwrap().id().clone();
        store.find_mut(&first_id).unwrap().touch();

        let blob = encode(&store).unwrap();
        let decoded = decode(&blob).unwrap();

        assert_eq!(decoded.len(), store.len());
        for (original, restored) in store.all().zip(&decoded) {
            assert_eq!(restored.id(), original.id());
            assert_eq!(restored.created_at(), original.created_at());
            assert_eq!(restored.kind(), original.kind());
            assert_eq!(restored.coordinates(), original.coordinates());
            assert_eq!(restored.distance_km(), original.distance_km());
            assert_eq!(restored.duration_min(), original.duration_min());
            assert_eq!(restored.metric(), original.metric());
            assert_eq!(restored.derived(), original.derived());
            assert_eq!(restored.description(), original.description());
            assert_eq!(restored.interaction_count(), 0);
        }
    }

    #[test]
    fn encoded_layout_uses_flat_fields() {
        let blob = encode(&sample_store()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        let ride = &value[1];

        assert_eq!(ride["id"], "0000000042");
        assert_eq!(ride["kind"], "cycling");
        assert_eq!(ride["coordinates"], serde_json::json!([39.5, -12.25]));
        assert_eq!(ride["kindSpecificValue"], 523.0);
        assert!(ride.get("speed").is_none());
        assert!(ride.get("description").is_none());
    }

    #[test]
    fn missing_distance_is_corrupt() {
        let blob = r#"[{"id":"1","createdAt":"2024-04-14T10:00:00Z","kind":"running",
            "coordinates":[40,-3],"durationMin":25,"kindSpecificValue":180}]"#;
        assert!(matches!(decode(blob), Err(TrackerError::CorruptData(_))));
    }

    #[test]
    fn one_invalid_record_rejects_the_whole_blob() {
        let blob = r#"[
            {"id":"1","createdAt":"2024-04-14T10:00:00Z","kind":"running",
             "coordinates":[40,-3],"distanceKm":5,"durationMin":25,"kindSpecificValue":180},
            {"id":"2","createdAt":"2024-04-15T10:00:00Z","kind":"cycling",
             "coordinates":[40,-3],"distanceKm":-20,"durationMin":60,"kindSpecificValue":300}
        ]"#;
        let err = decode(blob).unwrap_err();
        match err {
            TrackerError::CorruptData(reason) => assert!(reason.contains("record 1"), "{reason}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_and_empty_blobs_are_corrupt() {
        for blob in ["", "   ", "null", "{", "{\"workouts\":[]}", "[1,2,3]"] {
            assert!(
                matches!(decode(blob), Err(TrackerError::CorruptData(_))),
                "blob {blob:?} should be rejected"
            );
        }
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let blob = r#"[
            {"id":"7","createdAt":"2024-04-14T10:00:00Z","kind":"running",
             "coordinates":[40,-3],"distanceKm":5,"durationMin":25,"kindSpecificValue":180},
            {"id":"7","createdAt":"2024-04-14T10:00:00Z","kind":"running",
             "coordinates":[41,-3],"distanceKm":6,"durationMin":30,"kindSpecificValue":175}
        ]"#;
        assert!(matches!(decode(blob), Err(TrackerError::CorruptData(_))));
    }

    #[test]
    fn reads_browser_layout() {
        let blob = r#"[
            {"date":"2024-04-14T10:00:00.000Z","id":"3096000123","clicks":4,
             "coords":[39,-12],"distance":5.2,"duration":24,"type":"running",
             "cadence":178,"pace":4.615,"description":"Running on April 14"},
            {"date":"2024-04-15T10:00:00.000Z","id":"3182400456","clicks":0,
             "coords":[39,-12],"distance":27,"duration":95,"type":"cycling",
             "elevationGane":523,"speed":17.05,"description":"Cycling on April 15"}
        ]"#;
        let records = decode(blob).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().as_str(), "3096000123");
        assert_eq!(records[0].metric().value(), 178.0);
        assert_eq!(records[0].interaction_count(), 0);
        assert_eq!(records[1].kind(), WorkoutKind::Cycling);
        assert_eq!(records[1].metric().value(), 523.0);
        assert_eq!(records[1].coordinates(), Coordinates::new(39.0, -12.0));
    }

    #[test]
    fn browser_layout_without_kind_metric_is_corrupt() {
        let blob = r#"[{"date":"2024-04-14T10:00:00.000Z","id":"1","coords":[39,-12],
            "distance":5.2,"duration":24,"type":"running","elevationGane":10}]"#;
        assert!(matches!(decode(blob), Err(TrackerError::CorruptData(_))));
    }
}
