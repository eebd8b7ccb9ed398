//! In-memory workout collection. Records keep their insertion order for
//! rendering, with an id index on the side for lookups.

use std::collections::HashMap;

use crate::error::TrackerError;
use crate::models::{WorkoutId, WorkoutRecord};

/// Ordered collection of workouts. Ids, never coordinates, identify records:
/// two workouts logged at the same spot stay distinct.
#[derive(Debug, Clone, Default)]
pub struct WorkoutStore {
    records: Vec<WorkoutRecord>,
    index: HashMap<WorkoutId, usize>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already ordered records, rejecting duplicate ids.
    pub fn from_records<I>(records: I) -> Result<Self, TrackerError>
    where
        I: IntoIterator<Item = WorkoutRecord>,
    {
        let mut store = Self::new();
        for record in records {
            store.add(record)?;
        }
        Ok(store)
    }

    /// Append a record. A duplicate id means two views disagree about identity,
    /// which callers treat as a bug rather than user error.
    pub fn add(&mut self, record: WorkoutRecord) -> Result<(), TrackerError> {
        if self.index.contains_key(record.id()) {
            return Err(TrackerError::DuplicateId(record.id().clone()));
        }
        self.index.insert(record.id().clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Remove and return a record. Positions after it shift down by one, so
    /// the index is patched to keep pointing at the right slots.
    pub fn remove(&mut self, id: &WorkoutId) -> Result<WorkoutRecord, TrackerError> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        let record = self.records.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Ok(record)
    }

    /// Look a record up by id. A miss means a view is out of sync with the
    /// store and is reported as `NotFound` instead of being ignored.
    pub fn find(&self, id: &WorkoutId) -> Result<&WorkoutRecord, TrackerError> {
        self.index
            .get(id)
            .map(|&position| &self.records[position])
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }

    pub fn find_mut(&mut self, id: &WorkoutId) -> Result<&mut WorkoutRecord, TrackerError> {
        match self.index.get(id) {
            Some(&position) => Ok(&mut self.records[position]),
            None => Err(TrackerError::NotFound(id.clone())),
        }
    }

    pub fn contains(&self, id: &WorkoutId) -> bool {
        self.index.contains_key(id)
    }

    /// Records in insertion order. Each call starts a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = &WorkoutRecord> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empty the store, handing back the removed records so their list
    /// entries and markers can be torn down too.
    pub fn clear(&mut self) -> Vec<WorkoutRecord> {
        self.index.clear();
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, WorkoutKind};

    fn run(distance: f64) -> WorkoutRecord {
        WorkoutRecord::create(
            WorkoutKind::Running,
            Coordinates::new(40.0, -3.0),
            distance,
            25.0,
            180.0,
        )
        .unwrap()
    }

    #[test]
    fn remove_then_find_reports_not_found() {
        let mut store = WorkoutStore::new();
        let record = run(5.0);
        let id = record.id().clone();
        store.add(record).unwrap();

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.id(), &id);
        assert!(matches!(store.find(&id), Err(TrackerError::NotFound(_))));
        assert!(matches!(store.remove(&id), Err(TrackerError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn keeps_insertion_order_across_removals() {
        let mut store = WorkoutStore::new();
        let records: Vec<_> = (1..=4).map(|n| run(n as f64)).collect();
        let ids: Vec<_> = records.iter().map(|r| r.id().clone()).collect();
        for record in records {
            store.add(record).unwrap();
        }

        store.remove(&ids[1]).unwrap();

        let order: Vec<_> = store.all().map(|r| r.id().clone()).collect();
        assert_eq!(order, vec![ids[0].clone(), ids[2].clone(), ids[3].clone()]);
        assert_eq!(store.find(&ids[3]).unwrap().distance_km(), 4.0);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut store = WorkoutStore::new();
        let record = run(5.0);
        store.add(record.clone()).unwrap();

        assert!(matches!(store.add(record), Err(TrackerError::DuplicateId(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shared_coordinates_do_not_confuse_removal() {
        let mut store = WorkoutStore::new();
        let first = run(5.0);
        let second = run(6.0);
        let second_id = second.id().clone();
        store.add(first).unwrap();
        store.add(second).unwrap();

        store.remove(&second_id).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all().next().unwrap().distance_km(), 5.0);
    }
}
