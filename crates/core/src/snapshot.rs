//! The immutable dataset snapshot and its atomically-swapped store.
//!
//! A snapshot bundles everything one recommendation computation reads: the
//! doctor roster, the full rating table, and the patient condition matrix.
//! The refresher builds a new bundle off to the side and publishes it in one
//! pointer swap, so an in-flight request keeps the `Arc` it took at the start
//! and never observes a half-replaced dataset.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::doctor::Doctor;
use crate::domain::history::ConditionMatrix;
use crate::domain::rating::Rating;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub doctors: Vec<Doctor>,
    pub ratings: Vec<Rating>,
    pub history: ConditionMatrix,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The generation-0 snapshot the store starts with before the first
    /// successful refresh. Serves empty recommendations rather than failing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(doctors: Vec<Doctor>, ratings: Vec<Rating>, history: ConditionMatrix) -> Self {
        Self { generation: 0, doctors, ratings, history, fetched_at: Some(Utc::now()) }
    }
}

/// Holds the current snapshot behind `RwLock<Arc<..>>`.
///
/// Both lock paths are held only long enough to clone or swap the `Arc`;
/// neither the refresher's I/O nor a request's scoring work ever runs under
/// the lock, so readers and the single writer cannot serialize on each other.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self { current: RwLock::new(Arc::new(Snapshot::empty())) }
    }

    /// The latest published snapshot. Callers hold the returned `Arc` for
    /// the whole computation instead of calling this again mid-request.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.read().expect("snapshot lock poisoned").clone()
    }

    /// Publish a new snapshot, stamping it with the next generation number.
    /// Returns the generation it was published as.
    pub fn publish(&self, mut snapshot: Snapshot) -> u64 {
        let mut current = self.current.write().expect("snapshot lock poisoned");
        snapshot.generation = current.generation + 1;
        let generation = snapshot.generation;
        *current = Arc::new(snapshot);
        generation
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::doctor::{Doctor, DoctorId};
    use crate::domain::history::{ConditionMatrix, ConditionVocabulary};

    use super::*;

    fn doctor(name: &str) -> Doctor {
        Doctor {
            id: DoctorId(Uuid::new_v4()),
            full_name: name.to_string(),
            experience_years: 10,
            latitude: 30.0,
            longitude: 31.0,
            rating: 4.0,
            review_count: 12,
        }
    }

    #[test]
    fn store_starts_on_the_empty_generation_zero_snapshot() {
        let store = SnapshotStore::new();
        let snapshot = store.current();

        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.doctors.is_empty());
        assert!(snapshot.fetched_at.is_none());
    }

    #[test]
    fn publish_stamps_monotonically_increasing_generations() {
        let store = SnapshotStore::new();
        let matrix = ConditionMatrix::new(ConditionVocabulary::default());

        let first = store.publish(Snapshot::new(vec![doctor("Dr. A")], vec![], matrix.clone()));
        let second = store.publish(Snapshot::new(vec![doctor("Dr. B")], vec![], matrix));

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.current().generation, 2);
    }

    #[test]
    fn a_snapshot_taken_before_a_publish_is_unaffected_by_it() {
        let store = SnapshotStore::new();
        let matrix = ConditionMatrix::new(ConditionVocabulary::default());
        store.publish(Snapshot::new(vec![doctor("Dr. Old")], vec![], matrix.clone()));

        let in_flight = store.current();
        store.publish(Snapshot::new(vec![doctor("Dr. New")], vec![], matrix));

        // The in-flight computation still sees the roster it started with.
        assert_eq!(in_flight.generation, 1);
        assert_eq!(in_flight.doctors[0].full_name, "Dr. Old");
        assert_eq!(store.current().doctors[0].full_name, "Dr. New");
    }
}
