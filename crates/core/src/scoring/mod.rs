//! The scoring pipeline: per-signal modules plus the weighted aggregation.
//!
//! Each doctor's four signals travel together as fields of one
//! [`DoctorSignals`] record rather than as parallel positional arrays, so a
//! stage reordering its output cannot silently misalign the others.

use std::cmp::Ordering;

use crate::domain::doctor::Doctor;

pub mod experience;
pub mod geo;
pub mod history;
pub mod profile;
pub mod similarity;

/// Aggregation weights. Fixed constants of the ranking semantics: changing
/// them changes what the service recommends and must be a deliberate
/// versioned change, so they are not exposed through configuration.
pub const SIMILARITY_WEIGHT: f64 = 0.35;
pub const PROXIMITY_WEIGHT: f64 = 0.20;
pub const RATING_WEIGHT: f64 = 0.35;
pub const EXPERIENCE_WEIGHT: f64 = 0.10;

/// One doctor's scoring inputs for a single request, in roster order.
#[derive(Clone, Debug, PartialEq)]
pub struct DoctorSignals {
    pub doctor: Doctor,
    pub distance_km: f64,
    pub similarity: f64,
    pub proximity: f64,
    pub predicted_rating: f64,
    pub experience: f64,
}

impl DoctorSignals {
    /// Weighted linear combination of the four signals. Predicted ratings
    /// stay on the [1,5] scale, so composite scores can legitimately exceed
    /// 1.0.
    pub fn composite_score(&self) -> f64 {
        self.similarity * SIMILARITY_WEIGHT
            + self.proximity * PROXIMITY_WEIGHT
            + self.predicted_rating * RATING_WEIGHT
            + self.experience * EXPERIENCE_WEIGHT
    }
}

/// Sort descending by composite score. The sort is stable, so doctors with
/// identical scores keep their roster order and repeated requests against
/// one snapshot return identical rankings.
pub fn rank(mut signals: Vec<DoctorSignals>) -> Vec<DoctorSignals> {
    signals.sort_by(|a, b| {
        b.composite_score().partial_cmp(&a.composite_score()).unwrap_or(Ordering::Equal)
    });
    signals
}
