//! Content similarity between a patient's conditions and doctor profiles.

use std::collections::HashMap;

use crate::domain::doctor::{Doctor, DoctorId};

/// Cosine similarity with the convention that either zero-magnitude operand
/// yields exactly 0.0 rather than NaN. Covers patients with no history and
/// doctors with the all-zero profile.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Similarity of the patient vector against each doctor's profile, aligned
/// to roster iteration order. Doctors missing from the profile map (which
/// only happens if the caller built profiles for a different roster) score 0.
pub fn profile_similarities(
    patient_vector: &[f64],
    doctors: &[Doctor],
    profiles: &HashMap<DoctorId, Vec<f64>>,
) -> Vec<f64> {
    doctors
        .iter()
        .map(|doctor| {
            profiles
                .get(&doctor.id)
                .map(|profile| cosine_similarity(patient_vector, profile))
                .unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![1.0, 0.0, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_exactly_zero_not_nan() {
        let zero = vec![0.0, 0.0, 0.0];
        let some = vec![1.0, 1.0, 0.0];

        let left = cosine_similarity(&zero, &some);
        let right = cosine_similarity(&some, &zero);
        let both = cosine_similarity(&zero, &zero);

        assert_eq!(left, 0.0);
        assert_eq!(right, 0.0);
        assert_eq!(both, 0.0);
        assert!(!left.is_nan() && !right.is_nan() && !both.is_nan());
    }

    #[test]
    fn partial_overlap_matches_the_closed_form() {
        // dot = 1, |a| = sqrt(2), |b| = 1
        let got = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((got - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
