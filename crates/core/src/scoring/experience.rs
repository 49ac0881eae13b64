//! Experience normalization over the current doctor pool.

use crate::domain::doctor::Doctor;

/// Min-max scale each doctor's experience years against the pool being
/// ranked right now, aligned to roster order. When every doctor has the same
/// experience (including the single-doctor pool) the range is zero and
/// everyone scores 1.0 instead of dividing by it. An empty pool yields an
/// empty vector.
pub fn experience_scores(doctors: &[Doctor]) -> Vec<f64> {
    let Some(min) = doctors.iter().map(|doctor| doctor.experience_years).min() else {
        return Vec::new();
    };
    let max = doctors.iter().map(|doctor| doctor.experience_years).max().unwrap_or(min);

    if min == max {
        return vec![1.0; doctors.len()];
    }

    let range = (max - min) as f64;
    doctors
        .iter()
        .map(|doctor| (doctor.experience_years - min) as f64 / range)
        .collect()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::doctor::DoctorId;

    use super::*;

    fn doctor_with_experience(years: u32) -> Doctor {
        Doctor {
            id: DoctorId(Uuid::new_v4()),
            full_name: format!("Dr. {years}y"),
            experience_years: years,
            latitude: 0.0,
            longitude: 0.0,
            rating: 4.0,
            review_count: 1,
        }
    }

    #[test]
    fn scales_between_pool_min_and_max() {
        let doctors =
            vec![doctor_with_experience(5), doctor_with_experience(10), doctor_with_experience(20)];

        let scores = experience_scores(&doctors);

        assert_eq!(scores, vec![0.0, 1.0 / 3.0, 1.0]);
    }

    #[test]
    fn identical_experience_scores_everyone_one() {
        let doctors = vec![doctor_with_experience(7), doctor_with_experience(7)];
        assert_eq!(experience_scores(&doctors), vec![1.0, 1.0]);
    }

    #[test]
    fn single_doctor_scores_one() {
        assert_eq!(experience_scores(&[doctor_with_experience(3)]), vec![1.0]);
    }

    #[test]
    fn empty_pool_yields_empty_scores() {
        assert!(experience_scores(&[]).is_empty());
    }
}
