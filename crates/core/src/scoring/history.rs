//! Condition-vector encoding for a single patient.

use crate::domain::history::ConditionMatrix;
use crate::domain::rating::PatientId;

/// The patient's binary condition row, or the zero vector sized to the
/// current vocabulary when the patient has no recorded history. An empty
/// vocabulary yields the empty vector.
pub fn condition_vector(patient_id: &PatientId, matrix: &ConditionMatrix) -> Vec<f64> {
    match matrix.row(patient_id) {
        Some(row) => row.to_vec(),
        None => vec![0.0; matrix.vocabulary().len()],
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::history::{ConditionMatrix, ConditionVocabulary};

    use super::*;

    fn vocabulary(names: &[&str]) -> ConditionVocabulary {
        ConditionVocabulary::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn known_patient_gets_their_recorded_row() {
        let mut matrix = ConditionMatrix::new(vocabulary(&["asthma", "diabetes", "migraine"]));
        let patient = PatientId(Uuid::new_v4());
        matrix.mark(patient, "asthma");
        matrix.mark(patient, "migraine");

        assert_eq!(condition_vector(&patient, &matrix), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn patient_without_history_gets_the_zero_vector() {
        let matrix = ConditionMatrix::new(vocabulary(&["asthma", "diabetes"]));
        let unknown = PatientId(Uuid::new_v4());

        assert_eq!(condition_vector(&unknown, &matrix), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_vocabulary_yields_the_empty_vector() {
        let matrix = ConditionMatrix::new(ConditionVocabulary::default());
        let patient = PatientId(Uuid::new_v4());

        assert!(condition_vector(&patient, &matrix).is_empty());
    }
}
