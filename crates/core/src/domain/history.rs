use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::rating::PatientId;

/// The ordered, de-duplicated set of known condition names.
///
/// Position in the vocabulary is what gives condition vectors their meaning,
/// so the order must not change within a snapshot. The store loads it with a
/// deterministic ordering and it is never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionVocabulary(Vec<String>);

impl ConditionVocabulary {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|known| known == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// Patient → binary condition row, all rows aligned to one vocabulary.
///
/// Patients with no diagnosis records simply have no row here; consumers get
/// the zero vector for them via [`crate::scoring::history::condition_vector`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionMatrix {
    vocabulary: ConditionVocabulary,
    rows: HashMap<PatientId, Vec<f64>>,
}

impl ConditionMatrix {
    pub fn new(vocabulary: ConditionVocabulary) -> Self {
        Self { vocabulary, rows: HashMap::new() }
    }

    /// Record one diagnosis. Unknown condition names are ignored rather than
    /// widening the vocabulary mid-snapshot.
    pub fn mark(&mut self, patient_id: PatientId, condition_name: &str) {
        let Some(index) = self.vocabulary.position(condition_name) else {
            return;
        };
        let width = self.vocabulary.len();
        let row = self.rows.entry(patient_id).or_insert_with(|| vec![0.0; width]);
        row[index] = 1.0;
    }

    pub fn vocabulary(&self) -> &ConditionVocabulary {
        &self.vocabulary
    }

    pub fn row(&self, patient_id: &PatientId) -> Option<&[f64]> {
        self.rows.get(patient_id).map(Vec::as_slice)
    }

    pub fn patient_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn mark_sets_the_vocabulary_position() {
        let vocabulary =
            ConditionVocabulary::new(vec!["asthma".to_string(), "diabetes".to_string()]);
        let mut matrix = ConditionMatrix::new(vocabulary);
        let patient = PatientId(Uuid::new_v4());

        matrix.mark(patient, "diabetes");

        assert_eq!(matrix.row(&patient), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn mark_ignores_conditions_outside_the_vocabulary() {
        let vocabulary = ConditionVocabulary::new(vec!["asthma".to_string()]);
        let mut matrix = ConditionMatrix::new(vocabulary);
        let patient = PatientId(Uuid::new_v4());

        matrix.mark(patient, "unknown-condition");

        assert!(matrix.row(&patient).is_none());
    }
}
