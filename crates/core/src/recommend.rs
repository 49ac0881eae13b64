//! Per-request orchestration of the scoring pipeline.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::domain::location::GeoPoint;
use crate::domain::rating::PatientId;
use crate::ml::{ModelParams, RatingModel};
use crate::scoring::{self, experience, geo, history, profile, similarity, DoctorSignals};
use crate::snapshot::{Snapshot, SnapshotStore};

/// One display row of a recommendation, in descending score order. Internal
/// join keys (doctor id, raw coordinates) are deliberately absent; callers
/// get the computed distance instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedDoctor {
    pub doctor_name: String,
    pub experience_years: u32,
    pub rating: f64,
    pub review_count: u32,
    pub distance_km: f64,
    pub score: f64,
}

/// The full result of one request. Ephemeral: recomputed every call, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub snapshot_generation: u64,
    pub doctors: Vec<RankedDoctor>,
}

struct CachedModel {
    generation: u64,
    model: Arc<RatingModel>,
}

/// Ranks doctors for a patient against whatever snapshot is current when the
/// request starts.
///
/// The rating model is trained once per snapshot generation and reused by
/// every request until the refresher publishes the next generation; the
/// cache lock is held only to check or store the model handle, never during
/// training, so concurrent first requests on a fresh generation may train
/// twice and the later result wins.
pub struct Recommender {
    store: Arc<SnapshotStore>,
    params: ModelParams,
    model_cache: Mutex<Option<CachedModel>>,
}

impl Recommender {
    pub fn new(store: Arc<SnapshotStore>, params: ModelParams) -> Self {
        Self { store, params, model_cache: Mutex::new(None) }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Rank every doctor in the current snapshot for the given patient and
    /// location. An absent patient id scores as a patient with no history
    /// and no rating record. An empty doctor pool yields an empty result.
    pub fn recommend(&self, patient_id: Option<PatientId>, location: GeoPoint) -> Recommendation {
        // One snapshot per request; a refresh landing mid-computation cannot
        // mix into it.
        let snapshot = self.store.current();
        if snapshot.doctors.is_empty() {
            return Recommendation { snapshot_generation: snapshot.generation, doctors: Vec::new() };
        }

        let model = self.model_for(&snapshot);

        let patient_vector = match &patient_id {
            Some(id) => history::condition_vector(id, &snapshot.history),
            None => vec![0.0; snapshot.history.vocabulary().len()],
        };
        let profiles =
            profile::treatment_profiles(&snapshot.doctors, &snapshot.ratings, &snapshot.history);
        let similarities =
            similarity::profile_similarities(&patient_vector, &snapshot.doctors, &profiles);
        let experience_scores = experience::experience_scores(&snapshot.doctors);

        let signals: Vec<DoctorSignals> = snapshot
            .doctors
            .iter()
            .zip(similarities)
            .zip(experience_scores)
            .map(|((doctor, similarity), experience)| {
                let distance_km = geo::distance_km(
                    location,
                    GeoPoint::new(doctor.latitude, doctor.longitude),
                );
                let predicted_rating = match &patient_id {
                    Some(id) => model.predict(id, &doctor.id),
                    None => model.global_mean(),
                };
                DoctorSignals {
                    doctor: doctor.clone(),
                    distance_km,
                    similarity,
                    proximity: geo::proximity_score(distance_km),
                    predicted_rating,
                    experience,
                }
            })
            .collect();

        let doctors = scoring::rank(signals)
            .into_iter()
            .map(|signals| {
                let score = signals.composite_score();
                RankedDoctor {
                    doctor_name: signals.doctor.full_name,
                    experience_years: signals.doctor.experience_years,
                    rating: signals.doctor.rating,
                    review_count: signals.doctor.review_count,
                    distance_km: signals.distance_km,
                    score,
                }
            })
            .collect();

        Recommendation { snapshot_generation: snapshot.generation, doctors }
    }

    /// The rating model for this snapshot generation, training it if no
    /// request has needed it yet.
    fn model_for(&self, snapshot: &Snapshot) -> Arc<RatingModel> {
        if let Some(cached) = self.model_cache.lock().expect("model cache poisoned").as_ref() {
            if cached.generation == snapshot.generation {
                return cached.model.clone();
            }
        }

        let model = Arc::new(RatingModel::train(&snapshot.ratings, self.params));

        let mut cache = self.model_cache.lock().expect("model cache poisoned");
        *cache = Some(CachedModel { generation: snapshot.generation, model: model.clone() });
        model
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::doctor::{Doctor, DoctorId};
    use crate::domain::history::{ConditionMatrix, ConditionVocabulary};
    use crate::domain::rating::Rating;

    use super::*;

    fn doctor_at(name: &str, latitude: f64, longitude: f64) -> Doctor {
        Doctor {
            id: DoctorId(Uuid::new_v4()),
            full_name: name.to_string(),
            experience_years: 10,
            latitude,
            longitude,
            rating: 4.0,
            review_count: 25,
        }
    }

    fn empty_matrix() -> ConditionMatrix {
        ConditionMatrix::new(ConditionVocabulary::default())
    }

    fn recommender_with(snapshot: Snapshot) -> Recommender {
        let store = Arc::new(SnapshotStore::new());
        store.publish(snapshot);
        Recommender::new(store, ModelParams::default())
    }

    #[test]
    fn empty_doctor_pool_returns_an_empty_result() {
        let recommender = recommender_with(Snapshot::new(vec![], vec![], empty_matrix()));

        let result = recommender.recommend(None, GeoPoint::new(30.0, 31.0));

        assert!(result.doctors.is_empty());
    }

    #[test]
    fn doctors_within_the_near_field_outrank_distant_ones_in_stable_order() {
        // Patient in central Cairo; two doctors within 1 km (tied proximity
        // 1.0, identical everything else) and one ~10 km north.
        let here = GeoPoint::new(30.0444, 31.2357);
        let doctors = vec![
            doctor_at("Dr. Zero Km", 30.0444, 31.2357),
            doctor_at("Dr. Half Km", 30.0489, 31.2357),
            doctor_at("Dr. Ten Km", 30.1344, 31.2357),
        ];
        let recommender = recommender_with(Snapshot::new(doctors, vec![], empty_matrix()));

        let result = recommender.recommend(None, here);
        let names: Vec<_> = result.doctors.iter().map(|d| d.doctor_name.as_str()).collect();

        assert_eq!(names, vec!["Dr. Zero Km", "Dr. Half Km", "Dr. Ten Km"]);
        assert!(result.doctors[0].distance_km < 1.0);
        assert!(result.doctors[1].distance_km < 1.0);
        assert!(result.doctors[2].distance_km > 9.0);
        // The two near-field doctors tie on every signal; the stable sort
        // keeps their roster order.
        assert_eq!(result.doctors[0].score, result.doctors[1].score);
    }

    #[test]
    fn anonymous_requests_score_every_doctor_with_the_cold_start_rating() {
        let doctors = vec![doctor_at("Dr. A", 30.0, 31.0), doctor_at("Dr. B", 30.5, 31.0)];
        let rater = crate::domain::rating::PatientId(Uuid::new_v4());
        let ratings = vec![
            Rating { patient_id: rater, doctor_id: doctors[0].id, value: 5.0 },
            Rating { patient_id: rater, doctor_id: doctors[1].id, value: 3.0 },
        ];
        let recommender = recommender_with(Snapshot::new(doctors, ratings, empty_matrix()));

        let result = recommender.recommend(None, GeoPoint::new(30.0, 31.0));

        // Both doctors take the global mean (4.0), so the nearer one wins on
        // proximity alone.
        assert_eq!(result.doctors[0].doctor_name, "Dr. A");
        let mean_term = 4.0 * crate::scoring::RATING_WEIGHT;
        for ranked in &result.doctors {
            let remainder = ranked.score - mean_term;
            assert!(remainder >= 0.0, "rating signal should be the shared mean");
        }
    }

    #[test]
    fn the_model_is_cached_per_snapshot_generation() {
        let store = Arc::new(SnapshotStore::new());
        store.publish(Snapshot::new(vec![doctor_at("Dr. A", 30.0, 31.0)], vec![], empty_matrix()));
        let recommender = Recommender::new(store.clone(), ModelParams::default());

        let first = recommender.model_for(&store.current());
        let second = recommender.model_for(&store.current());
        assert!(Arc::ptr_eq(&first, &second), "same generation must reuse the trained model");

        store.publish(Snapshot::new(vec![doctor_at("Dr. B", 30.0, 31.0)], vec![], empty_matrix()));
        let third = recommender.model_for(&store.current());
        assert!(!Arc::ptr_eq(&first, &third), "a new generation must retrain");
    }

    #[test]
    fn display_rows_carry_no_join_keys() {
        // Compile-time by construction; assert the display fields round-trip
        // through serde with exactly the public shape.
        let row = RankedDoctor {
            doctor_name: "Dr. A".to_string(),
            experience_years: 9,
            rating: 4.5,
            review_count: 40,
            distance_km: 2.5,
            score: 1.8,
        };
        let json = serde_json::to_value(&row).expect("serialize");
        let mut keys: Vec<_> = json.as_object().expect("object").keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "distance_km",
                "doctor_name",
                "experience_years",
                "rating",
                "review_count",
                "score"
            ]
        );
    }
}
