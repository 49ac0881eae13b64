//! Rating Prediction Model
//!
//! Latent-factor matrix factorization over the patient×doctor rating table:
//! a rating is estimated as global mean + patient bias + doctor bias + the
//! dot product of two low-dimensional factor vectors, fitted by stochastic
//! gradient descent. Training is deterministic (fixed-seed initialization)
//! so the same rating table always yields the same model.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::doctor::DoctorId;
use crate::domain::rating::{PatientId, Rating};

/// The rating scale the table is normalized to; predictions are clamped to
/// this range.
pub const RATING_SCALE_MIN: f64 = 1.0;
pub const RATING_SCALE_MAX: f64 = 5.0;

const INIT_SEED: u64 = 0x0d0c_9a7c;
const INIT_SPREAD: f64 = 0.1;

/// Training hyperparameters, surfaced through `ModelConfig`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelParams {
    /// Latent dimensionality of the factor vectors.
    pub factors: usize,
    /// Full passes over the rating table.
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty applied to biases and factors.
    pub regularization: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self { factors: 32, epochs: 20, learning_rate: 0.005, regularization: 0.02 }
    }
}

/// A trained latent-factor model.
///
/// Ids never seen during training have no factor vector; `predict` falls
/// back to the global training mean for them instead of fabricating one.
#[derive(Clone, Debug)]
pub struct RatingModel {
    global_mean: f64,
    training_rows: usize,
    patient_index: HashMap<PatientId, usize>,
    doctor_index: HashMap<DoctorId, usize>,
    patient_bias: Vec<f64>,
    doctor_bias: Vec<f64>,
    patient_factors: Vec<Vec<f64>>,
    doctor_factors: Vec<Vec<f64>>,
}

impl RatingModel {
    /// Fit a model on the full rating table, duplicates included: a pair
    /// rated twice contributes two gradient steps per epoch, exactly as the
    /// table states it.
    pub fn train(ratings: &[Rating], params: ModelParams) -> Self {
        let mut patient_index = HashMap::new();
        let mut doctor_index = HashMap::new();
        for rating in ratings {
            let next = patient_index.len();
            patient_index.entry(rating.patient_id).or_insert(next);
            let next = doctor_index.len();
            doctor_index.entry(rating.doctor_id).or_insert(next);
        }

        // Empty table: a zero-mean model whose every prediction is 0.0.
        let global_mean = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|rating| rating.value).sum::<f64>() / ratings.len() as f64
        };

        let mut rng = StdRng::seed_from_u64(INIT_SEED);
        let mut init_factors = |count: usize| -> Vec<Vec<f64>> {
            (0..count)
                .map(|_| (0..params.factors).map(|_| (rng.gen::<f64>() - 0.5) * INIT_SPREAD).collect())
                .collect()
        };

        let mut model = Self {
            global_mean,
            training_rows: ratings.len(),
            patient_bias: vec![0.0; patient_index.len()],
            doctor_bias: vec![0.0; doctor_index.len()],
            patient_factors: init_factors(patient_index.len()),
            doctor_factors: init_factors(doctor_index.len()),
            patient_index,
            doctor_index,
        };

        for _epoch in 0..params.epochs {
            for rating in ratings {
                model.sgd_step(rating, &params);
            }
        }

        model
    }

    fn sgd_step(&mut self, rating: &Rating, params: &ModelParams) {
        let p = self.patient_index[&rating.patient_id];
        let d = self.doctor_index[&rating.doctor_id];

        let dot: f64 = self.patient_factors[p]
            .iter()
            .zip(self.doctor_factors[d].iter())
            .map(|(pf, df)| pf * df)
            .sum();
        let estimate = self.global_mean + self.patient_bias[p] + self.doctor_bias[d] + dot;
        let error = rating.value - estimate;

        let lr = params.learning_rate;
        let reg = params.regularization;

        self.patient_bias[p] += lr * (error - reg * self.patient_bias[p]);
        self.doctor_bias[d] += lr * (error - reg * self.doctor_bias[d]);

        for k in 0..params.factors {
            let pf = self.patient_factors[p][k];
            let df = self.doctor_factors[d][k];
            self.patient_factors[p][k] += lr * (error * df - reg * pf);
            self.doctor_factors[d][k] += lr * (error * pf - reg * df);
        }
    }

    /// Estimated rating for a (patient, doctor) pair, clamped to the rating
    /// scale. Either id missing from the training table takes the cold-start
    /// path: the mean of all training ratings.
    pub fn predict(&self, patient_id: &PatientId, doctor_id: &DoctorId) -> f64 {
        match (self.patient_index.get(patient_id), self.doctor_index.get(doctor_id)) {
            (Some(&p), Some(&d)) => {
                let dot: f64 = self.patient_factors[p]
                    .iter()
                    .zip(self.doctor_factors[d].iter())
                    .map(|(pf, df)| pf * df)
                    .sum();
                let estimate =
                    self.global_mean + self.patient_bias[p] + self.doctor_bias[d] + dot;
                estimate.clamp(RATING_SCALE_MIN, RATING_SCALE_MAX)
            }
            _ => self.global_mean,
        }
    }

    /// Mean of the training ratings; the cold-start estimate.
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }
}
