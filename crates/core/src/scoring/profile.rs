//! Per-doctor treatment profiles.
//!
//! A doctor's profile is the fraction of their treated patients exhibiting
//! each vocabulary condition. "Treated" means having at least one rating
//! edge to the doctor; patients with no recorded history still count toward
//! the denominator with a zero condition row, matching how the upstream data
//! defines a treatment relationship.

use std::collections::{HashMap, HashSet};

use crate::domain::doctor::{Doctor, DoctorId};
use crate::domain::history::ConditionMatrix;
use crate::domain::rating::{PatientId, Rating};

use super::history::condition_vector;

/// Build the profile vector for every doctor in the roster. Doctors with no
/// treated patients get an explicit all-zero profile; the division by the
/// treated-patient count is guarded so it never runs for them.
///
/// Dense O(doctors × treated patients × vocabulary) work, recomputed against
/// whichever snapshot the request took.
pub fn treatment_profiles(
    doctors: &[Doctor],
    ratings: &[Rating],
    matrix: &ConditionMatrix,
) -> HashMap<DoctorId, Vec<f64>> {
    let width = matrix.vocabulary().len();

    let mut treated: HashMap<DoctorId, HashSet<PatientId>> =
        doctors.iter().map(|doctor| (doctor.id, HashSet::new())).collect();
    for rating in ratings {
        if let Some(patients) = treated.get_mut(&rating.doctor_id) {
            patients.insert(rating.patient_id);
        }
    }

    doctors
        .iter()
        .map(|doctor| {
            let patients = &treated[&doctor.id];
            let mut profile = vec![0.0; width];
            if patients.is_empty() {
                return (doctor.id, profile);
            }

            for patient_id in patients {
                let row = condition_vector(patient_id, matrix);
                for (slot, value) in profile.iter_mut().zip(row) {
                    *slot += value;
                }
            }
            let count = patients.len() as f64;
            for slot in &mut profile {
                *slot /= count;
            }
            (doctor.id, profile)
        })
        .collect()
}
