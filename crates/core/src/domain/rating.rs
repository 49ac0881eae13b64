use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub Uuid);

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single patient→doctor rating edge, already normalized to the [1,5]
/// scale by the upstream store. Duplicate (patient, doctor) pairs are kept
/// as-is; the rating model trains on every row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub value: f64,
}
