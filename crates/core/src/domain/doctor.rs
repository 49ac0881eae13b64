use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoctorId(pub Uuid);

impl std::fmt::Display for DoctorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One row of the doctor roster. Immutable within a snapshot; the refresher
/// replaces the whole roster wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub full_name: String,
    pub experience_years: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub review_count: u32,
}
