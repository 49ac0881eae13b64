pub mod config;
pub mod domain;
pub mod errors;
pub mod ml;
pub mod recommend;
pub mod scoring;
pub mod snapshot;

pub use domain::doctor::{Doctor, DoctorId};
pub use domain::history::{ConditionMatrix, ConditionVocabulary};
pub use domain::location::GeoPoint;
pub use domain::rating::{PatientId, Rating};
pub use errors::RequestError;
pub use ml::{ModelParams, RatingModel};
pub use recommend::{RankedDoctor, Recommendation, Recommender};
pub use snapshot::{Snapshot, SnapshotStore};
