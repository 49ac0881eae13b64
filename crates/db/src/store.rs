//! The clinical data source: the three tabular pulls the refresher needs.

use async_trait::async_trait;
use sqlx::Row;
use thiserror::Error;
use uuid::Uuid;

use docmatch_core::{
    ConditionMatrix, ConditionVocabulary, Doctor, DoctorId, PatientId, Rating, Snapshot,
};

use crate::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// The three read operations the snapshot refresh is built from. The core
/// treats these as opaque tabular pulls; it does not know or care what
/// engine backs them.
#[async_trait]
pub trait ClinicalDataSource: Send + Sync {
    async fn load_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn load_ratings(&self) -> Result<Vec<Rating>, StoreError>;
    async fn load_condition_matrix(&self) -> Result<ConditionMatrix, StoreError>;

    /// Pull all three tables and bundle them into one snapshot. Any failing
    /// pull fails the whole refresh; the caller keeps its previous snapshot.
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let doctors = self.load_doctors().await?;
        let ratings = self.load_ratings().await?;
        let history = self.load_condition_matrix().await?;
        Ok(Snapshot::new(doctors, ratings, history))
    }
}

pub struct SqlClinicalStore {
    pool: DbPool,
}

impl SqlClinicalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_uuid(field: &str, value: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(value)
            .map_err(|error| StoreError::Decode(format!("invalid uuid in {field}: {error}")))
    }

    fn parse_count(field: &str, value: i64) -> Result<u32, StoreError> {
        u32::try_from(value)
            .map_err(|_| StoreError::Decode(format!("negative value in {field}: {value}")))
    }
}

#[async_trait]
impl ClinicalDataSource for SqlClinicalStore {
    async fn load_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, full_name, experience_years, latitude, longitude, rating, review_count
             FROM doctor
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                Ok(Doctor {
                    id: DoctorId(Self::parse_uuid("doctor.id", &id)?),
                    full_name: row.try_get("full_name")?,
                    experience_years: Self::parse_count(
                        "doctor.experience_years",
                        row.try_get("experience_years")?,
                    )?,
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    rating: row.try_get("rating")?,
                    review_count: Self::parse_count(
                        "doctor.review_count",
                        row.try_get("review_count")?,
                    )?,
                })
            })
            .collect()
    }

    async fn load_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        let rows = sqlx::query(
            "SELECT patient_id, doctor_id, normalized_rating FROM rating ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let patient_id: String = row.try_get("patient_id")?;
                let doctor_id: String = row.try_get("doctor_id")?;
                Ok(Rating {
                    patient_id: PatientId(Self::parse_uuid("rating.patient_id", &patient_id)?),
                    doctor_id: DoctorId(Self::parse_uuid("rating.doctor_id", &doctor_id)?),
                    value: row.try_get("normalized_rating")?,
                })
            })
            .collect()
    }

    async fn load_condition_matrix(&self) -> Result<ConditionMatrix, StoreError> {
        // Ordered DISTINCT pull keeps the vocabulary (and therefore vector
        // positions) stable for the lifetime of the snapshot.
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT condition_name FROM medical_condition ORDER BY condition_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut matrix = ConditionMatrix::new(ConditionVocabulary::new(names));

        let rows = sqlx::query(
            "SELECT pc.patient_id, mc.condition_name
             FROM patient_condition pc
             JOIN medical_condition mc ON mc.id = pc.condition_id",
        )
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let patient_id: String = row.try_get("patient_id")?;
            let condition_name: String = row.try_get("condition_name")?;
            let patient_id =
                PatientId(Self::parse_uuid("patient_condition.patient_id", &patient_id)?);
            matrix.mark(patient_id, &condition_name);
        }

        Ok(matrix)
    }
}
