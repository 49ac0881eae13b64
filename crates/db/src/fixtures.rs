use sqlx::Executor;

use crate::connection::DbPool;
use crate::store::StoreError;

/// Seeded row counts the fixture dataset guarantees. `verify` checks the
/// database against this contract after a load.
const SEED_DOCTOR_COUNT: i64 = 5;
const SEED_PATIENT_COUNT: i64 = 4;
const SEED_CONDITION_COUNT: i64 = 5;
const SEED_DIAGNOSIS_COUNT: i64 = 4;
const SEED_RATING_COUNT: i64 = 8;

/// Deterministic clinic seed dataset for development and end-to-end tests.
///
/// Covers the interesting data shapes: a repeat-rated doctor, a patient with
/// ratings but no medical history, and doctors spread from central Cairo to
/// Maadi so proximity scores differ.
pub struct ClinicSeedDataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedCheck {
    pub table: &'static str,
    pub expected: i64,
    pub actual: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedVerification {
    pub checks: Vec<SeedCheck>,
}

impl SeedVerification {
    pub fn is_consistent(&self) -> bool {
        self.checks.iter().all(|check| check.expected == check.actual)
    }
}

impl ClinicSeedDataset {
    /// SQL fixture content.
    pub const SQL: &str = include_str!("../../../config/fixtures/clinic_seed.sql");

    /// Load the seed dataset in one transaction.
    pub async fn load(pool: &DbPool) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::raw_sql(Self::SQL)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Verify the seeded tables match the contract counts.
    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, StoreError> {
        let expectations: [(&'static str, i64); 5] = [
            ("doctor", SEED_DOCTOR_COUNT),
            ("patient", SEED_PATIENT_COUNT),
            ("medical_condition", SEED_CONDITION_COUNT),
            ("patient_condition", SEED_DIAGNOSIS_COUNT),
            ("rating", SEED_RATING_COUNT),
        ];

        let mut checks = Vec::with_capacity(expectations.len());
        for (table, expected) in expectations {
            let actual: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(pool)
                .await?;
            checks.push(SeedCheck { table, expected, actual });
        }

        Ok(SeedVerification { checks })
    }
}
