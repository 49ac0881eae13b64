//! Contract tests for the clinic seed dataset: the fixture must load
//! cleanly onto a migrated schema and feed the full snapshot pull.

use docmatch_db::{
    connect_with_settings, migrations, ClinicSeedDataset, ClinicalDataSource, SqlClinicalStore,
};

async fn seeded_pool() -> docmatch_db::DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("run migrations");
    ClinicSeedDataset::load(&pool).await.expect("load seed dataset");
    pool
}

#[tokio::test]
async fn seed_loads_and_verifies_against_its_contract() {
    let pool = seeded_pool().await;

    let verification = ClinicSeedDataset::verify(&pool).await.expect("verify seed");

    assert!(
        verification.is_consistent(),
        "seed contract mismatch: {:?}",
        verification.checks
    );

    pool.close().await;
}

#[tokio::test]
async fn seeded_snapshot_exercises_every_scoring_input() {
    let pool = seeded_pool().await;

    let store = SqlClinicalStore::new(pool.clone());
    let snapshot = store.load_snapshot().await.expect("load snapshot");

    assert_eq!(snapshot.doctors.len(), 5);
    assert_eq!(snapshot.ratings.len(), 8);
    assert_eq!(snapshot.history.vocabulary().len(), 5);
    // One seeded patient rates doctors but has no recorded history.
    assert_eq!(snapshot.history.patient_count(), 3);

    // The repeat-rated pair arrives as two distinct rows.
    let repeat_pairs = snapshot
        .ratings
        .iter()
        .filter(|rating| {
            snapshot
                .ratings
                .iter()
                .filter(|other| {
                    other.patient_id == rating.patient_id && other.doctor_id == rating.doctor_id
                })
                .count()
                > 1
        })
        .count();
    assert_eq!(repeat_pairs, 2);

    pool.close().await;
}
