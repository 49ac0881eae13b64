use std::sync::Arc;

use docmatch_core::config::{AppConfig, ConfigError, LoadOptions};
use docmatch_core::{ModelParams, Recommender, SnapshotStore};
use docmatch_db::{connect_with_settings, migrations, ClinicalDataSource, DbPool, SqlClinicalStore};
use thiserror::Error;
use tracing::info;

use crate::refresh;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub snapshot_store: Arc<SnapshotStore>,
    pub recommender: Arc<Recommender>,
    pub data_source: Arc<dyn ClinicalDataSource>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let snapshot_store = Arc::new(SnapshotStore::new());
    let data_source: Arc<dyn ClinicalDataSource> =
        Arc::new(SqlClinicalStore::new(db_pool.clone()));
    let model_params = ModelParams {
        factors: config.model.factors as usize,
        epochs: config.model.epochs as usize,
        learning_rate: config.model.learning_rate,
        regularization: config.model.regularization,
    };
    let recommender = Arc::new(Recommender::new(snapshot_store.clone(), model_params));

    // Eager first refresh so the service starts with data when the store is
    // reachable. A failure here is logged and left to the next scheduled
    // tick; the empty generation-0 snapshot serves empty results meanwhile.
    refresh::refresh_once(data_source.as_ref(), &snapshot_store).await;

    Ok(Application { config, db_pool, snapshot_store, recommender, data_source })
}

#[cfg(test)]
mod tests {
    use docmatch_core::config::{ConfigOverrides, LoadOptions};
    use docmatch_core::GeoPoint;
    use docmatch_db::ClinicSeedDataset;

    use crate::bootstrap::bootstrap;

    fn database_options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    fn temp_database(dir: &tempfile::TempDir, name: &str) -> String {
        format!("sqlite://{}/{name}.db?mode=rwc", dir.path().display())
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_database_url() {
        let result = bootstrap(database_options("postgres://nope")).await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_publishes_the_first_snapshot() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let app = bootstrap(database_options(&temp_database(&dir, "bootstrap")))
            .await
            .expect("bootstrap should succeed against a fresh sqlite file");

        // Empty database still publishes an (empty) generation-1 snapshot.
        assert_eq!(app.snapshot_store.current().generation, 1);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn integration_smoke_covers_seed_refresh_and_recommendation() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let app = bootstrap(database_options(&temp_database(&dir, "smoke")))
            .await
            .expect("bootstrap should succeed");

        ClinicSeedDataset::load(&app.db_pool).await.expect("load seed");
        crate::refresh::refresh_once(app.data_source.as_ref(), &app.snapshot_store).await;

        let snapshot = app.snapshot_store.current();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.doctors.len(), 5);

        // Anonymous request from central Cairo: a full ranking comes back
        // with distances attached.
        let recommendation = app.recommender.recommend(None, GeoPoint::new(30.0444, 31.2357));
        assert_eq!(recommendation.doctors.len(), 5);
        assert!(recommendation.doctors[0].distance_km <= recommendation.doctors[4].distance_km);

        app.db_pool.close().await;
    }
}
