use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use docmatch_core::SnapshotStore;
use docmatch_db::DbPool;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    snapshot_store: Arc<SnapshotStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotCheck {
    pub status: &'static str,
    pub generation: u64,
    pub doctor_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub snapshot: SnapshotCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, snapshot_store: Arc<SnapshotStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { db_pool, snapshot_store })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let snapshot = state.snapshot_store.current();
    let snapshot_check = SnapshotCheck {
        // Generation 0 means no refresh has succeeded yet; the service still
        // answers (with empty results), so this degrades the report but not
        // the status code.
        status: if snapshot.generation > 0 { "ready" } else { "pending" },
        generation: snapshot.generation,
        doctor_count: snapshot.doctors.len(),
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "docmatch-server runtime initialized".to_string(),
        },
        database,
        snapshot: snapshot_check,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}
