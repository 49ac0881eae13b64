//! JSON API routes.
//!
//! - `GET  /`          — service banner
//! - `POST /recommend` — rank doctors for a patient id (optional) + location

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use docmatch_core::{GeoPoint, PatientId, RankedDoctor, Recommender, RequestError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    recommender: Arc<Recommender>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Absent for anonymous requests; such callers get cold-start scoring.
    pub patient_id: Option<String>,
    /// `"<lat>,<lon>"` in decimal degrees, the upstream wire shape.
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(recommender: Arc<Recommender>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/recommend", post(recommend))
        .with_state(ApiState { recommender })
}

async fn home() -> &'static str {
    "docmatch doctor recommendation service running"
}

async fn recommend(
    State(state): State<ApiState>,
    Json(body): Json<RecommendRequest>,
) -> Result<Json<Vec<RankedDoctor>>, (StatusCode, Json<ApiError>)> {
    let location: GeoPoint = body.location.parse().map_err(bad_request)?;
    let patient_id = parse_patient_id(body.patient_id.as_deref()).map_err(bad_request)?;

    // Scoring (and a possible model training run on a fresh snapshot
    // generation) is CPU-bound; keep it off the async workers.
    let recommender = state.recommender.clone();
    let recommendation =
        tokio::task::spawn_blocking(move || recommender.recommend(patient_id, location))
            .await
            .map_err(|join_error| {
                error!(
                    event_name = "api.recommend.panicked",
                    error = %join_error,
                    "recommendation task failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError { error: "recommendation failed".to_string() }),
                )
            })?;

    info!(
        event_name = "api.recommend.completed",
        snapshot_generation = recommendation.snapshot_generation,
        doctor_count = recommendation.doctors.len(),
        anonymous = body.patient_id.is_none(),
        "recommendation computed"
    );

    Ok(Json(recommendation.doctors))
}

fn parse_patient_id(raw: Option<&str>) -> Result<Option<PatientId>, RequestError> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let id = Uuid::parse_str(raw.trim())
                .map_err(|_| RequestError::InvalidPatientId { raw: raw.to_string() })?;
            Ok(Some(PatientId(id)))
        }
    }
}

fn bad_request(error: RequestError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: error.to_string() }))
}
