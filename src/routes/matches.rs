use actix_web::{web, HttpResponse, Responder};

use crate::models::{HealthResponse, ListMatchesQuery, ListMatchesResponse, MatchSummary, RequestId, RunMatchRequest};
use crate::routes::{error_response, match_error_response, AppState};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/run", web::post().to(run_match))
        .route("/matches", web::get().to(list_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres().health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run matching for a request
///
/// POST /api/v1/matches/run
///
/// Request body:
/// ```json
/// { "request_id": 12 }
/// ```
async fn run_match(state: web::Data<AppState>, req: web::Json<RunMatchRequest>) -> impl Responder {
    let request_id = match RequestId::from_json(req.request_id.as_ref()) {
        Ok(id) => id,
        Err(e) => return match_error_response(&e),
    };

    match state.orchestrator.run(request_id).await {
        Ok(outcome) => HttpResponse::Ok().json(MatchSummary::from_outcome(request_id, outcome)),
        Err(e) => match_error_response(&e),
    }
}

/// Match ledger for one request
///
/// GET /api/v1/matches?request_id={id}
async fn list_matches(state: web::Data<AppState>, query: web::Query<ListMatchesQuery>) -> impl Responder {
    let request_id = match query.request_id.as_deref().unwrap_or_default().parse::<RequestId>() {
        Ok(id) => id,
        Err(e) => return match_error_response(&e),
    };

    match state.postgres().list_matches_for_request(request_id).await {
        Ok(matches) => HttpResponse::Ok().json(ListMatchesResponse {
            success: true,
            request_id,
            matches,
        }),
        Err(e) => {
            tracing::error!("Failed to list matches for request {}: {}", request_id, e);
            error_response(500, "persistence_failure", e.to_string())
        }
    }
}
