// Route exports
pub mod donations;
pub mod matches;
pub mod requests;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::{MatchError, MatchOrchestrator};
use crate::models::ErrorResponse;
use crate::services::PostgresClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MatchOrchestrator<PostgresClient>>,
    pub matching: MatchingSettings,
}

impl AppState {
    pub fn postgres(&self) -> &PostgresClient {
        self.orchestrator.store()
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(requests::configure)
            .configure(donations::configure),
    );
}

pub(crate) fn error_response(status_code: u16, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)).json(
        ErrorResponse {
            error: error.to_string(),
            message,
            status_code,
        },
    )
}

pub(crate) fn match_error_response(err: &MatchError) -> HttpResponse {
    error_response(err.status_code(), err.kind(), err.to_string())
}

/// 201 with a JSON body, shared by every create endpoint
pub(crate) fn created<T: Serialize>(body: &T) -> HttpResponse {
    HttpResponse::Created().json(body)
}
