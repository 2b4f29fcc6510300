use actix_web::{web, Responder};
use validator::Validate;

use crate::models::{CreateRequestRequest, CreateRequestResponse, MatchSummary, NewRequest};
use crate::routes::{created, error_response, match_error_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/requests", web::post().to(create_request));
}

/// Create a request and attempt matching straight away
///
/// POST /api/v1/requests
///
/// A matching failure is logged and reported as `"match": null`; the request
/// itself is still created.
async fn create_request(state: web::Data<AppState>, req: web::Json<CreateRequestRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let new_request = NewRequest {
        recipient_id: req.recipient_id,
        item_name: req.item_name,
        category: req.category,
        location: Some(req.location),
        quantity: req.quantity,
    };

    let auto_match = state.matching.auto_match_on_create;
    match state.orchestrator.create_and_match(new_request, auto_match).await {
        Ok((request, outcome)) => created(&CreateRequestResponse {
            success: true,
            message: "Request created and matching attempted".to_string(),
            matching: outcome.map(|outcome| MatchSummary::from_outcome(request.id, outcome)),
            request,
        }),
        Err(e) => {
            tracing::error!("Failed to create request: {}", e);
            match_error_response(&e)
        }
    }
}
