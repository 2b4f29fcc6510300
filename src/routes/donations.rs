use actix_web::{web, Responder};
use validator::Validate;

use crate::models::{CreateDonationRequest, CreateDonationResponse, NewDonation};
use crate::routes::{created, error_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donations", web::post().to(create_donation));
}

/// POST /api/v1/donations
async fn create_donation(state: web::Data<AppState>, req: web::Json<CreateDonationRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let donation = NewDonation {
        donor_id: req.donor_id,
        item_name: req.item_name,
        category: req.category,
        location: Some(req.location),
        quantity: req.quantity,
    };

    match state.postgres().create_donation(donation).await {
        Ok(donation) => created(&CreateDonationResponse {
            success: true,
            donation,
        }),
        Err(e) => {
            tracing::error!("Failed to create donation: {}", e);
            error_response(500, "Failed to create donation", e.to_string())
        }
    }
}
