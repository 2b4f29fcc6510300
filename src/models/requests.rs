use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to run matching for one request record
///
/// `request_id` is kept as raw JSON so that both `12` and `"12"` are accepted
/// and a missing or malformed id surfaces as `InvalidInput` rather than a
/// payload error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchRequest {
    #[serde(default)]
    pub request_id: Option<serde_json::Value>,
}

/// Recipient creates a request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestRequest {
    #[validate(range(min = 1))]
    pub recipient_id: i64,
    #[validate(length(min = 1))]
    pub item_name: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1))]
    pub location: String,
}

/// Donor offers a donation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDonationRequest {
    #[validate(range(min = 1))]
    pub donor_id: i64,
    #[validate(length(min = 1))]
    pub item_name: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1))]
    pub location: String,
}

/// Query string for listing the match ledger of a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMatchesQuery {
    pub request_id: Option<String>,
}
