use serde::{Deserialize, Serialize};
use crate::models::domain::{Donation, Match, MatchOutcome, Request, RequestId, RequestStatus};

/// Summary of a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub success: bool,
    pub message: String,
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub matches: Vec<Match>,
    pub remaining_needed: i64,
}

impl MatchSummary {
    pub fn from_outcome(request_id: RequestId, outcome: MatchOutcome) -> Self {
        let message = outcome.message().to_string();
        let status = outcome.status();
        let remaining_needed = outcome.remaining_needed();
        let matches = match outcome {
            MatchOutcome::Executed { matches, .. } => matches,
            _ => vec![],
        };
        Self {
            success: true,
            message,
            request_id,
            status,
            matches,
            remaining_needed,
        }
    }
}

/// Response for request creation; `matching` is null when auto-matching failed or is disabled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequestResponse {
    pub success: bool,
    pub message: String,
    pub request: Request,
    #[serde(rename = "match")]
    pub matching: Option<MatchSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonationResponse {
    pub success: bool,
    pub donation: Donation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMatchesResponse {
    pub success: bool,
    pub request_id: RequestId,
    pub matches: Vec<Match>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
