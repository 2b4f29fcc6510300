use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::MatchError;

pub type DonationId = i64;
pub type MatchId = i64;

/// Identifier of a request row, validated before any storage access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    pub fn new(id: i64) -> Result<Self, MatchError> {
        if id <= 0 {
            return Err(MatchError::InvalidInput(format!("request id must be positive, got {}", id)));
        }
        Ok(Self(id))
    }

    /// Wraps an id read back from storage, where it was assigned by the store itself
    pub(crate) fn from_stored(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Accepts either a JSON integer or a numeric string, as clients send both
    pub fn from_json(value: Option<&serde_json::Value>) -> Result<Self, MatchError> {
        match value {
            None | Some(serde_json::Value::Null) => {
                Err(MatchError::InvalidInput("request_id required".to_string()))
            }
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| MatchError::InvalidInput(format!("request_id is not an integer: {}", n)))
                .and_then(Self::new),
            Some(serde_json::Value::String(s)) => s.parse(),
            Some(other) => Err(MatchError::InvalidInput(format!("request_id has unsupported type: {}", other))),
        }
    }
}

impl FromStr for RequestId {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MatchError::InvalidInput("request_id required".to_string()));
        }
        let id = trimmed
            .parse::<i64>()
            .map_err(|_| MatchError::InvalidInput(format!("request_id is not an integer: {}", s)))?;
        Self::new(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Available,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Partial,
    Fulfilled,
    Cancelled,
    /// Matching was attempted and nothing could be allocated
    Waiting,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Open => "open",
            RequestStatus::Partial => "partial",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Waiting => "waiting",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Partial,
    Fulfilled,
}

/// Supply unit offered by a donor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: i64,
    pub item_name: String,
    pub category: String,
    pub location: Option<String>,
    pub quantity: i64,
    pub quantity_remaining: Option<i64>,
    pub status: DonationStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Remaining quantity if it is usable for allocation
    pub fn allocatable(&self) -> Option<i64> {
        self.quantity_remaining.filter(|q| *q > 0)
    }
}

/// Demand unit created by a recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub recipient_id: i64,
    pub item_name: String,
    pub category: String,
    pub location: Option<String>,
    pub quantity: Option<i64>,
    pub quantity_remaining: Option<i64>,
    pub status: RequestStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Request {
    /// Outstanding need: `quantity_remaining`, falling back to `quantity`.
    ///
    /// Fails with `MalformedRecord` when neither field holds a non-negative value.
    pub fn outstanding(&self) -> Result<i64, MatchError> {
        self.quantity_remaining
            .filter(|q| *q >= 0)
            .or_else(|| self.quantity.filter(|q| *q >= 0))
            .ok_or_else(|| {
                MatchError::MalformedRecord(format!(
                    "request {} has no usable quantity (quantity={:?}, quantity_remaining={:?})",
                    self.id, self.quantity, self.quantity_remaining
                ))
            })
    }
}

/// Immutable allocation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub donation_id: DonationId,
    pub request_id: RequestId,
    pub allocated_quantity: i64,
    pub status: MatchStatus,
    pub distance_score: u32,
    pub created_at: DateTime<Utc>,
}

/// Match row as handed to storage, before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub donation_id: DonationId,
    pub request_id: RequestId,
    pub allocated_quantity: i64,
    pub status: MatchStatus,
    pub distance_score: u32,
}

/// Donation as submitted by a donor
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_id: i64,
    pub item_name: String,
    pub category: String,
    pub location: Option<String>,
    pub quantity: i64,
}

/// Request as submitted by a recipient
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub recipient_id: i64,
    pub item_name: String,
    pub category: String,
    pub location: Option<String>,
    pub quantity: i64,
}

/// Result of one orchestration run
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The request was already fulfilled; nothing was read beyond the request row
    AlreadyFulfilled,
    /// The request was cancelled before matching ran
    Cancelled { remaining_needed: i64 },
    /// No donation in the request's category has anything left.
    ///
    /// Reported as `waiting`, but nothing is written: the stored request keeps
    /// its current status (`open` for a fresh request) until a run allocates.
    NoCandidates { remaining_needed: i64 },
    /// An allocation plan was committed
    Executed {
        status: RequestStatus,
        matches: Vec<Match>,
        remaining_needed: i64,
    },
}

impl MatchOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            MatchOutcome::AlreadyFulfilled => "Request already fulfilled",
            MatchOutcome::Cancelled { .. } => "Request is cancelled",
            MatchOutcome::NoCandidates { .. } => "No matching donations found",
            MatchOutcome::Executed { .. } => "Matching executed",
        }
    }

    pub fn matches(&self) -> &[Match] {
        match self {
            MatchOutcome::Executed { matches, .. } => matches,
            _ => &[],
        }
    }

    pub fn remaining_needed(&self) -> i64 {
        match self {
            MatchOutcome::AlreadyFulfilled => 0,
            MatchOutcome::Cancelled { remaining_needed }
            | MatchOutcome::NoCandidates { remaining_needed }
            | MatchOutcome::Executed { remaining_needed, .. } => *remaining_needed,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            MatchOutcome::AlreadyFulfilled => RequestStatus::Fulfilled,
            MatchOutcome::Cancelled { .. } => RequestStatus::Cancelled,
            MatchOutcome::NoCandidates { .. } => RequestStatus::Waiting,
            MatchOutcome::Executed { status, .. } => *status,
        }
    }
}
