use thiserror::Error;

use crate::models::{DonationId, RequestId};
use crate::services::store::StoreError;

/// Failures of a matching run. None of them leave partial writes behind.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request not found: {0}")]
    NotFound(RequestId),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The conditional decrement found less stock than the plan assumed
    #[error("Donation {donation_id} no longer has the planned quantity available")]
    AllocationConflict { donation_id: DonationId },

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[source] StoreError),
}

impl From<StoreError> for MatchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Malformed(msg) => MatchError::MalformedRecord(msg),
            other => MatchError::PersistenceFailure(other),
        }
    }
}

impl MatchError {
    /// HTTP status code used when the error is reported to a client
    pub fn status_code(&self) -> u16 {
        match self {
            MatchError::InvalidInput(_) => 400,
            MatchError::NotFound(_) => 404,
            MatchError::MalformedRecord(_) => 422,
            MatchError::AllocationConflict { .. } => 409,
            MatchError::PersistenceFailure(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::InvalidInput(_) => "invalid_input",
            MatchError::NotFound(_) => "not_found",
            MatchError::MalformedRecord(_) => "malformed_record",
            MatchError::AllocationConflict { .. } => "allocation_conflict",
            MatchError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_classified() {
        let err: MatchError = StoreError::Malformed("bad quantity".to_string()).into();
        assert!(matches!(err, MatchError::MalformedRecord(_)));
        assert_eq!(err.status_code(), 422);

        let err: MatchError = StoreError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, MatchError::PersistenceFailure(_)));
        assert_eq!(err.kind(), "persistence_failure");
    }
}
