//! Storage seam for the matching engine.
//!
//! The engine never holds a database handle of its own. It asks a [`MatchStore`]
//! for a [`MatchTransaction`] and performs every read and write of one run
//! through it, so that a run either commits as a whole or leaves no trace.
#![allow(async_fn_in_trait)]

use thiserror::Error;

use crate::models::{Donation, DonationId, Match, NewMatch, NewRequest, Request, RequestId, RequestStatus};

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// Source of transactions
pub trait MatchStore {
    type Tx: MatchTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Persists requests ahead of their first matching run
pub trait RequestIntake {
    async fn create_request(&self, request: NewRequest) -> Result<Request, StoreError>;
}

/// One atomic unit of work. Dropping it without calling [`commit`](Self::commit)
/// discards every write made through it.
pub trait MatchTransaction: Sized {
    /// Loads a request and locks its row until the transaction ends
    async fn fetch_request_for_update(&mut self, id: RequestId) -> Result<Option<Request>, StoreError>;

    /// Loads and locks every `available` donation of `category` with quantity left
    async fn fetch_available_donations(&mut self, category: &str) -> Result<Vec<Donation>, StoreError>;

    /// Subtracts `amount` from the donation only if at least `amount` remains.
    ///
    /// Returns `false` when the row was not updated. A donation reaching zero is
    /// marked `exhausted`.
    async fn decrement_donation(&mut self, id: DonationId, amount: i64) -> Result<bool, StoreError>;

    async fn insert_match(&mut self, new_match: NewMatch) -> Result<Match, StoreError>;

    async fn update_request(
        &mut self,
        id: RequestId,
        status: RequestStatus,
        quantity_remaining: i64,
    ) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
