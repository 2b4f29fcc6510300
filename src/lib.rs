//! Relief Match - donation to request matching service
//!
//! This library provides the allocation engine that matches donations to
//! requests by category and location, splits quantities greedily and records
//! every allocation in an append-only match ledger.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{proximity_score, MatchError, MatchOrchestrator};
pub use crate::models::{Donation, Match, MatchOutcome, Request, RequestId, RequestStatus};
pub use crate::services::{InMemoryStore, MatchStore, PostgresClient};
