// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PgMatchTransaction, PostgresClient};
pub use store::{MatchStore, MatchTransaction, RequestIntake, StoreError};
