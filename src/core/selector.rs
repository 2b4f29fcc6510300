use crate::models::Donation;
use crate::services::store::{MatchTransaction, StoreError};

/// Finds the donations a request could draw from
///
/// Eligibility is an exact, case-sensitive category match on `available`
/// donations with quantity left. The result is unordered; ranking belongs to
/// the planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateSelector;

impl CandidateSelector {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_candidates<T: MatchTransaction>(
        &self,
        tx: &mut T,
        category: &str,
    ) -> Result<Vec<Donation>, StoreError> {
        let candidates: Vec<Donation> = tx
            .fetch_available_donations(category)
            .await?
            .into_iter()
            .filter(|d| d.category == category && d.allocatable().is_some())
            .collect();

        tracing::debug!("Found {} candidate donations in category {:?}", candidates.len(), category);

        Ok(candidates)
    }
}
