use tracing::Instrument;

use crate::core::{
    error::MatchError,
    executor::MatchExecutor,
    planner::AllocationPlanner,
    selector::CandidateSelector,
};
use crate::models::{MatchOutcome, NewRequest, Request, RequestId, RequestStatus};
use crate::services::store::{MatchStore, MatchTransaction, RequestIntake};

/// Entry point of the matching engine
///
/// # Pipeline
/// 1. Load and lock the request
/// 2. Short-circuit terminal requests
/// 3. Select candidate donations
/// 4. Rank and plan the allocation
/// 5. Execute the plan and commit
///
/// Every step runs inside one storage transaction, so two runs competing for the
/// same donation are serialized by the store and the second one sees what the
/// first one left.
#[derive(Debug, Clone)]
pub struct MatchOrchestrator<S> {
    store: S,
    selector: CandidateSelector,
    planner: AllocationPlanner,
    executor: MatchExecutor,
}

impl<S: MatchStore> MatchOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            selector: CandidateSelector::new(),
            planner: AllocationPlanner::new(),
            executor: MatchExecutor::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run matching for one request
    ///
    /// Re-running against a `fulfilled` request is a no-op. Any error leaves
    /// storage untouched.
    pub async fn run(&self, request_id: RequestId) -> Result<MatchOutcome, MatchError> {
        let span = tracing::info_span!(
            "match_run",
            request_id = request_id.value(),
            run_id = %uuid::Uuid::new_v4()
        );
        async move {
            let result = self.run_in_transaction(request_id).await;
            match &result {
                Ok(outcome) => tracing::info!(
                    "{}: {} matches, {} still needed",
                    outcome.message(),
                    outcome.matches().len(),
                    outcome.remaining_needed()
                ),
                Err(e) => tracing::error!("Matching failed for request {}: {}", request_id, e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_in_transaction(&self, request_id: RequestId) -> Result<MatchOutcome, MatchError> {
        let mut tx = self.store.begin().await?;

        let request = tx
            .fetch_request_for_update(request_id)
            .await?
            .ok_or(MatchError::NotFound(request_id))?;

        match request.status {
            RequestStatus::Fulfilled => {
                tx.rollback().await?;
                return Ok(MatchOutcome::AlreadyFulfilled);
            }
            RequestStatus::Cancelled => {
                let remaining_needed = request.outstanding()?;
                tx.rollback().await?;
                return Ok(MatchOutcome::Cancelled { remaining_needed });
            }
            _ => {}
        }

        let outstanding = request.outstanding()?;

        let candidates = self.selector.find_candidates(&mut tx, &request.category).await?;
        if candidates.is_empty() {
            tx.rollback().await?;
            return Ok(MatchOutcome::NoCandidates {
                remaining_needed: outstanding,
            });
        }

        let plan = self.planner.plan(&request, candidates)?;
        tracing::debug!(
            "Planned {} steps covering {} of {}",
            plan.steps.len(),
            plan.total_allocated(),
            plan.initial_needed
        );

        let report = self.executor.execute(&mut tx, &request, &plan).await?;
        tx.commit().await?;

        Ok(MatchOutcome::Executed {
            status: report.status,
            matches: report.matches,
            remaining_needed: report.remaining_needed,
        })
    }
}

impl<S: MatchStore + RequestIntake> MatchOrchestrator<S> {
    /// Create a request, then optionally run matching for it
    ///
    /// Only the creation can fail. A failed run is logged and returned as `None`,
    /// and the new request stays stored either way.
    pub async fn create_and_match(
        &self,
        new_request: NewRequest,
        auto_match: bool,
    ) -> Result<(Request, Option<MatchOutcome>), MatchError> {
        let request = self.store.create_request(new_request).await?;
        if !auto_match {
            return Ok((request, None));
        }

        let outcome = match self.run(request.id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("Auto-matching failed for new request {}: {}", request.id, e);
                None
            }
        };
        Ok((request, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewDonation, NewRequest};
    use crate::services::InMemoryStore;

    fn new_request(quantity: i64) -> NewRequest {
        NewRequest {
            recipient_id: 9,
            item_name: "water".to_string(),
            category: "water".to_string(),
            location: Some("Nashik".to_string()),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let orchestrator = MatchOrchestrator::new(InMemoryStore::new());
        let err = orchestrator.run(RequestId::new(42).unwrap()).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound(id) if id.value() == 42));
    }

    #[tokio::test]
    async fn test_rerun_after_fulfilment_is_noop() {
        let store = InMemoryStore::new();
        store
            .add_donation(NewDonation {
                donor_id: 1,
                item_name: "water".to_string(),
                category: "water".to_string(),
                location: Some("Nashik".to_string()),
                quantity: 10,
            })
            .await;
        let request = store.add_request(new_request(4)).await;
        let orchestrator = MatchOrchestrator::new(store.clone());

        let first = orchestrator.run(request.id).await.unwrap();
        assert_eq!(first.status(), RequestStatus::Fulfilled);
        assert_eq!(first.matches().len(), 1);

        let second = orchestrator.run(request.id).await.unwrap();
        assert_eq!(second, MatchOutcome::AlreadyFulfilled);
        assert_eq!(store.matches().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_request_is_left_alone() {
        let store = InMemoryStore::new();
        let mut request = store.add_request(new_request(4)).await;
        request.id = RequestId::new(100).unwrap();
        request.status = RequestStatus::Cancelled;
        store.insert_request_row(request.clone()).await;

        let outcome = MatchOrchestrator::new(store.clone()).run(request.id).await.unwrap();
        assert_eq!(outcome, MatchOutcome::Cancelled { remaining_needed: 4 });
        assert_eq!(store.request(request.id).await.unwrap().status, RequestStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_create_without_auto_match_skips_run() {
        let store = InMemoryStore::new();
        let orchestrator = MatchOrchestrator::new(store.clone());

        let (request, outcome) = orchestrator.create_and_match(new_request(4), false).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(store.request(request.id).await.unwrap().status, RequestStatus::Open);
    }
}
