use crate::core::error::MatchError;
use crate::core::planner::AllocationPlan;
use crate::models::{Match, NewMatch, Request, RequestStatus};
use crate::services::store::MatchTransaction;

/// What an executed plan did to the request
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub matches: Vec<Match>,
    pub status: RequestStatus,
    /// Need left after the plan, never negative
    pub remaining_needed: i64,
}

/// Writes an allocation plan through a transaction
///
/// The executor never commits: the caller owns the transaction, so the
/// decrements, match rows and request update land together or not at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchExecutor;

impl MatchExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute<T: MatchTransaction>(
        &self,
        tx: &mut T,
        request: &Request,
        plan: &AllocationPlan,
    ) -> Result<ExecutionReport, MatchError> {
        let mut matches = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            // Relative, conditional decrement; a stale plan is rejected here
            if !tx.decrement_donation(step.donation_id, step.allocated_quantity).await? {
                tracing::warn!(
                    "Donation {} could not cover {} units for request {}",
                    step.donation_id,
                    step.allocated_quantity,
                    request.id
                );
                return Err(MatchError::AllocationConflict {
                    donation_id: step.donation_id,
                });
            }

            let record = tx
                .insert_match(NewMatch {
                    donation_id: step.donation_id,
                    request_id: request.id,
                    allocated_quantity: step.allocated_quantity,
                    status: step.status,
                    distance_score: step.distance_score,
                })
                .await?;

            tracing::debug!(
                "Allocated {} from donation {} to request {} (score {}, {:?})",
                record.allocated_quantity,
                record.donation_id,
                request.id,
                record.distance_score,
                record.status
            );
            matches.push(record);
        }

        let status = final_status(plan.remaining_needed, !matches.is_empty());
        let remaining_needed = plan.remaining_needed.max(0);
        tx.update_request(request.id, status, remaining_needed).await?;

        Ok(ExecutionReport {
            matches,
            status,
            remaining_needed,
        })
    }
}

/// Request status after a run that left `remaining` units uncovered
pub fn final_status(remaining: i64, any_match: bool) -> RequestStatus {
    if remaining <= 0 {
        RequestStatus::Fulfilled
    } else if any_match {
        RequestStatus::Partial
    } else {
        RequestStatus::Waiting
    }
}
