use crate::core::error::MatchError;
use crate::core::proximity::proximity_score;
use crate::models::{Donation, DonationId, MatchStatus, Request};

/// One proposed allocation from a single donation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStep {
    pub donation_id: DonationId,
    pub allocated_quantity: i64,
    /// `Fulfilled` when this step alone covered everything that was still needed
    pub status: MatchStatus,
    pub distance_score: u32,
}

/// Ordered allocation steps and the need left once they are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub steps: Vec<AllocationStep>,
    pub initial_needed: i64,
    pub remaining_needed: i64,
}

impl AllocationPlan {
    pub fn total_allocated(&self) -> i64 {
        self.steps.iter().map(|s| s.allocated_quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Ranks candidate donations by proximity and allocates greedily
///
/// # Ranking
/// 1. Proximity score, ascending
/// 2. Donation creation time, ascending
/// 3. Donations without a timestamp after timestamped ones, in input order
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationPlanner;

impl AllocationPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, request: &Request, candidates: Vec<Donation>) -> Result<AllocationPlan, MatchError> {
        let initial_needed = request.outstanding()?;

        let mut ranked: Vec<(u32, Donation)> = candidates
            .into_iter()
            .map(|d| {
                let score = proximity_score(request.location.as_deref(), d.location.as_deref());
                (score, d)
            })
            .collect();

        // Stable sort: equal keys keep their input order
        ranked.sort_by_key(|(score, d)| (*score, d.created_at.is_none(), d.created_at));

        let mut remaining_needed = initial_needed;
        let mut steps = Vec::new();

        for (distance_score, donation) in ranked {
            if remaining_needed <= 0 {
                break;
            }

            let Some(available) = donation.allocatable() else {
                tracing::trace!("Skipping donation {} with no usable quantity", donation.id);
                continue;
            };

            let allocated_quantity = available.min(remaining_needed);
            let status = if allocated_quantity == remaining_needed {
                MatchStatus::Fulfilled
            } else {
                MatchStatus::Partial
            };

            steps.push(AllocationStep {
                donation_id: donation.id,
                allocated_quantity,
                status,
                distance_score,
            });
            remaining_needed -= allocated_quantity;
        }

        Ok(AllocationPlan {
            steps,
            initial_needed,
            remaining_needed,
        })
    }
}
