use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{
    Donation, DonationId, DonationStatus, Match, NewDonation, NewMatch, NewRequest, Request, RequestId,
    RequestStatus,
};
use crate::services::store::{MatchStore, MatchTransaction, RequestIntake, StoreError};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    donations: Vec<Donation>,
    requests: Vec<Request>,
    matches: Vec<Match>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store used to exercise the engine without a database
///
/// A transaction holds the store's lock for its whole lifetime and works on a
/// private copy of the state, which replaces the shared state on commit. Runs
/// are therefore fully serialized.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_donation(&self, donation: NewDonation) -> Donation {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let donation = Donation {
            id,
            donor_id: donation.donor_id,
            item_name: donation.item_name,
            category: donation.category,
            location: donation.location,
            quantity: donation.quantity,
            quantity_remaining: Some(donation.quantity),
            status: DonationStatus::Available,
            created_at: Some(Utc::now()),
        };
        state.donations.push(donation.clone());
        donation
    }

    /// Inserts a donation row exactly as given, keeping its id counter in step
    pub async fn insert_donation_row(&self, donation: Donation) {
        let mut state = self.state.lock().await;
        state.next_id = state.next_id.max(donation.id);
        state.donations.push(donation);
    }

    pub async fn add_request(&self, request: NewRequest) -> Request {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let request = Request {
            id: RequestId::from_stored(id),
            recipient_id: request.recipient_id,
            item_name: request.item_name,
            category: request.category,
            location: request.location,
            quantity: Some(request.quantity),
            quantity_remaining: Some(request.quantity),
            status: RequestStatus::Open,
            created_at: Some(Utc::now()),
        };
        state.requests.push(request.clone());
        request
    }

    /// Inserts a request row exactly as given, e.g. one that is already fulfilled
    pub async fn insert_request_row(&self, request: Request) {
        let mut state = self.state.lock().await;
        state.next_id = state.next_id.max(request.id.value());
        state.requests.push(request);
    }

    pub async fn donation(&self, id: DonationId) -> Option<Donation> {
        self.state.lock().await.donations.iter().find(|d| d.id == id).cloned()
    }

    pub async fn request(&self, id: RequestId) -> Option<Request> {
        self.state.lock().await.requests.iter().find(|r| r.id == id).cloned()
    }

    pub async fn matches(&self) -> Vec<Match> {
        self.state.lock().await.matches.clone()
    }
}

impl RequestIntake for InMemoryStore {
    async fn create_request(&self, request: NewRequest) -> Result<Request, StoreError> {
        Ok(self.add_request(request).await)
    }
}

impl MatchStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(InMemoryTransaction { guard, working })
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MatchTransaction for InMemoryTransaction {
    async fn fetch_request_for_update(&mut self, id: RequestId) -> Result<Option<Request>, StoreError> {
        Ok(self.working.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn fetch_available_donations(&mut self, category: &str) -> Result<Vec<Donation>, StoreError> {
        Ok(self
            .working
            .donations
            .iter()
            .filter(|d| {
                d.category == category
                    && d.status == DonationStatus::Available
                    && d.quantity_remaining.is_some_and(|q| q > 0)
            })
            .cloned()
            .collect())
    }

    async fn decrement_donation(&mut self, id: DonationId, amount: i64) -> Result<bool, StoreError> {
        let Some(donation) = self.working.donations.iter_mut().find(|d| d.id == id) else {
            return Ok(false);
        };
        match donation.quantity_remaining {
            Some(remaining) if donation.status == DonationStatus::Available && remaining >= amount => {
                let left = remaining - amount;
                donation.quantity_remaining = Some(left);
                if left <= 0 {
                    donation.status = DonationStatus::Exhausted;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_match(&mut self, new_match: NewMatch) -> Result<Match, StoreError> {
        let id = self.working.next_id();
        let record = Match {
            id,
            donation_id: new_match.donation_id,
            request_id: new_match.request_id,
            allocated_quantity: new_match.allocated_quantity,
            status: new_match.status,
            distance_score: new_match.distance_score,
            created_at: Utc::now(),
        };
        self.working.matches.push(record.clone());
        Ok(record)
    }

    async fn update_request(
        &mut self,
        id: RequestId,
        status: RequestStatus,
        quantity_remaining: i64,
    ) -> Result<(), StoreError> {
        let request = self
            .working
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::Malformed(format!("request {} vanished during transaction", id)))?;
        request.status = status;
        request.quantity_remaining = Some(quantity_remaining);
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(quantity: i64) -> NewDonation {
        NewDonation {
            donor_id: 1,
            item_name: "rice".to_string(),
            category: "food".to_string(),
            location: Some("Pune".to_string()),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let store = InMemoryStore::new();
        let donation = store.add_donation(food(3)).await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.decrement_donation(donation.id, 2).await.unwrap());
        drop(tx);

        assert_eq!(store.donation(donation.id).await.unwrap().quantity_remaining, Some(3));
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let store = InMemoryStore::new();
        let donation = store.add_donation(food(3)).await;

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.decrement_donation(donation.id, 4).await.unwrap());
        assert!(tx.decrement_donation(donation.id, 3).await.unwrap());
        assert!(!tx.decrement_donation(donation.id, 1).await.unwrap());
        tx.commit().await.unwrap();

        let stored = store.donation(donation.id).await.unwrap();
        assert_eq!(stored.quantity_remaining, Some(0));
        assert_eq!(stored.status, DonationStatus::Exhausted);
    }

    #[tokio::test]
    async fn test_available_donations_filter_category_exactly() {
        let store = InMemoryStore::new();
        store.add_donation(food(3)).await;
        let mut other = food(2);
        other.category = "Food".to_string();
        store.add_donation(other).await;

        let mut tx = store.begin().await.unwrap();
        let found = tx.fetch_available_donations("food").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "food");
    }
}
