//! In-memory store for vendors and tier change requests.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;
use vendor_tiers_sdk::{RequestType, Tier, TierChangeRequest, VendorRecord};

use crate::domain::repo::{
    InsertOutcome, RequestFilter, StatusTransition, TierRequestsRepository, TransitionOutcome,
    VendorsRepository,
};

#[derive(Default)]
struct StoreState {
    vendors: HashMap<Uuid, VendorRecord>,
    requests: HashMap<Uuid, TierChangeRequest>,
}

/// Both repositories behind a single lock.
///
/// Every trait call takes the lock once and never across an await, so the
/// pending check and the insert, and the status compare and the write, are
/// each atomic.
#[derive(Default)]
pub struct InMemoryTierStore {
    state: Mutex<StoreState>,
}

impl InMemoryTierStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(request: &TierChangeRequest) -> Reverse<(OffsetDateTime, Uuid)> {
    Reverse((request.requested_at, request.id))
}

#[async_trait]
impl VendorsRepository for InMemoryTierStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<VendorRecord>> {
        Ok(self.state.lock().vendors.get(&id).cloned())
    }

    async fn insert(&self, vendor: VendorRecord) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        if state.vendors.contains_key(&vendor.id) {
            anyhow::bail!("vendor {} already exists", vendor.id);
        }
        state.vendors.insert(vendor.id, vendor);
        Ok(())
    }

    async fn update_tier(
        &self,
        id: Uuid,
        tier: Tier,
        at: OffsetDateTime,
    ) -> anyhow::Result<Option<VendorRecord>> {
        let mut state = self.state.lock();
        Ok(state.vendors.get_mut(&id).map(|vendor| {
            vendor.tier = tier;
            vendor.updated_at = at;
            vendor.clone()
        }))
    }
}

#[async_trait]
impl TierRequestsRepository for InMemoryTierStore {
    async fn insert_if_no_pending(
        &self,
        request: TierChangeRequest,
    ) -> anyhow::Result<InsertOutcome> {
        let mut state = self.state.lock();
        let existing = state.requests.values().find(|r| {
            r.is_pending()
                && r.vendor_id == request.vendor_id
                && r.request_type == request.request_type
        });
        if let Some(existing) = existing {
            return Ok(InsertOutcome::PendingExists(existing.clone()));
        }
        state.requests.insert(request.id, request);
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<TierChangeRequest>> {
        Ok(self.state.lock().requests.get(&id).cloned())
    }

    async fn find_pending(
        &self,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> anyhow::Result<Option<TierChangeRequest>> {
        let state = self.state.lock();
        Ok(state
            .requests
            .values()
            .find(|r| r.is_pending() && r.vendor_id == vendor_id && r.request_type == request_type)
            .cloned())
    }

    async fn find_most_recent(
        &self,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> anyhow::Result<Option<TierChangeRequest>> {
        let state = self.state.lock();
        Ok(state
            .requests
            .values()
            .filter(|r| r.vendor_id == vendor_id && r.request_type == request_type)
            .min_by_key(|r| newest_first(r))
            .cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        transition: StatusTransition,
    ) -> anyhow::Result<TransitionOutcome> {
        let mut state = self.state.lock();
        let Some(request) = state.requests.get_mut(&id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if request.status != transition.expected {
            return Ok(TransitionOutcome::Conflict(request.status));
        }
        request.status = transition.next;
        request.decided_by = transition.decided_by;
        request.decided_at = transition.decided_at;
        request.rejection_reason = transition.rejection_reason;
        Ok(TransitionOutcome::Applied(request.clone()))
    }

    async fn list(
        &self,
        filter: &RequestFilter,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<(Vec<TierChangeRequest>, u64)> {
        let state = self.state.lock();
        let mut matching: Vec<&TierChangeRequest> =
            state.requests.values().filter(|r| filter.matches(r)).collect();
        matching.sort_by_key(|r| newest_first(r));

        let total = u64::try_from(matching.len())?;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset)?)
            .take(usize::try_from(limit)?)
            .cloned()
            .collect();
        Ok((page, total))
    }
}
