use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;
use vendor_tiers_sdk::{RequestStatus, RequestType, Tier, TierChangeRequest, VendorRecord};

#[async_trait]
pub trait VendorsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<VendorRecord>>;

    async fn insert(&self, vendor: VendorRecord) -> anyhow::Result<()>;

    /// Returns the updated record, or `None` if the vendor does not exist.
    async fn update_tier(
        &self,
        id: Uuid,
        tier: Tier,
        at: OffsetDateTime,
    ) -> anyhow::Result<Option<VendorRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Nothing was written; this request is already pending.
    PendingExists(TierChangeRequest),
}

/// Compare-and-set on a request's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub expected: RequestStatus,
    pub next: RequestStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<OffsetDateTime>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(TierChangeRequest),
    /// The stored status did not match `expected`.
    Conflict(RequestStatus),
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub vendor_id: Option<Uuid>,
}

impl RequestFilter {
    #[must_use]
    pub fn matches(&self, request: &TierChangeRequest) -> bool {
        self.status.is_none_or(|s| s == request.status)
            && self.request_type.is_none_or(|t| t == request.request_type)
            && self.vendor_id.is_none_or(|v| v == request.vendor_id)
    }
}

/// Storage for tier change requests.
///
/// `insert_if_no_pending` and `transition` must each be atomic. A backend
/// without a conditional write (unique partial index, transaction, or
/// compare-and-set) cannot honor the at-most-one-pending rule under
/// concurrent submissions and must document that race.
#[async_trait]
pub trait TierRequestsRepository: Send + Sync {
    /// Insert unless the vendor already has a pending request of the same type.
    async fn insert_if_no_pending(&self, request: TierChangeRequest)
    -> anyhow::Result<InsertOutcome>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<TierChangeRequest>>;

    async fn find_pending(
        &self,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> anyhow::Result<Option<TierChangeRequest>>;

    /// Latest by `requested_at`, any status.
    async fn find_most_recent(
        &self,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> anyhow::Result<Option<TierChangeRequest>>;

    async fn transition(
        &self,
        id: Uuid,
        transition: StatusTransition,
    ) -> anyhow::Result<TransitionOutcome>;

    /// One page of matching requests, newest first, plus the total match count.
    async fn list(
        &self,
        filter: &RequestFilter,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<(Vec<TierChangeRequest>, u64)>;
}
