//! Public models for the `vendor_tiers` module.
//!
//! Tier, request type and request status carry serde because their string
//! forms are part of the wire contract. The remaining records are
//! transport-agnostic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Vendor profile fields keyed by schema field name.
pub type ProfilePayload = serde_json::Map<String, serde_json::Value>;

/// Subscription tier. Declaration order is the tier order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Tier1,
    Tier2,
    Tier3,
}

/// Returned by the strict tier parser for identifiers outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized tier '{0}'")]
pub struct UnknownTier(pub String);

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Self; 4] = [Self::Free, Self::Tier1, Self::Tier2, Self::Tier3];

    /// Position in the tier order, `0..=3`.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
        }
    }

    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Free),
            1 => Some(Self::Tier1),
            2 => Some(Self::Tier2),
            3 => Some(Self::Tier3),
            _ => None,
        }
    }

    /// Fail-safe parse: anything missing or unrecognized resolves to `Free`.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    #[must_use]
    pub const fn meets_or_exceeds(self, required: Self) -> bool {
        self.level() >= required.level()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
        }
    }

    /// Marketing name shown in upgrade prompts and emails.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Tier1 => "Professional",
            Self::Tier2 => "Business",
            Self::Tier3 => "Enterprise",
        }
    }
}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "tier1" => Ok(Self::Tier1),
            "tier2" => Ok(Self::Tier2),
            "tier3" => Ok(Self::Tier3),
            other => Err(UnknownTier(other.to_owned())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level of a raw tier identifier; unknown or missing input is level 0.
#[must_use]
pub fn level_of(raw: Option<&str>) -> u8 {
    Tier::resolve(raw).level()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Upgrade,
    Downgrade,
}

impl RequestType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    /// Terminal statuses admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vendor as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRecord {
    pub id: Uuid,
    pub company_name: String,
    pub contact_email: String,
    pub slug: String,
    pub tier: Tier,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for provisioning a new vendor. Vendors always start at `free`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVendor {
    pub company_name: String,
    pub contact_email: String,
    pub slug: String,
}

/// Either a bare vendor id or an already loaded record.
///
/// Handlers pass whatever they hold; the module narrows it to a
/// [`VendorRecord`] before any tier rule runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorRef {
    Id(Uuid),
    Expanded(VendorRecord),
}

impl VendorRef {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Id(id) => *id,
            Self::Expanded(record) => record.id,
        }
    }
}

impl From<Uuid> for VendorRef {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<VendorRecord> for VendorRef {
    fn from(record: VendorRecord) -> Self {
        Self::Expanded(record)
    }
}

/// Fully resolved tier state the rules operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorTierState {
    pub vendor_id: Uuid,
    pub current_tier: Tier,
    pub is_admin: bool,
}

impl VendorTierState {
    #[must_use]
    pub const fn new(record: &VendorRecord, is_admin: bool) -> Self {
        Self {
            vendor_id: record.id,
            current_tier: record.tier,
            is_admin,
        }
    }
}

/// A vendor's request to move to another tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierChangeRequest {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub requested_by: Uuid,
    /// Vendor tier captured when the request was submitted.
    pub current_tier: Tier,
    pub requested_tier: Tier,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub vendor_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<Uuid>,
    pub requested_at: OffsetDateTime,
    pub decided_at: Option<OffsetDateTime>,
}

impl TierChangeRequest {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }
}

/// Vendor input for a tier change. `requested_tier` is kept raw so that an
/// unrecognized value is reported as a validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTierChangeRequest {
    pub requested_tier: String,
    pub request_type: RequestType,
    pub vendor_notes: Option<String>,
}

/// Admin decision on a pending request. A rejection always carries a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierDecision {
    Approve,
    Reject { reason: String },
}

impl TierDecision {
    #[must_use]
    pub const fn target_status(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject { .. } => RequestStatus::Rejected,
        }
    }
}

/// Enough of an in-flight request for a caller to reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestRef {
    pub id: Uuid,
    pub request_type: RequestType,
    pub requested_tier: Tier,
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
}

impl From<&TierChangeRequest> for PendingRequestRef {
    fn from(request: &TierChangeRequest) -> Self {
        Self {
            id: request.id,
            request_type: request.request_type,
            requested_tier: request.requested_tier,
            requested_at: request.requested_at,
        }
    }
}

/// Admin listing filter. Pages are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierRequestQuery {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub vendor_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRequestPage {
    pub items: Vec<TierChangeRequest>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}
