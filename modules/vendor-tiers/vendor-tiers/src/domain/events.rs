use uuid::Uuid;
use vendor_tiers_sdk::{RequestType, Tier, TierChangeRequest, VendorRecord};

/// Everything a notification about a tier change request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRequestNotice {
    pub request_id: Uuid,
    pub vendor_id: Uuid,
    pub company_name: String,
    pub contact_email: String,
    pub current_tier: Tier,
    pub requested_tier: Tier,
    pub request_type: RequestType,
    pub vendor_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

impl TierRequestNotice {
    #[must_use]
    pub fn new(vendor: &VendorRecord, request: &TierChangeRequest) -> Self {
        Self {
            request_id: request.id,
            vendor_id: request.vendor_id,
            company_name: vendor.company_name.clone(),
            contact_email: vendor.contact_email.clone(),
            current_tier: request.current_tier,
            requested_tier: request.requested_tier,
            request_type: request.request_type,
            vendor_notes: request.vendor_notes.clone(),
            rejection_reason: request.rejection_reason.clone(),
        }
    }
}

/// Domain events emitted by the tier change workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierRequestEvent {
    Requested(TierRequestNotice),
    Approved(TierRequestNotice),
    Rejected(TierRequestNotice),
}

impl TierRequestEvent {
    #[must_use]
    pub const fn notice(&self) -> &TierRequestNotice {
        match self {
            Self::Requested(notice) | Self::Approved(notice) | Self::Rejected(notice) => notice,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Requested(_) => "requested",
            Self::Approved(_) => "approved",
            Self::Rejected(_) => "rejected",
        }
    }
}
