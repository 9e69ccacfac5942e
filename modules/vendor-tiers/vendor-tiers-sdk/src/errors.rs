//! Public error types for the `vendor_tiers` module.
//!
//! Every variant is an expected, user-facing outcome. [`VendorTiersError::to_body`]
//! turns it into structured data (code + message + details) for the handler
//! layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PendingRequestRef, RequestStatus, Tier};

/// One problem found while validating input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorTiersError {
    /// Input was malformed or semantically invalid. Carries every issue found.
    #[error("Validation failed: {}", join_issues(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    /// The payload touched fields the tier cannot access.
    #[error("Fields {} are not accessible for {tier} tier", .fields.join(", "))]
    TierRestricted { tier: Tier, fields: Vec<String> },

    /// A pending request of the same type already exists for the vendor.
    #[error("Vendor already has a pending tier {} request", .existing.request_type)]
    DuplicateRequest { existing: PendingRequestRef },

    #[error("Vendor not found: {id}")]
    VendorNotFound { id: Uuid },

    #[error("Tier change request not found: {id}")]
    RequestNotFound { id: Uuid },

    /// The request already left `pending`.
    #[error("Tier change request {id} is already {status}")]
    StateConflict { id: Uuid, status: RequestStatus },

    #[error("Too many requests, retry after {}s", secs_of(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("Operation requires an administrator")]
    Forbidden,

    #[error("Internal error")]
    Internal,
}

/// Serializable error representation: stable code, message, optional details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl VendorTiersError {
    #[must_use]
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation { issues }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::TierRestricted { .. } => "TIER_RESTRICTED",
            Self::DuplicateRequest { .. } => "DUPLICATE_REQUEST",
            Self::VendorNotFound { .. } => "VENDOR_NOT_FOUND",
            Self::RequestNotFound { .. } => "REQUEST_NOT_FOUND",
            Self::StateConflict { .. } => "STATE_CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the handler layer should answer with.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::TierRestricted { .. } | Self::Forbidden => 403,
            Self::VendorNotFound { .. } | Self::RequestNotFound { .. } => 404,
            Self::DuplicateRequest { .. } | Self::StateConflict { .. } => 409,
            Self::RateLimited { .. } => 429,
            Self::Internal => 500,
        }
    }

    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            Self::Validation { issues } => Some(json!({ "issues": issues })),
            Self::TierRestricted { tier, fields } => Some(json!({
                "tier": tier,
                "restrictedFields": fields,
            })),
            Self::DuplicateRequest { existing } => serde_json::to_value(existing)
                .ok()
                .map(|existing| json!({ "existingRequest": existing })),
            Self::VendorNotFound { id } | Self::RequestNotFound { id } => {
                Some(json!({ "id": id }))
            }
            Self::StateConflict { id, status } => Some(json!({ "id": id, "status": status })),
            Self::RateLimited { retry_after } => Some(json!({
                "retryAfterSeconds": retry_after_secs(*retry_after),
            })),
            Self::Forbidden | Self::Internal => None,
        };

        ErrorBody {
            code: self.code().to_owned(),
            message: self.to_string(),
            details,
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn secs_of(retry_after: &Duration) -> u64 {
    retry_after_secs(*retry_after)
}

/// Whole seconds, rounded up so a client never retries early.
#[must_use]
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
