use uuid::Uuid;
use vendor_tiers_sdk::{PendingRequestRef, RequestStatus, Tier, ValidationIssue, VendorTiersError};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation failed")]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Fields {} are not accessible for {tier} tier", .fields.join(", "))]
    TierRestricted { tier: Tier, fields: Vec<String> },

    #[error("Vendor already has a pending tier {} request", .existing.request_type)]
    DuplicateRequest { existing: PendingRequestRef },

    #[error("Vendor not found: {id}")]
    VendorNotFound { id: Uuid },

    #[error("Tier change request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("Tier change request {id} is already {status}")]
    StateConflict { id: Uuid, status: RequestStatus },

    #[error("Operation requires an administrator")]
    Forbidden,

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            issues: vec![ValidationIssue::new(field, message)],
        }
    }
}

impl From<DomainError> for VendorTiersError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { issues } => Self::validation(issues),
            DomainError::TierRestricted { tier, fields } => Self::TierRestricted { tier, fields },
            DomainError::DuplicateRequest { existing } => Self::DuplicateRequest { existing },
            DomainError::VendorNotFound { id } => Self::VendorNotFound { id },
            DomainError::RequestNotFound { id } => Self::RequestNotFound { id },
            DomainError::StateConflict { id, status } => Self::StateConflict { id, status },
            DomainError::Forbidden => Self::Forbidden,
            DomainError::Repository(e) => {
                tracing::error!(error = %e, "vendor tiers repository failure");
                Self::internal()
            }
        }
    }
}
