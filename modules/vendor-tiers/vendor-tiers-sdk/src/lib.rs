//! Vendor tiers SDK
//!
//! This crate provides the public API for the vendor-tiers module:
//! - `VendorTiersClientV1` trait for the handler layer
//! - Model types (`Tier`, `TierChangeRequest`, `VendorRecord`, ...)
//! - Caller context (`RequestContext`, `Actor`)
//! - Error type (`VendorTiersError`) and its structured body (`ErrorBody`)

#![forbid(unsafe_code)]

pub mod api;
pub mod context;
pub mod errors;
pub mod models;

pub use api::VendorTiersClientV1;
pub use context::{Actor, RequestContext};
pub use errors::{ErrorBody, ValidationIssue, VendorTiersError};
pub use models::{
    NewTierChangeRequest, NewVendor, PendingRequestRef, ProfilePayload, RequestStatus,
    RequestType, Tier, TierChangeRequest, TierDecision, TierRequestPage, TierRequestQuery,
    UnknownTier, VendorRecord, VendorRef, VendorTierState, level_of,
};
