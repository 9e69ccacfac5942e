//! Vendor Tiers Module Implementation
//!
//! Tier access control for vendor profiles and the upgrade/downgrade request
//! workflow. The public API is defined in `vendor-tiers-sdk` and re-exported
//! here.

pub use vendor_tiers_sdk::{
    Actor, NewTierChangeRequest, NewVendor, ProfilePayload, RequestContext, RequestStatus,
    RequestType, Tier, TierChangeRequest, TierDecision, TierRequestPage, TierRequestQuery,
    VendorRecord, VendorRef, VendorTiersClientV1, VendorTiersError,
};

pub mod module;
pub use module::{VendorTiersModule, VendorTiersModuleBuilder};

pub mod config;
pub use config::VendorTiersConfig;

#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
