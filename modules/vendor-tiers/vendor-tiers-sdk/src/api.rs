//! `VendorTiersClientV1` trait definition.
//!
//! This trait defines the public API for the vendor-tiers module (Version 1).
//! Every stateful method takes a [`RequestContext`] resolved by the
//! authorization layer.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::errors::VendorTiersError;
use crate::models::{
    NewTierChangeRequest, NewVendor, ProfilePayload, RequestType, Tier, TierChangeRequest,
    TierDecision, TierRequestPage, TierRequestQuery, VendorRecord, VendorRef,
};

/// Public API trait for the vendor-tiers module (Version 1).
#[async_trait]
pub trait VendorTiersClientV1: Send + Sync {
    /// Store a new vendor at the `free` tier.
    async fn provision_vendor(
        &self,
        ctx: &RequestContext,
        vendor: NewVendor,
    ) -> Result<VendorRecord, VendorTiersError>;

    /// Direct tier edit. Admin only.
    async fn set_vendor_tier(
        &self,
        ctx: &RequestContext,
        vendor_id: uuid::Uuid,
        tier: Tier,
    ) -> Result<VendorRecord, VendorTiersError>;

    /// Submit an upgrade or downgrade request for a vendor.
    async fn submit_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: uuid::Uuid,
        request: NewTierChangeRequest,
    ) -> Result<TierChangeRequest, VendorTiersError>;

    /// Approve or reject a pending request. Admin only.
    async fn decide_tier_request(
        &self,
        ctx: &RequestContext,
        request_id: uuid::Uuid,
        decision: TierDecision,
    ) -> Result<TierChangeRequest, VendorTiersError>;

    /// Withdraw a pending request.
    async fn cancel_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: uuid::Uuid,
        request_id: uuid::Uuid,
    ) -> Result<TierChangeRequest, VendorTiersError>;

    /// The pending request of this type, else the most recent one, else `None`.
    async fn get_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: uuid::Uuid,
        request_type: RequestType,
    ) -> Result<Option<TierChangeRequest>, VendorTiersError>;

    /// Paged listing for the admin queue. Admin only.
    async fn list_tier_requests(
        &self,
        ctx: &RequestContext,
        query: TierRequestQuery,
    ) -> Result<TierRequestPage, VendorTiersError>;

    /// Validation gate in front of a profile write.
    ///
    /// Returns the payload unchanged when it is acceptable for the vendor's
    /// tier (or the caller is an admin); otherwise fails listing every
    /// restricted field or limit violation.
    async fn validate_profile_update(
        &self,
        ctx: &RequestContext,
        vendor: VendorRef,
        payload: ProfilePayload,
    ) -> Result<ProfilePayload, VendorTiersError>;

    /// Public projection of a stored profile, keyed by the profile's own `tier`.
    fn project_public_profile(&self, profile: &ProfilePayload) -> ProfilePayload;

    /// Copy of `payload` without the keys `tier` cannot access. Never fails.
    fn sanitize_for_tier(&self, tier: Tier, payload: &ProfilePayload) -> ProfilePayload;

    /// Coarse capability check; unknown features are never accessible.
    fn can_access_feature(&self, tier: Tier, feature: &str) -> bool;

    /// Lowest tier unlocking `feature`, for upgrade prompts.
    fn upgrade_path(&self, feature: &str) -> Option<Tier>;

    /// Every feature unlocked at `tier`, sorted by name.
    fn features_for(&self, tier: Tier) -> Vec<String>;

    /// Human-readable list of what a downgrade from `current` to `target`
    /// would take away from this profile. Advisory.
    fn downgrade_conflicts(
        &self,
        current: Tier,
        target: Tier,
        profile: &ProfilePayload,
    ) -> Vec<String>;
}
