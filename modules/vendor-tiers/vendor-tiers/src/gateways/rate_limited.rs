//! Client decorator that throttles tier change submissions per caller.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use vendor_tiers_sdk::{
    NewTierChangeRequest, NewVendor, ProfilePayload, RequestContext, RequestType, Tier,
    TierChangeRequest, TierDecision, TierRequestPage, TierRequestQuery, VendorRecord, VendorRef,
    VendorTiersClientV1, VendorTiersError,
};

use crate::infra::rate_limit::SubmitRateLimiter;

/// Gates `submit_tier_request` by [`RequestContext::client_key`]. An
/// over-limit call never reaches the inner client. Every other method is
/// passed through.
pub struct RateLimitedClient {
    inner: Arc<dyn VendorTiersClientV1>,
    limiter: Arc<SubmitRateLimiter>,
}

impl RateLimitedClient {
    #[must_use]
    pub fn new(inner: Arc<dyn VendorTiersClientV1>, limiter: Arc<SubmitRateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl VendorTiersClientV1 for RateLimitedClient {
    async fn provision_vendor(
        &self,
        ctx: &RequestContext,
        vendor: NewVendor,
    ) -> Result<VendorRecord, VendorTiersError> {
        self.inner.provision_vendor(ctx, vendor).await
    }

    async fn set_vendor_tier(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        tier: Tier,
    ) -> Result<VendorRecord, VendorTiersError> {
        self.inner.set_vendor_tier(ctx, vendor_id, tier).await
    }

    async fn submit_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request: NewTierChangeRequest,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        if ctx.client_key().is_empty() {
            tracing::warn!(
                %vendor_id,
                "Tier change submission without a client key shares the anonymous rate limit bucket"
            );
        }
        if let Err(retry_after) = self.limiter.check(ctx.client_key()) {
            tracing::warn!(
                client_key = ctx.client_key(),
                %vendor_id,
                retry_after_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
                "Tier change submission rate limited"
            );
            return Err(VendorTiersError::RateLimited { retry_after });
        }
        self.inner.submit_tier_request(ctx, vendor_id, request).await
    }

    async fn decide_tier_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        decision: TierDecision,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        self.inner.decide_tier_request(ctx, request_id, decision).await
    }

    async fn cancel_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request_id: Uuid,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        self.inner
            .cancel_tier_request(ctx, vendor_id, request_id)
            .await
    }

    async fn get_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> Result<Option<TierChangeRequest>, VendorTiersError> {
        self.inner
            .get_tier_request(ctx, vendor_id, request_type)
            .await
    }

    async fn list_tier_requests(
        &self,
        ctx: &RequestContext,
        query: TierRequestQuery,
    ) -> Result<TierRequestPage, VendorTiersError> {
        self.inner.list_tier_requests(ctx, query).await
    }

    async fn validate_profile_update(
        &self,
        ctx: &RequestContext,
        vendor: VendorRef,
        payload: ProfilePayload,
    ) -> Result<ProfilePayload, VendorTiersError> {
        self.inner
            .validate_profile_update(ctx, vendor, payload)
            .await
    }

    fn project_public_profile(&self, profile: &ProfilePayload) -> ProfilePayload {
        self.inner.project_public_profile(profile)
    }

    fn sanitize_for_tier(&self, tier: Tier, payload: &ProfilePayload) -> ProfilePayload {
        self.inner.sanitize_for_tier(tier, payload)
    }

    fn can_access_feature(&self, tier: Tier, feature: &str) -> bool {
        self.inner.can_access_feature(tier, feature)
    }

    fn upgrade_path(&self, feature: &str) -> Option<Tier> {
        self.inner.upgrade_path(feature)
    }

    fn features_for(&self, tier: Tier) -> Vec<String> {
        self.inner.features_for(tier)
    }

    fn downgrade_conflicts(
        &self,
        current: Tier,
        target: Tier,
        profile: &ProfilePayload,
    ) -> Vec<String> {
        self.inner.downgrade_conflicts(current, target, profile)
    }
}
