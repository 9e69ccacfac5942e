use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use vendor_tiers_sdk::{
    NewTierChangeRequest, NewVendor, ProfilePayload, RequestContext, RequestType, Tier,
    TierChangeRequest, TierDecision, TierRequestPage, TierRequestQuery, VendorRecord, VendorRef,
    VendorTiersClientV1, VendorTiersError,
};

use super::service::Service;

/// In-process implementation of [`VendorTiersClientV1`].
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl VendorTiersClientV1 for LocalClient {
    async fn provision_vendor(
        &self,
        ctx: &RequestContext,
        vendor: NewVendor,
    ) -> Result<VendorRecord, VendorTiersError> {
        self.service
            .provision_vendor(ctx, vendor)
            .await
            .map_err(Into::into)
    }

    async fn set_vendor_tier(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        tier: Tier,
    ) -> Result<VendorRecord, VendorTiersError> {
        self.service
            .set_vendor_tier(ctx, vendor_id, tier)
            .await
            .map_err(Into::into)
    }

    async fn submit_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request: NewTierChangeRequest,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        self.service
            .submit_tier_request(ctx, vendor_id, request)
            .await
            .map_err(Into::into)
    }

    async fn decide_tier_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        decision: TierDecision,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        self.service
            .decide_tier_request(ctx, request_id, decision)
            .await
            .map_err(Into::into)
    }

    async fn cancel_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request_id: Uuid,
    ) -> Result<TierChangeRequest, VendorTiersError> {
        self.service
            .cancel_tier_request(ctx, vendor_id, request_id)
            .await
            .map_err(Into::into)
    }

    async fn get_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> Result<Option<TierChangeRequest>, VendorTiersError> {
        self.service
            .get_tier_request(ctx, vendor_id, request_type)
            .await
            .map_err(Into::into)
    }

    async fn list_tier_requests(
        &self,
        ctx: &RequestContext,
        query: TierRequestQuery,
    ) -> Result<TierRequestPage, VendorTiersError> {
        self.service
            .list_tier_requests(ctx, query)
            .await
            .map_err(Into::into)
    }

    async fn validate_profile_update(
        &self,
        ctx: &RequestContext,
        vendor: VendorRef,
        payload: ProfilePayload,
    ) -> Result<ProfilePayload, VendorTiersError> {
        self.service
            .validate_profile_update(ctx, vendor, payload)
            .await
            .map_err(Into::into)
    }

    fn project_public_profile(&self, profile: &ProfilePayload) -> ProfilePayload {
        self.service.project_public_profile(profile)
    }

    fn sanitize_for_tier(&self, tier: Tier, payload: &ProfilePayload) -> ProfilePayload {
        self.service.sanitize_for_tier(tier, payload)
    }

    fn can_access_feature(&self, tier: Tier, feature: &str) -> bool {
        self.service.policy().features.can_access(tier, feature)
    }

    fn upgrade_path(&self, feature: &str) -> Option<Tier> {
        self.service.policy().features.upgrade_path(feature)
    }

    fn features_for(&self, tier: Tier) -> Vec<String> {
        self.service
            .policy()
            .features
            .features_for(tier)
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    fn downgrade_conflicts(
        &self,
        current: Tier,
        target: Tier,
        profile: &ProfilePayload,
    ) -> Vec<String> {
        self.service.downgrade_conflicts(current, target, profile)
    }
}
