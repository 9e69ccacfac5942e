#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the tier change workflow through the public client.
//!
//! Each test starts a full module (in-memory store, notification dispatcher,
//! optional rate limiter) and drives it only through `VendorTiersClientV1`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;
use vendor_tiers::config::{NotificationConfig, RateLimitConfig};
use tokio_util::sync::CancellationToken;
use vendor_tiers::domain::events::TierRequestNotice;
use vendor_tiers::domain::policy::{
    ArrayLimitRule, ArrayLimitTable, FeatureTable, FieldAccessTable, Limit, Projection, TierPolicy,
};
use vendor_tiers::domain::ports::TierMailer;
use vendor_tiers::{
    NewTierChangeRequest, NewVendor, ProfilePayload, RequestContext, RequestStatus, RequestType,
    Tier, TierDecision, VendorRecord, VendorTiersClientV1, VendorTiersConfig, VendorTiersError,
    VendorTiersModule,
};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(&'static str, TierRequestNotice)>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<(&'static str, TierRequestNotice)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl TierMailer for RecordingMailer {
    async fn send_tier_requested(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        self.sent.lock().push(("requested", notice.clone()));
        Ok(())
    }

    async fn send_tier_approved(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        self.sent.lock().push(("approved", notice.clone()));
        Ok(())
    }

    async fn send_tier_rejected(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        self.sent.lock().push(("rejected", notice.clone()));
        Ok(())
    }
}

fn quiet_config() -> VendorTiersConfig {
    VendorTiersConfig {
        rate_limit: RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        },
        notifications: NotificationConfig {
            retry_delay: Duration::from_millis(1),
            ..NotificationConfig::default()
        },
        ..VendorTiersConfig::default()
    }
}

fn start(config: VendorTiersConfig) -> (VendorTiersModule, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let module = VendorTiersModule::builder(config)
        .with_mailer(mailer.clone())
        .start()
        .unwrap();
    (module, mailer)
}

async fn provision(client: &dyn VendorTiersClientV1, admin: &RequestContext) -> VendorRecord {
    client
        .provision_vendor(
            admin,
            NewVendor {
                company_name: "Bluewater Yachts".to_owned(),
                contact_email: "sales@bluewater.test".to_owned(),
                slug: "bluewater-yachts".to_owned(),
            },
        )
        .await
        .unwrap()
}

fn profile(value: serde_json::Value) -> ProfilePayload {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_upgrade_approval_moves_tier_and_notifies_vendor() {
    // Arrange
    let (module, mailer) = start(quiet_config());
    let client = module.client();
    let admin = RequestContext::admin(Uuid::new_v4());
    let vendor = provision(client.as_ref(), &admin).await;
    let owner = RequestContext::vendor(Uuid::new_v4(), vendor.id);

    // Act
    let request = client
        .submit_tier_request(
            &owner,
            vendor.id,
            NewTierChangeRequest {
                requested_tier: "tier2".to_owned(),
                request_type: RequestType::Upgrade,
                vendor_notes: Some("need more media slots".to_owned()),
            },
        )
        .await
        .unwrap();
    let approved = client
        .decide_tier_request(&admin, request.id, TierDecision::Approve)
        .await
        .unwrap();
    module.shutdown().await;

    // Assert
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.current_tier, Tier::Free);
    assert_eq!(approved.requested_tier, Tier::Tier2);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "requested");
    assert_eq!(
        sent[0].1.vendor_notes.as_deref(),
        Some("need more media slots")
    );
    let (kind, notice) = &sent[1];
    assert_eq!(*kind, "approved");
    assert_eq!(notice.company_name, "Bluewater Yachts");
    assert_eq!(notice.contact_email, "sales@bluewater.test");
    assert_eq!(notice.current_tier, Tier::Free);
    assert_eq!(notice.requested_tier, Tier::Tier2);
}

#[tokio::test]
async fn test_downgrade_rejection_keeps_tier_and_stores_reason() {
    let (module, mailer) = start(quiet_config());
    let client = module.client();
    let admin = RequestContext::admin(Uuid::new_v4());
    let vendor = provision(client.as_ref(), &admin).await;
    client
        .set_vendor_tier(&admin, vendor.id, Tier::Tier2)
        .await
        .unwrap();
    let owner = RequestContext::vendor(Uuid::new_v4(), vendor.id);

    let request = client
        .submit_tier_request(
            &owner,
            vendor.id,
            NewTierChangeRequest {
                requested_tier: "free".to_owned(),
                request_type: RequestType::Downgrade,
                vendor_notes: None,
            },
        )
        .await
        .unwrap();
    let rejected = client
        .decide_tier_request(
            &admin,
            request.id,
            TierDecision::Reject {
                reason: "pending overdue payment".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("pending overdue payment")
    );

    let latest = client
        .get_tier_request(&owner, vendor.id, RequestType::Downgrade)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, request.id);
    assert_eq!(latest.status, RequestStatus::Rejected);

    // A tier2 field is still writable, so the vendor is still at tier2.
    let still_tier2 = client
        .validate_profile_update(
            &owner,
            vendor.id.into(),
            profile(json!({ "locations": [{ "city": "Antibes" }] })),
        )
        .await;
    assert!(still_tier2.is_ok());

    module.shutdown().await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].0, "rejected");
    assert_eq!(
        sent[1].1.rejection_reason.as_deref(),
        Some("pending overdue payment")
    );
}

#[tokio::test]
async fn test_submissions_are_rate_limited_per_client() {
    let config = VendorTiersConfig {
        rate_limit: RateLimitConfig {
            max_requests: 1,
            ..RateLimitConfig::default()
        },
        ..quiet_config()
    };
    let (module, _mailer) = start(config);
    let client = module.client();
    let admin = RequestContext::admin(Uuid::new_v4());
    let first = provision(client.as_ref(), &admin).await;
    let second = provision(client.as_ref(), &admin).await;
    let upgrade = || NewTierChangeRequest {
        requested_tier: "tier1".to_owned(),
        request_type: RequestType::Upgrade,
        vendor_notes: None,
    };

    let ctx = |vendor_id| {
        RequestContext::vendor(Uuid::new_v4(), vendor_id).with_client_key("203.0.113.7")
    };
    client
        .submit_tier_request(&ctx(first.id), first.id, upgrade())
        .await
        .unwrap();
    let err = client
        .submit_tier_request(&ctx(second.id), second.id, upgrade())
        .await
        .unwrap_err();

    match err {
        VendorTiersError::RateLimited { retry_after } => assert!(retry_after > Duration::ZERO),
        other => panic!("expected rate limit, got {other}"),
    }

    let other_client = RequestContext::vendor(Uuid::new_v4(), second.id)
        .with_client_key("198.51.100.20");
    client
        .submit_tier_request(&other_client, second.id, upgrade())
        .await
        .unwrap();

    module.shutdown().await;
}

#[tokio::test]
async fn test_policy_queries_through_client() {
    let (module, _mailer) = start(quiet_config());
    let client = module.client();

    assert!(client.can_access_feature(Tier::Tier1, "media-gallery"));
    assert!(!client.can_access_feature(Tier::Free, "media-gallery"));
    assert!(!client.can_access_feature(Tier::Tier3, "teleportation"));
    assert_eq!(client.upgrade_path("apiAccess"), Some(Tier::Tier2));
    assert_eq!(client.upgrade_path("teleportation"), None);
    assert!(client.features_for(Tier::Free).is_empty());
    assert_eq!(
        client.features_for(Tier::Tier1),
        vec!["enhancedProfile", "media-gallery", "multipleLocations"]
    );
    assert_eq!(client.features_for(Tier::Tier3).len(), 10);

    let stored = profile(json!({
        "id": "v-1",
        "tier": "free",
        "companyName": "Bluewater Yachts",
        "website": "https://bluewater.test",
        "locations": [
            { "city": "Fort Lauderdale", "isHQ": false },
            { "city": "Miami", "isHQ": true },
        ],
    }));
    let public = client.project_public_profile(&stored);
    assert_eq!(public.get("companyName"), stored.get("companyName"));
    assert!(public.get("website").is_none());
    assert_eq!(public["locations"], json!([{ "city": "Miami", "isHQ": true }]));

    let conflicts = client.downgrade_conflicts(Tier::Tier1, Tier::Free, &stored);
    assert_eq!(conflicts.len(), 2);

    module.shutdown().await;
}

fn reduced_policy() -> TierPolicy {
    let fields =
        FieldAccessTable::from_additions([&["companyName"], &["website", "media"], &[], &[]])
            .unwrap();
    let media = ArrayLimitRule::new(
        "media",
        [
            Limit::Capped(1),
            Limit::Capped(2),
            Limit::Capped(2),
            Limit::Unbounded,
        ],
        Projection::FirstN,
    )
    .unwrap();
    TierPolicy::new(
        fields,
        ArrayLimitTable::new().with_rule("media", media),
        FeatureTable::new([("chat", Tier::Tier1)]),
    )
}

#[tokio::test]
async fn test_substituted_policy_drives_every_rule() {
    let mailer = Arc::new(RecordingMailer::default());
    let module = VendorTiersModule::builder(quiet_config())
        .with_policy(reduced_policy())
        .with_mailer(mailer)
        .start()
        .unwrap();
    let client = module.client();
    let admin = RequestContext::admin(Uuid::new_v4());
    let vendor = provision(client.as_ref(), &admin).await;
    client
        .set_vendor_tier(&admin, vendor.id, Tier::Tier1)
        .await
        .unwrap();
    let owner = RequestContext::vendor(Uuid::new_v4(), vendor.id);

    let ok = client
        .validate_profile_update(
            &owner,
            vendor.id.into(),
            profile(json!({ "website": "https://bluewater.test" })),
        )
        .await;
    assert!(ok.is_ok());

    // Standard tier1 field, absent from the reduced table.
    let err = client
        .validate_profile_update(
            &owner,
            vendor.id.into(),
            profile(json!({ "description": "Yachts" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VendorTiersError::TierRestricted { ref fields, .. } if fields == &["description"]
    ));

    let err = client
        .validate_profile_update(
            &owner,
            vendor.id.into(),
            profile(json!({ "media": [1, 2, 3] })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VendorTiersError::Validation { .. }));

    assert!(client.can_access_feature(Tier::Tier1, "chat"));
    assert!(!client.can_access_feature(Tier::Tier3, "media-gallery"));
    assert_eq!(client.features_for(Tier::Tier1), vec!["chat"]);

    module.shutdown().await;
}

#[tokio::test]
async fn test_parent_cancellation_stops_module_after_flushing_notices() {
    let parent = CancellationToken::new();
    let mailer = Arc::new(RecordingMailer::default());
    let module = VendorTiersModule::builder(quiet_config())
        .with_mailer(mailer.clone())
        .with_cancellation(parent.clone())
        .start()
        .unwrap();
    let client = module.client();
    let admin = RequestContext::admin(Uuid::new_v4());
    let vendor = provision(client.as_ref(), &admin).await;
    client
        .submit_tier_request(
            &RequestContext::vendor(Uuid::new_v4(), vendor.id),
            vendor.id,
            NewTierChangeRequest {
                requested_tier: "tier1".to_owned(),
                request_type: RequestType::Upgrade,
                vendor_notes: None,
            },
        )
        .await
        .unwrap();

    parent.cancel();
    tokio::time::timeout(Duration::from_secs(5), module.shutdown())
        .await
        .unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "requested");
}

#[test]
fn test_zero_sweep_interval_is_rejected_at_start() {
    let config = VendorTiersConfig {
        rate_limit: RateLimitConfig {
            sweep_interval: Duration::ZERO,
            ..RateLimitConfig::default()
        },
        ..VendorTiersConfig::default()
    };

    let err = VendorTiersModule::builder(config).start().err().unwrap();

    assert!(err.to_string().contains("sweep_interval"));
}
