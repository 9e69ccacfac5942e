use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;
use vendor_tiers_sdk::{
    NewTierChangeRequest, NewVendor, PendingRequestRef, ProfilePayload, RequestContext,
    RequestStatus, RequestType, Tier, TierChangeRequest, TierDecision, TierRequestPage,
    TierRequestQuery, ValidationIssue, VendorRecord, VendorRef, VendorTierState,
};

use super::error::DomainError;
use super::events::{TierRequestEvent, TierRequestNotice};
use super::policy::TierPolicy;
use super::ports::EventPublisher;
use super::profile;
use super::repo::{
    InsertOutcome, RequestFilter, StatusTransition, TierRequestsRepository, TransitionOutcome,
    VendorsRepository,
};

pub struct ServiceConfig {
    pub notes_min_len: usize,
    pub notes_max_len: usize,
    pub rejection_reason_max_len: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            notes_min_len: 20,
            notes_max_len: 500,
            rejection_reason_max_len: 1000,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

pub struct Service {
    vendors: Arc<dyn VendorsRepository>,
    requests: Arc<dyn TierRequestsRepository>,
    events: Arc<dyn EventPublisher<TierRequestEvent>>,
    policy: Arc<TierPolicy>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        vendors: Arc<dyn VendorsRepository>,
        requests: Arc<dyn TierRequestsRepository>,
        events: Arc<dyn EventPublisher<TierRequestEvent>>,
        policy: Arc<TierPolicy>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            vendors,
            requests,
            events,
            policy,
            config,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    pub async fn provision_vendor(
        &self,
        _ctx: &RequestContext,
        new: NewVendor,
    ) -> Result<VendorRecord, DomainError> {
        let mut issues = Vec::new();
        if new.company_name.trim().is_empty() {
            issues.push(ValidationIssue::new("companyName", "Company name is required"));
        }
        if new.slug.trim().is_empty() {
            issues.push(ValidationIssue::new("slug", "Slug is required"));
        }
        if !new.contact_email.contains('@') {
            issues.push(ValidationIssue::new(
                "contactEmail",
                "Contact email must be a valid email address",
            ));
        }
        if !issues.is_empty() {
            return Err(DomainError::Validation { issues });
        }

        let now = OffsetDateTime::now_utc();
        let vendor = VendorRecord {
            id: Uuid::now_v7(),
            company_name: new.company_name,
            contact_email: new.contact_email,
            slug: new.slug,
            tier: Tier::Free,
            created_at: now,
            updated_at: now,
        };
        self.vendors.insert(vendor.clone()).await?;

        tracing::info!(vendor_id = %vendor.id, "Provisioned vendor at free tier");
        Ok(vendor)
    }

    pub async fn set_vendor_tier(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        tier: Tier,
    ) -> Result<VendorRecord, DomainError> {
        require_admin(ctx)?;

        let vendor = self
            .vendors
            .update_tier(vendor_id, tier, OffsetDateTime::now_utc())
            .await?
            .ok_or(DomainError::VendorNotFound { id: vendor_id })?;

        tracing::info!(%vendor_id, %tier, admin_id = %ctx.user_id(), "Vendor tier set directly");
        Ok(vendor)
    }

    pub async fn submit_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        input: NewTierChangeRequest,
    ) -> Result<TierChangeRequest, DomainError> {
        let vendor = self.load_vendor(vendor_id).await?;
        let requested_tier = self.validate_submission(vendor.tier, &input)?;

        let request = TierChangeRequest {
            id: Uuid::now_v7(),
            vendor_id,
            requested_by: ctx.user_id(),
            current_tier: vendor.tier,
            requested_tier,
            request_type: input.request_type,
            status: RequestStatus::Pending,
            vendor_notes: input
                .vendor_notes
                .map(|notes| notes.trim().to_owned())
                .filter(|notes| !notes.is_empty()),
            rejection_reason: None,
            decided_by: None,
            requested_at: OffsetDateTime::now_utc(),
            decided_at: None,
        };

        if let InsertOutcome::PendingExists(existing) =
            self.requests.insert_if_no_pending(request.clone()).await?
        {
            tracing::info!(
                %vendor_id,
                existing_id = %existing.id,
                request_type = %existing.request_type,
                "Rejected duplicate tier change request"
            );
            return Err(DomainError::DuplicateRequest {
                existing: PendingRequestRef::from(&existing),
            });
        }

        tracing::info!(
            request_id = %request.id,
            %vendor_id,
            current_tier = %request.current_tier,
            requested_tier = %request.requested_tier,
            request_type = %request.request_type,
            "Tier change request submitted"
        );
        self.events.publish(&TierRequestEvent::Requested(TierRequestNotice::new(
            &vendor, &request,
        )));

        Ok(request)
    }

    pub async fn decide_tier_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        decision: TierDecision,
    ) -> Result<TierChangeRequest, DomainError> {
        require_admin(ctx)?;
        if let TierDecision::Reject { reason } = &decision {
            self.validate_rejection_reason(reason)?;
        }

        let current = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(DomainError::RequestNotFound { id: request_id })?;
        if current.status.is_terminal() {
            return Err(DomainError::StateConflict {
                id: request_id,
                status: current.status,
            });
        }

        let now = OffsetDateTime::now_utc();
        let next = decision.target_status();
        let rejection_reason = match decision {
            TierDecision::Approve => None,
            TierDecision::Reject { reason } => Some(reason),
        };
        let decided = self
            .apply_transition(
                request_id,
                StatusTransition {
                    expected: RequestStatus::Pending,
                    next,
                    decided_by: Some(ctx.user_id()),
                    decided_at: Some(now),
                    rejection_reason,
                },
            )
            .await?;

        if decided.status == RequestStatus::Approved {
            let vendor = self.apply_approved_tier(&decided, now).await?;
            tracing::info!(
                %request_id,
                vendor_id = %decided.vendor_id,
                tier = %decided.requested_tier,
                "Tier change request approved"
            );
            self.events.publish(&TierRequestEvent::Approved(TierRequestNotice::new(
                &vendor, &decided,
            )));
        } else {
            tracing::info!(
                %request_id,
                vendor_id = %decided.vendor_id,
                "Tier change request rejected"
            );
            self.notify_rejected(&decided).await;
        }

        Ok(decided)
    }

    pub async fn cancel_tier_request(
        &self,
        ctx: &RequestContext,
        vendor_id: Uuid,
        request_id: Uuid,
    ) -> Result<TierChangeRequest, DomainError> {
        let current = self
            .requests
            .find_by_id(request_id)
            .await?
            .filter(|request| {
                request.vendor_id == vendor_id
                    && ctx.vendor_id().is_none_or(|own| own == vendor_id)
            })
            .ok_or(DomainError::RequestNotFound { id: request_id })?;
        if current.status.is_terminal() {
            return Err(DomainError::StateConflict {
                id: request_id,
                status: current.status,
            });
        }

        let cancelled = self
            .apply_transition(
                request_id,
                StatusTransition {
                    expected: RequestStatus::Pending,
                    next: RequestStatus::Cancelled,
                    decided_by: Some(ctx.user_id()),
                    decided_at: Some(OffsetDateTime::now_utc()),
                    rejection_reason: None,
                },
            )
            .await?;

        tracing::info!(%request_id, %vendor_id, "Tier change request cancelled");
        Ok(cancelled)
    }

    pub async fn get_tier_request(
        &self,
        _ctx: &RequestContext,
        vendor_id: Uuid,
        request_type: RequestType,
    ) -> Result<Option<TierChangeRequest>, DomainError> {
        tracing::debug!(%vendor_id, %request_type, "Looking up tier change request");
        if let Some(pending) = self.requests.find_pending(vendor_id, request_type).await? {
            return Ok(Some(pending));
        }
        Ok(self
            .requests
            .find_most_recent(vendor_id, request_type)
            .await?)
    }

    pub async fn list_tier_requests(
        &self,
        ctx: &RequestContext,
        query: TierRequestQuery,
    ) -> Result<TierRequestPage, DomainError> {
        require_admin(ctx)?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));
        let offset = u64::from(page - 1) * u64::from(limit);
        let filter = RequestFilter {
            status: query.status,
            request_type: query.request_type,
            vendor_id: query.vendor_id,
        };

        let (items, total) = self
            .requests
            .list(&filter, offset, u64::from(limit))
            .await?;
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        tracing::debug!(page, limit, total, "Listed tier change requests");
        Ok(TierRequestPage {
            items,
            total,
            page,
            total_pages,
        })
    }

    /// Gate a profile write against the vendor's tier.
    pub async fn validate_profile_update(
        &self,
        ctx: &RequestContext,
        vendor: VendorRef,
        payload: ProfilePayload,
    ) -> Result<ProfilePayload, DomainError> {
        let vendor = self.resolve_vendor(vendor).await?;
        let state = VendorTierState::new(&vendor, ctx.is_admin());

        let payload = profile::filter_fields_by_tier(
            &self.policy,
            payload,
            state.current_tier,
            state.is_admin,
        )?;

        let mut issues = Vec::new();
        if !state.is_admin {
            issues.extend(profile::check_array_limits(
                &self.policy,
                &payload,
                state.current_tier,
            ));
        }
        issues.extend(profile::check_single_headquarters(&payload));

        if issues.is_empty() {
            Ok(payload)
        } else {
            Err(DomainError::Validation { issues })
        }
    }

    #[must_use]
    pub fn project_public_profile(&self, stored: &ProfilePayload) -> ProfilePayload {
        profile::project_public_profile(&self.policy, stored)
    }

    #[must_use]
    pub fn sanitize_for_tier(&self, tier: Tier, payload: &ProfilePayload) -> ProfilePayload {
        profile::sanitize_for_tier(&self.policy, payload, tier)
    }

    #[must_use]
    pub fn downgrade_conflicts(
        &self,
        current: Tier,
        target: Tier,
        stored: &ProfilePayload,
    ) -> Vec<String> {
        profile::downgrade_conflicts(&self.policy, current, target, stored)
    }

    /// Narrow a vendor reference to a loaded record.
    async fn resolve_vendor(&self, vendor: VendorRef) -> Result<VendorRecord, DomainError> {
        match vendor {
            VendorRef::Id(id) => self.load_vendor(id).await,
            VendorRef::Expanded(record) => Ok(record),
        }
    }

    async fn load_vendor(&self, id: Uuid) -> Result<VendorRecord, DomainError> {
        self.vendors
            .find_by_id(id)
            .await?
            .ok_or(DomainError::VendorNotFound { id })
    }

    fn validate_submission(
        &self,
        current: Tier,
        input: &NewTierChangeRequest,
    ) -> Result<Tier, DomainError> {
        let mut issues = Vec::new();

        let requested = match input.requested_tier.parse::<Tier>() {
            Ok(tier) => Some(tier),
            Err(e) => {
                issues.push(ValidationIssue::new(
                    "requestedTier",
                    format!("Invalid tier: {e}"),
                ));
                None
            }
        };

        if let Some(requested) = requested {
            if requested == current {
                issues.push(ValidationIssue::new(
                    "requestedTier",
                    "Requested tier must be different from current tier",
                ));
            } else {
                match input.request_type {
                    RequestType::Upgrade if requested < current => {
                        issues.push(ValidationIssue::new(
                            "requestedTier",
                            "Requested tier must be higher than current tier for upgrades",
                        ));
                    }
                    RequestType::Downgrade if requested > current => {
                        issues.push(ValidationIssue::new(
                            "requestedTier",
                            "Requested tier must be lower than current tier for downgrades",
                        ));
                    }
                    RequestType::Upgrade | RequestType::Downgrade => {}
                }
            }
        }

        if let Some(notes) = &input.vendor_notes {
            let trimmed_len = notes.trim().chars().count();
            if trimmed_len > 0 && trimmed_len < self.config.notes_min_len {
                issues.push(ValidationIssue::new(
                    "vendorNotes",
                    format!(
                        "Vendor notes must be at least {} characters",
                        self.config.notes_min_len
                    ),
                ));
            }
            if trimmed_len > self.config.notes_max_len {
                issues.push(ValidationIssue::new(
                    "vendorNotes",
                    format!(
                        "Vendor notes must not exceed {} characters",
                        self.config.notes_max_len
                    ),
                ));
            }
        }

        match requested {
            Some(tier) if issues.is_empty() => Ok(tier),
            _ => Err(DomainError::Validation { issues }),
        }
    }

    fn validate_rejection_reason(&self, reason: &str) -> Result<(), DomainError> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation(
                "rejectionReason",
                "Rejection reason is required when rejecting a request",
            ));
        }
        if reason.chars().count() > self.config.rejection_reason_max_len {
            return Err(DomainError::validation(
                "rejectionReason",
                format!(
                    "Rejection reason must not exceed {} characters",
                    self.config.rejection_reason_max_len
                ),
            ));
        }
        Ok(())
    }

    async fn apply_transition(
        &self,
        request_id: Uuid,
        transition: StatusTransition,
    ) -> Result<TierChangeRequest, DomainError> {
        match self.requests.transition(request_id, transition).await? {
            TransitionOutcome::Applied(request) => Ok(request),
            TransitionOutcome::Conflict(status) => Err(DomainError::StateConflict {
                id: request_id,
                status,
            }),
            TransitionOutcome::NotFound => Err(DomainError::RequestNotFound { id: request_id }),
        }
    }

    /// Move the vendor to the approved tier, reverting the request to
    /// `pending` if that fails.
    async fn apply_approved_tier(
        &self,
        request: &TierChangeRequest,
        at: OffsetDateTime,
    ) -> Result<VendorRecord, DomainError> {
        let err = match self
            .vendors
            .update_tier(request.vendor_id, request.requested_tier, at)
            .await
        {
            Ok(Some(vendor)) => return Ok(vendor),
            Ok(None) => DomainError::VendorNotFound {
                id: request.vendor_id,
            },
            Err(e) => DomainError::Repository(e),
        };

        let revert = StatusTransition {
            expected: RequestStatus::Approved,
            next: RequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            rejection_reason: None,
        };
        match self.requests.transition(request.id, revert).await {
            Ok(TransitionOutcome::Applied(_)) => {
                tracing::warn!(
                    request_id = %request.id,
                    vendor_id = %request.vendor_id,
                    "Vendor tier update failed, request returned to pending"
                );
            }
            Ok(TransitionOutcome::Conflict(status)) => {
                tracing::error!(
                    request_id = %request.id,
                    %status,
                    "Could not return request to pending after failed tier update"
                );
            }
            Ok(TransitionOutcome::NotFound) => {
                tracing::error!(
                    request_id = %request.id,
                    "Request vanished before it could be returned to pending"
                );
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request.id,
                    error = %e,
                    "Could not return request to pending after failed tier update"
                );
            }
        }

        Err(err)
    }

    async fn notify_rejected(&self, request: &TierChangeRequest) {
        match self.vendors.find_by_id(request.vendor_id).await {
            Ok(Some(vendor)) => {
                self.events.publish(&TierRequestEvent::Rejected(TierRequestNotice::new(
                    &vendor, request,
                )));
            }
            Ok(None) => {
                tracing::warn!(
                    request_id = %request.id,
                    vendor_id = %request.vendor_id,
                    "Vendor missing, rejection notice not sent"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.id,
                    error = %e,
                    "Vendor lookup failed, rejection notice not sent"
                );
            }
        }
    }
}

fn require_admin(ctx: &RequestContext) -> Result<(), DomainError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
