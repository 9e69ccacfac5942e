use async_trait::async_trait;

use super::events::TierRequestNotice;

/// Fire-and-forget sink for domain events. Must never block the caller.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Outbound email for the tier change workflow.
#[async_trait]
pub trait TierMailer: Send + Sync {
    /// Tell the admin team a vendor asked for a tier change.
    async fn send_tier_requested(&self, notice: &TierRequestNotice) -> anyhow::Result<()>;

    async fn send_tier_approved(&self, notice: &TierRequestNotice) -> anyhow::Result<()>;

    async fn send_tier_rejected(&self, notice: &TierRequestNotice) -> anyhow::Result<()>;
}
