use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::NotificationConfig;
use crate::domain::events::TierRequestEvent;
use crate::domain::ports::{EventPublisher, TierMailer};

/// Publisher half of the notification channel.
#[derive(Clone)]
pub struct ChannelEventPublisher {
    tx: mpsc::UnboundedSender<TierRequestEvent>,
}

impl EventPublisher<TierRequestEvent> for ChannelEventPublisher {
    fn publish(&self, event: &TierRequestEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::warn!(
                request_id = %event.notice().request_id,
                kind = event.kind(),
                "Notification dispatcher is gone, event dropped"
            );
        }
    }
}

#[must_use]
pub fn notification_channel() -> (
    ChannelEventPublisher,
    mpsc::UnboundedReceiver<TierRequestEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelEventPublisher { tx }, rx)
}

/// Consumes workflow events and sends the matching email.
pub struct NotificationDispatcher {
    mailer: Arc<dyn TierMailer>,
    config: NotificationConfig,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(mailer: Arc<dyn TierMailer>, config: NotificationConfig) -> Self {
        Self { mailer, config }
    }

    /// Run until cancelled or every publisher is dropped. Events already
    /// queued at cancellation are still delivered.
    pub fn spawn(
        self,
        mut events: mpsc::UnboundedReceiver<TierRequestEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        while let Ok(event) = events.try_recv() {
                            self.deliver(&event).await;
                        }
                        tracing::debug!("notification dispatcher cancelled");
                        break;
                    }

                    next = events.recv() => {
                        let Some(event) = next else {
                            tracing::debug!("notification channel closed");
                            break;
                        };
                        self.deliver(&event).await;
                    }
                }
            }
        })
    }

    /// Send one event, retrying on failure. Never returns an error; the
    /// result reports whether the email went out.
    pub async fn deliver(&self, event: &TierRequestEvent) -> bool {
        let request_id = event.notice().request_id;
        if !self.config.enabled {
            tracing::debug!(
                %request_id,
                kind = event.kind(),
                "Notifications disabled, event dropped"
            );
            return false;
        }

        let attempts = self.config.max_attempts.max(1);
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.config.send_timeout, self.send(event)).await {
                Ok(Ok(())) => {
                    tracing::debug!(%request_id, kind = event.kind(), attempt, "Notification sent");
                    return true;
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        %request_id,
                        kind = event.kind(),
                        attempt,
                        error = %e,
                        "Notification send failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        %request_id,
                        kind = event.kind(),
                        attempt,
                        "Notification send timed out"
                    );
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        tracing::warn!(
            %request_id,
            kind = event.kind(),
            attempts,
            "Giving up on notification"
        );
        false
    }

    async fn send(&self, event: &TierRequestEvent) -> anyhow::Result<()> {
        match event {
            TierRequestEvent::Requested(notice) => self.mailer.send_tier_requested(notice).await,
            TierRequestEvent::Approved(notice) => self.mailer.send_tier_approved(notice).await,
            TierRequestEvent::Rejected(notice) => self.mailer.send_tier_rejected(notice).await,
        }
    }
}
