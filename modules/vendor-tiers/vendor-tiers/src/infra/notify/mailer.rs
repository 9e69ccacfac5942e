use async_trait::async_trait;

use crate::config::NotificationConfig;
use crate::domain::events::TierRequestNotice;
use crate::domain::ports::TierMailer;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Notice to the admin team about a new request.
    #[must_use]
    pub fn tier_requested(notice: &TierRequestNotice, from: &str, admin_email: &str) -> Self {
        let kind = capitalized(notice.request_type.as_str());
        let mut body = format!(
            "{} ({}) requested a tier {} from {} to {}.\nRequest id: {}",
            notice.company_name,
            notice.contact_email,
            notice.request_type,
            notice.current_tier.display_name(),
            notice.requested_tier.display_name(),
            notice.request_id,
        );
        if let Some(notes) = &notice.vendor_notes {
            body.push_str("\nVendor notes: ");
            body.push_str(notes);
        }
        Self {
            from: from.to_owned(),
            to: admin_email.to_owned(),
            subject: format!(
                "Tier {kind} Request: {} ({} -> {})",
                notice.company_name,
                notice.current_tier.display_name(),
                notice.requested_tier.display_name(),
            ),
            body,
        }
    }

    #[must_use]
    pub fn tier_approved(notice: &TierRequestNotice, from: &str) -> Self {
        let kind = capitalized(notice.request_type.as_str());
        Self {
            from: from.to_owned(),
            to: notice.contact_email.clone(),
            subject: format!("Your Tier {kind} Has Been Approved"),
            body: format!(
                "Hello {},\n\nYour listing has moved from {} to {}.",
                notice.company_name,
                notice.current_tier.display_name(),
                notice.requested_tier.display_name(),
            ),
        }
    }

    #[must_use]
    pub fn tier_rejected(notice: &TierRequestNotice, from: &str) -> Self {
        let kind = capitalized(notice.request_type.as_str());
        let reason = notice
            .rejection_reason
            .as_deref()
            .unwrap_or("No reason given");
        Self {
            from: from.to_owned(),
            to: notice.contact_email.clone(),
            subject: format!("Tier {kind} Request Update"),
            body: format!(
                "Hello {},\n\nYour request to move to {} was not approved.\nReason: {reason}",
                notice.company_name,
                notice.requested_tier.display_name(),
            ),
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Renders every email and writes it to the log instead of sending it.
///
/// Used when the host does not wire a real transport.
pub struct LogMailer {
    from: String,
    admin_email: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            from: config.from_address.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    fn emit(message: &MailMessage) {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email (log transport)"
        );
        tracing::debug!(body = %message.body, "Email body");
    }
}

#[async_trait]
impl TierMailer for LogMailer {
    async fn send_tier_requested(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        Self::emit(&MailMessage::tier_requested(
            notice,
            &self.from,
            &self.admin_email,
        ));
        Ok(())
    }

    async fn send_tier_approved(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        Self::emit(&MailMessage::tier_approved(notice, &self.from));
        Ok(())
    }

    async fn send_tier_rejected(&self, notice: &TierRequestNotice) -> anyhow::Result<()> {
        Self::emit(&MailMessage::tier_rejected(notice, &self.from));
        Ok(())
    }
}
