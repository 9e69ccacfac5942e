//! Best-effort delivery of tier workflow emails.
//!
//! The service publishes [`TierRequestEvent`]s into an unbounded channel and
//! returns immediately; [`NotificationDispatcher`] drains the channel on its
//! own task and owns retries, timeouts and failure logging.
//!
//! [`TierRequestEvent`]: crate::domain::events::TierRequestEvent

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{ChannelEventPublisher, NotificationDispatcher, notification_channel};
pub use mailer::{LogMailer, MailMessage};
