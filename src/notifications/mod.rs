//! Outbound notifications.
//!
//! Services hand a [`Notification`] to the configured
//! [`NotificationGateway`] through [`notify_best_effort`]: delivery failures
//! are logged and counted, never returned to the caller.
//!
//! - [`smtp`]: delivery through an SMTP relay
//! - [`log`]: writes the message to the log instead of sending it
//! - `recording`: keeps messages in memory (feature `test-utils`)
//! - [`templates`]: the messages the admission workflow sends

pub mod log;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;
pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::metrics::track_notification_failed;

pub use self::log::LogGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use self::recording::RecordingGateway;
pub use self::smtp::SmtpGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Sends `notification`, logging and counting a failure instead of
/// propagating it.
#[instrument(skip(gateway, notification), fields(to = %notification.to, subject = %notification.subject))]
pub async fn notify_best_effort(gateway: &dyn NotificationGateway, notification: Notification) {
    if let Err(err) = gateway.send(&notification).await {
        warn!(error = %err, "Notification delivery failed");
        track_notification_failed();
    }
}
