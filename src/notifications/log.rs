use async_trait::async_trait;
use tracing::info;

use super::{Notification, NotificationError, NotificationGateway};

/// Used when SMTP is disabled: the message is logged, not delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogGateway;

#[async_trait]
impl NotificationGateway for LogGateway {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "Email delivery disabled, notification logged"
        );
        Ok(())
    }
}
