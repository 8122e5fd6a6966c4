use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use matricula_config::EmailConfig;

use super::{Notification, NotificationError, NotificationGateway};

pub struct SmtpGateway {
    config: EmailConfig,
}

impl SmtpGateway {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotificationError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(from.parse().map_err(|e| NotificationError::Address {
                address: from.clone(),
                reason: format!("{}", e),
            })?)
            .to(notification
                .to
                .parse()
                .map_err(|e| NotificationError::Address {
                    address: notification.to.clone(),
                    reason: format!("{}", e),
                })?)
            .subject(notification.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(notification.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(notification.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, NotificationError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| NotificationError::Delivery(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl NotificationGateway for SmtpGateway {
    #[instrument(skip(self, notification), fields(to = %notification.to))]
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let email = self.build_message(notification)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| NotificationError::Delivery(format!("Task join error: {}", e)))?
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        Ok(())
    }
}
