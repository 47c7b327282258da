/**
 * Outbound Email Dispatch
 *
 * This module wraps the SMTP transport used to deliver verification codes.
 *
 * # Development Mode
 *
 * When SMTP credentials are not configured the mailer runs in log-only
 * mode: messages are written to the log instead of being sent, so the
 * full verification flow works locally without a mail account.
 */

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::server::config::SmtpConfig;

/// Email templates
pub mod templates;

/// Email dispatch failure
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Asynchronous SMTP mailer
///
/// Cheap to clone; the underlying transport pools connections.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    platform_name: String,
}

impl Mailer {
    /// Build a mailer from SMTP configuration
    ///
    /// `smtp` being `None` selects log-only mode.
    pub fn new(smtp: Option<&SmtpConfig>, platform_name: &str) -> Result<Self, MailError> {
        let (transport, from) = match smtp {
            Some(config) => {
                let creds = Credentials::new(config.user.clone(), config.pass.clone());
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
                    .credentials(creds)
                    .build();
                let from: Mailbox = config.user.parse()?;
                (Some(transport), Some(from))
            }
            None => {
                tracing::warn!("SMTP not configured; emails will be logged instead of sent");
                (None, None)
            }
        };

        Ok(Self {
            transport,
            from,
            platform_name: platform_name.to_string(),
        })
    }

    /// Platform name used in message subjects and bodies
    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    /// Send an HTML email
    ///
    /// In log-only mode the message body is logged at debug level and the
    /// call succeeds.
    pub async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!("mail (log-only) to {}: {}", to, subject);
            tracing::debug!("mail body: {}", html);
            return Ok(());
        };

        let message = Message::builder()
            .from(from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        transport.send(message).await?;
        tracing::info!("mail sent to {}: {}", to, subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_only_mode_succeeds() {
        let mailer = Mailer::new(None, "RecipeShare").unwrap();
        let result = mailer
            .send("user@example.com", "Test", "<p>hello</p>".to_string())
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_platform_name() {
        let mailer = Mailer::new(None, "RecipeShare").unwrap();
        assert_eq!(mailer.platform_name(), "RecipeShare");
    }
}
