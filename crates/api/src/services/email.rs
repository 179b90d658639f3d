//! Email service for sending invitation emails.
//!
//! Supports multiple email providers:
//! - `console`: Logs emails to console (development)
//! - `smtp`: Log-only stub pending full SMTP support
//! - `sendgrid`: Uses SendGrid API

use crate::config::EmailConfig;
use domain::models::user::UserRole;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Send an invitation email with the shareable registration link and
    /// the role the invitee was granted.
    pub async fn send_invitation_email(
        &self,
        to_email: &str,
        invitation_url: &str,
        role: UserRole,
    ) -> Result<(), EmailError> {
        self.send(Self::build_invitation_message(to_email, invitation_url, role))
            .await
    }

    /// Builds the invitation email template.
    fn build_invitation_message(
        to_email: &str,
        invitation_url: &str,
        role: UserRole,
    ) -> EmailMessage {
        let role_phrase = match role {
            UserRole::Admin => "an administrator",
            UserRole::Member => "a member",
        };

        let subject = "You're invited to Taskboard";

        let body_text = format!(
            r#"Hi,

You've been invited to join Taskboard as {role}. Click the link below to create your account:

{url}

This invitation will expire in 7 days.

If you weren't expecting this invitation, you can safely ignore this email.

The Taskboard Team"#,
            role = role_phrase,
            url = invitation_url
        );

        let body_html = Some(format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>You're invited</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>You're invited to Taskboard</h2>
    <p>You've been invited as {role}. Click the button below to create your account:</p>
    <div style="text-align: center; margin: 30px 0;">
        <a href="{url}" style="background: #2563eb; color: white; padding: 14px 28px; text-decoration: none; border-radius: 6px; font-weight: bold; display: inline-block;">Accept Invitation</a>
    </div>
    <p style="color: #666; font-size: 14px;">This invitation will expire in 7 days.</p>
    <p style="color: #999; font-size: 12px;">Or copy and paste this link into your browser:<br><a href="{url}">{url}</a></p>
</body>
</html>"#,
            role = role_phrase,
            url = invitation_url
        ));

        EmailMessage {
            to: to_email.to_string(),
            subject: subject.to_string(),
            body_text,
            body_html,
        }
    }

    /// Console provider - logs emails for development.
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(
            body_text = %message.body_text,
            "Email body (plain text)"
        );

        Ok(())
    }

    /// SMTP provider - log-only stub pending full SMTP support.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        warn!(
            provider = "smtp",
            to = %message.to,
            subject = %message.subject,
            "SMTP provider configured but full implementation requires an SMTP client crate"
        );
        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut body = serde_json::json!({
            "personalizations": [{
                "to": [{
                    "email": message.to
                }]
            }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        if let Some(html) = &message.body_html {
            if let Some(content) = body["content"].as_array_mut() {
                content.push(serde_json::json!({
                    "type": "text/html",
                    "value": html
                }));
            }
        }

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(enabled: bool, provider: &str) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: provider.to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "test@example.com".to_string(),
            sender_name: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = EmailService::new(test_config(false, "console"));
        assert!(!service.is_enabled());

        let result = service
            .send_invitation_email(
                "user@example.com",
                "https://tasks.example.com/login?token=abc",
                UserRole::Member,
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_console_provider_sends() {
        let service = EmailService::new(test_config(true, "console"));
        let result = service
            .send_invitation_email(
                "user@example.com",
                "https://tasks.example.com/login?token=abc",
                UserRole::Member,
            )
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_invitation_message_mentions_link_and_role() {
        let url = "https://tasks.example.com/login?token=abc";

        let message = EmailService::build_invitation_message("user@example.com", url, UserRole::Admin);
        assert_eq!(message.to, "user@example.com");
        assert!(message.body_text.contains(url));
        assert!(message.body_text.contains("an administrator"));
        assert!(message.body_html.as_ref().unwrap().contains(url));
        assert!(message.body_html.as_ref().unwrap().contains("an administrator"));

        let message = EmailService::build_invitation_message("user@example.com", url, UserRole::Member);
        assert!(message.body_text.contains("a member"));
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let service = EmailService::new(test_config(true, "carrier-pigeon"));
        let result = service
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                subject: "Hello".to_string(),
                body_text: "Hi".to_string(),
                body_html: None,
            })
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_fails() {
        let service = EmailService::new(test_config(true, "sendgrid"));
        let result = service
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                subject: "Hello".to_string(),
                body_text: "Hi".to_string(),
                body_html: None,
            })
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
