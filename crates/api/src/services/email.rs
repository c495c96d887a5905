//! Email service for lifecycle notifications and password resets.
//!
//! Supports multiple email providers:
//! - `console`: Logs emails to console (development)
//! - `smtp`: Sends via SMTP server
//! - `sendgrid`: Uses SendGrid API

use crate::config::EmailConfig;
use chrono::{DateTime, Utc};
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
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

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

    /// Tell a department in-charge a new borrow request awaits review.
    pub async fn send_request_submitted(
        &self,
        to_email: &str,
        to_name: &str,
        requester_name: &str,
        item_name: &str,
        purpose: &str,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            "Hi {name},\n\n\
             {requester} has requested to borrow \"{item}\".\n\n\
             Purpose: {purpose}\n\n\
             Please review the request in the portal.\n\n\
             Regards,\nLabTrack",
            name = to_name,
            requester = requester_name,
            item = item_name,
            purpose = purpose
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("New borrow request: {}", item_name),
            body_text,
        })
        .await
    }

    /// Notify a borrower that their request was approved.
    pub async fn send_request_approved(
        &self,
        to_email: &str,
        to_name: &str,
        item_name: &str,
        remarks: Option<&str>,
    ) -> Result<(), EmailError> {
        let remarks_line = remarks
            .map(|r| format!("\n\nRemarks from the approver: {}", r))
            .unwrap_or_default();

        let body_text = format!(
            "Hi {name},\n\n\
             Your borrow request for \"{item}\" has been approved. Please visit \
             the department to collect the item.{remarks}\n\n\
             Regards,\nLabTrack",
            name = to_name,
            item = item_name,
            remarks = remarks_line
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("Request approved: {}", item_name),
            body_text,
        })
        .await
    }

    /// Notify a borrower that their request was rejected.
    pub async fn send_request_rejected(
        &self,
        to_email: &str,
        to_name: &str,
        item_name: &str,
        reason: &str,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            "Hi {name},\n\n\
             Your borrow request for \"{item}\" was rejected.\n\n\
             Reason: {reason}\n\n\
             Regards,\nLabTrack",
            name = to_name,
            item = item_name,
            reason = reason
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("Request rejected: {}", item_name),
            body_text,
        })
        .await
    }

    /// Confirm an item handover with the expected return date.
    pub async fn send_item_issued(
        &self,
        to_email: &str,
        to_name: &str,
        item_name: &str,
        manual_id: &str,
        expected_return: DateTime<Utc>,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            "Hi {name},\n\n\
             \"{item}\" ({id}) has been issued to you.\n\n\
             Expected return date: {due}\n\n\
             Late returns may lead to a borrowing ban, so please plan ahead.\n\n\
             Regards,\nLabTrack",
            name = to_name,
            item = item_name,
            id = manual_id,
            due = expected_return.format("%Y-%m-%d")
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("Item issued: {}", item_name),
            body_text,
        })
        .await
    }

    /// Remind a borrower about an upcoming return date.
    pub async fn send_due_reminder(
        &self,
        to_email: &str,
        to_name: &str,
        item_name: &str,
        manual_id: &str,
        expected_return: DateTime<Utc>,
        days_left: i64,
    ) -> Result<(), EmailError> {
        let when = if days_left == 1 {
            "tomorrow".to_string()
        } else {
            format!("in {} days", days_left)
        };

        let body_text = format!(
            "Hi {name},\n\n\
             A reminder that \"{item}\" ({id}) is due back {when}, \
             on {due}.\n\n\
             Regards,\nLabTrack",
            name = to_name,
            item = item_name,
            id = manual_id,
            when = when,
            due = expected_return.format("%Y-%m-%d")
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("Return reminder: {}", item_name),
            body_text,
        })
        .await
    }

    /// Tell a borrower their loan is overdue.
    pub async fn send_overdue_notice(
        &self,
        to_email: &str,
        to_name: &str,
        item_name: &str,
        manual_id: &str,
        expected_return: DateTime<Utc>,
        days_overdue: i64,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            "Hi {name},\n\n\
             \"{item}\" ({id}) was due back on {due} and is now {days} day(s) \
             overdue. Please return it as soon as possible. Late returns can \
             result in a temporary borrowing ban.\n\n\
             Regards,\nLabTrack",
            name = to_name,
            item = item_name,
            id = manual_id,
            due = expected_return.format("%Y-%m-%d"),
            days = days_overdue
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: format!("Overdue item: {}", item_name),
            body_text,
        })
        .await
    }

    /// Tell a user they have been banned from borrowing.
    pub async fn send_ban_notice(
        &self,
        to_email: &str,
        to_name: &str,
        banned_until: Option<DateTime<Utc>>,
    ) -> Result<(), EmailError> {
        let duration_line = match banned_until {
            Some(until) => format!("Your ban lifts on {}.", until.format("%Y-%m-%d")),
            None => "The ban is indefinite; contact an administrator to appeal.".to_string(),
        };

        let body_text = format!(
            "Hi {name},\n\n\
             Due to a late return, your account has been suspended from \
             borrowing items. {duration}\n\n\
             Regards,\nLabTrack",
            name = to_name,
            duration = duration_line
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: "Borrowing privileges suspended".to_string(),
            body_text,
        })
        .await
    }

    /// Send password reset email.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_token: &str,
    ) -> Result<(), EmailError> {
        let reset_url = format!(
            "{}/reset-password?token={}",
            self.config.base_url, reset_token
        );

        let body_text = format!(
            "Hi{name},\n\n\
             We received a request to reset your password. Open the link below \
             to choose a new one:\n\n\
             {url}\n\n\
             If you didn't request a password reset, you can safely ignore \
             this email.\n\n\
             Regards,\nLabTrack",
            name = to_name.map(|n| format!(" {}", n)).unwrap_or_default(),
            url = reset_url
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject: "Reset your password - LabTrack".to_string(),
            body_text,
        })
        .await
    }

    /// Console provider - logs email to console (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(body_text = %message.body_text, "Email body");

        Ok(())
    }

    /// SMTP provider - sends via SMTP server.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        // Full SMTP delivery needs the lettre crate; log until that lands.
        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            "SMTP provider configured but full implementation requires lettre crate"
        );

        info!(
            to = %message.to,
            subject = %message.subject,
            smtp_host = %self.config.smtp_host,
            "Email would be sent via SMTP"
        );

        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });

        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let body = serde_json::json!({
            "personalizations": [personalizations],
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

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            sendgrid_api_key: String::new(),
            sender_email: "test@example.com".to_string(),
            sender_name: "Test".to_string(),
            base_url: "https://portal.example.edu".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        let service = EmailService::new(test_config());
        assert!(service.is_enabled());
    }

    #[tokio::test]
    async fn test_send_console_email() {
        let service = EmailService::new(test_config());

        let message = EmailMessage {
            to: "user@example.edu".to_string(),
            to_name: Some("Test User".to_string()),
            subject: "Test Subject".to_string(),
            body_text: "Test body".to_string(),
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_disabled_silently_succeeds() {
        let mut config = test_config();
        config.enabled = false;
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "user@example.edu".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let mut config = test_config();
        config.provider = "carrier-pigeon".to_string();
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "user@example.edu".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
        };

        assert!(matches!(
            service.send(message).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_send_request_submitted() {
        let service = EmailService::new(test_config());
        let result = service
            .send_request_submitted(
                "incharge@example.edu",
                "Dr. Rao",
                "Test Student",
                "Oscilloscope",
                "Signal processing lab",
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_due_reminder() {
        let service = EmailService::new(test_config());
        let result = service
            .send_due_reminder(
                "user@example.edu",
                "Test User",
                "Oscilloscope",
                "EE-042",
                Utc::now(),
                1,
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_ban_notice_indefinite() {
        let service = EmailService::new(test_config());
        let result = service
            .send_ban_notice("user@example.edu", "Test User", None)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_password_reset_email() {
        let service = EmailService::new(test_config());
        let result = service
            .send_password_reset_email("user@example.edu", Some("Test User"), "reset-token-456")
            .await;
        assert!(result.is_ok());
    }
}
