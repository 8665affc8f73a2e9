//! Outbound transactional mail
//!
//! A thin client over the mail provider's REST API plus the contact
//! notification built from a persisted inquiry. Notification delivery is
//! fire-and-forget: missing configuration or provider failures are
//! logged and never fail the request that triggered them.

use crate::config::MailConfig;
use crate::db::models::ContactInquiry;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A single outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Seam for mail delivery, so handlers can be tested with a fake.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message, returning the provider's message id.
    async fn send(&self, message: &EmailMessage) -> Result<String>;
}

/// Resend API client
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build mail client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.resend.com".to_string(),
        })
    }
}

#[async_trait]
impl Notifier for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        let url = format!("{}/emails", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::Mail {
                message: format!("Send request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Mail {
                message: format!("Provider returned {}: {}", status, body),
            });
        }

        let result: SendResponse = response.json().await.map_err(|e| AppError::Mail {
            message: format!("Failed to parse provider response: {}", e),
        })?;

        Ok(result.id)
    }
}

/// Contact notification sender, constructed once at startup.
pub struct ContactNotifier {
    notifier: Option<Arc<dyn Notifier>>,
    from: String,
    to: Option<String>,
}

impl ContactNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let notifier = match &config.api_key {
            Some(key) => Some(Arc::new(ResendMailer::new(key.clone(), config.timeout_secs)?)
                as Arc<dyn Notifier>),
            None => None,
        };

        Ok(Self {
            notifier,
            from: config.from.clone(),
            to: config.notify_to.clone(),
        })
    }

    /// Construct with an explicit notifier, for tests.
    pub fn with_notifier(notifier: Arc<dyn Notifier>, from: &str, to: &str) -> Self {
        Self {
            notifier: Some(notifier),
            from: from.to_string(),
            to: Some(to.to_string()),
        }
    }

    /// Send the notification for a persisted inquiry. Never returns an
    /// error: the submission is already committed and must not be
    /// unwound by mail trouble.
    pub async fn notify(&self, inquiry: &ContactInquiry) {
        let (notifier, to) = match (&self.notifier, &self.to) {
            (Some(n), Some(to)) => (n, to),
            _ => {
                tracing::warn!(
                    "Mail api key or notify address not configured; skipping notification"
                );
                return;
            }
        };

        let message = EmailMessage {
            from: self.from.clone(),
            to: to.clone(),
            subject: format!("New contact inquiry from {}", inquiry.name),
            text: contact_notification_text(inquiry),
        };

        match notifier.send(&message).await {
            Ok(id) => {
                tracing::info!(message_id = %id, "Contact notification sent");
            }
            Err(e) => {
                crate::metrics::record_mail_failure();
                tracing::error!(error = %e, "Failed to send contact notification");
            }
        }
    }
}

/// Plain-text notification body enumerating every inquiry field, with a
/// `-` placeholder for blanks.
pub fn contact_notification_text(inquiry: &ContactInquiry) -> String {
    fn or_dash(value: &Option<String>) -> &str {
        value.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")
    }

    [
        format!("Name: {}", inquiry.name),
        format!("Organisation: {}", or_dash(&inquiry.organisation)),
        format!("Email: {}", inquiry.email),
        format!("Role/position: {}", or_dash(&inquiry.role)),
        String::new(),
        format!("Type of support: {}", or_dash(&inquiry.service_type)),
        format!("Timeframe: {}", or_dash(&inquiry.timeframe)),
        String::new(),
        format!("Preferred contact: {}", or_dash(&inquiry.preferred_contact)),
        format!("Attachment: {}", or_dash(&inquiry.attachment_url)),
        String::new(),
        "Message:".to_string(),
        inquiry.message.clone(),
        String::new(),
        format!("Referral source: {}", or_dash(&inquiry.referral)),
        format!("Timing/budget notes: {}", or_dash(&inquiry.constraints_note)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn inquiry() -> ContactInquiry {
        ContactInquiry {
            id: Uuid::new_v4(),
            created_at: Utc::now().into(),
            name: "Jane".into(),
            organisation: Some("Acme NGO".into()),
            email: "jane@example.org".into(),
            role: None,
            service_type: Some("Endline evaluation".into()),
            timeframe: None,
            message: "We need an evaluator.".into(),
            referral: None,
            constraints_note: None,
            preferred_contact: None,
            location: None,
            is_reviewed: false,
            attachment_url: None,
            attachment_path: None,
            source: None,
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_notification_text_layout() {
        let text = contact_notification_text(&inquiry());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name: Jane");
        assert_eq!(lines[1], "Organisation: Acme NGO");
        assert_eq!(lines[3], "Role/position: -");
        assert!(lines.contains(&"Message:"));
        assert!(lines.contains(&"We need an evaluator."));
        assert_eq!(*lines.last().unwrap(), "Timing/budget notes: -");
    }

    struct RecordingNotifier {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &EmailMessage) -> Result<String> {
            if self.fail {
                return Err(AppError::Mail {
                    message: "provider down".into(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok("msg_1".into())
        }
    }

    #[tokio::test]
    async fn test_notify_sends_to_configured_address() {
        let recorder = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = ContactNotifier::with_notifier(
            recorder.clone(),
            "Evalsite <no-reply@example.org>",
            "team@example.org",
        );

        notifier.notify(&inquiry()).await;

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "team@example.org");
        assert_eq!(sent[0].subject, "New contact inquiry from Jane");
    }

    #[tokio::test]
    async fn test_notify_failure_is_swallowed() {
        let recorder = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let notifier =
            ContactNotifier::with_notifier(recorder, "from@example.org", "to@example.org");

        // Must not panic or propagate.
        notifier.notify(&inquiry()).await;
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_skips() {
        let notifier = ContactNotifier::from_config(&MailConfig {
            api_key: None,
            notify_to: None,
            from: "from@example.org".into(),
            timeout_secs: 5,
        })
        .unwrap();

        notifier.notify(&inquiry()).await;
    }
}
