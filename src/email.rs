//! Email Delivery
//!
//! Thin client for a Resend-compatible transactional email API. Delivery is
//! best-effort: a missing API key or a provider failure produces a logged
//! failure result, never an error that aborts the caller's request.

use crate::config::AppConfig;

use serde::Serialize;

const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

/// Outcome of a delivery attempt
#[derive(Debug, Clone)]
pub struct EmailSendResult {
    pub success: bool,
    pub status: u16,
    pub error: Option<String>,
}

impl EmailSendResult {
    fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Transactional email client
pub struct EmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl EmailClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
        }
    }

    /// Send one HTML email
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> EmailSendResult {
        if !to.contains('@') {
            return EmailSendResult::failure(400, "Invalid email address");
        }

        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                tracing::warn!("RESEND_API_KEY is not set; skipping email delivery");
                return EmailSendResult::failure(500, "Email service not configured");
            }
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&SendEmailBody {
                from: &self.from,
                to,
                subject,
                html,
            })
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => EmailSendResult {
                success: true,
                status: response.status().as_u16(),
                error: None,
            },
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status, body = %body, "Email provider rejected delivery");
                EmailSendResult::failure(status, "Failed to send email")
            }
            Err(err) => {
                tracing::error!("Email delivery failed: {:?}", err);
                EmailSendResult::failure(500, "Failed to send email")
            }
        }
    }
}
