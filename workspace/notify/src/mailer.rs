//! The outbound email seam.
//!
//! Template rendering and delivery live in an external mail service; this
//! module only knows how to hand it a template name, a recipient, and the
//! template data. Everything above the seam talks to the [`Mailer`] trait
//! so tests can substitute a recording implementation.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{NotifyError, Result};

/// Templates known to the mail service. The notifier only uses one, but
/// the contract is an enum so new flows cannot typo a template name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    ClientGotPaidNotice,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::ClientGotPaidNotice => "client_got_paid_notice",
        }
    }
}

/// Recipient of one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: String,
}

/// One email to send: recipient plus the data the template is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: Recipient,
    #[serde(rename = "emailData")]
    pub email_data: serde_json::Value,
}

/// Sends templated emails through the platform's mail service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, subject: &str, template: EmailTemplate, message: EmailMessage)
    -> Result<()>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    subject: &'a str,
    template: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
}

/// Production mailer posting JSON to the mail-API endpoint.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl HttpMailer {
    pub fn new(api_url: String, api_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Mail(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_token,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(
        &self,
        subject: &str,
        template: EmailTemplate,
        message: EmailMessage,
    ) -> Result<()> {
        let request = SendRequest {
            subject,
            template: template.as_str(),
            message: &message,
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Mail(format!(
                "mail API returned {} for {}",
                response.status(),
                message.to.email
            )));
        }

        debug!(to = %message.to.email, template = template.as_str(), "email accepted by mail API");
        Ok(())
    }
}

/// Mailer used when no mail API is configured: logs the would-be send and
/// drops it so local runs still work end to end.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        subject: &str,
        template: EmailTemplate,
        message: EmailMessage,
    ) -> Result<()> {
        warn!(
            to = %message.to.email,
            template = template.as_str(),
            subject,
            "mail API not configured; dropping email"
        );
        Ok(())
    }
}
