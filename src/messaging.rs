use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::configuration::MessagingConfiguration;

/// A failed delivery. Provider, transport and decoding failures are not
/// distinguished.
#[derive(Debug, Error)]
#[error("failed to send message to {to}: {reason}")]
pub struct DeliveryError {
    pub to: String,
    pub reason: String,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Dispatch one message and return the provider's message id. Every call
    /// sends a new message.
    async fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError>;
}

/// Sends messages through the Twilio Programmable Messaging REST API.
pub struct TwilioGateway {
    http: reqwest::Client,
    messages_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Deserialize)]
struct CreatedMessage {
    sid: String,
}

impl TwilioGateway {
    pub fn new(configuration: &MessagingConfiguration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(configuration.timeout_seconds))
            .build()?;
        Ok(TwilioGateway {
            http,
            messages_url: format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                configuration.base_url.trim_end_matches('/'),
                configuration.account_sid
            ),
            account_sid: configuration.account_sid.clone(),
            auth_token: configuration.auth_token.clone(),
            from_number: configuration.from_number.clone(),
        })
    }
}

#[async_trait]
impl MessagingGateway for TwilioGateway {
    #[tracing::instrument(name = "Send SMS", skip(self, body))]
    async fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let failed = |reason: String| DeliveryError {
            to: to.to_string(),
            reason,
        };

        let response = self
            .http
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|error| failed(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(failed(format!("provider answered {}: {}", status, detail)));
        }

        let created = response
            .json::<CreatedMessage>()
            .await
            .map_err(|error| failed(error.to_string()))?;
        Ok(created.sid)
    }
}
