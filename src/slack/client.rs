//! Slack delivery client
//!
//! Sends a [`Message`] either to an incoming webhook or to the Slack Web API
//! and classifies the response. Nothing here is retried: a failed send is final.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};

use super::message::Message;
use super::response::{Delivery, SendMessageResponse};
use crate::core::config::Secret;
use crate::errors::NotifyError;

pub const SLACK_API_BASE_URL: &str = "https://slack.com/api";

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

pub(crate) static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Web API method used for token delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    PostMessage,
    Update,
}

impl ApiMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMethod::PostMessage => "chat.postMessage",
            ApiMethod::Update => "chat.update",
        }
    }
}

/// Where a message is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Legacy incoming webhook; no auth header, unstructured response.
    Webhook(Secret),
    /// Slack Web API with a bearer token.
    Api { token: Secret, method: ApiMethod },
}

impl Endpoint {
    /// Token delivery: `chat.update` when the message carries a `ts`,
    /// `chat.postMessage` otherwise.
    #[must_use]
    pub fn api(token: Secret, message: &Message) -> Self {
        let method = if message.is_update() {
            ApiMethod::Update
        } else {
            ApiMethod::PostMessage
        };
        Endpoint::Api { token, method }
    }

    #[must_use]
    pub fn is_webhook(&self) -> bool {
        matches!(self, Endpoint::Webhook(_))
    }
}

/// HTTP client for Slack message delivery
pub struct SlackClient {
    http: Client,
    api_base_url: String,
}

impl Default for SlackClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SlackClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(HTTP_CLIENT.clone())
    }

    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            api_base_url: SLACK_API_BASE_URL.to_string(),
        }
    }

    /// Override the Web API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// The URL a request for `endpoint` goes to.
    #[must_use]
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        match endpoint {
            Endpoint::Webhook(url) => url.expose().trim().to_string(),
            Endpoint::Api { method, .. } => format!("{}/{}", self.api_base_url, method.as_str()),
        }
    }

    /// POST `message` to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Slack answers with a non-2xx
    /// status, or (for API delivery) the body is not a successful envelope.
    pub async fn send(&self, message: &Message, endpoint: &Endpoint) -> Result<Delivery, NotifyError> {
        let body = serde_json::to_vec(message)?;
        debug!("Request to Slack: {}", String::from_utf8_lossy(&body));

        let url = self.url_for(endpoint);
        match endpoint {
            #[cfg(feature = "debug-logs")]
            Endpoint::Webhook(_) => info!("Sending message to webhook {}", url),
            #[cfg(not(feature = "debug-logs"))]
            Endpoint::Webhook(_) => info!("Sending message to incoming webhook"),
            Endpoint::Api { method, .. } => info!("Sending message via {}", method.as_str()),
        }

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body);
        if let Endpoint::Api { token, .. } = endpoint {
            request = request.bearer_auth(token.expose());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| NotifyError::Http(format!("failed to send the request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response: {e}>"));
            return Err(NotifyError::Delivery { status, body });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| NotifyError::ResponseParse(format!("failed to read response: {e}")))?;
        debug!("Response from Slack: {}", body);

        match endpoint {
            Endpoint::Webhook(_) => Ok(Delivery::Webhook { body }),
            Endpoint::Api { method, .. } => {
                let envelope: SendMessageResponse = serde_json::from_str(&body)
                    .map_err(|e| NotifyError::ResponseParse(e.to_string()))?;

                if !envelope.ok {
                    return Err(NotifyError::Api(format!(
                        "{} error: {}",
                        method.as_str(),
                        envelope.error.as_deref().unwrap_or("unknown_error")
                    )));
                }

                Ok(Delivery::Api(envelope))
            }
        }
    }
}
