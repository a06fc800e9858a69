//! Build API client
//!
//! Looks up the webhook URL of a workspace Slack integration. This is the only
//! call in the step that is retried.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::Secret;
use crate::errors::NotifyError;
use crate::slack::client::HTTP_CLIENT;

pub const BUILD_API_TOKEN_HEADER: &str = "Build-Api-Token";

const MAX_RETRIES: usize = 4;

#[derive(Debug, Deserialize)]
struct IntegrationResponse {
    webhook_url: String,
}

/// Resolves workspace Slack integrations to webhook URLs.
pub struct WebhookResolver {
    http: Client,
    base_delay: Duration,
}

impl Default for WebhookResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(HTTP_CLIENT.clone())
    }

    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            base_delay: Duration::from_millis(100),
        }
    }

    /// Override the first retry delay (useful for testing).
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Fetch the webhook URL of `integration_id` from the build API at `build_url`.
    ///
    /// Transport failures and 5xx answers are retried with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the build API answers with a
    /// non-200 status, or the body has no `webhook_url`.
    pub async fn resolve(
        &self,
        integration_id: &str,
        build_url: &str,
        build_api_token: &Secret,
    ) -> Result<Secret, NotifyError> {
        let url = integration_url(build_url, integration_id)?;
        info!("Looking up Slack integration {}", integration_id);

        // 100ms, 200ms, 400ms, ... before jitter
        let base = u64::try_from(self.base_delay.as_millis()).unwrap_or(100).max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(base.div_ceil(2))
            .map(jitter)
            .take(MAX_RETRIES);

        RetryIf::spawn(
            strategy,
            || self.fetch(&url, build_api_token),
            |e: &NotifyError| {
                let transient = e.is_transient();
                if transient {
                    warn!("Slack integration lookup failed, retrying: {}", e);
                }
                transient
            },
        )
        .await
    }

    async fn fetch(&self, url: &Url, build_api_token: &Secret) -> Result<Secret, NotifyError> {
        let resp = self
            .http
            .get(url.clone())
            .header(BUILD_API_TOKEN_HEADER, build_api_token.expose())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status != StatusCode::OK {
            return Err(NotifyError::Resolution { status, body });
        }

        let integration: IntegrationResponse =
            serde_json::from_str(&body).map_err(|e| NotifyError::Resolution {
                status,
                body: format!("invalid integration response ({e}): {body}"),
            })?;

        if integration.webhook_url.trim().is_empty() {
            return Err(NotifyError::Resolution {
                status,
                body: "integration has no webhook_url".to_string(),
            });
        }

        debug!("Slack integration resolved to a webhook URL");
        Ok(Secret::new(integration.webhook_url.trim()))
    }
}

/// `<build_url>/integrations/slack/<integration_id>`
///
/// # Errors
///
/// Returns an error if `build_url` is not an absolute URL.
pub fn integration_url(build_url: &str, integration_id: &str) -> Result<Url, NotifyError> {
    let mut url = Url::parse(build_url.trim())
        .map_err(|e| NotifyError::Config(format!("invalid build URL {build_url:?}: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| NotifyError::Config(format!("build URL {build_url:?} cannot be a base")))?
        .pop_if_empty()
        .extend(["integrations", "slack", integration_id]);

    Ok(url)
}
