//! The step itself: validate, build, resolve, send, export.
//!
//! Stages run strictly in order and the first failure aborts the rest.

use tracing::{debug, info, warn};

use crate::clients::build_api::WebhookResolver;
use crate::core::config::{Credentials, StepConfig};
use crate::errors::NotifyError;
use crate::outputs::{EnvmanExporter, OutputExporter, export_outputs};
use crate::slack::client::{Endpoint, SlackClient};
use crate::slack::message::Message;
use crate::slack::payload::build_message;
use crate::slack::response::Delivery;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Conflicting inputs that were resolved automatically.
    pub warnings: Vec<String>,
    pub message: Message,
    pub delivery: Delivery,
    /// Value written to the output variable, if one was requested.
    pub exported_ts: Option<String>,
}

/// Turn the resolved credentials into a concrete endpoint, looking up the
/// integration's webhook URL if needed.
///
/// # Errors
///
/// Returns an error if the integration lookup fails.
pub async fn resolve_endpoint(
    credentials: Credentials,
    message: &Message,
    resolver: &WebhookResolver,
) -> Result<Endpoint, NotifyError> {
    match credentials {
        Credentials::Integration {
            id,
            build_url,
            build_api_token,
        } => {
            let url = resolver.resolve(&id, &build_url, &build_api_token).await?;
            Ok(Endpoint::Webhook(url))
        }
        Credentials::Webhook(url) => Ok(Endpoint::Webhook(url)),
        Credentials::Token(token) => Ok(Endpoint::api(token, message)),
    }
}

/// Sends the build notification.
pub struct Notifier<E = EnvmanExporter> {
    slack: SlackClient,
    resolver: WebhookResolver,
    exporter: E,
}

impl Default for Notifier<EnvmanExporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier<EnvmanExporter> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            SlackClient::new(),
            WebhookResolver::new(),
            EnvmanExporter::default(),
        )
    }
}

impl<E: OutputExporter> Notifier<E> {
    pub fn with_parts(slack: SlackClient, resolver: WebhookResolver, exporter: E) -> Self {
        Self {
            slack,
            resolver,
            exporter,
        }
    }

    #[must_use]
    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Run every stage for `config`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub async fn run(&self, config: &StepConfig) -> Result<Report, NotifyError> {
        debug!("Configuration: {:?}", config);
        info!(
            "Build {}",
            if config.outcome.succeeded() {
                "succeeded"
            } else {
                "failed"
            }
        );

        let (credentials, warnings) = Credentials::resolve(config)?;
        let message = build_message(config);

        let endpoint = resolve_endpoint(credentials, &message, &self.resolver).await?;
        if config.is_requesting_output() && endpoint.is_webhook() {
            warn!("Outputs were requested but the message goes to a webhook");
        }
        let delivery = self.slack.send(&message, &endpoint).await?;

        let exported_ts = export_outputs(&delivery, &config.output_thread_ts, &self.exporter)?;

        Ok(Report {
            warnings,
            message,
            delivery,
            exported_ts,
        })
    }
}
