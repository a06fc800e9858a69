use std::env;
use std::fmt;

use tracing::warn;

use super::select::{BuildOutcome, OnErrorOverride, Selectable};
use crate::errors::NotifyError;

/// A credential-bearing input. `Debug` never prints the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("\"\"")
        } else {
            f.write_str("[REDACTED]")
        }
    }
}

impl OnErrorOverride for Secret {
    fn overrides(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Reads one step input from a variable lookup.
trait Input: Sized {
    fn read(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Self, NotifyError>;
}

impl Input for String {
    fn read(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Self, NotifyError> {
        Ok(lookup(key).unwrap_or_default())
    }
}

impl Input for Secret {
    fn read(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Self, NotifyError> {
        String::read(lookup, key).map(Secret)
    }
}

impl Input for bool {
    fn read(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Self, NotifyError> {
        read_bool(lookup, key, false)
    }
}

fn read_bool(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, NotifyError> {
    match lookup(key).as_deref() {
        None => Ok(default),
        Some("yes") => Ok(true),
        Some("no") => Ok(false),
        Some(other) => Err(NotifyError::Config(format!(
            "{key}: value must be one of [yes, no], got {other:?}"
        ))),
    }
}

macro_rules! selectable_inputs {
    ($( $(#[$doc:meta])* $field:ident: $ty:ty => ($key:literal, $on_error_key:literal), )*) => {
        /// Inputs that come with an `_on_error` variant.
        #[derive(Debug, Clone, Default)]
        pub struct SelectableInputs {
            $( $(#[$doc])* pub $field: Selectable<$ty>, )*
        }

        /// [`SelectableInputs`] after the build outcome has been applied.
        #[derive(Debug, Clone, Default)]
        pub struct SelectedInputs {
            $( $(#[$doc])* pub $field: $ty, )*
        }

        impl SelectableInputs {
            fn read(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, NotifyError> {
                Ok(Self {
                    $(
                        $field: Selectable::new(
                            <$ty as Input>::read(lookup, $key)?,
                            <$ty as Input>::read(lookup, $on_error_key)?,
                        ),
                    )*
                })
            }

            /// Resolve every pair for `outcome`.
            #[must_use]
            pub fn select(&self, outcome: BuildOutcome) -> SelectedInputs {
                SelectedInputs {
                    $( $field: self.$field.get(outcome), )*
                }
            }
        }
    };
}

selectable_inputs! {
    webhook_url: Secret => ("webhook_url", "webhook_url_on_error"),
    /// Channel ID (eg. C024BE91L) or name (eg. #general).
    channel: String => ("channel", "channel_on_error"),
    text: String => ("text", "text_on_error"),
    icon_emoji: String => ("emoji", "emoji_on_error"),
    icon_url: String => ("icon_url", "icon_url_on_error"),
    username: String => ("from_username", "from_username_on_error"),
    thread_ts: String => ("thread_ts", "thread_ts_on_error"),
    reply_broadcast: bool => ("reply_broadcast", "reply_broadcast_on_error"),
    /// Timestamp of a previously sent message to update instead of posting.
    update_ts: String => ("update_ts", "update_ts_on_error"),
    color: String => ("color", "color_on_error"),
    pretext: String => ("pretext", "pretext_on_error"),
    title: String => ("title", "title_on_error"),
    message: String => ("message", "message_on_error"),
    image_url: String => ("image_url", "image_url_on_error"),
    thumb_url: String => ("thumb_url", "thumb_url_on_error"),
    footer: String => ("footer", "footer_on_error"),
    footer_icon: String => ("footer_icon", "footer_icon_on_error"),
}

/// Step inputs plus the CI environment this step runs in.
#[derive(Debug, Clone, Default)]
pub struct StepConfig {
    pub debug: bool,
    pub outcome: BuildOutcome,
    pub inputs: SelectableInputs,

    pub api_token: Secret,
    pub workspace_slack_integration_id: String,
    pub build_url: String,
    pub build_api_token: Secret,

    pub link_names: bool,
    pub author_name: String,
    pub title_link: String,
    pub timestamp: bool,
    /// Pairs list (`title|value` per line).
    pub fields: String,
    /// Pairs list (`label|url` per line).
    pub buttons: String,

    /// Name of the variable to export the sent message's `ts` into.
    pub output_thread_ts: String,
}

impl StepConfig {
    /// # Errors
    ///
    /// Returns an error if an input has an invalid value or `color` is missing.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if an input has an invalid value or `color` is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        let text = |key: &str| lookup(key).unwrap_or_default();

        let inputs = SelectableInputs::read(lookup)?;
        if inputs.color.primary.trim().is_empty() {
            return Err(NotifyError::Config(
                "color: required variable is not present".to_string(),
            ));
        }

        let pipeline_status = lookup("BITRISEIO_PIPELINE_BUILD_STATUS");

        Ok(Self {
            debug: read_bool(lookup, "is_debug_mode", false)?,
            outcome: BuildOutcome::from_status(
                &text("BITRISE_BUILD_STATUS"),
                pipeline_status.as_deref(),
            ),
            inputs,
            api_token: Secret(text("api_token")),
            workspace_slack_integration_id: text("workspace_slack_integration_id"),
            build_url: text("BITRISE_BUILD_URL"),
            build_api_token: Secret(text("BITRISE_BUILD_API_TOKEN")),
            link_names: read_bool(lookup, "link_names", true)?,
            author_name: text("author_name"),
            title_link: text("title_link"),
            timestamp: read_bool(lookup, "timestamp", true)?,
            fields: text("fields"),
            buttons: text("buttons"),
            output_thread_ts: text("output_thread_ts"),
        })
    }

    #[must_use]
    pub fn selected(&self) -> SelectedInputs {
        self.inputs.select(self.outcome)
    }

    #[must_use]
    pub fn is_requesting_output(&self) -> bool {
        !self.output_thread_ts.trim().is_empty()
    }
}

/// Where the message goes, decided once before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Bot token for the Slack Web API.
    Token(Secret),
    /// Incoming webhook URL.
    Webhook(Secret),
    /// Webhook URL looked up from a workspace Slack integration.
    Integration {
        id: String,
        build_url: String,
        build_api_token: Secret,
    },
}

impl Credentials {
    /// Pick the delivery credential from `config`.
    ///
    /// An integration ID wins over a token or webhook, and a token wins over a
    /// webhook. Every overridden value produces a warning in the returned list.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a token nor a webhook URL is configured, or
    /// if an integration is configured without a build URL.
    pub fn resolve(config: &StepConfig) -> Result<(Self, Vec<String>), NotifyError> {
        let webhook = config.inputs.webhook_url.get(config.outcome);
        let webhook = Secret(webhook.expose().trim().to_string());
        let token = Secret(config.api_token.expose().trim().to_string());
        let integration_id = config.workspace_slack_integration_id.trim();
        let mut warnings = Vec::new();

        if !integration_id.is_empty() {
            if !token.is_empty() {
                warnings.push(
                    "Both Slack integration ID and API Token are provided. Using the integration"
                        .to_string(),
                );
            }
            if !webhook.is_empty() {
                warnings.push(
                    "Both Slack integration ID and Webhook URL are provided. Using the integration"
                        .to_string(),
                );
            }
            if config.build_url.trim().is_empty() {
                return Err(NotifyError::Config(
                    "BITRISE_BUILD_URL is required to look up a Slack integration".to_string(),
                ));
            }
            for w in &warnings {
                warn!("{}", w);
            }
            return Ok((
                Credentials::Integration {
                    id: integration_id.to_string(),
                    build_url: config.build_url.trim().to_string(),
                    build_api_token: config.build_api_token.clone(),
                },
                warnings,
            ));
        }

        let credentials = match (token.is_empty(), webhook.is_empty()) {
            (true, true) => {
                return Err(NotifyError::Config(
                    "Both API Token and Webhook URL are empty. You need to provide one of them. \
                     If you want to use incoming webhooks provide the webhook url. \
                     If you want to use a bot to send a message provide the bot API token"
                        .to_string(),
                ));
            }
            (false, false) => {
                let w = "Both API Token and Webhook URL are provided. Using the API Token";
                warn!("{}", w);
                warnings.push(w.to_string());
                Credentials::Token(token)
            }
            (false, true) => Credentials::Token(token),
            (true, false) => Credentials::Webhook(webhook),
        };

        Ok((credentials, warnings))
    }

    /// The token used for Web API delivery, if any.
    #[must_use]
    pub fn api_token(&self) -> Option<&Secret> {
        match self {
            Credentials::Token(token) => Some(token),
            _ => None,
        }
    }

    /// The directly configured webhook URL, if any.
    #[must_use]
    pub fn webhook_url(&self) -> Option<&Secret> {
        match self {
            Credentials::Webhook(url) => Some(url),
            _ => None,
        }
    }
}
