//! Slack message payload
//!
//! See <https://api.slack.com/methods/chat.postMessage> and
//! <https://api.slack.com/docs/message-attachments>.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Fields whose value is shorter than this many characters are rendered
/// side-by-side with their neighbours.
pub const SHORT_FIELD_MAX_CHARS: usize = 40;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Message to post to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Message {
    /// Channel ID (eg. C024BE91L) or name (eg. #general).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Overrides `icon_url` on Slack's side.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_url: String,

    #[serde(skip_serializing_if = "is_false")]
    pub link_names: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,

    /// Makes this message a reply in the thread of the given message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub thread_ts: String,

    /// Makes this send an update of the message with the given timestamp.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ts: String,

    /// Used with `thread_ts`: also show the reply in the channel.
    #[serde(skip_serializing_if = "is_false")]
    pub reply_broadcast: bool,
}

impl Message {
    /// Whether this message updates an earlier one rather than posting a new one.
    #[must_use]
    pub fn is_update(&self) -> bool {
        !self.ts.trim().is_empty()
    }
}

/// Rich content block shown below the message text.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Attachment {
    /// Plain-text summary for clients that can't render attachments.
    pub fallback: String,

    /// `good`, `warning`, `danger` or a hex color code (eg. #439FE0).
    pub color: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub pretext: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title_link: String,

    /// Collapses behind "Show more..." past 700 characters or 5 line breaks.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub thumb_url: String,

    /// Limited to 300 characters by Slack.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer_icon: String,

    /// Epoch seconds shown in the footer.
    #[serde(rename = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Link buttons. Slack renders at most 5.
    #[serde(rename = "actions", skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

/// One row of the table inside an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }

    /// Whether the value fits next to other fields.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.value.chars().count() < SHORT_FIELD_MAX_CHARS
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Field", 3)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("short", &self.is_short())?;
        state.end()
    }
}

/// A link rendered as a button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub url: String,
}

impl Button {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

impl Serialize for Button {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Button", 4)?;
        state.serialize_field("type", "button")?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("style", "default")?;
        state.end()
    }
}
