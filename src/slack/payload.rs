//! Builds the Slack [`Message`] from the step configuration.

use chrono::Utc;

use super::message::{Attachment, Button, Field, Message};
use crate::core::config::StepConfig;

/// Replace every literal `\n` escape with a newline character.
#[must_use]
pub fn ensure_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}

/// Split every line of `s` at its first pipe.
///
/// Lines without a pipe, or with an empty label or value, are skipped.
#[must_use]
pub fn pairs(s: &str) -> Vec<(String, String)> {
    s.split('\n')
        .filter_map(|line| line.split_once('|'))
        .filter(|(label, value)| !label.is_empty() && !value.is_empty())
        .map(|(label, value)| (label.to_string(), value.to_string()))
        .collect()
}

#[must_use]
pub fn parse_fields(s: &str) -> Vec<Field> {
    pairs(s)
        .into_iter()
        .map(|(title, value)| Field::new(title, ensure_newlines(&value)))
        .collect()
}

#[must_use]
pub fn parse_buttons(s: &str) -> Vec<Button> {
    pairs(s)
        .into_iter()
        .map(|(text, url)| Button::new(text, url))
        .collect()
}

/// Build the message for the current build, stamping it with the current time
/// if the timestamp input is enabled.
#[must_use]
pub fn build_message(config: &StepConfig) -> Message {
    build_message_at(config, Utc::now().timestamp())
}

/// Same as [`build_message`] with an explicit epoch-seconds clock reading.
#[must_use]
pub fn build_message_at(config: &StepConfig, now: i64) -> Message {
    let selected = config.selected();
    let body = ensure_newlines(&selected.message);

    let attachment = Attachment {
        fallback: body.clone(),
        color: selected.color,
        pretext: selected.pretext,
        author_name: config.author_name.clone(),
        title: selected.title,
        title_link: config.title_link.clone(),
        text: body,
        fields: parse_fields(&config.fields),
        image_url: selected.image_url,
        thumb_url: selected.thumb_url,
        footer: selected.footer,
        footer_icon: selected.footer_icon,
        timestamp: config.timestamp.then_some(now),
        buttons: parse_buttons(&config.buttons),
    };

    Message {
        channel: selected.channel.trim().to_string(),
        text: ensure_newlines(&selected.text),
        attachments: vec![attachment],
        icon_emoji: selected.icon_emoji,
        icon_url: selected.icon_url,
        link_names: config.link_names,
        username: selected.username,
        thread_ts: selected.thread_ts,
        ts: selected.update_ts.trim().to_string(),
        reply_broadcast: selected.reply_broadcast,
    }
}
