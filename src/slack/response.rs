use serde::Deserialize;

/// Envelope returned by `chat.postMessage` and `chat.update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    /// Error code if `ok` is false.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Timestamp of the sent message; the thread timestamp for replies to it.
    #[serde(default)]
    pub ts: String,
}

/// What came back from a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Incoming webhooks only acknowledge with a bare body (usually `ok`).
    Webhook { body: String },
    Api(SendMessageResponse),
}

impl Delivery {
    #[must_use]
    pub fn thread_ts(&self) -> Option<&str> {
        match self {
            Delivery::Webhook { .. } => None,
            Delivery::Api(resp) => Some(resp.ts.as_str()),
        }
    }
}
