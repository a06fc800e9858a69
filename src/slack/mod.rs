//! All Slack-specific functionality

pub mod client;
pub mod message;
pub mod payload;
pub mod response;

// Re-export main types for convenience
pub use client::{ApiMethod, Endpoint, SlackClient};
pub use message::{Attachment, Button, Field, Message};
pub use payload::build_message;
pub use response::{Delivery, SendMessageResponse};
