//! Client modules for external API interactions

pub mod build_api;

pub use build_api::WebhookResolver;
