/// buildnotify - A CI step that posts the outcome of a build to Slack.
///
/// The step reads its inputs from the environment, picks the success or
/// `_on_error` variant of every paired input, builds a Slack message with a
/// single attachment and delivers it through one of:
/// 1. An incoming webhook URL
/// 2. The Slack Web API (`chat.postMessage`, or `chat.update` for updates) with a bot token
/// 3. A workspace Slack integration, resolved to a webhook URL through the build API
///
/// With token delivery the timestamp of the sent message can be exported as an
/// output variable for later steps.
///
/// # Example
///
/// ```no_run
/// use buildnotify::core::config::StepConfig;
/// use buildnotify::pipeline::Notifier;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = StepConfig::from_env()?;
///     buildnotify::setup_logging(config.debug);
///
///     let report = Notifier::new().run(&config).await?;
///     if let Some(ts) = report.exported_ts {
///         println!("Sent message {ts}");
///     }
///     Ok(())
/// }
/// ```
// Module declarations
pub mod clients;
pub mod core;
pub mod errors;
pub mod outputs;
pub mod pipeline;
pub mod slack;

pub use errors::NotifyError;

/// Configure console logging for the step.
///
/// Debug-level events (request and response bodies) are only shown when
/// `debug` is set. Calling this more than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// buildnotify::setup_logging(false);
/// ```
pub fn setup_logging(debug: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(level);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
