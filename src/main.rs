use std::process::ExitCode;

use anyhow::Context;
use buildnotify::core::config::StepConfig;
use buildnotify::pipeline::Notifier;
use tracing::{error, info};

async fn run() -> anyhow::Result<()> {
    let config = StepConfig::from_env();
    buildnotify::setup_logging(config.as_ref().is_ok_and(|c| c.debug));

    let config = config.context("Failed to read step inputs")?;
    Notifier::new().run(&config).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => {
            info!("Slack message successfully sent! 🚀");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
