//! Step outputs
//!
//! After a successful Web API send, the message timestamp can be exported as a
//! named variable for later steps.

use std::process::Command;
use tracing::debug;

use crate::errors::NotifyError;
use crate::slack::response::Delivery;

/// Makes a named value available to later pipeline steps.
pub trait OutputExporter {
    /// # Errors
    ///
    /// Returns an error if the value could not be exported.
    fn export(&self, key: &str, value: &str) -> Result<(), NotifyError>;
}

/// Exports through the `envman` CLI.
#[derive(Debug, Clone)]
pub struct EnvmanExporter {
    program: String,
}

impl Default for EnvmanExporter {
    fn default() -> Self {
        Self {
            program: "envman".to_string(),
        }
    }
}

impl EnvmanExporter {
    /// Use a different executable in place of `envman`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl OutputExporter for EnvmanExporter {
    fn export(&self, key: &str, value: &str) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .args(["add", "--key", key, "--value", value])
            .status()
            .map_err(|e| NotifyError::OutputExport(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(NotifyError::OutputExport(format!(
                "{} add --key {key} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

/// Export the sent message's `ts` as `output_name`.
///
/// Does nothing when no output was requested. Returns the exported value.
///
/// # Errors
///
/// Returns a usage error for webhook deliveries, which carry no timestamp, and
/// propagates any exporter failure.
pub fn export_outputs(
    delivery: &Delivery,
    output_name: &str,
    exporter: &dyn OutputExporter,
) -> Result<Option<String>, NotifyError> {
    let output_name = output_name.trim();
    if output_name.is_empty() {
        debug!("Not requesting any outputs");
        return Ok(None);
    }

    match delivery {
        // Slack webhooks do not return any useful response information
        Delivery::Webhook { .. } => Err(NotifyError::Usage(
            "For output support, do not submit a WebHook URL. \
             Outputs require delivery with an API Token"
                .to_string(),
        )),
        Delivery::Api(resp) => {
            debug!("Exporting output: {}={}", output_name, resp.ts);
            exporter.export(output_name, &resp.ts)?;
            Ok(Some(resp.ts.clone()))
        }
    }
}
