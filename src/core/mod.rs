//! Step configuration and build-outcome handling

pub mod config;
pub mod select;

pub use config::{Credentials, Secret, SelectableInputs, SelectedInputs, StepConfig};
pub use select::{BuildOutcome, Selectable, select};
