pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::TerminalFrontend;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FilePreferenceStore, HttpPredictionService};
pub use app::ScriptedFrontend;
pub use config::TomlConfig;
pub use core::{
    catalog::{derive_sequence, Catalog},
    controller::{Phase, Questionnaire, Transition, PREDICTION_ERROR_MESSAGE},
    engine::{AssessmentEngine, SessionReport},
};
pub use utils::error::{AssessmentError, Result};
