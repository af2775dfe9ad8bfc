use crate::config::toml_config::TomlConfig;
use crate::domain::model::{FieldNaming, Theme};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "diabetes-risk-bot")]
#[command(about = "Step-by-step diabetes risk questionnaire backed by a prediction service")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Prediction endpoint, overrides the configuration file")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Request timeout in seconds (no timeout by default)")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Wire field naming: camel or snake")]
    pub field_naming: Option<FieldNaming>,

    #[arg(long, help = "Answer the questionnaire from a TOML file instead of prompting")]
    pub answers: Option<String>,

    #[arg(long, help = "Colour theme: light or dark (remembered)")]
    pub theme: Option<Theme>,

    #[arg(long, help = "Switch between light and dark theme (remembered)")]
    pub toggle_theme: bool,

    #[arg(long, help = "Preference file location")]
    pub preferences: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the configuration file (or defaults) and applies command line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout {
            config.service.timeout_seconds = Some(timeout);
        }
        if let Some(naming) = self.field_naming {
            config.service.field_naming = naming;
        }
        if let Some(path) = &self.preferences {
            config.preferences.path = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(answers) = &self.answers {
            validate_file_extensions("answers", std::slice::from_ref(answers), &["toml"])?;
        }
        if let Some(config) = &self.config {
            validate_file_extensions("config", std::slice::from_ref(config), &["toml"])?;
        }
        Ok(())
    }
}
