use crate::core::catalog::Catalog;
use crate::core::ConfigProvider;
use crate::domain::model::{FieldNaming, Question};
use crate::utils::error::{AssessmentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/predict";
pub const DEFAULT_PREFERENCES_PATH: &str = ".diabetes-risk-bot/preferences.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// Replaces the built-in questionnaire when present.
    pub questions: Option<Vec<Question>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub field_naming: FieldNaming,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: None,
            field_naming: FieldNaming::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PREFERENCES_PATH.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AssessmentError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AssessmentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PREDICT_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AssessmentError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.endpoint", &self.service.endpoint)?;

        if let Some(timeout) = self.service.timeout_seconds {
            validation::validate_positive_number("service.timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("preferences.path", &self.preferences.path)?;

        if let Some(questions) = &self.questions {
            Catalog::new(questions.clone())?;
        }

        Ok(())
    }

    /// The configured questionnaire, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.questions {
            Some(questions) => Catalog::new(questions.clone()),
            None => Ok(Catalog::diabetes()),
        }
    }

    pub fn preferences_path(&self) -> &str {
        &self.preferences.path
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.service.endpoint
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.service.timeout_seconds.map(Duration::from_secs)
    }

    fn field_naming(&self) -> FieldNaming {
        self.service.field_naming
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::QuestionKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[service]
endpoint = "https://api.example.com/predict"
timeout_seconds = 10
field_naming = "snake"

[preferences]
path = "./prefs.toml"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_endpoint(), "https://api.example.com/predict");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.field_naming(), FieldNaming::Snake);
        assert_eq!(config.preferences_path(), "./prefs.toml");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.api_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.field_naming(), FieldNaming::Camel);
        assert_eq!(config.catalog().unwrap(), Catalog::diabetes());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_PREDICT_ENDPOINT", "https://test.api.com/predict");

        let toml_content = r#"
[service]
endpoint = "${TEST_PREDICT_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.service.endpoint, "https://test.api.com/predict");

        std::env::remove_var("TEST_PREDICT_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[service]
endpoint = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let zero_timeout = r#"
[service]
endpoint = "http://localhost:5000/predict"
timeout_seconds = 0
"#;
        let config = TomlConfig::from_toml_str(zero_timeout).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_questions() {
        let toml_content = r#"
[[questions]]
key = "age"
label = "How old are you?"
kind = "numeric_range"
min = 18.0
max = 99.0

[[questions]]
key = "smoker"
label = "Do you smoke?"
kind = "single_select"
options = ["Yes", "No"]

[[questions]]
key = "packs"
label = "Packs per day?"
kind = "numeric_range"
min = 0.0
max = 10.0
normal_range = "0"
gate = { key = "smoker", equals = "Yes" }
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let catalog = config.catalog().unwrap();
        let questions = catalog.questions();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].kind, QuestionKind::NumericRange { min: 18.0, max: 99.0 });
        assert_eq!(questions[2].gate.as_ref().unwrap().key, "smoker");
        assert_eq!(questions[2].normal_range.as_deref(), Some("0"));
    }

    #[test]
    fn test_invalid_custom_questions_fail_validation() {
        let toml_content = r#"
[[questions]]
key = "smoker"
label = "Do you smoke?"
kind = "single_select"
options = []
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[service]
endpoint = "https://api.example.com/predict"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.service.endpoint, "https://api.example.com/predict");
    }
}
