use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "cli")]
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid answer for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("No answer provided for {field}")]
    MissingAnswerError { field: String },

    #[error("Prediction service returned {status}: {body}")]
    PredictionStatusError { status: u16, body: String },

    #[error("Unexpected prediction response: {message}")]
    UnexpectedResponseError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AssessmentError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_)
            | Self::PredictionStatusError { .. }
            | Self::UnexpectedResponseError { .. } => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } | Self::MissingAnswerError { .. } => ErrorCategory::Input,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
            #[cfg(feature = "cli")]
            Self::PromptError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::PredictionStatusError { .. } => {
                "The prediction service could not be reached".to_string()
            }
            Self::UnexpectedResponseError { .. } => {
                "The prediction service sent a response that could not be understood".to_string()
            }
            Self::ValidationError { field, message } => format!("{}: {}", field, message),
            Self::MissingAnswerError { field } => format!("No answer was given for '{}'", field),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => format!("Invalid configuration: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the prediction service is running and the endpoint is correct",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Input => "Check the answers file against the question ranges and options",
            ErrorCategory::System => "Check file permissions and that the terminal is interactive",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssessmentError>;
