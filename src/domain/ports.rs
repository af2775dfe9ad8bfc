use crate::domain::model::{AnswerRecord, AnswerValue, FieldNaming, Prediction, Question};
use crate::utils::error::{AssessmentError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// The backend that turns a completed answer record into a risk result.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, answers: &AnswerRecord) -> Result<Prediction>;
}

/// Key/value preferences that outlive a session.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn field_naming(&self) -> FieldNaming;
}

/// Snapshot of the question currently on screen.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub question: &'a Question,
    /// 1-based
    pub step: usize,
    pub total: usize,
    pub current: Option<&'a AnswerValue>,
    pub can_retreat: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answer(String),
    Back,
    Quit,
}

/// Renders the questionnaire and collects user replies.
pub trait Frontend {
    /// Returns false when the user declines to start.
    fn show_intro(&mut self) -> Result<bool>;

    fn ask(&mut self, view: &QuestionView<'_>) -> Result<Reply>;

    /// Called when a reply was rejected. Returning an error ends the session.
    fn report_invalid(&mut self, view: &QuestionView<'_>, error: &AssessmentError) -> Result<()>;

    fn show_submitting(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns true to restart the questionnaire.
    fn show_result(&mut self, result: &str) -> Result<bool>;
}
