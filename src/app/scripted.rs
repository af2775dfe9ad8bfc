use crate::core::engine::SessionReport;
use crate::core::Frontend;
use crate::domain::model::AnswerRecord;
use crate::domain::ports::{QuestionView, Reply};
use crate::utils::error::{AssessmentError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Answers the questionnaire from a TOML table of `key = value` pairs.
///
/// Answers still go through the questionnaire's validation; a missing or
/// rejected answer ends the session with an error instead of re-asking.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrontend {
    answers: HashMap<String, String>,
    asked: Vec<String>,
}

impl ScriptedFrontend {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| AssessmentError::ConfigValidationError {
                field: "answers".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let mut answers = HashMap::new();
        for (key, value) in table {
            let raw = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                // yes/no questions
                toml::Value::Boolean(true) => "Yes".to_string(),
                toml::Value::Boolean(false) => "No".to_string(),
                other => {
                    return Err(AssessmentError::InvalidConfigValueError {
                        field: format!("answers.{}", key),
                        value: other.to_string(),
                        reason: "expected a string, number or boolean".to_string(),
                    })
                }
            };
            answers.insert(key, raw);
        }

        Ok(Self {
            answers,
            asked: Vec::new(),
        })
    }

    /// Question keys in the order they were asked.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Frontend for ScriptedFrontend {
    fn show_intro(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn ask(&mut self, view: &QuestionView<'_>) -> Result<Reply> {
        let key = &view.question.key;
        self.asked.push(key.clone());

        match self.answers.get(key) {
            Some(raw) => {
                tracing::debug!("[{}/{}] {} = {}", view.step, view.total, key, raw);
                Ok(Reply::Answer(raw.clone()))
            }
            None => Err(AssessmentError::MissingAnswerError { field: key.clone() }),
        }
    }

    fn report_invalid(&mut self, view: &QuestionView<'_>, error: &AssessmentError) -> Result<()> {
        let message = match error {
            AssessmentError::ValidationError { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Err(AssessmentError::validation(&view.question.key, message))
    }

    fn show_submitting(&mut self) -> Result<()> {
        tracing::info!("Submitting {} scripted answers", self.asked.len());
        Ok(())
    }

    fn show_result(&mut self, result: &str) -> Result<bool> {
        tracing::info!("✅ Assessment complete: {}", result);
        Ok(false)
    }
}

#[derive(Debug, Serialize)]
struct ScriptedOutcome<'a> {
    prediction: Option<&'a str>,
    answers: Option<&'a AnswerRecord>,
    completed_at: DateTime<Utc>,
}

/// JSON summary of a scripted run, printed on stdout.
pub fn render_report(report: &SessionReport) -> Result<String> {
    let outcome = ScriptedOutcome {
        prediction: report.result.as_deref(),
        answers: report.submitted.as_ref(),
        completed_at: Utc::now(),
    };
    Ok(serde_json::to_string_pretty(&outcome)?)
}
