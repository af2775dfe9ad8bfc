use crate::utils::error::{AssessmentError, Result};
use crate::utils::validation::{validate_one_of, validate_range};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single answer. Numbers cover every numeric-range question, text covers
/// the single-select ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Accumulated answers of one session, keyed by question key. A missing key is "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord {
    fields: BTreeMap<String, AnswerValue>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnswerValue::as_text)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.fields.iter()
    }
}

/// Inclusion condition: the question is asked only when `key` was answered with `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub key: String,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    NumericRange { min: f64, max: f64 },
    SingleSelect { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    /// Typical healthy range, shown as a hint next to the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
}

impl Question {
    pub fn numeric(key: &str, label: &str, min: f64, max: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: QuestionKind::NumericRange { min, max },
            normal_range: None,
            gate: None,
        }
    }

    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: QuestionKind::SingleSelect {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            normal_range: None,
            gate: None,
        }
    }

    pub fn with_normal_range(mut self, range: &str) -> Self {
        self.normal_range = Some(range.to_string());
        self
    }

    pub fn gated_on(mut self, key: &str, equals: &str) -> Self {
        self.gate = Some(Gate {
            key: key.to_string(),
            equals: equals.to_string(),
        });
        self
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::SingleSelect { options } => Some(options),
            QuestionKind::NumericRange { .. } => None,
        }
    }

    pub fn is_included(&self, answers: &AnswerRecord) -> bool {
        match &self.gate {
            Some(gate) => answers.text(&gate.key) == Some(gate.equals.as_str()),
            None => true,
        }
    }

    /// Checks an already typed answer against this question's constraints.
    pub fn validate_answer(&self, value: &AnswerValue) -> Result<()> {
        match (&self.kind, value) {
            (QuestionKind::NumericRange { min, max }, AnswerValue::Number(n)) => {
                validate_range(&self.key, *n, *min, *max)
            }
            (QuestionKind::NumericRange { .. }, other) => Err(AssessmentError::validation(
                &self.key,
                format!("expected a number, got '{}'", other),
            )),
            (QuestionKind::SingleSelect { options }, AnswerValue::Text(s)) => {
                validate_one_of(&self.key, s, options)
            }
            (QuestionKind::SingleSelect { options }, other) => Err(AssessmentError::validation(
                &self.key,
                format!("'{}' is not one of: {}", other, options.join(", ")),
            )),
        }
    }

    /// Parses raw text typed by the user. Options match case-insensitively and
    /// are stored with their canonical spelling.
    pub fn parse_input(&self, raw: &str) -> Result<AnswerValue> {
        let trimmed = raw.trim();
        let value = match &self.kind {
            QuestionKind::NumericRange { .. } => {
                let n = trimmed.parse::<f64>().map_err(|_| {
                    AssessmentError::validation(&self.key, format!("'{}' is not a number", trimmed))
                })?;
                AnswerValue::Number(n)
            }
            QuestionKind::SingleSelect { options } => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(trimmed))
                .map(|option| AnswerValue::Text(option.clone()))
                .unwrap_or_else(|| AnswerValue::Text(trimmed.to_string())),
        };
        self.validate_answer(&value)?;
        Ok(value)
    }

    pub fn placeholder(&self) -> String {
        match (&self.kind, &self.normal_range) {
            (_, Some(range)) => format!("Enter value (Range: {})", range),
            (QuestionKind::NumericRange { min, max }, None) => {
                format!("Enter value ({} to {})", min, max)
            }
            (QuestionKind::SingleSelect { options }, None) => options.join(" / "),
        }
    }
}

/// The text returned by the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub received_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            received_at: Utc::now(),
        }
    }
}

/// Key naming used on the wire when the answer record is posted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    #[default]
    Camel,
    Snake,
}

impl FieldNaming {
    pub fn wire_name(&self, key: &str) -> String {
        match self {
            Self::Camel => key.to_string(),
            Self::Snake => match key {
                // the service names this one after the full feature
                "diabetesPedigree" => "diabetes_pedigree_function".to_string(),
                _ => camel_to_snake(key),
            },
        }
    }
}

impl FromStr for FieldNaming {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camel" => Ok(Self::Camel),
            "snake" => Ok(Self::Snake),
            other => Err(AssessmentError::InvalidConfigValueError {
                field: "field_naming".to_string(),
                value: other.to_string(),
                reason: "expected 'camel' or 'snake'".to_string(),
            }),
        }
    }
}

fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(AssessmentError::InvalidConfigValueError {
                field: "theme".to_string(),
                value: other.to_string(),
                reason: "expected 'light' or 'dark'".to_string(),
            }),
        }
    }
}
