use crate::domain::model::{AnswerRecord, Question, QuestionKind};
use crate::utils::error::{AssessmentError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use std::collections::{HashMap, HashSet};

pub const INTRO_TITLE: &str = "Welcome to the Diabetes Risk Assessment";

pub const INTRO_TEXT: &str = "This tool uses various health metrics to assess your risk of developing \
diabetes. It includes questions about your age, gender, glucose levels, blood pressure, and other \
key health factors.";

pub const DIET_GUIDELINES_URL: &str = "https://medlineplus.gov/diabeticdiet.html";

/// Every question that can be asked, in presentation order. Gated questions
/// are only part of the sequence while their gate holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        let catalog = Self { questions };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The built-in diabetes risk questionnaire.
    pub fn diabetes() -> Self {
        Self {
            questions: vec![
                Question::numeric("age", "What is your age?", 1.0, 120.0),
                Question::select("gender", "What is your gender?", &["Male", "Female"]),
                Question::numeric("pregnancies", "Number of pregnancies?", 0.0, 12.0)
                    .gated_on("gender", "Female"),
                Question::select("pcos", "Do you have PCOS?", &["Yes", "No"])
                    .gated_on("gender", "Female"),
                Question::numeric("glucose", "What is your glucose level? (mg/dL)", 0.0, 600.0)
                    .with_normal_range("90-120"),
                Question::numeric(
                    "bloodPressure",
                    "What is your blood pressure? (mm Hg)",
                    20.0,
                    300.0,
                )
                .with_normal_range("70-90"),
                Question::numeric("skinThickness", "What is your skin thickness? (mm)", 0.0, 10.0)
                    .with_normal_range("1-2"),
                Question::numeric("insulin", "What is your insulin level? (mu U/ml)", 0.0, 600.0)
                    .with_normal_range("15-35"),
                Question::numeric("bmi", "What is your BMI?", 0.0, 50.0).with_normal_range("20-25"),
                Question::select("exercise", "Do you exercise?", &["Yes", "No"]),
                Question::select(
                    "ethnicity",
                    "What is your ethnicity?",
                    &["Asian", "African", "Caucasian", "Hispanic", "Other"],
                ),
                Question::numeric(
                    "diabetesPedigree",
                    "What is your diabetes pedigree function?",
                    0.08,
                    100.0,
                )
                .with_normal_range("0.08-1"),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::diabetes()
    }
}

impl Validate for Catalog {
    fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(AssessmentError::ConfigValidationError {
                field: "questions".to_string(),
                message: "at least one question is required".to_string(),
            });
        }

        let mut seen: HashMap<&str, &Question> = HashMap::new();
        for question in &self.questions {
            validate_non_empty_string("questions.key", &question.key)?;
            validate_non_empty_string(&format!("questions.{}.label", question.key), &question.label)?;

            match &question.kind {
                QuestionKind::NumericRange { min, max } => {
                    if !min.is_finite() || !max.is_finite() || min > max {
                        return Err(AssessmentError::ConfigValidationError {
                            field: format!("questions.{}", question.key),
                            message: format!("invalid range {} to {}", min, max),
                        });
                    }
                }
                QuestionKind::SingleSelect { options } => {
                    let unique: HashSet<&String> = options.iter().collect();
                    if options.is_empty() || unique.len() != options.len() {
                        return Err(AssessmentError::ConfigValidationError {
                            field: format!("questions.{}.options", question.key),
                            message: "options must be non-empty and distinct".to_string(),
                        });
                    }
                }
            }

            // a gate may only look back, so answering a question never hides itself
            if let Some(gate) = &question.gate {
                let field = format!("questions.{}.gate", question.key);
                let Some(gating) = seen.get(gate.key.as_str()) else {
                    return Err(AssessmentError::ConfigValidationError {
                        field,
                        message: format!("gate key '{}' must name an earlier question", gate.key),
                    });
                };
                // gates compare the selected option text
                match gating.options() {
                    Some(options) if options.iter().any(|o| o == &gate.equals) => {}
                    Some(_) => {
                        return Err(AssessmentError::ConfigValidationError {
                            field,
                            message: format!(
                                "'{}' is not an option of question '{}'",
                                gate.equals, gate.key
                            ),
                        });
                    }
                    None => {
                        return Err(AssessmentError::ConfigValidationError {
                            field,
                            message: format!("gate key '{}' must name a select question", gate.key),
                        });
                    }
                }
            }

            if seen.insert(question.key.as_str(), question).is_some() {
                return Err(AssessmentError::ConfigValidationError {
                    field: "questions".to_string(),
                    message: format!("duplicate question key '{}'", question.key),
                });
            }
        }

        Ok(())
    }
}

/// The questions to present for the given answers, in order.
pub fn derive_sequence<'a>(catalog: &'a Catalog, answers: &AnswerRecord) -> Vec<&'a Question> {
    catalog
        .questions
        .iter()
        .filter(|question| question.is_included(answers))
        .collect()
}
