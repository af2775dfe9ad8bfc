use crate::core::catalog::{derive_sequence, Catalog};
use crate::domain::model::{AnswerRecord, AnswerValue, Question};
use crate::domain::ports::{PredictionService, QuestionView};
use crate::utils::error::Result;

/// Shown as the result whenever the prediction request fails.
pub const PREDICTION_ERROR_MESSAGE: &str = "Error occurred while predicting.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Answering,
    Submitting,
    Result,
}

/// What an action did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Cursor or phase changed.
    Moved,
    /// The last question was answered; a submission is pending.
    ReadyToSubmit,
    /// The action is not valid in the current phase, or is a no-op.
    Ignored,
}

/// Multi-step questionnaire state machine.
///
/// Owns the catalog, the cursor into the derived sequence and the answer record.
/// All transitions are synchronous except [`Questionnaire::submit`], which holds
/// `&mut self` across the single outbound request.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    catalog: Catalog,
    phase: Phase,
    cursor: usize,
    answers: AnswerRecord,
    result: Option<String>,
}

impl Questionnaire {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            phase: Phase::Intro,
            cursor: 0,
            answers: AnswerRecord::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sequence(&self) -> Vec<&Question> {
        derive_sequence(&self.catalog, &self.answers)
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != Phase::Answering {
            return None;
        }
        self.sequence().get(self.cursor).copied()
    }

    pub fn current_view(&self) -> Option<QuestionView<'_>> {
        let sequence = self.sequence();
        let question = match self.phase {
            Phase::Answering => sequence.get(self.cursor).copied()?,
            _ => return None,
        };
        Some(QuestionView {
            question,
            step: self.cursor + 1,
            total: sequence.len(),
            current: self.answers.get(&question.key),
            can_retreat: self.cursor > 0,
        })
    }

    pub fn start(&mut self) -> Transition {
        if self.phase != Phase::Intro {
            return Transition::Ignored;
        }
        self.reset();
        tracing::debug!("Questionnaire started");
        Transition::Moved
    }

    /// Parses raw text for the current question and advances with it.
    pub fn advance_input(&mut self, raw: &str) -> Result<Transition> {
        let value = match self.current_question() {
            Some(question) => question.parse_input(raw)?,
            None => return Ok(Transition::Ignored),
        };
        self.advance(value)
    }

    /// Records `value` for the current question and moves forward.
    ///
    /// A rejected value leaves cursor and answers untouched.
    pub fn advance(&mut self, value: AnswerValue) -> Result<Transition> {
        let key = match self.current_question() {
            Some(question) => {
                question.validate_answer(&value)?;
                question.key.clone()
            }
            None => return Ok(Transition::Ignored),
        };

        tracing::debug!("Answer for {}: {}", key, value);
        self.answers.set(key, value);
        self.purge_excluded();

        let len = self.sequence().len();
        if self.cursor + 1 >= len {
            self.phase = Phase::Submitting;
            tracing::info!("All {} questions answered, submitting", len);
            Ok(Transition::ReadyToSubmit)
        } else {
            self.cursor += 1;
            Ok(Transition::Moved)
        }
    }

    pub fn retreat(&mut self) -> Transition {
        if self.phase != Phase::Answering || self.cursor == 0 {
            return Transition::Ignored;
        }
        self.cursor -= 1;
        Transition::Moved
    }

    /// Sends the answer record to `service` and moves to the result phase.
    ///
    /// Only acts while submitting; a failed request becomes the fixed error message.
    pub async fn submit<S: PredictionService + ?Sized>(&mut self, service: &S) -> Transition {
        if self.phase != Phase::Submitting {
            return Transition::Ignored;
        }

        let text = match service.predict(&self.answers).await {
            Ok(prediction) => {
                tracing::info!("Prediction received: {}", prediction.label);
                prediction.label
            }
            Err(e) => {
                tracing::error!(
                    "❌ Prediction request failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                PREDICTION_ERROR_MESSAGE.to_string()
            }
        };

        self.result = Some(text);
        self.phase = Phase::Result;
        Transition::Moved
    }

    pub fn restart(&mut self) -> Transition {
        if self.phase != Phase::Result {
            return Transition::Ignored;
        }
        self.reset();
        tracing::debug!("Questionnaire restarted");
        Transition::Moved
    }

    fn reset(&mut self) {
        self.answers.clear();
        self.cursor = 0;
        self.result = None;
        self.phase = Phase::Answering;
    }

    /// Drops answers to questions that the current answers gate out.
    ///
    /// Gates only look back, so one pass in catalog order also clears answers
    /// whose gate depended on an answer removed earlier in the pass.
    fn purge_excluded(&mut self) {
        for question in self.catalog.questions() {
            if self.answers.contains(&question.key) && !question.is_included(&self.answers) {
                tracing::debug!("Discarding answer for {}, no longer asked", question.key);
                self.answers.remove(&question.key);
            }
        }
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new(Catalog::diabetes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Prediction;
    use crate::utils::error::AssessmentError;
    use async_trait::async_trait;

    struct FixedService(&'static str);

    #[async_trait]
    impl PredictionService for FixedService {
        async fn predict(&self, _answers: &AnswerRecord) -> Result<Prediction> {
            Ok(Prediction::new(self.0))
        }
    }

    struct FailingService;

    #[async_trait]
    impl PredictionService for FailingService {
        async fn predict(&self, _answers: &AnswerRecord) -> Result<Prediction> {
            Err(AssessmentError::UnexpectedResponseError {
                message: "missing prediction".to_string(),
            })
        }
    }

    fn answer_all_male(q: &mut Questionnaire) {
        for raw in ["45", "Male", "110", "80", "2", "30", "24", "Yes", "Asian", "0.5"] {
            q.advance_input(raw).unwrap();
        }
    }

    #[test]
    fn test_actions_ignored_before_start() {
        let mut q = Questionnaire::default();
        assert_eq!(q.phase(), Phase::Intro);
        assert_eq!(q.advance_input("45").unwrap(), Transition::Ignored);
        assert_eq!(q.retreat(), Transition::Ignored);
        assert_eq!(q.restart(), Transition::Ignored);
        assert!(q.answers().is_empty());
    }

    #[test]
    fn test_start_enters_answering() {
        let mut q = Questionnaire::default();
        assert_eq!(q.start(), Transition::Moved);
        assert_eq!(q.phase(), Phase::Answering);
        assert_eq!(q.cursor(), 0);
        assert_eq!(q.current_question().unwrap().key, "age");
        assert_eq!(q.start(), Transition::Ignored);
    }

    #[test]
    fn test_view_reports_progress_and_prefill() {
        let mut q = Questionnaire::default();
        q.start();
        q.advance_input("45").unwrap();
        q.retreat();
        let view = q.current_view().unwrap();
        assert_eq!(view.step, 1);
        assert_eq!(view.total, 10);
        assert_eq!(view.current, Some(&AnswerValue::Number(45.0)));
        assert!(!view.can_retreat);
    }

    #[test]
    fn test_submit_success_sets_result() {
        let mut q = Questionnaire::default();
        q.start();
        answer_all_male(&mut q);
        assert_eq!(q.phase(), Phase::Submitting);
        assert!(q.current_view().is_none());

        let transition = tokio_test::block_on(q.submit(&FixedService("No Diabetes")));
        assert_eq!(transition, Transition::Moved);
        assert_eq!(q.phase(), Phase::Result);
        assert_eq!(q.result(), Some("No Diabetes"));
    }

    #[test]
    fn test_submit_failure_sets_fixed_message() {
        let mut q = Questionnaire::default();
        q.start();
        answer_all_male(&mut q);
        tokio_test::block_on(q.submit(&FailingService));
        assert_eq!(q.phase(), Phase::Result);
        assert_eq!(q.result(), Some(PREDICTION_ERROR_MESSAGE));
    }

    #[test]
    fn test_submit_outside_submitting_is_ignored() {
        let mut q = Questionnaire::default();
        q.start();
        let transition = tokio_test::block_on(q.submit(&FixedService("Diabetes")));
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(q.result(), None);
    }
}
