use crate::core::controller::{Phase, Questionnaire};
use crate::domain::model::AnswerRecord;
use crate::domain::ports::{Frontend, PredictionService, Reply};
use crate::utils::error::Result;

/// Outcome of one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    /// Result text of the last completed questionnaire.
    pub result: Option<String>,
    /// The answer record that produced `result`.
    pub submitted: Option<AnswerRecord>,
    /// Number of prediction requests issued during the run.
    pub submissions: usize,
}

/// Drives a [`Questionnaire`] against a frontend and a prediction service.
pub struct AssessmentEngine<S: PredictionService, F: Frontend> {
    service: S,
    frontend: F,
    questionnaire: Questionnaire,
}

impl<S: PredictionService, F: Frontend> AssessmentEngine<S, F> {
    pub fn new(service: S, frontend: F, questionnaire: Questionnaire) -> Self {
        Self {
            service,
            frontend,
            questionnaire,
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn into_frontend(self) -> F {
        self.frontend
    }

    pub async fn run(&mut self) -> Result<SessionReport> {
        let mut report = SessionReport::default();

        loop {
            match self.questionnaire.phase() {
                Phase::Intro => {
                    if !self.frontend.show_intro()? {
                        tracing::info!("Assessment declined at intro");
                        return Ok(report);
                    }
                    self.questionnaire.start();
                }
                Phase::Answering => {
                    let reply = match self.questionnaire.current_view() {
                        Some(view) => self.frontend.ask(&view)?,
                        None => continue,
                    };

                    match reply {
                        Reply::Answer(raw) => {
                            if let Err(e) = self.questionnaire.advance_input(&raw) {
                                tracing::debug!("Answer rejected: {}", e);
                                if let Some(view) = self.questionnaire.current_view() {
                                    self.frontend.report_invalid(&view, &e)?;
                                }
                            }
                        }
                        Reply::Back => {
                            self.questionnaire.retreat();
                        }
                        Reply::Quit => {
                            tracing::info!(
                                "Assessment abandoned at step {}",
                                self.questionnaire.cursor() + 1
                            );
                            return Ok(report);
                        }
                    }
                }
                Phase::Submitting => {
                    self.frontend.show_submitting()?;
                    let submitted = self.questionnaire.answers().clone();
                    self.questionnaire.submit(&self.service).await;
                    report.submissions += 1;
                    report.submitted = Some(submitted);
                }
                Phase::Result => {
                    let result = self.questionnaire.result().unwrap_or_default().to_string();
                    report.result = Some(result.clone());

                    if self.frontend.show_result(&result)? {
                        self.questionnaire.restart();
                    } else {
                        return Ok(report);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Prediction;
    use crate::domain::ports::QuestionView;
    use crate::utils::error::AssessmentError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingService {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PredictionService for CountingService {
        async fn predict(&self, _answers: &AnswerRecord) -> Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction::new("Diabetes"))
        }
    }

    struct QueueFrontend {
        start: bool,
        replies: VecDeque<Reply>,
        restarts: usize,
        invalid: Vec<String>,
        asked: Vec<String>,
    }

    impl QueueFrontend {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                start: true,
                replies: replies.into(),
                restarts: 0,
                invalid: Vec::new(),
                asked: Vec::new(),
            }
        }
    }

    impl Frontend for QueueFrontend {
        fn show_intro(&mut self) -> Result<bool> {
            Ok(self.start)
        }

        fn ask(&mut self, view: &QuestionView<'_>) -> Result<Reply> {
            self.asked.push(view.question.key.clone());
            Ok(self.replies.pop_front().unwrap_or(Reply::Quit))
        }

        fn report_invalid(&mut self, view: &QuestionView<'_>, _error: &AssessmentError) -> Result<()> {
            self.invalid.push(view.question.key.clone());
            Ok(())
        }

        fn show_result(&mut self, _result: &str) -> Result<bool> {
            if self.restarts > 0 {
                self.restarts -= 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    fn answers(raw: &[&str]) -> Vec<Reply> {
        raw.iter().map(|r| Reply::Answer(r.to_string())).collect()
    }

    const MALE: [&str; 10] = ["45", "Male", "110", "80", "2", "30", "24", "Yes", "Asian", "0.5"];

    #[tokio::test]
    async fn test_declined_intro_ends_without_request() {
        let service = CountingService::default();
        let mut frontend = QueueFrontend::new(Vec::new());
        frontend.start = false;

        let mut engine = AssessmentEngine::new(service.clone(), frontend, Questionnaire::default());
        let report = engine.run().await.unwrap();

        assert_eq!(report, SessionReport::default());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_answer_is_reported_and_reasked() {
        let service = CountingService::default();
        let mut replies = answers(&["200"]);
        replies.extend(answers(&MALE));

        let mut engine =
            AssessmentEngine::new(service.clone(), QueueFrontend::new(replies), Questionnaire::default());
        let report = engine.run().await.unwrap();

        assert_eq!(report.result.as_deref(), Some("Diabetes"));
        assert_eq!(report.submissions, 1);
        let frontend = engine.into_frontend();
        assert_eq!(frontend.invalid, vec!["age".to_string()]);
        assert_eq!(&frontend.asked[..2], ["age", "age"]);
    }

    #[tokio::test]
    async fn test_back_reply_revisits_previous_question() {
        let service = CountingService::default();
        let mut replies = answers(&["45"]);
        replies.push(Reply::Back);
        replies.extend(answers(&MALE));

        let mut engine =
            AssessmentEngine::new(service, QueueFrontend::new(replies), Questionnaire::default());
        engine.run().await.unwrap();

        let frontend = engine.into_frontend();
        assert_eq!(&frontend.asked[..3], ["age", "gender", "age"]);
    }

    #[tokio::test]
    async fn test_restart_runs_a_second_submission() {
        let service = CountingService::default();
        let mut replies = answers(&MALE);
        replies.extend(answers(&MALE));
        let mut frontend = QueueFrontend::new(replies);
        frontend.restarts = 1;

        let mut engine = AssessmentEngine::new(service.clone(), frontend, Questionnaire::default());
        let report = engine.run().await.unwrap();

        assert_eq!(report.submissions, 2);
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quit_mid_questionnaire() {
        let service = CountingService::default();
        let mut replies = answers(&["45", "Female"]);
        replies.push(Reply::Quit);

        let mut engine =
            AssessmentEngine::new(service.clone(), QueueFrontend::new(replies), Questionnaire::default());
        let report = engine.run().await.unwrap();

        assert!(report.result.is_none());
        assert_eq!(engine.questionnaire().cursor(), 2);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }
}
