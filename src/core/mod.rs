pub mod catalog;
pub mod controller;
pub mod engine;

pub use crate::domain::model::{AnswerRecord, AnswerValue, Prediction, Question, QuestionKind};
pub use crate::domain::ports::{ConfigProvider, Frontend, PreferenceStore, PredictionService};
pub use crate::utils::error::Result;
