use crate::core::{AnswerRecord, ConfigProvider, Prediction, PredictionService};
use crate::domain::model::FieldNaming;
use crate::utils::error::{AssessmentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: String,
}

/// Posts the answer record as a flat JSON object and reads back `{"prediction": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    client: Client,
    endpoint: String,
    naming: FieldNaming,
}

impl HttpPredictionService {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.api_endpoint().to_string(),
            naming: config.field_naming(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload(&self, answers: &AnswerRecord) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        for (key, value) in answers.iter() {
            body.insert(self.naming.wire_name(key), serde_json::to_value(value)?);
        }
        Ok(body)
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn predict(&self, answers: &AnswerRecord) -> Result<Prediction> {
        let payload = self.payload(answers)?;

        tracing::debug!("Making API request to: {}", self.endpoint);
        tracing::debug!("Payload: {}", serde_json::Value::Object(payload.clone()));

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssessmentError::PredictionStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictionResponse =
            serde_json::from_str(&body).map_err(|e| AssessmentError::UnexpectedResponseError {
                message: format!("{} in body: {}", e, body),
            })?;

        Ok(Prediction::new(parsed.prediction))
    }
}
