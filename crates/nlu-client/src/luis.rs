//! [`Recognizer`] backed by a LUIS v3 prediction endpoint.

use async_trait::async_trait;
use nlubot_core::{RecognitionError, RecognitionResult, Recognizer};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::{NluConfig, DEFAULT_SLOT, DEFAULT_TIMEOUT_SECS};
use crate::mask_token;
use crate::response::PredictionResponse;

/// HTTP client for `GET {endpoint}/luis/prediction/v3.0/apps/{app_id}/slots/{slot}/predict`.
#[derive(Clone)]
pub struct LuisRecognizer {
    client: Client,
    endpoint: Url,
    app_id: String,
    api_key: String,
    slot: String,
}

impl LuisRecognizer {
    pub fn new(endpoint: String, app_id: String, api_key: String) -> Result<Self, RecognitionError> {
        Self::build(
            endpoint,
            app_id,
            api_key,
            DEFAULT_SLOT.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn from_config(config: &dyn NluConfig) -> Result<Self, RecognitionError> {
        Self::build(
            config.endpoint().to_string(),
            config.app_id().to_string(),
            config.api_key().to_string(),
            config.slot().to_string(),
            config.timeout(),
        )
    }

    fn build(
        endpoint: String,
        app_id: String,
        api_key: String,
        slot: String,
        timeout: Duration,
    ) -> Result<Self, RecognitionError> {
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| RecognitionError::Request(format!("invalid endpoint `{}`: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(RecognitionError::Request(format!(
                "endpoint `{}` cannot carry a path",
                endpoint
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecognitionError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            app_id,
            api_key,
            slot,
        })
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    fn predict_url(&self) -> Result<Url, RecognitionError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RecognitionError::Request(format!("endpoint `{}` cannot carry a path", self.endpoint)))?
            .pop_if_empty()
            .extend([
                "luis",
                "prediction",
                "v3.0",
                "apps",
                self.app_id.as_str(),
                "slots",
                self.slot.as_str(),
                "predict",
            ]);
        Ok(url)
    }
}

fn request_error(e: reqwest::Error) -> RecognitionError {
    if e.is_timeout() {
        RecognitionError::Timeout
    } else {
        RecognitionError::Request(e.to_string())
    }
}

#[async_trait]
impl Recognizer for LuisRecognizer {
    #[instrument(skip(self, text))]
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError> {
        info!(
            app_id = %self.app_id,
            slot = %self.slot,
            api_key = %mask_token(&self.api_key),
            query_len = text.len(),
            "LUIS predict request"
        );

        let response = self
            .client
            .get(self.predict_url()?)
            .query(&[
                ("subscription-key", self.api_key.as_str()),
                ("query", text),
                ("verbose", "false"),
                ("show-all-intents", "false"),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(request_error)?;
        let prediction: PredictionResponse =
            serde_json::from_str(&body).map_err(|e| RecognitionError::Malformed(e.to_string()))?;
        let result = RecognitionResult::from(prediction);

        debug!(
            top_intent = ?result.top_intent,
            entity_types = result.entities.len(),
            "LUIS predict response"
        );
        Ok(result)
    }
}
