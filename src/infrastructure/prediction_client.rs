// Prediction service client - Tomorrow's indoor humidity per sensor
use crate::application::ports::{FetchError, PredictionSource, SensorPredictions};
use async_trait::async_trait;

/// Client for the prediction model service. It needs no session.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: String,
    http: reqwest::Client,
}

impl PredictionClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn predict_all_url(&self) -> String {
        format!("{}/predict_all", self.base_url)
    }
}

/// Body is `{ "<identifier>": <value>, ... }`. Failures come back as a
/// non-success status with an `{"error": ...}` body.
fn parse_predictions(body: &str) -> Result<SensorPredictions, FetchError> {
    serde_json::from_str(body).map_err(FetchError::transport)
}

#[async_trait]
impl PredictionSource for PredictionClient {
    async fn fetch_predictions(&self) -> Result<SensorPredictions, FetchError> {
        let response = self
            .http
            .get(self.predict_all_url())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::transport)?;
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let predictions = parse_predictions(&body)?;
        tracing::debug!("Fetched {} predictions", predictions.len());
        Ok(predictions)
    }
}
