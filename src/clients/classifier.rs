use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::models::Priority;

/// What the classifier said about one complaint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub priority: Priority,
    pub confidence: f64,
    pub model_version: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    complaint_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    priority: String,
    confidence: f64,
    model_version: Option<String>,
}

/// Client for the external priority-classification endpoint.
///
/// Classification failure must never block complaint submission, so
/// [`ClassifierClient::classify`] swallows every failure mode (connect
/// error, timeout, non-200, malformed body, unknown label) and hands back
/// the configured default instead. No retries.
#[derive(Clone)]
pub struct ClassifierClient {
    client: Client,
    predict_url: String,
    health_url: String,
    fallback_model_version: String,
}

impl ClassifierClient {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Complainr/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build classifier HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &ClassifierConfig) -> Self {
        let base = config.url.trim_end_matches('/');
        Self {
            client,
            predict_url: format!("{base}/predict"),
            health_url: format!("{base}/health"),
            fallback_model_version: config.fallback_model_version.clone(),
        }
    }

    fn default_prediction(&self) -> Prediction {
        Prediction {
            priority: Priority::Low,
            confidence: 0.0,
            model_version: self.fallback_model_version.clone(),
        }
    }

    /// Asks the classifier for a priority, defaulting to `{Low, 0.0}` on
    /// any failure.
    pub async fn classify(&self, text: &str) -> Prediction {
        match self.request_prediction(text).await {
            Ok(prediction) => prediction,
            Err(e) => {
                warn!("Priority classification failed, using default: {e}");
                self.default_prediction()
            }
        }
    }

    async fn request_prediction(&self, text: &str) -> Result<Prediction> {
        let response = self
            .client
            .post(&self.predict_url)
            .json(&PredictRequest {
                complaint_text: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Classifier error: {} - {}", status, body));
        }

        let body: PredictResponse = response.json().await?;

        let priority = Priority::from_str(&body.priority)
            .map_err(|()| anyhow::anyhow!("Unknown priority label: {}", body.priority))?;

        Ok(Prediction {
            priority,
            confidence: body.confidence,
            model_version: body
                .model_version
                .unwrap_or_else(|| self.fallback_model_version.clone()),
        })
    }

    /// Reachability probe for the health endpoint.
    pub async fn is_reachable(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
