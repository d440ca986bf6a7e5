//! Clarifai model-outputs client.
//!
//! Posts the image as base64 to
//! `{endpoint}/v2/users/{user}/apps/{app}/models/{model}/outputs` with a
//! `Key` authorization header and reads `outputs[0].data.concepts`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::provider::{resolve_env_var, ContentClassifier, ImageInput};
use crate::config::ClassifierConfig;
use crate::error::{ConfigError, GateError};
use crate::types::Concept;

/// Identity of the model to call, plus the key that pays for it.
#[derive(Debug, Clone)]
pub struct ClarifaiCredentials {
    pub user_id: String,
    pub app_id: String,
    pub model_id: String,
    pub api_key: String,
}

/// Clarifai classifier over a shared `reqwest::Client`.
pub struct ClarifaiClassifier {
    url: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl ClarifaiClassifier {
    pub fn new(endpoint: &str, credentials: ClarifaiCredentials, timeout: Duration) -> Self {
        let url = format!(
            "{}/v2/users/{}/apps/{}/models/{}/outputs",
            endpoint.trim_end_matches('/'),
            credentials.user_id,
            credentials.app_id,
            credentials.model_id
        );
        Self {
            url,
            api_key: credentials.api_key,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Build from the `[classifier]` section, resolving `${ENV_VAR}` in the key.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let api_key = resolve_env_var(&config.api_key).ok_or_else(|| {
            ConfigError::ValidationError(
                "Classifier API key not set. Set CLARIFAI_API_KEY env var or classifier.api_key."
                    .to_string(),
            )
        })?;
        let credentials = ClarifaiCredentials {
            user_id: config.user_id.clone(),
            app_id: config.app_id.clone(),
            model_id: config.model_id.clone(),
            api_key,
        };
        Ok(Self::new(
            &config.endpoint,
            credentials,
            Duration::from_millis(config.timeout_ms),
        ))
    }

    /// Full outputs URL this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

// --- Request types ---

#[derive(Serialize)]
struct OutputsRequest<'a> {
    inputs: Vec<Input<'a>>,
}

#[derive(Serialize)]
struct Input<'a> {
    data: InputData<'a>,
}

#[derive(Serialize)]
struct InputData<'a> {
    image: InputImage<'a>,
}

#[derive(Serialize)]
struct InputImage<'a> {
    base64: &'a str,
}

// --- Response types ---

#[derive(Deserialize)]
struct OutputsResponse {
    outputs: Vec<Output>,
}

#[derive(Deserialize)]
struct Output {
    data: OutputData,
}

#[derive(Deserialize)]
struct OutputData {
    concepts: Vec<Concept>,
}

#[async_trait]
impl ContentClassifier for ClarifaiClassifier {
    fn name(&self) -> &str {
        "clarifai"
    }

    async fn concepts(&self, image: &ImageInput) -> Result<Vec<Concept>, GateError> {
        let start = Instant::now();

        let body = OutputsRequest {
            inputs: vec![Input {
                data: InputData {
                    image: InputImage { base64: &image.data },
                },
            }],
        };

        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GateError::RemoteService {
                message: format!("Clarifai request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GateError::RemoteService {
                message: format!("Clarifai HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let outputs: OutputsResponse = resp.json().await.map_err(|e| GateError::RemoteService {
            message: format!("Failed to parse Clarifai response: {e}"),
            status_code: None,
        })?;

        let output = outputs
            .outputs
            .into_iter()
            .next()
            .ok_or_else(|| GateError::RemoteService {
                message: "Clarifai returned no outputs".to_string(),
                status_code: None,
            })?;

        tracing::debug!(
            "Clarifai answered in {:?} with {} concept(s)",
            start.elapsed(),
            output.data.concepts.len()
        );

        Ok(output.data.concepts)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
