pub mod error;
pub mod types;

pub use error::{InferenceError, Result};
pub use types::{EntitySpan, LabelScore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::{
    ClassificationResponse, InferenceOptions, InferenceRequest, TextClassificationParams,
    TokenClassificationParams,
};

const BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl InferenceClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Run a token-classification (NER) model and return its merged spans.
    pub async fn token_classification(&self, model: &str, text: &str) -> Result<Vec<EntitySpan>> {
        let params = TokenClassificationParams {
            aggregation_strategy: "simple",
        };
        let spans: Vec<EntitySpan> = self.infer(model, text, params).await?;
        tracing::debug!(model, spans = spans.len(), "Token classification complete");
        Ok(spans)
    }

    /// Run a text-classification model and return all candidate labels.
    pub async fn text_classification(&self, model: &str, text: &str) -> Result<Vec<LabelScore>> {
        let params = TextClassificationParams { truncation: true };
        let resp: ClassificationResponse = self.infer(model, text, params).await?;
        Ok(resp.into_labels())
    }

    async fn infer<P: Serialize, T: DeserializeOwned>(
        &self,
        model: &str,
        text: &str,
        parameters: P,
    ) -> Result<T> {
        let url = format!("{}/models/{}", self.base_url, model);
        let body = InferenceRequest {
            inputs: text,
            parameters,
            options: InferenceOptions::default(),
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
