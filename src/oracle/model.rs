use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::combat::definitions::{AdjudicationError, DecisionSource};
use crate::oracle::definitions::*;

pub const DEFAULT_MODEL: &str = "llama3";

/// Body of `POST /api/generate`, the one-shot completion call of an Ollama style server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReply {
    pub response: String,
}

/// Decision source backed by a language model served over HTTP on this machine.
pub struct LocalModel {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl LocalModel {
    /// `base` is the server root, e.g. `http://localhost:11434/`.
    pub fn new(base: &Url, model: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(LocalModel {
            client: reqwest::Client::new(),
            endpoint: base.join("api/generate")?,
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, prompt: String) -> Result<String, AdjudicationError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    AdjudicationError::Disconnected
                } else {
                    AdjudicationError::Source(err.to_string())
                }
            })?
            .error_for_status()
            .map_err(|err| AdjudicationError::Source(err.to_string()))?;
        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|err| AdjudicationError::Source(format!("malformed model reply: {}", err)))?;
        Ok(reply.response)
    }
}

impl DecisionSource for LocalModel {
    fn prompt(&self, text: String) -> BoxFuture<'_, Result<String, AdjudicationError>> {
        async move {
            trace!("Asking {} at {}: {:?}", self.model, self.endpoint, text);
            let answer = self.generate(text).await;
            match &answer {
                Ok(text) => debug!("Model answered {:?}", text),
                Err(err) => warn!("Model at {} failed: {}", self.endpoint, err),
            }
            answer
        }
        .boxed()
    }
}
