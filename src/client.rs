//! Async client for a running embedding server.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::model::{EmbedRequest, EmbedResponse, ErrorResponse, Inputs};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("text is empty or whitespace")]
    EmptyText,

    #[error("embedding server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("embedding server returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub struct EmbedClient {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl EmbedClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embed", base_url.trim_end_matches('/')),
            bearer_token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request, for servers
    /// sitting behind an authenticating proxy.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn embed(&self, inputs: impl Into<Inputs>) -> Result<Vec<Vec<f32>>, ClientError> {
        let inputs = inputs.into();
        let expected = match &inputs {
            Inputs::Single(_) => 1,
            Inputs::Many(texts) => texts.len(),
        };

        debug!("embed POST {} ({} inputs)", self.endpoint, expected);
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { inputs });
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbedResponse = response.json().await?;
        if body.embeddings.len() != expected {
            return Err(ClientError::CountMismatch {
                expected,
                actual: body.embeddings.len(),
            });
        }
        Ok(body.embeddings)
    }

    /// Embeds one non-blank text and returns its vector.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyText);
        }

        let mut embeddings = self.embed(text).await?;
        // embed() already checked there is exactly one
        Ok(embeddings.swap_remove(0))
    }
}
