//! HTTP-backed engine provider
//!
//! Talks to an external inference service that hosts the actual seq2seq
//! models. The service owns everything the core stays out of: weight
//! downloads, tokenization, and device or backend selection. The core hands
//! over an engine identifier and receives a ready handle.
//!
//! # Endpoint
//!
//! The service base URL comes from the `TRIGLOT_ENGINE_URL` environment
//! variable or an explicit argument. Two calls are used:
//!
//! - `POST {base}/load` with `{"model": id}` readies a model
//! - `POST {base}/translate` with `{"model": id, "text": ..., "params": ...}`
//!   returns `{"translation": ...}`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::engine::{EngineError, EngineHandle, EngineProvider, GenerationParams, TranslationEngine};

/// Provider that readies models on a remote inference service.
#[derive(Clone)]
pub struct RemoteEngineProvider {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteEngineProvider {
    /// Model instantiation can take a while on a cold service.
    const LOAD_TIMEOUT: Duration = Duration::from_secs(300);

    /// Per-hop inference budget.
    const RUN_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a provider for the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(EngineError::new("inference service URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| EngineError::new(format!("failed to create HTTP client: {e}")))?;

        Ok(RemoteEngineProvider {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the `TRIGLOT_ENGINE_URL` environment variable.
    pub fn from_env() -> Result<Self, EngineError> {
        let base_url = std::env::var("TRIGLOT_ENGINE_URL").map_err(|_| {
            EngineError::new("TRIGLOT_ENGINE_URL environment variable not set")
        })?;
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for RemoteEngineProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEngineProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl EngineProvider for RemoteEngineProvider {
    async fn load(&self, engine_id: &str) -> Result<EngineHandle, EngineError> {
        let url = format!("{}/load", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(Self::LOAD_TIMEOUT)
            .json(&json!({ "model": engine_id }))
            .send()
            .await
            .map_err(|e| EngineError::new(format!("load request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EngineError::new(format!(
                "inference service rejected model {engine_id} ({status}): {body}"
            )));
        }

        Ok(Arc::new(RemoteEngine {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            engine_id: engine_id.to_string(),
        }))
    }
}

/// One readied model on the inference service. Reentrant: the HTTP client is
/// safe for concurrent use, so warm handles serve many requests at once.
pub struct RemoteEngine {
    client: reqwest::Client,
    base_url: String,
    engine_id: String,
}

#[async_trait]
impl TranslationEngine for RemoteEngine {
    async fn run(&self, text: &str, params: &GenerationParams) -> Result<String, EngineError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let url = format!("{}/translate", self.base_url);
        let body = json!({
            "model": self.engine_id,
            "text": text,
            "params": params,
        });

        let response = self
            .client
            .post(&url)
            .timeout(RemoteEngineProvider::RUN_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::new(format!("translate request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EngineError::new(format!(
                "inference failed ({status}): {body}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EngineError::new(format!("failed to parse service response: {e}")))?;

        payload["translation"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                EngineError::new("invalid service response: missing \"translation\" field")
            })
    }

    fn engine_id(&self) -> &str {
        &self.engine_id
    }
}
