//! Mock engines for testing
//!
//! Deterministic, dependency-free engines and a provider that records every
//! load. Used by the test suite and by the CLI's `--mock` flag, so the whole
//! routing core can be exercised without model weights or a network.
//!
//! # Example
//!
//! ```ignore
//! let provider = Arc::new(MockEngineProvider::new());
//! let engine = provider.load("zh-en").await?;
//! let out = engine.run("hello", &GenerationParams::default()).await?;
//! assert_eq!(out, "hello::zh-en");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::{EngineError, EngineHandle, EngineProvider, GenerationParams, TranslationEngine};

/// What a mock engine does to its input.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Append `"::<engine id>"`, making every hop visible in the output.
    Tag,

    /// Uppercase the input.
    Uppercase,

    /// Lowercase the input.
    Lowercase,

    /// Predefined input-to-output mappings; unmapped inputs fall back to
    /// [`MockBehavior::Tag`].
    Mappings(HashMap<String, String>),

    /// Return the input unchanged.
    NoOp,

    /// Fail every inference call with this message.
    Fail(String),

    /// Fail only when the input equals the trigger; otherwise behave like
    /// [`MockBehavior::Tag`].
    FailOn(String),
}

/// A deterministic engine with a fixed behavior.
#[derive(Debug, Clone)]
pub struct MockEngine {
    engine_id: String,
    behavior: MockBehavior,
    run_delay: Option<Duration>,
}

impl MockEngine {
    pub fn new(engine_id: impl Into<String>, behavior: MockBehavior) -> Self {
        MockEngine {
            engine_id: engine_id.into(),
            behavior,
            run_delay: None,
        }
    }

    /// Simulate slow inference.
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    fn apply(&self, text: &str) -> Result<String, EngineError> {
        match &self.behavior {
            MockBehavior::Tag => Ok(format!("{}::{}", text, self.engine_id)),
            MockBehavior::Uppercase => Ok(text.to_uppercase()),
            MockBehavior::Lowercase => Ok(text.to_lowercase()),
            MockBehavior::Mappings(map) => Ok(map
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("{}::{}", text, self.engine_id))),
            MockBehavior::NoOp => Ok(text.to_string()),
            MockBehavior::Fail(message) => Err(EngineError::new(message.clone())),
            MockBehavior::FailOn(trigger) => {
                if text == trigger {
                    Err(EngineError::new(format!("cannot translate {text:?}")))
                } else {
                    Ok(format!("{}::{}", text, self.engine_id))
                }
            }
        }
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn run(&self, text: &str, _params: &GenerationParams) -> Result<String, EngineError> {
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        self.apply(text)
    }

    fn engine_id(&self) -> &str {
        &self.engine_id
    }
}

/// Provider of mock engines.
///
/// Every load is counted per identifier so tests can assert the cache's
/// load-once behavior. Loads can be delayed or forced to fail, globally or
/// per identifier.
#[derive(Debug, Default)]
pub struct MockEngineProvider {
    behaviors: HashMap<String, MockBehavior>,
    load_delay: Option<Duration>,
    run_delay: Option<Duration>,
    per_id_load_delay: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    load_counts: Mutex<HashMap<String, usize>>,
}

impl MockEngineProvider {
    /// A provider where every engine uses [`MockBehavior::Tag`].
    pub fn new() -> Self {
        MockEngineProvider::default()
    }

    /// Use `behavior` for engines loaded with this identifier.
    pub fn with_behavior(mut self, engine_id: impl Into<String>, behavior: MockBehavior) -> Self {
        self.behaviors.insert(engine_id.into(), behavior);
        self
    }

    /// Delay every load, simulating slow model instantiation.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Delay every inference call on the loaded engines.
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    /// Delay loads of one identifier only.
    pub fn set_load_delay_for(&self, engine_id: &str, delay: Duration) {
        if let Ok(mut delays) = self.per_id_load_delay.lock() {
            delays.insert(engine_id.to_string(), delay);
        }
    }

    /// Make loads of this identifier fail until restored.
    pub fn fail_loads(&self, engine_id: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(engine_id.to_string());
        }
    }

    /// Let loads of this identifier succeed again.
    pub fn restore_loads(&self, engine_id: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(engine_id);
        }
    }

    /// How many times this identifier was loaded.
    pub fn load_count(&self, engine_id: &str) -> usize {
        self.load_counts
            .lock()
            .map(|counts| counts.get(engine_id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total loads across all identifiers.
    pub fn total_loads(&self) -> usize {
        self.load_counts
            .lock()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    fn should_fail(&self, engine_id: &str) -> bool {
        self.failing
            .lock()
            .map(|failing| failing.contains(engine_id))
            .unwrap_or(false)
    }

    fn load_delay_for(&self, engine_id: &str) -> Option<Duration> {
        let per_id = self
            .per_id_load_delay
            .lock()
            .ok()
            .and_then(|delays| delays.get(engine_id).copied());
        per_id.or(self.load_delay)
    }
}

#[async_trait]
impl EngineProvider for MockEngineProvider {
    async fn load(&self, engine_id: &str) -> Result<EngineHandle, EngineError> {
        if let Ok(mut counts) = self.load_counts.lock() {
            *counts.entry(engine_id.to_string()).or_insert(0) += 1;
        }

        if let Some(delay) = self.load_delay_for(engine_id) {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail(engine_id) {
            return Err(EngineError::new(format!(
                "mock load failure for {engine_id}"
            )));
        }

        let behavior = self
            .behaviors
            .get(engine_id)
            .cloned()
            .unwrap_or(MockBehavior::Tag);
        let mut engine = MockEngine::new(engine_id, behavior);
        if let Some(delay) = self.run_delay {
            engine = engine.with_run_delay(delay);
        }
        Ok(Arc::new(engine))
    }
}
