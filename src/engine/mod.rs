//! Translation engine abstraction
//!
//! This module defines the seams between the routing core and the engines
//! that actually transform text:
//!
//! 1. **[`TranslationEngine`]** - one loaded engine, able to run a single hop
//! 2. **[`EngineProvider`]** - the loading collaborator that turns an engine
//!    identifier into a ready handle (device and backend selection happen on
//!    its side of the seam, never in the core)
//! 3. **[`EngineCache`]** - the keyed, load-once store shared across requests
//!
//! Engines can be slow to instantiate (seconds) and slow to run (hundreds of
//! milliseconds and up); both traits are async so neither blocks a worker.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cache;
pub mod mock;
pub mod remote;

pub use cache::EngineCache;
pub use mock::{MockBehavior, MockEngineProvider};
pub use remote::RemoteEngineProvider;

/// A shared, ready-to-use engine handle.
pub type EngineHandle = Arc<dyn TranslationEngine>;

/// Failure reported by an engine provider or by a running engine.
///
/// Cloneable so a single failed load can be delivered to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        EngineError(message.into())
    }
}

/// Decoding parameters applied on every hop.
///
/// The values are an engine-level concern; the orchestrator only guarantees
/// that the same parameters reach each hop of a chain, so no hop degenerates
/// into repeated output while the others suppress it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_length: usize,
    pub num_beams: usize,
    pub no_repeat_ngram_size: usize,
    pub length_penalty: f32,
    pub early_stopping: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            max_length: 512,
            num_beams: 4,
            no_repeat_ngram_size: 3,
            length_penalty: 2.0,
            early_stopping: true,
        }
    }
}

/// One loaded translation engine, able to run a single hop.
///
/// Implementations must be safe for concurrent use from multiple requests:
/// `run` takes `&self` and warm handles are shared. An implementation
/// wrapping a resource that is not reentrant must serialize internally.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Run one hop of inference over `text`.
    async fn run(&self, text: &str, params: &GenerationParams) -> Result<String, EngineError>;

    /// The identifier this engine was loaded for.
    fn engine_id(&self) -> &str;
}

/// The engine-loading collaborator.
///
/// `load` is expensive; [`EngineCache`] guarantees it is called at most once
/// per identifier while the cached handle lives.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    /// Instantiate the engine identified by `engine_id`.
    async fn load(&self, engine_id: &str) -> Result<EngineHandle, EngineError>;
}
