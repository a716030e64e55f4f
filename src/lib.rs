//! triglot - chain-capable translation between Chinese, English, and Greek
//!
//! Some language pairs have no directly available translation engine and are
//! served by chaining through a bridge language (zh->el runs as zh->en
//! followed by en->el). This crate is the routing core behind that: it
//! resolves the hop sequence for a pair, lazily loads and caches the
//! engines (which are expensive to instantiate), applies them in order, and
//! reports the path taken.
//!
//! The components, leaf first:
//!
//! 1. **[`LanguageCatalog`]** - code to display name, presentation only
//! 2. **[`RouteTable`]** - validated mapping from ordered pairs to routes
//! 3. **[`EngineCache`]** - keyed, load-once engine store with per-key
//!    single-flight loading
//! 4. **[`Orchestrator`]** - resolves, acquires, applies, reports
//!
//! Engines live behind the [`TranslationEngine`] and [`EngineProvider`]
//! traits; the shipped providers are an HTTP-backed one for a real inference
//! service and deterministic mocks for tests and offline use.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use triglot::{MockEngineProvider, Orchestrator, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::builtin();
//!     let provider = Arc::new(MockEngineProvider::new());
//!     let orchestrator = Orchestrator::new(&config, provider)?;
//!
//!     let result = orchestrator.translate("你好，世界！", "zh", "el").await?;
//!     println!("{}", result.text);
//!     println!("via {}", result.path.join(" → "));
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod route;

pub use catalog::{LanguageCatalog, LanguageCode};
pub use config::{RouteSpec, TranslationConfig};
pub use engine::{
    EngineCache, EngineError, EngineProvider, GenerationParams, MockBehavior, MockEngineProvider,
    RemoteEngineProvider, TranslationEngine,
};
pub use error::{ConfigError, TranslateError};
pub use orchestrator::{Orchestrator, Translation};
pub use route::{Hop, Route, RouteTable};
