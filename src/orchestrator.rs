//! Translation orchestration
//!
//! The [`Orchestrator`] ties the core together: it resolves a route for a
//! language pair, pulls each hop's engine from the cache, feeds the running
//! text through the hops in order, and reports the human-readable path taken.
//! It holds no request state of its own; the engine cache is the only shared
//! mutable resource behind it.
//!
//! Built once at process start and shared by the front-ends (an `Arc` in the
//! HTTP server's state, a local in the CLI).
//!
//! # Example
//!
//! ```ignore
//! let config = TranslationConfig::builtin();
//! let provider = Arc::new(RemoteEngineProvider::from_env()?);
//! let orchestrator = Orchestrator::new(&config, provider)?;
//!
//! let result = orchestrator.translate("你好，世界！", "zh", "el").await?;
//! println!("{} (via {})", result.text, result.path.join(" → "));
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{LanguageCatalog, LanguageCode};
use crate::config::TranslationConfig;
use crate::engine::{EngineCache, EngineHandle, EngineProvider, GenerationParams};
use crate::error::{ConfigError, TranslateError};
use crate::route::{Route, RouteTable};

/// The outcome of one translation: the final text and the ordered display
/// names of the languages passed through (always `hops + 1` entries, for
/// direct and chain routes alike).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub path: Vec<String>,
}

/// A caller-supplied time budget covering engine loads and inference alike.
#[derive(Debug, Clone, Copy)]
struct Deadline(Option<tokio::time::Instant>);

impl Deadline {
    fn none() -> Self {
        Deadline(None)
    }

    fn after(limit: Duration) -> Self {
        Deadline(Some(tokio::time::Instant::now() + limit))
    }

    async fn bound<T>(
        &self,
        operation: &str,
        work: impl Future<Output = Result<T, TranslateError>>,
    ) -> Result<T, TranslateError> {
        match self.0 {
            None => work.await,
            Some(at) => match tokio::time::timeout_at(at, work).await {
                Ok(result) => result,
                Err(_) => Err(TranslateError::Timeout {
                    operation: operation.to_string(),
                }),
            },
        }
    }
}

/// Routing core: catalog, route table, engine cache, and the fixed decoding
/// parameters applied on every hop.
pub struct Orchestrator {
    catalog: LanguageCatalog,
    routes: RouteTable,
    engines: EngineCache,
    params: GenerationParams,
}

impl Orchestrator {
    /// Validate the configuration and build the routing core. Fails with
    /// [`ConfigError`] before any request is served; nothing is deferred.
    pub fn new(
        config: &TranslationConfig,
        provider: Arc<dyn EngineProvider>,
    ) -> Result<Self, ConfigError> {
        let (catalog, routes) = config.build()?;
        tracing::info!(
            languages = catalog.len(),
            routes = routes.len(),
            "orchestrator ready"
        );
        Ok(Orchestrator {
            catalog,
            routes,
            engines: EngineCache::new(provider),
            params: GenerationParams::default(),
        })
    }

    /// Override the decoding parameters passed to every hop.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Source display name to reachable target display names, derived from
    /// the route table.
    pub fn available_routes(&self) -> BTreeMap<String, Vec<String>> {
        self.catalog.list_routes(&self.routes)
    }

    /// Drop every cached engine. The next translation on each pair reloads.
    pub fn clear_cache(&self) {
        self.engines.clear();
    }

    /// The path a translation over this pair would take, without running it:
    /// display names of every language passed through, `hops + 1` entries.
    pub fn route_path(&self, source: &str, target: &str) -> Result<Vec<String>, TranslateError> {
        let (source, target) = self.check_pair(source, target)?;
        let route = self.resolve(&source, &target)?;
        Ok(self.describe_path(route, &target))
    }

    /// Translate `text` from `source` to `target`, returning the final text
    /// and the path taken.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, TranslateError> {
        self.translate_impl(text, source, target, Deadline::none())
            .await
    }

    /// Like [`Orchestrator::translate`], but bounded by a deadline covering
    /// engine loads and inference. Elapsing surfaces
    /// [`TranslateError::Timeout`] and leaves the cache consistent.
    pub async fn translate_with_deadline(
        &self,
        text: &str,
        source: &str,
        target: &str,
        limit: Duration,
    ) -> Result<Translation, TranslateError> {
        self.translate_impl(text, source, target, Deadline::after(limit))
            .await
    }

    /// Translate several texts over the same language pair.
    ///
    /// The route is resolved once and every hop engine is acquired once
    /// before the first item runs, so the batch never loads an engine per
    /// text. Items fail independently: each slot carries its own result, and
    /// one failing item leaves the others translated. Conditions affecting
    /// the whole batch equally (invalid pair, no route, an engine that will
    /// not load) fail the call itself.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<Result<Translation, TranslateError>>, TranslateError> {
        self.translate_batch_impl(texts, source, target, Deadline::none())
            .await
    }

    /// Like [`Orchestrator::translate_batch`] with one deadline over the
    /// whole batch; items past the deadline report [`TranslateError::Timeout`].
    pub async fn translate_batch_with_deadline(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
        limit: Duration,
    ) -> Result<Vec<Result<Translation, TranslateError>>, TranslateError> {
        self.translate_batch_impl(texts, source, target, Deadline::after(limit))
            .await
    }

    async fn translate_impl(
        &self,
        text: &str,
        source: &str,
        target: &str,
        deadline: Deadline,
    ) -> Result<Translation, TranslateError> {
        let (source, target) = self.check_pair(source, target)?;
        let route = self.resolve(&source, &target)?;
        let path = self.describe_path(route, &target);
        tracing::info!(path = %path.join(" → "), "translation path");

        let mut current = text.to_string();
        for (hop, engine_id) in route.hops().iter().zip(route.engines()) {
            let engine = deadline
                .bound("waiting for engine load", self.engines.acquire(engine_id))
                .await?;
            tracing::debug!(hop = %hop, engine_id, "running hop");
            let next = self.run_hop(&engine, engine_id, &current, deadline).await?;
            current = next;
        }

        Ok(Translation {
            text: current,
            path,
        })
    }

    async fn translate_batch_impl(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
        deadline: Deadline,
    ) -> Result<Vec<Result<Translation, TranslateError>>, TranslateError> {
        let (source, target) = self.check_pair(source, target)?;
        let route = self.resolve(&source, &target)?;
        let path = self.describe_path(route, &target);
        tracing::info!(
            path = %path.join(" → "),
            items = texts.len(),
            "batch translation path"
        );

        // Warm every hop engine once; all items reuse the same handles.
        let mut engines: Vec<EngineHandle> = Vec::with_capacity(route.hop_count());
        for engine_id in route.engines() {
            let engine = deadline
                .bound("waiting for engine load", self.engines.acquire(engine_id))
                .await?;
            engines.push(engine);
        }

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let item = self.run_hops(&engines, route, text, deadline).await;
            results.push(item.map(|text| Translation {
                text,
                path: path.clone(),
            }));
        }
        Ok(results)
    }

    async fn run_hops(
        &self,
        engines: &[EngineHandle],
        route: &Route,
        text: &str,
        deadline: Deadline,
    ) -> Result<String, TranslateError> {
        let mut current = text.to_string();
        for (engine, engine_id) in engines.iter().zip(route.engines()) {
            let next = self.run_hop(engine, engine_id, &current, deadline).await?;
            current = next;
        }
        Ok(current)
    }

    async fn run_hop(
        &self,
        engine: &EngineHandle,
        engine_id: &str,
        text: &str,
        deadline: Deadline,
    ) -> Result<String, TranslateError> {
        deadline
            .bound("running inference", async {
                engine
                    .run(text, &self.params)
                    .await
                    .map_err(|e| TranslateError::Inference {
                        engine_id: engine_id.to_string(),
                        reason: e.to_string(),
                    })
            })
            .await
    }

    /// Normalize and validate the requested pair. Rejections here happen
    /// before any route lookup or engine work.
    fn check_pair(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(LanguageCode, LanguageCode), TranslateError> {
        let source = LanguageCode::parse(source)
            .map_err(|e| TranslateError::InvalidRequest(e.to_string()))?;
        let target = LanguageCode::parse(target)
            .map_err(|e| TranslateError::InvalidRequest(e.to_string()))?;

        for code in [&source, &target] {
            if !self.catalog.contains(code) {
                return Err(TranslateError::InvalidRequest(format!(
                    "unknown language code {:?}",
                    code.as_str()
                )));
            }
        }
        if source == target {
            return Err(TranslateError::InvalidRequest(
                "source and target languages are the same".to_string(),
            ));
        }
        Ok((source, target))
    }

    fn resolve(
        &self,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<&Route, TranslateError> {
        self.routes
            .resolve(source, target)
            .ok_or_else(|| TranslateError::RouteNotFound {
                src: source.to_string(),
                target: target.to_string(),
            })
    }

    /// Display names of each hop's source language followed by the target's.
    fn describe_path(&self, route: &Route, target: &LanguageCode) -> Vec<String> {
        route
            .hops()
            .iter()
            .map(|hop| self.catalog.display_name(hop.from()).to_string())
            .chain(std::iter::once(
                self.catalog.display_name(target).to_string(),
            ))
            .collect()
    }
}
