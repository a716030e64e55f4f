//! Keyed, load-once cache of translation engines
//!
//! Engines are expensive to instantiate, so the cache loads each identifier
//! at most once and shares the handle with every caller. Concurrent
//! `acquire` calls for the same identifier join a single in-flight load and
//! all receive its outcome, success or failure; calls for different
//! identifiers never block one another. A failed load is not retained: the
//! slot is removed and the next `acquire` retries.
//!
//! The map lock only guards slot bookkeeping. Loads and inference run with
//! no cache lock held, so warm-entry inference from different requests is
//! fully concurrent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::engine::{EngineError, EngineHandle, EngineProvider};
use crate::error::TranslateError;

type LoadFuture = Shared<BoxFuture<'static, Result<EngineHandle, EngineError>>>;

enum Slot {
    /// Load finished; the handle is shared with every subsequent caller.
    Ready(EngineHandle),
    /// Load in flight; callers clone the future and await the same outcome.
    Loading(LoadFuture),
}

/// Load-once engine store shared across requests. Not an LRU: entries live
/// until [`EngineCache::clear`] drops them all.
pub struct EngineCache {
    provider: Arc<dyn EngineProvider>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl EngineCache {
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        EngineCache {
            provider,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the engine for `engine_id`, loading it if no cached handle exists.
    ///
    /// If a deadline cancels a waiter, the in-flight load is merely parked;
    /// the next `acquire` for the same identifier resumes it, so the cache is
    /// never left half-loaded.
    pub async fn acquire(&self, engine_id: &str) -> Result<EngineHandle, TranslateError> {
        let load = {
            let mut slots = self.lock(engine_id)?;
            match slots.get(engine_id) {
                Some(Slot::Ready(handle)) => {
                    tracing::debug!(engine_id, "engine cache hit");
                    return Ok(Arc::clone(handle));
                }
                Some(Slot::Loading(load)) => load.clone(),
                None => {
                    tracing::info!(engine_id, "loading engine");
                    let provider = Arc::clone(&self.provider);
                    let id = engine_id.to_string();
                    let load: LoadFuture =
                        async move { provider.load(&id).await }.boxed().shared();
                    slots.insert(engine_id.to_string(), Slot::Loading(load.clone()));
                    load
                }
            }
        };

        match load.clone().await {
            Ok(handle) => {
                let mut slots = self.lock(engine_id)?;
                // Promote only the load we awaited. A slot removed by a
                // concurrent clear() stays removed: the handle is still valid
                // for this caller, but future callers load afresh.
                if let Some(slot) = slots.get_mut(engine_id) {
                    if matches!(slot, Slot::Loading(current) if current.ptr_eq(&load)) {
                        *slot = Slot::Ready(Arc::clone(&handle));
                    }
                }
                Ok(handle)
            }
            Err(err) => {
                let mut slots = self.lock(engine_id)?;
                if matches!(slots.get(engine_id), Some(Slot::Loading(current)) if current.ptr_eq(&load))
                {
                    slots.remove(engine_id);
                }
                tracing::warn!(engine_id, error = %err, "engine load failed");
                Err(TranslateError::EngineLoad {
                    engine_id: engine_id.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Drop every entry and release the cache's references to the engines.
    ///
    /// Handles already returned stay valid for their holders; the engines
    /// themselves are freed once the last holder is done with them.
    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            let dropped = slots.len();
            slots.clear();
            tracing::info!(dropped, "engine cache cleared");
        }
    }

    /// Number of entries, counting in-flight loads.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
        engine_id: &str,
    ) -> Result<MutexGuard<'_, HashMap<String, Slot>>, TranslateError> {
        self.slots.lock().map_err(|_| TranslateError::EngineLoad {
            engine_id: engine_id.to_string(),
            reason: "engine cache lock poisoned".to_string(),
        })
    }
}
