//! Error types for the translation service
//!
//! Two families of errors exist. [`ConfigError`] covers malformed or
//! inconsistent routing configuration; it is raised while the service starts
//! and is never recovered. [`TranslateError`] covers everything that can go
//! wrong while serving a request; it is always returned as a typed result so
//! the front-ends can map each condition to a transport-specific response.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::InvalidLanguageCode;

/// Errors raised while loading and validating the configuration.
///
/// All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A language code did not survive normalization.
    #[error(transparent)]
    Language(#[from] InvalidLanguageCode),

    /// A language has an empty display name.
    #[error("language {code:?} has an empty display name")]
    EmptyDisplayName { code: String },

    /// A hop identifier is not of the form `"from-to"`.
    #[error("route {src}->{target}: hop {hop:?} is not of the form \"from-to\"")]
    MalformedHop {
        src: String,
        target: String,
        hop: String,
    },

    /// A route declares a different number of engines than hops.
    #[error("route {src}->{target} declares {hops} hop(s) but {engines} engine(s)")]
    EngineCountMismatch {
        src: String,
        target: String,
        hops: usize,
        engines: usize,
    },

    /// A route has no hops at all.
    #[error("route {src}->{target} has an empty hop list")]
    EmptyRoute { src: String, target: String },

    /// A route connects a language to itself.
    #[error("route {src}->{src} connects a language to itself")]
    DegenerateRoute { src: String },

    /// A route references a language that is not declared under `languages`.
    #[error(
        "route {src}->{target} references language {code:?} which is not declared under \"languages\""
    )]
    UnknownLanguage {
        src: String,
        target: String,
        code: String,
    },

    /// The hops of a route do not form a connected chain from source to target.
    #[error("route {src}->{target}: {detail}")]
    BrokenChain {
        src: String,
        target: String,
        detail: String,
    },

    /// Two declared routes normalize to the same ordered language pair.
    #[error("duplicate route for {src}->{target}")]
    DuplicateRoute { src: String, target: String },
}

/// Errors returned while serving a translation request.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The request was rejected before any routing or engine work: the
    /// source and target are the same language, or a code is unknown.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Both languages are valid but no configured route connects them.
    #[error("no translation route from {src} to {target}")]
    RouteNotFound { src: String, target: String },

    /// The engine for an identifier could not be instantiated. The cache
    /// does not retain the failure; the next acquire retries the load.
    #[error("failed to load engine {engine_id}: {reason}")]
    EngineLoad { engine_id: String, reason: String },

    /// A loaded engine failed to produce output for the given input.
    #[error("engine {engine_id} failed: {reason}")]
    Inference { engine_id: String, reason: String },

    /// The caller-supplied deadline elapsed while waiting on a load or an
    /// inference call.
    #[error("deadline elapsed while {operation}")]
    Timeout { operation: String },
}

impl TranslateError {
    /// Whether the condition was caused by the caller rather than by a
    /// failing engine or dependency. Front-ends map client errors to 4xx
    /// responses and the rest to 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslateError::InvalidRequest(_) | TranslateError::RouteNotFound { .. }
        )
    }
}
