use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use triglot::{
    EngineProvider, Orchestrator, RemoteEngineProvider, TranslateError, TranslationConfig,
};

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub from: String,
    pub to: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    pub original_text: String,
    pub translated_text: String,
    pub from: String,
    pub to: String,
    pub translation_path: Vec<String>,
}

#[derive(Deserialize)]
pub struct BatchTranslateRequest {
    pub from: String,
    pub to: String,
    pub texts: Vec<String>,
}

/// One batch item: either a translation or an error, never both.
#[derive(Serialize)]
pub struct BatchItem {
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct BatchTranslateResponse {
    pub translations: Vec<BatchItem>,
    pub from: String,
    pub to: String,
    pub translation_path: Vec<String>,
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub languages: BTreeMap<String, String>,
    pub routes: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let config = match std::env::var("TRIGLOT_CONFIG") {
        Ok(path) => TranslationConfig::from_file(&path)?,
        Err(_) => TranslationConfig::builtin(),
    };

    let provider: Arc<dyn EngineProvider> = Arc::new(
        RemoteEngineProvider::from_env()
            .map_err(|e| format!("failed to initialize engine provider: {e}"))?,
    );
    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(&config, provider)?),
    };

    let app = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/translate", post(translate))
        .route("/translate/batch", post(translate_batch))
        .route("/cache", delete(clear_cache))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind = std::env::var("TRIGLOT_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("🚀 Translation server running at http://{bind}");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn service_info() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Translation API is running. POST /translate to translate text.".to_string(),
    })
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Service is healthy".to_string(),
    })
}

async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state
        .orchestrator
        .catalog()
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();
    Json(LanguagesResponse {
        languages,
        routes: state.orchestrator.available_routes(),
    })
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(from = %request.from, to = %request.to, "translation request");

    let translation = state
        .orchestrator
        .translate(&request.text, &request.from, &request.to)
        .await
        .map_err(into_response_error)?;

    Ok(Json(TranslateResponse {
        original_text: request.text,
        translated_text: translation.text,
        from: request.from,
        to: request.to,
        translation_path: translation.path,
    }))
}

async fn translate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchTranslateRequest>,
) -> Result<Json<BatchTranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        from = %request.from,
        to = %request.to,
        items = request.texts.len(),
        "batch translation request"
    );

    let translation_path = state
        .orchestrator
        .route_path(&request.from, &request.to)
        .map_err(into_response_error)?;

    let results = state
        .orchestrator
        .translate_batch(&request.texts, &request.from, &request.to)
        .await
        .map_err(into_response_error)?;

    let translations = request
        .texts
        .iter()
        .zip(results)
        .map(|(original, result)| match result {
            Ok(translation) => BatchItem {
                original_text: original.clone(),
                translated_text: Some(translation.text),
                error: None,
            },
            Err(e) => BatchItem {
                original_text: original.clone(),
                translated_text: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(Json(BatchTranslateResponse {
        translations,
        from: request.from,
        to: request.to,
        translation_path,
    }))
}

async fn clear_cache(State(state): State<AppState>) -> Json<StatusResponse> {
    state.orchestrator.clear_cache();
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Engine cache cleared; the next translation per pair will reload".to_string(),
    })
}

/// Map core errors to transport responses: caller mistakes become 400,
/// dependency failures 502, and an elapsed deadline 504.
fn into_response_error(error: TranslateError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(error, TranslateError::Timeout { .. }) {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
