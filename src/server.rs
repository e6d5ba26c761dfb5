//! HTTP bridge server.
//!
//! Thin endpoint layer over the resolution engine and the action-API
//! client: query parameters in, simplified JSON (or raw page HTML) out.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/resolve?topic=…[&wiki=…]` | Resolve a topic to a wiki base |
//! | `GET`  | `/search?q=…[&topic=…][&wiki=…][&limit=…]` | Search a resolved wiki |
//! | `GET`  | `/page?title=…[&topic=…][&wiki=…][&format=json\|html]` | Fetch a page |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "…" } }
//! ```
//!
//! Codes: `bad_request` (400), `not_allowed` (403), `not_found` (404),
//! `upstream_error` (502). The code is derived from the structured
//! [`BridgeError`] variant, never from message text.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the bridge is
//! read-only and meant to sit behind browser clients.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::client::{PageContent, SearchHit, WikiClient};
use crate::config::Config;
use crate::error::BridgeError;
use crate::probe::HttpProber;
use crate::resolve::{ResolutionMethod, Resolver};
use crate::title::{canonicalize, TitleResolution};
use crate::wiki::WikiBase;

/// Shared application state passed to all route handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
    client: Arc<WikiClient>,
}

/// Starts the bridge HTTP server on `[server].bind`. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let prober = Arc::new(HttpProber::new(&config.resolver)?);
    let state = AppState {
        resolver: Arc::new(Resolver::new(config.resolver.clone(), prober)),
        client: Arc::new(WikiClient::new(&config.resolver)?),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/resolve", get(handle_resolve))
        .route("/search", get(handle_search))
        .route("/page", get(handle_page))
        .layer(cors)
        .with_state(state);

    println!("wikibridge listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        AppError {
            status: StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Constructs a 400 Bad Request error for parameter validation.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /resolve ============

#[derive(Deserialize)]
struct ResolveParams {
    topic: Option<String>,
    wiki: Option<String>,
}

/// JSON response body for `GET /resolve`.
#[derive(Serialize)]
struct ResolveResponse {
    wiki: WikiBase,
    method: ResolutionMethod,
}

async fn handle_resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<ResolveResponse>, AppError> {
    let topic = params.topic.as_deref().unwrap_or("");
    if topic.trim().is_empty() && params.wiki.is_none() {
        return Err(bad_request("topic or wiki parameter required"));
    }

    let result = state
        .resolver
        .resolve(topic, params.wiki.as_deref())
        .await?;
    Ok(Json(ResolveResponse {
        wiki: result.base,
        method: result.method,
    }))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    topic: Option<String>,
    wiki: Option<String>,
    limit: Option<u32>,
}

/// JSON response body for `GET /search`.
#[derive(Serialize)]
struct SearchResponse {
    wiki: WikiBase,
    method: ResolutionMethod,
    results: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }
    let limit = params.limit.unwrap_or(5).clamp(1, 20);

    // Without an explicit topic the query itself is the topic guess.
    let topic = params.topic.as_deref().unwrap_or(&params.q);
    let resolved = state.resolver.resolve(topic, params.wiki.as_deref()).await?;

    let results = state
        .client
        .search_articles(&resolved.base, &params.q, limit)
        .await?;

    Ok(Json(SearchResponse {
        wiki: resolved.base,
        method: resolved.method,
        results,
    }))
}

// ============ GET /page ============

#[derive(Deserialize)]
struct PageParams {
    title: String,
    topic: Option<String>,
    wiki: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

/// JSON response body for `GET /page?format=json`.
#[derive(Serialize)]
struct PageResponse {
    wiki: WikiBase,
    method: ResolutionMethod,
    #[serde(flatten)]
    title: TitleResolution,
    page: PageContent,
}

async fn handle_page(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError> {
    if params.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    if params.topic.is_none() && params.wiki.is_none() {
        return Err(bad_request("topic or wiki parameter required"));
    }
    let format = params.format.as_deref().unwrap_or("json");
    if format != "json" && format != "html" {
        return Err(bad_request("format must be json or html"));
    }

    let topic = params.topic.as_deref().unwrap_or("");
    let resolved = state.resolver.resolve(topic, params.wiki.as_deref()).await?;
    let title = canonicalize(state.client.as_ref(), &resolved.base, &params.title).await;

    if format == "html" {
        let html = state
            .client
            .render_html(&resolved.base, &title.canonical)
            .await?;
        return Ok(Html(html).into_response());
    }

    let page = state
        .client
        .fetch_page(&resolved.base, &title.canonical)
        .await?;

    Ok(Json(PageResponse {
        wiki: resolved.base,
        method: resolved.method,
        title,
        page,
    })
    .into_response())
}
