//! Query endpoint: the HTTP surface over the product search aggregator.
//!
//! Routes:
//! - `GET /` landing page, `GET /favicon.ico` icon
//! - `GET /health` liveness probe
//! - `GET /sites` registered sites and their fetch strategies
//! - `POST /search` (form) and `GET /search` (query string) run a search

use crate::config::AppConfig;
use crate::error::Result;
use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use shopscan_search::{SearchConfig, SearchError, SiteRegistry, SiteSelection};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const FAVICON_SVG: &str = include_str!("../assets/favicon.svg");

/// Immutable state shared by all handlers.
struct AppState {
    registry: SiteRegistry,
    search: SearchConfig,
}

/// Search request parameters, from a form body or a query string.
#[derive(Debug, serde::Deserialize)]
struct SearchParams {
    #[serde(default)]
    search_term: String,
    /// Comma-separated site names; empty or `all` means every site.
    #[serde(default)]
    sites: String,
}

#[derive(serde::Serialize)]
struct SiteInfo<'a> {
    name: &'a str,
    strategy: &'static str,
}

/// Build the router for `config`.
///
/// # Errors
///
/// Returns an error if the configured site adapters are invalid.
pub fn router(config: &AppConfig) -> Result<Router> {
    let state = Arc::new(AppState {
        registry: config.registry()?,
        search: config.search.clone(),
    });

    Ok(Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/health", get(health))
        .route("/sites", get(list_sites))
        .route("/search", get(search_query).post(search_form))
        .with_state(state))
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let app = router(&config)?;

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("shopscan listening on http://{local_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn favicon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], FAVICON_SVG)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn list_sites(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sites: Vec<SiteInfo<'_>> = state
        .registry
        .adapters()
        .iter()
        .map(|a| SiteInfo {
            name: &a.name,
            strategy: a.fetch_strategy.name(),
        })
        .collect();
    Json(sites).into_response()
}

async fn search_form(
    State(state): State<Arc<AppState>>,
    Form(params): Form<SearchParams>,
) -> Response {
    run_search(&state, params).await
}

async fn search_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    run_search(&state, params).await
}

async fn run_search(state: &AppState, params: SearchParams) -> Response {
    let selection = SiteSelection::parse(&params.sites);
    let result =
        shopscan_search::search(&params.search_term, &selection, &state.registry, &state.search)
            .await;

    match result {
        Ok(records) => {
            tracing::info!(sites = records.len(), "search completed");
            (StatusCode::OK, Json(records)).into_response()
        }
        Err(err @ SearchError::Validation(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "search could not run");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}
