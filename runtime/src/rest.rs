// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for sa-scraper.
//!
//! Every scraping endpoint goes through the shared [`Scraper`], whose lock
//! queues concurrent requests so only one browser session runs at a time.
//! Failures are answered with `success: false` bodies, never raw errors.

use crate::scrape::Scraper;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sa_series::{window_from_months, Catalog, ScrapeError, ALL_OBSERVATIONS};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by all handlers.
pub struct AppState {
    pub scraper: Scraper,
    pub catalog: Catalog,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(scraper: Scraper, catalog: Catalog) -> Self {
        Self {
            scraper,
            catalog,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/indicators", get(list_indicators))
        .route("/scrape", get(scrape_one))
        .route("/scrape-multiple", post(scrape_multiple))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API until the process receives ctrl-c.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received shutdown signal");
        })
        .await?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

/// HTTP status for a failed scrape.
pub fn status_for(error: &ScrapeError) -> StatusCode {
    match error {
        ScrapeError::BrowserUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ScrapeError::NavigationTimeout { .. } | ScrapeError::ReadinessTimeout { .. } => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ScrapeError::OptionNotFound { .. } => StatusCode::BAD_REQUEST,
        ScrapeError::ControlNotFound { .. }
        | ScrapeError::ActionControlNotFound { .. }
        | ScrapeError::ChartNotFound(_) => StatusCode::BAD_GATEWAY,
        ScrapeError::Browser(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn bad_request(message: &str) -> Response {
    reply(
        StatusCode::BAD_REQUEST,
        json!({ "success": false, "error": message }),
    )
}

// ── Handlers ────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "live_browsers": state.scraper.renderer().live_sessions(),
    }))
}

async fn list_indicators(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!(state.catalog.iter().collect::<Vec<_>>()))
}

/// `GET /scrape` query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct ScrapeParams {
    pub indicator: Option<String>,
    pub date: Option<String>,
    pub months: Option<i64>,
}

async fn scrape_one(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ScrapeParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return bad_request(&rejection.body_text()),
    };
    let Some(indicator) = params
        .indicator
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return bad_request("missing required query parameter `indicator`");
    };
    let date = params.date.filter(|d| !d.trim().is_empty());

    let window = if date.is_some() {
        ALL_OBSERVATIONS
    } else {
        window_from_months(params.months)
    };

    let result = match state.scraper.scrape(&indicator, window).await {
        Ok(result) => result,
        Err(e) => {
            let mut body = json!({
                "success": false,
                "indicator": indicator,
                "error": e.to_string(),
                "error_kind": e.kind(),
            });
            if let Some(date) = date {
                body["date"] = json!(date);
            }
            return reply(status_for(&e), body);
        }
    };

    match date {
        Some(date) => match result.data().find(&date) {
            Some(record) => reply(
                StatusCode::OK,
                json!({
                    "success": true,
                    "indicator": indicator,
                    "date": date,
                    "value": record.value,
                    "scraped_at": result.scraped_at(),
                }),
            ),
            None => reply(
                StatusCode::NOT_FOUND,
                json!({
                    "success": false,
                    "indicator": indicator,
                    "date": date,
                    "value": null,
                    "error": format!("no observation for date {date}"),
                    "scraped_at": result.scraped_at(),
                }),
            ),
        },
        None => reply(
            StatusCode::OK,
            json!({
                "success": true,
                "indicator": indicator,
                "data": result.data(),
                "count": result.data().len(),
                "scraped_at": result.scraped_at(),
            }),
        ),
    }
}

/// `POST /scrape-multiple` body.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub indicators: Vec<String>,
    pub months: Option<i64>,
}

async fn scrape_multiple(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_request(&rejection.body_text()),
    };
    let codes: Vec<String> = body
        .indicators
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if codes.is_empty() {
        return bad_request("`indicators` must list at least one indicator code");
    }

    let batch = state
        .scraper
        .run_all(&codes, window_from_months(body.months))
        .await;
    (StatusCode::OK, Json(batch)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ScrapeError::ReadinessTimeout {
                code: "CMP".into(),
                timeout_ms: 90_000
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&ScrapeError::ChartNotFound("gone".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ScrapeError::BrowserUnavailable("none".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
