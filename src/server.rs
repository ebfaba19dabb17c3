//! HTTP API: the welcome route and the analysis endpoint.
//!
//! Both outcomes of an analysis (full envelope or "no articles") are 200s;
//! only malformed or blank requests are rejected.

use crate::models::CompanyRequest;
use crate::pipeline::NewsAnalyzer;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, serve};
use std::error::Error;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const WELCOME: &str = "Welcome to the News Analyzer API";

/// Shared state threaded through the handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<NewsAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: NewsAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Bind `bind` and serve until the process exits.
pub async fn run_server(state: AppState, bind: &str) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("News Analyzer API listening on http://{}", listener.local_addr()?);
    serve(listener, build_router(state)).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/analyze-news/", post(analyze_news))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({ "message": WELCOME }))
}

async fn analyze_news(
    State(state): State<AppState>,
    payload: Result<Json<CompanyRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected analysis request");
            return api_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text());
        }
    };

    let company = request.company_name.trim();
    if company.is_empty() {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "company_name must not be blank",
        );
    }

    Json(state.analyzer.analyze(company).await).into_response()
}

/// `{"error": message}` with the given status.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
