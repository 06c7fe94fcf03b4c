use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::model::PlanForm;
use crate::plan::PlanGenerator;

/// Application state shared across all handlers
pub type AppState = Arc<PlanGenerator>;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub output: String,
}

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: &PlanError) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

/// Form fields arrive as raw pairs so that `disease` may repeat
pub async fn get_plan(
    State(generator): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    let profile = match PlanForm::from_pairs(pairs).validate() {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Rejected plan request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &e);
        }
    };

    info!(
        "Generating plan for {} condition(s): {}",
        profile.diseases.len(),
        profile.diseases.join(", ")
    );

    match generator.generate(&profile).await {
        Ok(plan) => (StatusCode::OK, Json(PlanResponse { output: plan.html })).into_response(),
        Err(e) => {
            error!("Plan generation failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, &e)
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/get_plan", post(get_plan))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> Result<(), PlanError> {
    let generator = PlanGenerator::from_config(config)?;
    let app = router(Arc::new(generator));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
