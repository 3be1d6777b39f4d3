// Router wiring
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    control_decision, decision_timeline, health_check, list_models, model_fit, predict, timestep_count,
    timestep_report, validation,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/timesteps", get(timestep_count))
        .route("/timesteps/:index", get(timestep_report))
        .route("/timesteps/:index/decision", get(control_decision))
        .route("/timesteps/:index/validation", get(validation))
        .route("/decisions", get(decision_timeline))
        .route("/models", get(list_models))
        .route("/models/fit", get(model_fit))
        .route("/predict", get(predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
