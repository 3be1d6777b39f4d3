// HTTP request handlers
use crate::domain::chiller::ChillerId;
use crate::domain::decision::ControlDecision;
use crate::domain::physics_model::{check_power_deviation, model_stats, predict_plant_power, ModelStats, PowerDeviation};
use crate::domain::report::{DecisionEvent, ModelFitReport, TimestepReport};
use crate::domain::timestep::TimestepError;
use crate::domain::validation::ValidationResult;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn timestep_error(e: TimestepError) -> (StatusCode, String) {
    let status = match e {
        TimestepError::MissingTimestep(_) => StatusCode::NOT_FOUND,
        TimestepError::MalformedRecord { .. } => {
            tracing::warn!("{}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, e.to_string())
}

#[derive(Serialize)]
pub struct TimestepCount {
    pub count: usize,
}

#[derive(Deserialize)]
pub struct ValidationQuery {
    pub decision: Option<bool>,
}

#[derive(Deserialize)]
pub struct PredictQuery {
    pub chiller: ChillerId,
    pub evap: f64,
    pub cond: f64,
    pub cooling: f64,
    /// Measured plant power to check against the prediction
    pub actual: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub chiller: ChillerId,
    pub predicted_power: f64,
    pub model: ModelStats,
    pub deviation: Option<PowerDeviation>,
}

#[derive(Serialize)]
pub struct ModelSummary {
    pub chiller: ChillerId,
    #[serde(flatten)]
    pub stats: ModelStats,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn timestep_count(State(state): State<Arc<AppState>>) -> Json<TimestepCount> {
    let count = state.decision_service.timestep_count().await;
    Json(TimestepCount { count })
}

pub async fn timestep_report(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<TimestepReport> {
    state
        .decision_service
        .report(index)
        .await
        .map(Json)
        .map_err(timestep_error)
}

pub async fn control_decision(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ControlDecision> {
    state
        .decision_service
        .control_decision(index)
        .await
        .map(Json)
        .map_err(timestep_error)
}

pub async fn validation(
    Path(index): Path<usize>,
    Query(query): Query<ValidationQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ValidationResult> {
    state
        .decision_service
        .validation(index, query.decision)
        .await
        .map(Json)
        .map_err(timestep_error)
}

pub async fn decision_timeline(State(state): State<Arc<AppState>>) -> Json<Vec<DecisionEvent>> {
    Json(state.decision_service.decision_timeline().await)
}

pub async fn list_models() -> Json<Vec<ModelSummary>> {
    let models = ChillerId::ALL
        .into_iter()
        .map(|chiller| ModelSummary {
            chiller,
            stats: model_stats(chiller),
        })
        .collect();
    Json(models)
}

pub async fn model_fit(State(state): State<Arc<AppState>>) -> Json<Vec<ModelFitReport>> {
    Json(state.decision_service.model_fit().await)
}

/// Evaluate one chiller's model directly, optionally checking a measured value against it
pub async fn predict(Query(query): Query<PredictQuery>) -> Json<PredictionResponse> {
    let model = model_stats(query.chiller);
    let predicted_power = predict_plant_power(query.chiller, query.evap, query.cond, query.cooling);
    let deviation = query
        .actual
        .map(|actual| check_power_deviation(actual, predicted_power, model.rmse));

    tracing::debug!(chiller = %query.chiller, predicted_power, "Evaluated power model");

    Json(PredictionResponse {
        chiller: query.chiller,
        predicted_power,
        model,
        deviation,
    })
}
