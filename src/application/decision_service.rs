// Decision service - Use cases for inspecting control decisions per timestep
use crate::application::run_repository::RunDataRepository;
use crate::domain::chiller::ChillerId;
use crate::domain::dataset::Dataset;
use crate::domain::decision::{detect_control_decision, ControlDecision};
use crate::domain::report::{DecisionEvent, ModelFitReport, TimestepReport};
use crate::domain::timestep::{parse_timestep, TimestepError, TimestepSnapshot};
use crate::domain::validation::{check_violations, select_active_chiller_prediction, ValidationResult};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct DecisionService {
    repository: Arc<dyn RunDataRepository>,
}

impl DecisionService {
    pub fn new(repository: Arc<dyn RunDataRepository>) -> Self {
        Self { repository }
    }

    pub async fn timestep_count(&self) -> usize {
        self.repository.load_dataset().await.len()
    }

    pub async fn timestep(&self, index: usize) -> Result<TimestepSnapshot, TimestepError> {
        let dataset = self.repository.load_dataset().await;
        parse_timestep(index, &dataset)
    }

    pub async fn control_decision(&self, index: usize) -> Result<ControlDecision, TimestepError> {
        let dataset = self.repository.load_dataset().await;
        detect_control_decision(index, &dataset)
    }

    /// Validate a timestep. Without an explicit override the anomaly check runs only
    /// when a control decision was detected at this index.
    pub async fn validation(
        &self,
        index: usize,
        has_control_decision: Option<bool>,
    ) -> Result<ValidationResult, TimestepError> {
        let dataset = self.repository.load_dataset().await;
        let snapshot = parse_timestep(index, &dataset)?;
        let has_control_decision = match has_control_decision {
            Some(flag) => flag,
            None => detect_control_decision(index, &dataset)?.has_changes,
        };
        Ok(check_violations(&snapshot, has_control_decision))
    }

    pub async fn report(&self, index: usize) -> Result<TimestepReport, TimestepError> {
        let dataset = self.repository.load_dataset().await;
        let snapshot = parse_timestep(index, &dataset)?;
        let decision = detect_control_decision(index, &dataset)?;
        let validation = check_violations(&snapshot, decision.has_changes);
        Ok(TimestepReport::new(index, snapshot, decision, validation))
    }

    /// Every timestep where a staging or setpoint change was detected, in index order.
    pub async fn decision_timeline(&self) -> Vec<DecisionEvent> {
        let dataset = self.repository.load_dataset().await;
        tokio::task::spawn_blocking(move || collect_decision_events(&dataset))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Decision timeline scan failed: {}", e);
                Vec::new()
            })
    }

    /// Compare each model against every single-chiller timestep in the run.
    pub async fn model_fit(&self) -> Vec<ModelFitReport> {
        let dataset = self.repository.load_dataset().await;
        tokio::task::spawn_blocking(move || collect_model_fit(&dataset))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Model fit scan failed: {}", e);
                Vec::new()
            })
    }
}

// Each record is parsed once and carried forward as the next index's previous snapshot.
// A timestep whose predecessor is missing or malformed is skipped.
fn collect_decision_events(dataset: &Dataset) -> Vec<DecisionEvent> {
    let mut events = Vec::new();
    let mut previous: Option<(usize, TimestepSnapshot)> = None;

    for index in dataset.indices() {
        let snapshot = match parse_timestep(index, dataset) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Skipping timestep {} in decision timeline: {}", index, e);
                previous = None;
                continue;
            }
        };

        let decision = match (index.checked_sub(1), &previous) {
            (None, _) => Some(ControlDecision::between(&snapshot, &snapshot)),
            (Some(expected), Some((previous_index, previous_snapshot))) if *previous_index == expected => {
                Some(ControlDecision::between(previous_snapshot, &snapshot))
            }
            (Some(expected), _) => {
                tracing::warn!(
                    "Skipping timestep {} in decision timeline: timestep {} unavailable",
                    index,
                    expected
                );
                None
            }
        };

        if let Some(decision) = decision.filter(|decision| decision.has_changes) {
            let validation = check_violations(&snapshot, true);
            events.push(DecisionEvent {
                index,
                datetime: snapshot.datetime.clone(),
                reasoning: decision.reasoning,
                violation_count: validation.violations.len(),
                anomaly_count: validation.anomalies.len(),
            });
        }
        previous = Some((index, snapshot));
    }

    tracing::debug!("Found {} control decisions in {} timesteps", events.len(), dataset.len());
    events
}

fn collect_model_fit(dataset: &Dataset) -> Vec<ModelFitReport> {
    let mut samples: BTreeMap<ChillerId, (Vec<f64>, Vec<f64>)> =
        ChillerId::ALL.into_iter().map(|id| (id, Default::default())).collect();

    for index in dataset.indices() {
        let snapshot = match parse_timestep(index, dataset) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Skipping timestep {} in model fit: {}", index, e);
                continue;
            }
        };
        if snapshot.plant.cooling <= 0.0 {
            continue;
        }
        if let Some(prediction) = select_active_chiller_prediction(&snapshot) {
            let (predictions, actuals) = samples.entry(prediction.chiller).or_default();
            predictions.push(prediction.predicted_power);
            actuals.push(snapshot.plant.power);
        }
    }

    samples
        .into_iter()
        .map(|(chiller, (predictions, actuals))| ModelFitReport::new(chiller, &predictions, &actuals))
        .collect()
}
