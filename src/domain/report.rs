// Composite views served to the dashboard
use super::chiller::ChillerId;
use super::decision::{ControlDecision, PerChiller};
use super::model_error::{
    difference_stats, mean_absolute_error, prediction_accuracy, root_mean_square_error, DifferenceStats,
};
use super::physics_model::{check_power_deviation, ChillerModel};
use super::timestep::TimestepSnapshot;
use super::validation::{
    physics_predictions, predicted_efficiency, validation_rules, PredictedEfficiency, RuleCheck,
    ValidationResult,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestepReport {
    pub index: usize,
    pub snapshot: TimestepSnapshot,
    pub decision: ControlDecision,
    pub validation: ValidationResult,
    pub rules: Vec<RuleCheck>,
    pub predictions: PerChiller<Option<f64>>,
    pub predicted: PredictedEfficiency,
    /// Actual plant efficiency (kW/ton)
    pub efficiency: f64,
    pub power_difference: Option<DifferenceStats>,
    pub prediction_accuracy: Option<f64>,
}

impl TimestepReport {
    pub fn new(
        index: usize,
        snapshot: TimestepSnapshot,
        decision: ControlDecision,
        validation: ValidationResult,
    ) -> Self {
        let has_decision = decision.has_changes;
        let predicted = predicted_efficiency(&snapshot, has_decision);
        let actual_power = snapshot.plant.power;

        Self {
            index,
            rules: validation_rules(&snapshot),
            predictions: physics_predictions(&snapshot, has_decision),
            efficiency: snapshot.plant.efficiency(),
            power_difference: predicted
                .total_predicted_power
                .map(|power| difference_stats(power, actual_power)),
            prediction_accuracy: predicted
                .total_predicted_power
                .map(|power| prediction_accuracy(power, actual_power)),
            predicted,
            snapshot,
            decision,
            validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    pub index: usize,
    pub datetime: String,
    pub reasoning: String,
    pub violation_count: usize,
    pub anomaly_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFitReport {
    pub chiller: ChillerId,
    pub samples: usize,
    pub mean_absolute_error: f64,
    pub root_mean_square_error: f64,
    /// Samples outside the model's 2×RMSE band
    pub deviations: usize,
    pub model_rmse: f64,
    pub model_r2: f64,
}

impl ModelFitReport {
    /// Summarise paired (predicted, actual) plant power samples for one chiller's model.
    pub fn new(chiller: ChillerId, predictions: &[f64], actuals: &[f64]) -> Self {
        let model = ChillerModel::for_chiller(chiller);
        let deviations = predictions
            .iter()
            .zip(actuals)
            .filter(|&(&predicted, &actual)| check_power_deviation(actual, predicted, model.rmse).is_deviation)
            .count();

        Self {
            chiller,
            samples: predictions.len(),
            mean_absolute_error: mean_absolute_error(predictions, actuals),
            root_mean_square_error: root_mean_square_error(predictions, actuals),
            deviations,
            model_rmse: model.rmse,
            model_r2: model.r2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_fit_report() {
        // Chiller 3 band is 2 x 4.69 = 9.38 kW
        let report = ModelFitReport::new(ChillerId::Three, &[200.0, 250.0], &[205.0, 240.0]);

        assert_eq!(report.samples, 2);
        assert_eq!(report.deviations, 1);
        assert_eq!(report.mean_absolute_error, 7.5);
        assert_eq!(report.model_r2, 0.9792);
    }

    #[test]
    fn test_model_fit_report_empty() {
        let report = ModelFitReport::new(ChillerId::One, &[], &[]);
        assert_eq!(report.samples, 0);
        assert_eq!(report.root_mean_square_error, 0.0);
    }
}
