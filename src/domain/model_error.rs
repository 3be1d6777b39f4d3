// Prediction error statistics
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceStats {
    pub absolute: f64,
    pub percentage: f64,
    pub is_over_predicted: bool,
    pub is_under_predicted: bool,
}

/// Signed percentage of `actual` relative to `predicted`, 0 when nothing was predicted.
pub fn percentage_difference(predicted: f64, actual: f64) -> f64 {
    if predicted == 0.0 {
        return 0.0;
    }
    (actual - predicted) / predicted * 100.0
}

pub fn difference_stats(predicted: f64, actual: f64) -> DifferenceStats {
    let diff = actual - predicted;
    DifferenceStats {
        absolute: diff.abs(),
        percentage: percentage_difference(predicted, actual),
        is_over_predicted: diff < 0.0,
        is_under_predicted: diff > 0.0,
    }
}

/// 100 minus the percentage error, floored at 0.
pub fn prediction_accuracy(predicted: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        return 0.0;
    }
    let percentage_error = (predicted - actual).abs() / actual * 100.0;
    (100.0 - percentage_error).max(0.0)
}

pub fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    if predictions.len() != actuals.len() || predictions.is_empty() {
        return 0.0;
    }
    let sum: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(predicted, actual)| (predicted - actual).abs())
        .sum();
    sum / predictions.len() as f64
}

pub fn root_mean_square_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    if predictions.len() != actuals.len() || predictions.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(predicted, actual)| (predicted - actual).powi(2))
        .sum();
    (sum_squares / predictions.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statistics() {
        let predictions = [100.0, 200.0, 300.0];
        let actuals = [110.0, 190.0, 300.0];

        assert!((mean_absolute_error(&predictions, &actuals) - 20.0 / 3.0).abs() < 1e-12);
        assert!((root_mean_square_error(&predictions, &actuals) - (200.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_error_statistics_mismatched_or_empty() {
        assert_eq!(mean_absolute_error(&[1.0], &[]), 0.0);
        assert_eq!(root_mean_square_error(&[], &[]), 0.0);
    }

    #[test]
    fn test_accuracy_and_difference() {
        assert_eq!(prediction_accuracy(90.0, 100.0), 90.0);
        assert_eq!(prediction_accuracy(350.0, 100.0), 0.0);
        assert_eq!(prediction_accuracy(10.0, 0.0), 0.0);

        let stats = difference_stats(200.0, 150.0);
        assert_eq!(stats.absolute, 50.0);
        assert_eq!(stats.percentage, -25.0);
        assert!(stats.is_over_predicted);
        assert!(!stats.is_under_predicted);
        assert_eq!(percentage_difference(0.0, 10.0), 0.0);
    }
}
