// Violation & anomaly checks for a single timestep
use super::chiller::ChillerId;
use super::decision::PerChiller;
use super::physics_model::predict_plant_power;
use super::timestep::TimestepSnapshot;
use serde::Serialize;

pub const RLA_MAX: f64 = 95.0;
pub const RLA_MIN: f64 = 30.0;
pub const EVAP_TEMP_MIN: f64 = 42.0;
pub const EVAP_TEMP_MAX: f64 = 55.0;
/// Efficiency disagreement with the model (%) above which a timestep is anomalous
pub const EFFICIENCY_ANOMALY_PERCENT: f64 = 10.0;

/// Hard violations are physical-constraint breaches; anomalies are advisory model disagreements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub violations: Vec<String>,
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChillerPrediction {
    pub chiller: ChillerId,
    /// Predicted plant power (kW)
    pub predicted_power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedEfficiency {
    /// kW/ton
    pub predicted_efficiency: Option<f64>,
    pub total_predicted_power: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    RlaMax,
    RlaMin,
    EvapTempRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleCheck {
    pub chiller: ChillerId,
    pub rule: Rule,
    pub passed: bool,
    pub observed: Option<f64>,
}

/// Model prediction for the one chiller that is running, if exactly one is.
///
/// The per-chiller models only cover single-chiller operation, so zero or several
/// running chillers yield `None`.
pub fn select_active_chiller_prediction(snapshot: &TimestepSnapshot) -> Option<ActiveChillerPrediction> {
    let mut running = snapshot
        .chillers()
        .filter_map(|(id, chiller)| chiller.running_evap_temp().map(|evap| (id, chiller, evap)));

    let (chiller, reading, evap_temp) = running.next()?;
    if running.next().is_some() {
        return None;
    }

    Some(ActiveChillerPrediction {
        chiller,
        predicted_power: predict_plant_power(chiller, evap_temp, reading.cond_temp, snapshot.plant.cooling),
    })
}

fn rla_too_high(rla: f64) -> bool {
    rla > RLA_MAX
}

fn rla_too_low(rla: f64) -> bool {
    rla > 0.0 && rla < RLA_MIN
}

fn evap_out_of_range(evap_temp: f64) -> bool {
    evap_temp < EVAP_TEMP_MIN || evap_temp > EVAP_TEMP_MAX
}

/// Signed efficiency disagreement in percent; positive means the plant did worse than predicted.
pub fn efficiency_deviation_percent(actual_efficiency: f64, predicted_efficiency: f64) -> f64 {
    (actual_efficiency - predicted_efficiency) / predicted_efficiency * 100.0
}

fn efficiency_anomaly(actual_efficiency: f64, predicted_efficiency: f64) -> Option<String> {
    let diff_percent = efficiency_deviation_percent(actual_efficiency, predicted_efficiency);
    // A NaN deviation (both efficiencies zero) fails the comparison and is never an anomaly
    let is_anomaly = diff_percent.abs() > EFFICIENCY_ANOMALY_PERCENT;
    if !is_anomaly {
        return None;
    }

    let direction = if actual_efficiency > predicted_efficiency {
        "worse"
    } else {
        "better"
    };
    Some(format!(
        "Plant efficiency {direction} than physics model predicts (actual: {actual_efficiency:.2} kW/ton vs predicted: {predicted_efficiency:.2} kW/ton, {:.1}% {direction})",
        diff_percent.abs()
    ))
}

/// Check fixed safety thresholds, and when a control decision happened, the plant's
/// efficiency against the physics model.
pub fn check_violations(snapshot: &TimestepSnapshot, has_control_decision: bool) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (id, chiller) in snapshot.chillers() {
        if rla_too_high(chiller.rla) {
            result.violations.push(format!(
                "{id} RLA exceeds safe limit ({:.1}% > {RLA_MAX}%)",
                chiller.rla
            ));
        }
    }

    for (id, chiller) in snapshot.chillers() {
        if rla_too_low(chiller.rla) {
            result.violations.push(format!(
                "{id} RLA below efficient range ({:.1}% < {RLA_MIN}%)",
                chiller.rla
            ));
        }
    }

    for (id, chiller) in snapshot.chillers() {
        let Some(evap_temp) = chiller.evap_temp else {
            continue;
        };
        if evap_temp < EVAP_TEMP_MIN {
            result.violations.push(format!(
                "{id} evap temp too cold ({evap_temp:.1}°F < {EVAP_TEMP_MIN}°F)"
            ));
        }
        if evap_temp > EVAP_TEMP_MAX {
            result.violations.push(format!(
                "{id} evap temp too warm ({evap_temp:.1}°F > {EVAP_TEMP_MAX}°F)"
            ));
        }
    }

    let cooling = snapshot.plant.cooling;
    if has_control_decision && cooling > 0.0 {
        if let Some(prediction) = select_active_chiller_prediction(snapshot) {
            let predicted_efficiency = prediction.predicted_power / cooling;
            let actual_efficiency = snapshot.plant.power / cooling;
            if let Some(anomaly) = efficiency_anomaly(actual_efficiency, predicted_efficiency) {
                tracing::debug!(chiller = %prediction.chiller, "Efficiency anomaly: {}", anomaly);
                result.anomalies.push(anomaly);
            }
        }
    }

    result
}

/// Raw predicted plant power, attributed to the running chiller. All `None` unless a
/// control decision happened and exactly one chiller runs.
pub fn physics_predictions(snapshot: &TimestepSnapshot, has_control_decision: bool) -> PerChiller<Option<f64>> {
    let prediction = has_control_decision
        .then(|| select_active_chiller_prediction(snapshot))
        .flatten();

    PerChiller::from_fn(|id| {
        prediction
            .filter(|p| p.chiller == id)
            .map(|p| p.predicted_power)
    })
}

pub fn predicted_efficiency(snapshot: &TimestepSnapshot, has_control_decision: bool) -> PredictedEfficiency {
    let cooling = snapshot.plant.cooling;
    let prediction = if has_control_decision && cooling != 0.0 {
        select_active_chiller_prediction(snapshot)
    } else {
        None
    };

    PredictedEfficiency {
        predicted_efficiency: prediction.map(|p| p.predicted_power / cooling),
        total_predicted_power: prediction.map(|p| p.predicted_power),
    }
}

/// Pass/fail state of every threshold rule, per chiller, for display.
pub fn validation_rules(snapshot: &TimestepSnapshot) -> Vec<RuleCheck> {
    snapshot
        .chillers()
        .flat_map(|(chiller, reading)| {
            [
                RuleCheck {
                    chiller,
                    rule: Rule::RlaMax,
                    passed: !rla_too_high(reading.rla),
                    observed: Some(reading.rla),
                },
                RuleCheck {
                    chiller,
                    rule: Rule::RlaMin,
                    passed: !rla_too_low(reading.rla),
                    observed: Some(reading.rla),
                },
                RuleCheck {
                    chiller,
                    rule: Rule::EvapTempRange,
                    passed: !reading.evap_temp.is_some_and(evap_out_of_range),
                    observed: reading.evap_temp,
                },
            ]
        })
        .collect()
}
