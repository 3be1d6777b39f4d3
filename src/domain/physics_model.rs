// Physics-based plant power models
//
// Degree-2 polynomial regressions of total PLANT power, one per chiller. Each model was
// fit on periods where only that chiller was running and is not valid for multi-chiller
// operation.
use super::chiller::ChillerId;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChillerModel {
    pub intercept: f64,
    /// Weights for [`polynomial_features`], in the same order
    pub coefficients: [f64; FEATURE_COUNT],
    pub rmse: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelStats {
    pub rmse: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerDeviation {
    pub is_deviation: bool,
    pub error_percent: f64,
    pub error_absolute: f64,
}

// Indexed by ChillerId::index()
static CHILLER_MODELS: [ChillerModel; 3] = [
    // Chiller 1 (500 tons), 6551 single-chiller samples
    ChillerModel {
        intercept: 4721.09,
        coefficients: [
            -8.078101,   // evap
            -122.343705, // cond
            2.216326,    // cooling
            -0.189299,   // evap^2
            0.326569,    // evap * cond
            0.002742,    // evap * cooling
            0.765678,    // cond^2
            -0.033574,   // cond * cooling
            0.001007,    // cooling^2
        ],
        rmse: 13.20,
        r2: 0.8522,
    },
    // Chiller 2 (500 tons), 3857 single-chiller samples
    ChillerModel {
        intercept: 2285.38,
        coefficients: [
            17.175637, -69.869946, 0.979994, -0.024797, -0.197040, 0.005032, 0.523248, -0.007353,
            -0.000037,
        ],
        rmse: 12.32,
        r2: 0.8733,
    },
    // Chiller 3 (375 tons), 455 single-chiller samples
    ChillerModel {
        intercept: 1503.01,
        coefficients: [
            -52.879134, -10.888671, 1.547344, 0.125490, 0.657254, -0.039538, -0.109687, -0.001288,
            0.001866,
        ],
        rmse: 4.69,
        r2: 0.9792,
    },
];

/// Expand `[x1, x2, x3]` into `[x1, x2, x3, x1², x1·x2, x1·x3, x2², x2·x3, x3²]`.
///
/// Bias-free, so the intercept is carried by the model instead.
pub fn polynomial_features(x1: f64, x2: f64, x3: f64) -> [f64; FEATURE_COUNT] {
    [x1, x2, x3, x1 * x1, x1 * x2, x1 * x3, x2 * x2, x2 * x3, x3 * x3]
}

impl ChillerModel {
    pub fn for_chiller(id: ChillerId) -> &'static ChillerModel {
        &CHILLER_MODELS[id.index()]
    }

    /// Predicted plant power (kW). No envelope check: inputs far from the training data
    /// can produce implausible or negative values.
    pub fn predict_power(&self, evap_temp: f64, cond_temp: f64, cooling_rate: f64) -> f64 {
        let features = polynomial_features(evap_temp, cond_temp, cooling_rate);

        let mut power = self.intercept;
        for (coefficient, feature) in self.coefficients.iter().zip(features) {
            power += coefficient * feature;
        }
        power
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            rmse: self.rmse,
            r2: self.r2,
        }
    }
}

/// Plant power when only Chiller 1 is running.
pub fn predict_chiller1_power(evap_temp: f64, cond_temp: f64, cooling_rate: f64) -> f64 {
    ChillerModel::for_chiller(ChillerId::One).predict_power(evap_temp, cond_temp, cooling_rate)
}

/// Plant power when only Chiller 2 is running.
pub fn predict_chiller2_power(evap_temp: f64, cond_temp: f64, cooling_rate: f64) -> f64 {
    ChillerModel::for_chiller(ChillerId::Two).predict_power(evap_temp, cond_temp, cooling_rate)
}

/// Plant power when only Chiller 3 is running.
pub fn predict_chiller3_power(evap_temp: f64, cond_temp: f64, cooling_rate: f64) -> f64 {
    ChillerModel::for_chiller(ChillerId::Three).predict_power(evap_temp, cond_temp, cooling_rate)
}

pub fn predict_plant_power(chiller: ChillerId, evap_temp: f64, cond_temp: f64, cooling_rate: f64) -> f64 {
    match chiller {
        ChillerId::One => predict_chiller1_power(evap_temp, cond_temp, cooling_rate),
        ChillerId::Two => predict_chiller2_power(evap_temp, cond_temp, cooling_rate),
        ChillerId::Three => predict_chiller3_power(evap_temp, cond_temp, cooling_rate),
    }
}

pub fn model_stats(chiller: ChillerId) -> ModelStats {
    ChillerModel::for_chiller(chiller).stats()
}

/// Flags an actual reading more than 2×RMSE away from the prediction (95% band).
pub fn check_power_deviation(actual_power: f64, predicted_power: f64, rmse: f64) -> PowerDeviation {
    let error_absolute = (actual_power - predicted_power).abs();
    let error_percent = error_absolute / predicted_power * 100.0;

    PowerDeviation {
        is_deviation: error_absolute > 2.0 * rmse,
        error_percent,
        error_absolute,
    }
}
