// Chiller domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Chillers below this RLA are treated as transitional when gating the power models.
pub const RUNNING_RLA_MIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChillerId {
    One,
    Two,
    Three,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown chiller {0}, expected 1, 2 or 3")]
pub struct ChillerIdError(pub u8);

impl ChillerId {
    pub const ALL: [ChillerId; 3] = [ChillerId::One, ChillerId::Two, ChillerId::Three];

    pub fn number(self) -> u8 {
        match self {
            ChillerId::One => 1,
            ChillerId::Two => 2,
            ChillerId::Three => 3,
        }
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl TryFrom<u8> for ChillerId {
    type Error = ChillerIdError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(ChillerId::One),
            2 => Ok(ChillerId::Two),
            3 => Ok(ChillerId::Three),
            other => Err(ChillerIdError(other)),
        }
    }
}

impl From<ChillerId> for u8 {
    fn from(id: ChillerId) -> Self {
        id.number()
    }
}

impl fmt::Display for ChillerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StagingState {
    On,
    Off,
}

impl fmt::Display for StagingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingState::On => f.write_str("ON"),
            StagingState::Off => f.write_str("OFF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChillerReading {
    /// Condenser entering water temperature (°F)
    pub cond_temp: f64,
    /// Evaporator leaving water temperature (°F), absent when the sensor has no reading
    pub evap_temp: Option<f64>,
    /// Relative load amperage (%)
    pub rla: f64,
    /// Power draw (kW)
    pub power: Option<f64>,
    /// Evaporator leaving water setpoint (°F)
    pub setpoint: Option<f64>,
}

impl ChillerReading {
    /// Staging state as seen by the control-decision detector: any load at all means ON.
    pub fn staging_state(&self) -> StagingState {
        if self.rla > 0.0 {
            StagingState::On
        } else {
            StagingState::Off
        }
    }

    pub fn is_on(&self) -> bool {
        self.staging_state() == StagingState::On
    }

    /// Evaporator temperature of a chiller that counts as running for the power models.
    ///
    /// Stricter than [`ChillerReading::is_on`]: the chiller must carry more than
    /// [`RUNNING_RLA_MIN`] load and have an evaporator reading.
    pub fn running_evap_temp(&self) -> Option<f64> {
        if self.rla > RUNNING_RLA_MIN {
            self.evap_temp
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(rla: f64, evap_temp: Option<f64>) -> ChillerReading {
        ChillerReading {
            cond_temp: 85.0,
            evap_temp,
            rla,
            power: None,
            setpoint: Some(44.0),
        }
    }

    #[test]
    fn test_staging_boundary() {
        assert_eq!(reading(0.0, Some(45.0)).staging_state(), StagingState::Off);
        assert_eq!(reading(0.1, None).staging_state(), StagingState::On);
    }

    #[test]
    fn test_running_requires_load_and_evap_reading() {
        assert_eq!(reading(10.0, Some(45.0)).running_evap_temp(), None);
        assert_eq!(reading(10.5, Some(45.0)).running_evap_temp(), Some(45.0));
        assert_eq!(reading(60.0, None).running_evap_temp(), None);
        // Staged on, but too lightly loaded for the models
        assert!(reading(5.0, Some(45.0)).is_on());
    }

    #[test]
    fn test_chiller_id_conversions() {
        assert_eq!(ChillerId::try_from(3), Ok(ChillerId::Three));
        assert_eq!(ChillerId::try_from(4), Err(ChillerIdError(4)));
        assert_eq!(ChillerId::Two.to_string(), "CH2");
        assert_eq!(serde_json::to_string(&ChillerId::One).unwrap(), "1");
        assert_eq!(serde_json::to_string(&StagingState::Off).unwrap(), "\"OFF\"");
    }
}
