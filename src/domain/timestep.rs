// Timestep snapshot - structured view of one raw fixture record
use super::chiller::{ChillerId, ChillerReading};
use super::dataset::Dataset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestepError {
    #[error("timestep {0} not found in run data")]
    MissingTimestep(usize),
    #[error("timestep {index} is malformed: {source}")]
    MalformedRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantReading {
    /// Total cooling delivered (tons)
    pub cooling: f64,
    /// Total plant power (kW)
    pub power: f64,
    /// Chilled water supply temperature (°F)
    pub supply_temp: Option<f64>,
}

impl PlantReading {
    /// Plant efficiency in kW/ton, 0 when there is no cooling load.
    pub fn efficiency(&self) -> f64 {
        if self.cooling > 0.0 {
            self.power / self.cooling
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentReading {
    pub drybulb: f64,
    pub humidity: Option<f64>,
    pub wetbulb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepSnapshot {
    pub datetime: String,
    pub chiller1: ChillerReading,
    pub chiller2: ChillerReading,
    pub chiller3: ChillerReading,
    pub plant: PlantReading,
    pub environment: EnvironmentReading,
}

impl TimestepSnapshot {
    pub fn chiller(&self, id: ChillerId) -> &ChillerReading {
        match id {
            ChillerId::One => &self.chiller1,
            ChillerId::Two => &self.chiller2,
            ChillerId::Three => &self.chiller3,
        }
    }

    pub fn chillers(&self) -> impl Iterator<Item = (ChillerId, &ChillerReading)> {
        ChillerId::ALL.into_iter().map(|id| (id, self.chiller(id)))
    }
}

// Field names as they appear in the run export. Readings nothing computes with may be null.
#[derive(Debug, Deserialize)]
struct RawTimestep {
    datetime: String,
    chiller_1_cond_entering_water_temperature: f64,
    chiller_1_evap_leaving_water_temperature: Option<f64>,
    chiller_1_percentage_rla: f64,
    chiller_1_power: Option<f64>,
    chiller_1_evap_leaving_water_set_temp: Option<f64>,
    chiller_2_cond_entering_water_temperature: f64,
    chiller_2_evap_leaving_water_temperature: Option<f64>,
    chiller_2_percentage_rla: f64,
    chiller_2_power: Option<f64>,
    chiller_2_evap_leaving_water_set_temp: Option<f64>,
    chiller_3_cond_entering_water_temperature: f64,
    chiller_3_evap_leaving_water_temperature: Option<f64>,
    chiller_3_percentage_rla: f64,
    chiller_3_power: Option<f64>,
    chiller_3_evap_leaving_water_set_temp: Option<f64>,
    plant_cooling_rate: f64,
    plant_power: f64,
    chilled_water_loop_supply_water_temperature: Option<f64>,
    outdoor_weather_station_drybulb_temperature: f64,
    outdoor_weather_station_humidity: Option<f64>,
    outdoor_weather_station_wetbulb_temperature: Option<f64>,
}

impl From<RawTimestep> for TimestepSnapshot {
    fn from(raw: RawTimestep) -> Self {
        Self {
            datetime: raw.datetime,
            chiller1: ChillerReading {
                cond_temp: raw.chiller_1_cond_entering_water_temperature,
                evap_temp: raw.chiller_1_evap_leaving_water_temperature,
                rla: raw.chiller_1_percentage_rla,
                power: raw.chiller_1_power,
                setpoint: raw.chiller_1_evap_leaving_water_set_temp,
            },
            chiller2: ChillerReading {
                cond_temp: raw.chiller_2_cond_entering_water_temperature,
                evap_temp: raw.chiller_2_evap_leaving_water_temperature,
                rla: raw.chiller_2_percentage_rla,
                power: raw.chiller_2_power,
                setpoint: raw.chiller_2_evap_leaving_water_set_temp,
            },
            chiller3: ChillerReading {
                cond_temp: raw.chiller_3_cond_entering_water_temperature,
                evap_temp: raw.chiller_3_evap_leaving_water_temperature,
                rla: raw.chiller_3_percentage_rla,
                power: raw.chiller_3_power,
                setpoint: raw.chiller_3_evap_leaving_water_set_temp,
            },
            plant: PlantReading {
                cooling: raw.plant_cooling_rate,
                power: raw.plant_power,
                supply_temp: raw.chilled_water_loop_supply_water_temperature,
            },
            environment: EnvironmentReading {
                drybulb: raw.outdoor_weather_station_drybulb_temperature,
                humidity: raw.outdoor_weather_station_humidity,
                wetbulb: raw.outdoor_weather_station_wetbulb_temperature,
            },
        }
    }
}

/// Parse the record at `index` into a snapshot. No bounds checking beyond the key lookup.
pub fn parse_timestep(index: usize, dataset: &Dataset) -> Result<TimestepSnapshot, TimestepError> {
    let record = dataset.record(index)?;
    let raw = RawTimestep::deserialize(record)
        .map_err(|source| TimestepError::MalformedRecord { index, source })?;
    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, RecordBuilder};
    use serde_json::json;

    #[test]
    fn test_parse_timestep_maps_fields() {
        let data = dataset(vec![
            RecordBuilder::idle(),
            RecordBuilder::idle()
                .datetime("2025-10-01 00:15:00")
                .chiller(2, 62.5, Some(44.1), 83.0)
                .setpoint(2, Some(45.0))
                .plant(310.0, 240.0)
                .drybulb(81.0),
        ]);

        let snapshot = parse_timestep(1, &data).unwrap();

        assert_eq!(snapshot.datetime, "2025-10-01 00:15:00");
        assert_eq!(snapshot.chiller2.rla, 62.5);
        assert_eq!(snapshot.chiller2.evap_temp, Some(44.1));
        assert_eq!(snapshot.chiller2.cond_temp, 83.0);
        assert_eq!(snapshot.chiller2.setpoint, Some(45.0));
        assert_eq!(snapshot.chiller1.evap_temp, None);
        assert_eq!(snapshot.plant.cooling, 310.0);
        assert_eq!(snapshot.plant.supply_temp, Some(44.0));
        assert_eq!(snapshot.environment.drybulb, 81.0);
        assert_eq!(snapshot.environment.wetbulb, Some(66.0));
        assert_eq!(snapshot.chiller(ChillerId::Two), &snapshot.chiller2);
    }

    #[test]
    fn test_parse_timestep_out_of_range() {
        let data = dataset(vec![RecordBuilder::idle()]);
        assert!(matches!(
            parse_timestep(5, &data),
            Err(TimestepError::MissingTimestep(5))
        ));
    }

    #[test]
    fn test_parse_timestep_malformed_record() {
        let mut record = RecordBuilder::idle().build();
        record["plant_power"] = json!(null);
        let data: Dataset = vec![record].into_iter().collect();

        let err = parse_timestep(0, &data).unwrap_err();
        assert!(matches!(err, TimestepError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn test_null_display_readings_are_accepted() {
        let data = dataset(vec![RecordBuilder::idle()
            .null("outdoor_weather_station_humidity")
            .null("outdoor_weather_station_wetbulb_temperature")
            .null("chilled_water_loop_supply_water_temperature")
            .null("chiller_2_power")]);

        let snapshot = parse_timestep(0, &data).unwrap();

        assert_eq!(snapshot.environment.humidity, None);
        assert_eq!(snapshot.environment.wetbulb, None);
        assert_eq!(snapshot.plant.supply_temp, None);
        assert_eq!(snapshot.chiller2.power, None);
        assert_eq!(snapshot.chiller1.power, Some(0.0));
        assert_eq!(serde_json::to_value(&snapshot).unwrap()["environment"]["humidity"], json!(null));
    }

    #[test]
    fn test_efficiency_guards_zero_cooling() {
        let plant = PlantReading {
            cooling: 0.0,
            power: 120.0,
            supply_temp: Some(44.0),
        };
        assert_eq!(plant.efficiency(), 0.0);

        let plant = PlantReading {
            cooling: 400.0,
            power: 300.0,
            ..plant
        };
        assert_eq!(plant.efficiency(), 0.75);
    }
}
