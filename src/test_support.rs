// Fixture builders shared by unit tests
use crate::domain::dataset::Dataset;
use serde_json::{json, Value};

/// One raw timestep with every chiller off and no plant load.
pub struct RecordBuilder {
    record: Value,
}

impl RecordBuilder {
    pub fn idle() -> Self {
        let mut record = json!({
            "datetime": "2025-10-01 00:00:00",
            "plant_cooling_rate": 0.0,
            "plant_power": 0.0,
            "chilled_water_loop_supply_water_temperature": 44.0,
            "outdoor_weather_station_drybulb_temperature": 78.0,
            "outdoor_weather_station_humidity": 55.0,
            "outdoor_weather_station_wetbulb_temperature": 66.0
        });
        for n in 1..=3 {
            record[format!("chiller_{n}_cond_entering_water_temperature")] = json!(80.0);
            record[format!("chiller_{n}_evap_leaving_water_temperature")] = Value::Null;
            record[format!("chiller_{n}_percentage_rla")] = json!(0.0);
            record[format!("chiller_{n}_power")] = json!(0.0);
            record[format!("chiller_{n}_evap_leaving_water_set_temp")] = json!(44.0);
        }
        Self { record }
    }

    pub fn datetime(mut self, datetime: &str) -> Self {
        self.record["datetime"] = json!(datetime);
        self
    }

    pub fn chiller(mut self, n: u8, rla: f64, evap_temp: Option<f64>, cond_temp: f64) -> Self {
        self.record[format!("chiller_{n}_percentage_rla")] = json!(rla);
        self.record[format!("chiller_{n}_evap_leaving_water_temperature")] = json!(evap_temp);
        self.record[format!("chiller_{n}_cond_entering_water_temperature")] = json!(cond_temp);
        self
    }

    pub fn setpoint(mut self, n: u8, setpoint: Option<f64>) -> Self {
        self.record[format!("chiller_{n}_evap_leaving_water_set_temp")] = json!(setpoint);
        self
    }

    pub fn plant(mut self, cooling: f64, power: f64) -> Self {
        self.record["plant_cooling_rate"] = json!(cooling);
        self.record["plant_power"] = json!(power);
        self
    }

    pub fn drybulb(mut self, drybulb: f64) -> Self {
        self.record["outdoor_weather_station_drybulb_temperature"] = json!(drybulb);
        self
    }

    /// Blank out a raw field, as the loader does for `NaN` readings.
    pub fn null(mut self, field: &str) -> Self {
        self.record[field] = Value::Null;
        self
    }

    pub fn build(self) -> Value {
        self.record
    }
}

pub fn dataset(records: Vec<RecordBuilder>) -> Dataset {
    records.into_iter().map(RecordBuilder::build).collect()
}
