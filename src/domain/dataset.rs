// Run dataset - raw per-timestep records keyed by stringified index
use super::timestep::TimestepError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Immutable run dataset as loaded from the fixture.
///
/// Records are kept in their raw flat form and only parsed when a timestep is queried.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: HashMap<String, Value>,
}

impl Dataset {
    /// Number of timesteps. Keys that are not integers are not timesteps.
    pub fn len(&self) -> usize {
        self.timestep_keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&self, index: usize) -> Result<&Value, TimestepError> {
        self.records
            .get(&index.to_string())
            .ok_or(TimestepError::MissingTimestep(index))
    }

    /// Numeric timestep indices in ascending order. Keys that are not integers are ignored.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.timestep_keys().collect();
        indices.sort_unstable();
        indices
    }

    fn timestep_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.records.keys().filter_map(|key| key.parse().ok())
    }
}

impl FromIterator<Value> for Dataset {
    /// Builds a dataset keyed "0", "1", ... in iteration order.
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let records = iter
            .into_iter()
            .enumerate()
            .map(|(index, record)| (index.to_string(), record))
            .collect();
        Self { records }
    }
}
