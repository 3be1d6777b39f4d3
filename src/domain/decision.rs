// Control decision detection - diff of two adjacent timesteps
use super::chiller::{ChillerId, StagingState};
use super::dataset::Dataset;
use super::timestep::{parse_timestep, TimestepError, TimestepSnapshot};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition<T> {
    pub previous: T,
    pub current: T,
}

impl<T: PartialEq> Transition<T> {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// One value per chiller, serialised as `chiller1`..`chiller3`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerChiller<T> {
    pub chiller1: T,
    pub chiller2: T,
    pub chiller3: T,
}

impl<T> PerChiller<T> {
    pub fn from_fn(mut f: impl FnMut(ChillerId) -> T) -> Self {
        Self {
            chiller1: f(ChillerId::One),
            chiller2: f(ChillerId::Two),
            chiller3: f(ChillerId::Three),
        }
    }

    pub fn get(&self, id: ChillerId) -> &T {
        match id {
            ChillerId::One => &self.chiller1,
            ChillerId::Two => &self.chiller2,
            ChillerId::Three => &self.chiller3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDecision {
    pub staging: PerChiller<Transition<StagingState>>,
    pub setpoints: PerChiller<Transition<Option<f64>>>,
    pub has_changes: bool,
    pub reasoning: String,
}

impl ControlDecision {
    /// Compare two snapshots. Passing the same snapshot twice yields no changes.
    pub fn between(previous: &TimestepSnapshot, current: &TimestepSnapshot) -> Self {
        let staging = PerChiller::from_fn(|id| Transition {
            previous: previous.chiller(id).staging_state(),
            current: current.chiller(id).staging_state(),
        });
        let setpoints = PerChiller::from_fn(|id| Transition {
            previous: previous.chiller(id).setpoint,
            current: current.chiller(id).setpoint,
        });
        let setpoint_changed = PerChiller::from_fn(|id| {
            staging.get(id).current == StagingState::On && setpoint_moved(setpoints.get(id))
        });

        let has_changes = ChillerId::ALL
            .into_iter()
            .any(|id| staging.get(id).changed() || *setpoint_changed.get(id));

        let reasoning = compose_reasoning(current, &staging, &setpoints, &setpoint_changed);

        Self {
            staging,
            setpoints,
            has_changes,
            reasoning,
        }
    }
}

// A missing previous setpoint never counts as a move
fn setpoint_moved(setpoint: &Transition<Option<f64>>) -> bool {
    match setpoint.previous {
        Some(previous) => setpoint.current != Some(previous),
        None => false,
    }
}

fn format_setpoint(setpoint: Option<f64>) -> String {
    setpoint.map_or_else(|| "--".to_string(), |value| format!("{value:.0}"))
}

fn compose_reasoning(
    current: &TimestepSnapshot,
    staging: &PerChiller<Transition<StagingState>>,
    setpoints: &PerChiller<Transition<Option<f64>>>,
    setpoint_changed: &PerChiller<bool>,
) -> String {
    let mut reasoning = format!(
        "Load at {:.0} tons with {:.0}°F outdoor temperature. ",
        current.plant.cooling, current.environment.drybulb
    );

    let staging_changes: Vec<String> = ChillerId::ALL
        .into_iter()
        .filter(|id| staging.get(*id).changed())
        .map(|id| {
            let transition = staging.get(id);
            format!("{id} {} → {}", transition.previous, transition.current)
        })
        .collect();
    if !staging_changes.is_empty() {
        reasoning.push_str(&format!("Staging changes: {}. ", staging_changes.join(", ")));
    }

    let setpoint_changes: Vec<String> = ChillerId::ALL
        .into_iter()
        .filter(|id| *setpoint_changed.get(*id))
        .map(|id| {
            let transition = setpoints.get(id);
            format!(
                "{id} evap {}°F → {}°F",
                format_setpoint(transition.previous),
                format_setpoint(transition.current)
            )
        })
        .collect();
    if !setpoint_changes.is_empty() {
        reasoning.push_str(&format!("Setpoint changes: {}. ", setpoint_changes.join(", ")));
    }

    let active: Vec<String> = current
        .chillers()
        .filter(|(_, chiller)| chiller.is_on())
        .map(|(id, chiller)| format!("{id} at {:.1}% RLA", chiller.rla))
        .collect();
    if active.is_empty() {
        reasoning.push_str("All chillers offline.");
    } else {
        reasoning.push_str(&format!("Active: {}.", active.join(", ")));
    }

    reasoning
}

/// Detect whether a control action happened between timestep `index - 1` and `index`.
///
/// Index 0 is compared against itself.
pub fn detect_control_decision(index: usize, dataset: &Dataset) -> Result<ControlDecision, TimestepError> {
    let current = parse_timestep(index, dataset)?;
    let decision = match index.checked_sub(1) {
        Some(previous_index) => {
            let previous = parse_timestep(previous_index, dataset)?;
            ControlDecision::between(&previous, &current)
        }
        None => ControlDecision::between(&current, &current),
    };

    tracing::debug!(index, has_changes = decision.has_changes, "Detected control decision");
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, RecordBuilder};

    #[test]
    fn test_first_timestep_has_no_changes() {
        let data = dataset(vec![RecordBuilder::idle().chiller(1, 55.0, Some(44.0), 82.0)]);

        let decision = detect_control_decision(0, &data).unwrap();

        assert!(!decision.has_changes);
        assert_eq!(decision.staging.chiller1.previous, StagingState::On);
        assert_eq!(decision.staging.chiller1.current, StagingState::On);
        assert_eq!(decision.setpoints.chiller1.previous, Some(44.0));
    }

    #[test]
    fn test_staging_on_transition() {
        let data = dataset(vec![
            RecordBuilder::idle(),
            RecordBuilder::idle().chiller(1, 10.0, Some(46.0), 84.0),
        ]);

        let decision = detect_control_decision(1, &data).unwrap();

        assert!(decision.has_changes);
        assert_eq!(
            decision.staging.chiller1,
            Transition {
                previous: StagingState::Off,
                current: StagingState::On
            }
        );
        assert!(!decision.staging.chiller2.changed());
        assert!(decision.reasoning.contains("Staging changes: CH1 OFF → ON."));
    }

    #[test]
    fn test_setpoint_drift_ignored_while_off() {
        let data = dataset(vec![
            RecordBuilder::idle().setpoint(2, Some(44.0)),
            RecordBuilder::idle().setpoint(2, Some(47.0)),
        ]);

        let decision = detect_control_decision(1, &data).unwrap();

        assert!(!decision.has_changes);
        assert_eq!(
            decision.setpoints.chiller2,
            Transition {
                previous: Some(44.0),
                current: Some(47.0)
            }
        );
        assert!(!decision.reasoning.contains("Setpoint changes"));
    }

    #[test]
    fn test_setpoint_change_while_on() {
        let data = dataset(vec![
            RecordBuilder::idle()
                .chiller(2, 60.0, Some(44.0), 82.0)
                .setpoint(2, Some(44.0)),
            RecordBuilder::idle()
                .chiller(2, 61.0, Some(45.0), 82.0)
                .setpoint(2, Some(46.0)),
        ]);

        let decision = detect_control_decision(1, &data).unwrap();

        assert!(decision.has_changes);
        assert!(decision.reasoning.contains("Setpoint changes: CH2 evap 44°F → 46°F."));
    }

    #[test]
    fn test_missing_previous_setpoint_is_not_a_change() {
        let data = dataset(vec![
            RecordBuilder::idle()
                .chiller(3, 60.0, Some(44.0), 82.0)
                .setpoint(3, None),
            RecordBuilder::idle()
                .chiller(3, 60.0, Some(44.0), 82.0)
                .setpoint(3, Some(45.0)),
        ]);

        assert!(!detect_control_decision(1, &data).unwrap().has_changes);
    }

    #[test]
    fn test_reasoning_text() {
        let data = dataset(vec![
            RecordBuilder::idle()
                .chiller(1, 70.0, Some(44.0), 85.0)
                .plant(420.0, 330.0),
            RecordBuilder::idle()
                .chiller(3, 48.3, Some(45.0), 84.0)
                .plant(251.6, 210.0)
                .drybulb(79.4),
        ]);

        let decision = detect_control_decision(1, &data).unwrap();

        assert_eq!(
            decision.reasoning,
            "Load at 252 tons with 79°F outdoor temperature. \
             Staging changes: CH1 ON → OFF, CH3 OFF → ON. \
             Active: CH3 at 48.3% RLA."
        );
    }

    #[test]
    fn test_reasoning_all_offline() {
        let data = dataset(vec![RecordBuilder::idle(), RecordBuilder::idle()]);
        let decision = detect_control_decision(1, &data).unwrap();
        assert!(decision.reasoning.ends_with("All chillers offline."));
    }

    #[test]
    fn test_null_humidity_in_previous_timestep() {
        let data = dataset(vec![
            RecordBuilder::idle().null("outdoor_weather_station_humidity"),
            RecordBuilder::idle().chiller(1, 40.0, Some(46.0), 84.0),
        ]);

        assert!(parse_timestep(0, &data).is_ok());
        let decision = detect_control_decision(1, &data).unwrap();
        assert!(decision.has_changes);
        assert!(decision.reasoning.contains("CH1 OFF → ON"));
    }

    #[test]
    fn test_missing_previous_timestep_propagates() {
        let data: Dataset =
            serde_json::from_value(serde_json::json!({ "4": RecordBuilder::idle().build() })).unwrap();

        assert!(matches!(
            detect_control_decision(4, &data),
            Err(TimestepError::MissingTimestep(3))
        ));
    }
}
