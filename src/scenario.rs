//! Scenario files for the headless runner.
//!
//! A scenario describes entities together with the timers and media clips
//! scheduled on them. [`Scenario::spawn`] creates the entities and registers
//! one process per timer and clip.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "name": "door",
//!       "timers": [
//!         { "start": 0.5, "duration": 2.0, "on_start": 16, "on_end": 64 },
//!         { "start": 1.0, "duration": 0.0 }
//!       ],
//!       "clips": [ { "name": "creak", "frames": 30 } ]
//!     }
//!   ]
//! }
//! ```
//!
//! `start` and `duration` are seconds, `on_start`/`on_end` are bytecode
//! offsets and may be omitted.

use bevy_ecs::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};

use crate::components::timers::TimerRecord;
use crate::resources::media::ClipPlayer;
use crate::resources::worldtime::WorldTime;
use crate::systems::processes::{schedule_timer, start_playback};

/// Marker carrying the scenario name of a spawned entity.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ScenarioName(pub String);

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub entities: Vec<ScenarioEntity>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioEntity {
    pub name: String,
    #[serde(default)]
    pub timers: Vec<ScenarioTimer>,
    #[serde(default)]
    pub clips: Vec<ScenarioClip>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioTimer {
    #[serde(default)]
    pub start: f32,
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub on_start: Option<u32>,
    #[serde(default)]
    pub on_end: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioClip {
    pub name: String,
    pub frames: u32,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario {}: {}", path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        let scenario: Scenario =
            serde_json::from_str(text).map_err(|e| format!("Invalid scenario: {}", e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), String> {
        for entity in &self.entities {
            for timer in &entity.timers {
                if timer.start < 0.0 || timer.duration < 0.0 {
                    return Err(format!(
                        "entity '{}': timer start and duration must not be negative",
                        entity.name
                    ));
                }
            }
        }
        Ok(())
    }

    /// Spawn every entity and schedule its timers and clips.
    ///
    /// Timers are stamped with the current [`WorldTime`] clock. Returns the
    /// spawned entities in file order.
    pub fn spawn(&self, world: &mut World) -> Vec<Entity> {
        let now = world
            .get_resource::<WorldTime>()
            .map(|wt| wt.elapsed)
            .unwrap_or_default();
        let mut spawned = Vec::with_capacity(self.entities.len());

        for desc in &self.entities {
            let entity = world.spawn(ScenarioName(desc.name.clone())).id();
            for timer in &desc.timers {
                let mut record = TimerRecord::new(now, timer.start, timer.duration);
                record.start_offset = timer.on_start;
                record.end_offset = timer.on_end;
                schedule_timer(world, entity, record);
            }
            for clip in &desc.clips {
                start_playback(world, ClipPlayer::new(clip.name.clone(), clip.frames), Some(entity));
            }
            info!(
                "spawned '{}' as {:?} with {} timer(s), {} clip(s)",
                desc.name,
                entity,
                desc.timers.len(),
                desc.clips.len()
            );
            spawned.push(entity);
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_optional_fields() {
        let scenario = Scenario::from_json(
            r#"{ "entities": [ { "name": "door",
                  "timers": [ { "start": 1.0, "duration": 2.0, "on_end": 64 } ] } ] }"#,
        )
        .unwrap();
        let timer = &scenario.entities[0].timers[0];
        assert_eq!(timer.on_start, None);
        assert_eq!(timer.on_end, Some(64));
        assert!(scenario.entities[0].clips.is_empty());
    }

    #[test]
    fn test_rejects_negative_durations() {
        let err = Scenario::from_json(
            r#"{ "entities": [ { "name": "bad", "timers": [ { "start": -1.0 } ] } ] }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(Scenario::from_json("{ entities: ").is_err());
    }
}
