//! Timer process.
//!
//! A [`TimerProcess`] drives one [`TimerRecord`] through
//! `NotStarted -> Started -> Stopped`. Each tick evaluates exactly two
//! guarded branches, and at most one of them fires:
//!
//! - **start**: `time - created >= start_time` while `NotStarted`. Runs the
//!   start bytecode (script time = `start_time`) if an offset is set, then
//!   marks the record `Started`.
//! - **stop**: otherwise, `time - created >= start_time + duration` while
//!   `Started`. Runs the end bytecode (script time = `created + start_time +
//!   duration`) if an offset is set, marks the record `Stopped` and succeeds.
//!
//! Because the branches never cascade, a timer with zero delay and zero
//! duration still needs two ticks to resolve.
//!
//! The process never removes anything from the entity's
//! [`Timers`] during `update`. The record is detached in the completion
//! hooks, which also drop the whole component once it is empty.

use bevy_ecs::prelude::*;
use log::{debug, error, warn};

use crate::components::timers::{TimerId, TimerRecord, TimerState, Timers};
use crate::processes::{Process, ProcessControl, ProcessError};
use crate::resources::scripting::run_bytecode;
use crate::systems::processes::{TimerRemoval, remove_timer};

/// Process owning the lifecycle of one timer record on `entity`.
#[derive(Debug, Clone)]
pub struct TimerProcess {
    entity: Entity,
    timer: TimerId,
}

impl TimerProcess {
    /// Bind a process to the record `timer` stored in `entity`'s [`Timers`].
    pub fn new(entity: Entity, timer: TimerId) -> Self {
        TimerProcess { entity, timer }
    }

    /// Id of the supervised record.
    pub fn timer(&self) -> TimerId {
        self.timer
    }

    fn record(&self, world: &World) -> Option<TimerRecord> {
        world
            .get::<Timers>(self.entity)
            .and_then(|timers| timers.get(self.timer))
            .cloned()
    }

    /// Write the new state back. If the record vanished while its bytecode
    /// ran, abort and return `false`.
    fn set_state(
        &self,
        world: &mut World,
        state: TimerState,
        control: &mut ProcessControl,
    ) -> bool {
        let written = world
            .get_mut::<Timers>(self.entity)
            .and_then(|mut timers| timers.get_mut(self.timer).map(|r| r.advance(state)))
            .is_some();
        if !written {
            warn!(
                "timer {} on {:?} vanished before {:?}, aborting",
                self.timer.get(),
                self.entity,
                state
            );
            control.abort();
        }
        written
    }
}

impl Process for TimerProcess {
    fn name(&self) -> &str {
        "timer"
    }

    fn entity(&self) -> Option<Entity> {
        Some(self.entity)
    }

    fn update(&mut self, time: f32, world: &mut World, control: &mut ProcessControl) {
        if !control.is_alive() {
            return;
        }
        let Some(record) = self.record(world) else {
            warn!(
                "timer {} on {:?} lost its record, aborting",
                self.timer.get(),
                self.entity
            );
            control.abort();
            return;
        };

        let elapsed = time - record.created;
        if record.state() == TimerState::NotStarted && elapsed >= record.start_time {
            if let Some(offset) = record.start_offset {
                run_bytecode(world, record.start_time, offset, self.entity);
            }
            self.set_state(world, TimerState::Started, control);
        } else if record.state() == TimerState::Started
            && elapsed >= record.duration + record.start_time
        {
            if let Some(offset) = record.end_offset {
                run_bytecode(world, record.end_at(), offset, self.entity);
            }
            if self.set_state(world, TimerState::Stopped, control) {
                control.succeed();
            }
        }
    }

    fn succeeded(&mut self, world: &mut World) -> Result<(), ProcessError> {
        match remove_timer(world, self.entity, self.timer) {
            TimerRemoval::Removed { remaining } => {
                debug!(
                    "timer {} on {:?} done, {} left",
                    self.timer.get(),
                    self.entity,
                    remaining
                );
                Ok(())
            }
            TimerRemoval::NotFound => {
                warn!(
                    "timer {} on {:?} was already detached",
                    self.timer.get(),
                    self.entity
                );
                Ok(())
            }
            TimerRemoval::NoCollection => {
                error!(
                    "timer {} finished but {:?} has no timer collection",
                    self.timer.get(),
                    self.entity
                );
                Err(ProcessError::MissingTimers {
                    entity: self.entity,
                })
            }
        }
    }

    fn aborted(&mut self, world: &mut World) -> Result<(), ProcessError> {
        let removal = remove_timer(world, self.entity, self.timer);
        debug!(
            "timer {} on {:?} aborted ({:?})",
            self.timer.get(),
            self.entity,
            removal
        );
        Ok(())
    }
}
