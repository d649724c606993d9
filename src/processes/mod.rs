//! Cooperative processes.
//!
//! A [`Process`] is a long-lived unit of per-frame work: a scripted timer, a
//! media playback supervisor, or any future activity that needs to be
//! advanced once per frame until it decides it is done. Processes are owned
//! by the [`ProcessScheduler`](crate::resources::scheduler::ProcessScheduler)
//! resource and ticked by the
//! [`run_processes`](crate::systems::processes::run_processes) system.
//!
//! # Lifecycle
//!
//! 1. The process is registered with the scheduler and starts out alive.
//! 2. Every frame the scheduler calls [`Process::update`] with the current
//!    clock value. The process may call [`ProcessControl::succeed`] to finish
//!    normally or [`ProcessControl::abort`] to give up. External code can
//!    cancel it with
//!    [`ProcessScheduler::abort`](crate::resources::scheduler::ProcessScheduler::abort).
//! 3. Once the scheduler observes a terminal status it removes the process
//!    from the active set and never calls `update` on it again.
//! 4. Exactly one of [`Process::succeeded`] or [`Process::aborted`] then runs,
//!    exactly once, followed by a
//!    [`ProcessEndedEvent`](crate::events::process::ProcessEndedEvent).
//!
//! Processes never panic or return errors out of `update`; anything
//! unrecoverable is turned into an abort. Completion hooks may report an
//! [`ProcessError`], which the scheduler logs before moving on.
//!
//! Submodules:
//! - [`timer`] – drives a [`TimerRecord`](crate::components::timers::TimerRecord)
//!   and runs its bytecode entry points
//! - [`playback`] – keeps a playback session advancing until it stops

pub mod playback;
pub mod timer;

use std::fmt;

use bevy_ecs::prelude::*;

/// Liveness of a scheduled process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessStatus {
    #[default]
    Alive,
    Succeeded,
    Aborted,
}

impl ProcessStatus {
    pub fn is_alive(self) -> bool {
        matches!(self, ProcessStatus::Alive)
    }
}

/// How a finished process left the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessOutcome {
    Succeeded,
    Aborted,
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Succeeded => write!(f, "succeeded"),
            ProcessOutcome::Aborted => write!(f, "aborted"),
        }
    }
}

/// Handle given to [`Process::update`] to request termination.
///
/// The first request wins: once a process has succeeded or aborted, later
/// calls are ignored.
#[derive(Debug, Default)]
pub struct ProcessControl {
    status: ProcessStatus,
}

impl ProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_status(status: ProcessStatus) -> Self {
        ProcessControl { status }
    }

    /// Finish normally; [`Process::succeeded`] will run.
    pub fn succeed(&mut self) {
        if self.status.is_alive() {
            self.status = ProcessStatus::Succeeded;
        }
    }

    /// Cancel; [`Process::aborted`] will run.
    pub fn abort(&mut self) {
        if self.status.is_alive() {
            self.status = ProcessStatus::Aborted;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }
}

/// Failure reported by a completion hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The entity has no [`Timers`](crate::components::timers::Timers)
    /// component although one of its timers just completed.
    MissingTimers { entity: Entity },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::MissingTimers { entity } => {
                write!(f, "entity {:?} has no timer collection", entity)
            }
        }
    }
}

impl std::error::Error for ProcessError {}

/// A resumable unit of per-frame work.
pub trait Process: Send + Sync {
    /// Short label used in logs and [`ProcessEndedEvent`](crate::events::process::ProcessEndedEvent).
    fn name(&self) -> &str;

    /// Entity this process acts on, if any.
    ///
    /// Used by [`ProcessScheduler::abort_entity`](crate::resources::scheduler::ProcessScheduler::abort_entity)
    /// to cancel everything attached to an entity that is being torn down.
    fn entity(&self) -> Option<Entity> {
        None
    }

    /// Advance one tick. `time` is the current frame clock in seconds.
    fn update(&mut self, time: f32, world: &mut World, control: &mut ProcessControl);

    /// Cleanup after a normal finish.
    fn succeeded(&mut self, _world: &mut World) -> Result<(), ProcessError> {
        Ok(())
    }

    /// Cleanup after cancellation. The entity or resources this process
    /// referenced may already be gone.
    fn aborted(&mut self, _world: &mut World) -> Result<(), ProcessError> {
        Ok(())
    }
}
