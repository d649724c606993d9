//! Process completion events.
//!
//! After the [`ProcessScheduler`](crate::resources::scheduler::ProcessScheduler)
//! has removed a process and run its completion hook, it triggers a
//! [`ProcessEndedEvent`] on the world. Observers can use it to chain
//! follow-up work (start the next cutscene clip, unlock input, ...) without
//! the processes knowing about each other.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<ProcessEndedEvent>| {
//!     let event = trigger.event();
//!     log::info!("{} {}", event.name, event.outcome);
//! });
//! ```
//!
//! # Related
//!
//! - [`crate::resources::scheduler::ProcessScheduler::reap`] – emits this event
//! - [`crate::processes::Process`] – the lifecycle contract

use bevy_ecs::prelude::*;

use crate::processes::ProcessOutcome;
use crate::resources::scheduler::ProcessId;

/// Event emitted once for every process that leaves the scheduler.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProcessEndedEvent {
    /// Scheduler handle of the finished process.
    pub id: ProcessId,
    /// The process' [`name`](crate::processes::Process::name).
    pub name: String,
    /// Entity the process was bound to, if any.
    pub entity: Option<Entity>,
    /// Which completion hook ran.
    pub outcome: ProcessOutcome,
}
