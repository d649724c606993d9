//! Process scheduler resource.
//!
//! [`ProcessScheduler`] owns every live [`Process`] and advances them once
//! per frame in the order they were added. It is the only place that
//! observes process status, which is what guarantees the lifecycle contract:
//!
//! - `update` is never called on a process after it succeeded or aborted;
//! - every process that leaves the scheduler gets exactly one completion
//!   hook, `succeeded` or `aborted`, after it has been removed from the
//!   active set;
//! - a [`ProcessEndedEvent`] is triggered on the world right after the hook.
//!
//! The scheduler needs `&mut World` while it is itself stored in the world,
//! so it is driven through [`World::resource_scope`]; see
//! [`run_processes`](crate::systems::processes::run_processes).

use bevy_ecs::prelude::*;
use log::{debug, error};

use crate::events::process::ProcessEndedEvent;
use crate::processes::{Process, ProcessControl, ProcessOutcome, ProcessStatus};

/// Handle of a process registered with the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(u64);

impl ProcessId {
    pub fn get(self) -> u64 {
        self.0
    }
}

struct ProcessSlot {
    id: ProcessId,
    status: ProcessStatus,
    process: Box<dyn Process>,
}

/// Owner and driver of all scheduled processes.
#[derive(Resource, Default)]
pub struct ProcessScheduler {
    next_id: u64,
    slots: Vec<ProcessSlot>,
}

impl ProcessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process. It is first updated on the next [`tick`](Self::tick).
    pub fn add(&mut self, process: impl Process + 'static) -> ProcessId {
        self.add_boxed(Box::new(process))
    }

    pub fn add_boxed(&mut self, process: Box<dyn Process>) -> ProcessId {
        let id = ProcessId(self.next_id);
        self.next_id += 1;
        debug!("process {} '{}' added", id.0, process.name());
        self.slots.push(ProcessSlot {
            id,
            status: ProcessStatus::Alive,
            process,
        });
        id
    }

    /// Request cancellation of a live process.
    ///
    /// The process is removed and its `aborted` hook runs on the next
    /// [`tick`](Self::tick) or [`reap`](Self::reap). Returns `false` if the
    /// process is unknown or already terminating.
    pub fn abort(&mut self, id: ProcessId) -> bool {
        match self.slots.iter_mut().find(|s| s.id == id) {
            Some(slot) if slot.status.is_alive() => {
                slot.status = ProcessStatus::Aborted;
                true
            }
            _ => false,
        }
    }

    /// Abort every live process bound to `entity`. Returns how many were
    /// marked.
    pub fn abort_entity(&mut self, entity: Entity) -> usize {
        let mut count = 0;
        for slot in self.slots.iter_mut() {
            if slot.status.is_alive() && slot.process.entity() == Some(entity) {
                slot.status = ProcessStatus::Aborted;
                count += 1;
            }
        }
        count
    }

    /// Abort every live process. Returns how many were marked.
    pub fn abort_all(&mut self) -> usize {
        let mut count = 0;
        for slot in self.slots.iter_mut().filter(|s| s.status.is_alive()) {
            slot.status = ProcessStatus::Aborted;
            count += 1;
        }
        count
    }

    /// Status of a process still held by the scheduler.
    ///
    /// Returns `None` once the process has been reaped.
    pub fn status(&self, id: ProcessId) -> Option<ProcessStatus> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.status)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.status(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Update every live process once, then reap the ones that finished.
    ///
    /// Returns the number of processes removed during this tick.
    pub fn tick(&mut self, world: &mut World, time: f32) -> usize {
        for slot in self.slots.iter_mut() {
            if !slot.status.is_alive() {
                continue;
            }
            let mut control = ProcessControl::from_status(slot.status);
            slot.process.update(time, world, &mut control);
            slot.status = control.status();
        }
        self.reap(world)
    }

    /// Remove all terminated processes and run their completion hooks.
    ///
    /// Hooks run after the whole batch has left the active set, in the order
    /// the processes were added.
    pub fn reap(&mut self, world: &mut World) -> usize {
        if self.slots.iter().all(|s| s.status.is_alive()) {
            return 0;
        }
        let (finished, alive): (Vec<ProcessSlot>, Vec<ProcessSlot>) =
            std::mem::take(&mut self.slots)
                .into_iter()
                .partition(|s| !s.status.is_alive());
        self.slots = alive;

        let count = finished.len();
        for mut slot in finished {
            let (outcome, result) = match slot.status {
                ProcessStatus::Succeeded => {
                    (ProcessOutcome::Succeeded, slot.process.succeeded(world))
                }
                _ => (ProcessOutcome::Aborted, slot.process.aborted(world)),
            };
            if let Err(e) = result {
                error!(
                    "process {} '{}' {} with cleanup error: {}",
                    slot.id.0,
                    slot.process.name(),
                    outcome,
                    e
                );
            } else {
                debug!(
                    "process {} '{}' {}",
                    slot.id.0,
                    slot.process.name(),
                    outcome
                );
            }
            world.trigger(ProcessEndedEvent {
                id: slot.id,
                name: slot.process.name().to_string(),
                entity: slot.process.entity(),
                outcome,
            });
        }
        count
    }
}
