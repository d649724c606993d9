//! Process scheduling systems and helpers.
//!
//! - [`run_processes`] – exclusive system ticking the
//!   [`ProcessScheduler`](crate::resources::scheduler::ProcessScheduler)
//!   with the current [`WorldTime`] clock
//! - [`schedule_timer`] – attach a timer record to an entity and start its process
//! - [`start_playback`] – hand a session to the media subsystem and supervise it
//! - [`remove_timer`] – the single path that detaches records from [`Timers`]
//! - [`despawn_with_processes`] – abort an entity's processes, then despawn it
//!
//! # System Flow
//!
//! Each frame, after [`update_world_time`](crate::systems::time::update_world_time):
//!
//! 1. `run_processes` takes the scheduler out of the world
//! 2. every live process is updated with `WorldTime::elapsed`
//! 3. finished processes are removed and their completion hooks run
//! 4. a `ProcessEndedEvent` is triggered for each of them

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::timers::{TimerId, TimerRecord, Timers};
use crate::processes::playback::PlaybackProcess;
use crate::processes::timer::TimerProcess;
use crate::resources::media::{MediaPlayers, Player};
use crate::resources::scheduler::{ProcessId, ProcessScheduler};
use crate::resources::worldtime::WorldTime;

/// Tick every scheduled process once.
///
/// Does nothing if no [`ProcessScheduler`] is installed.
pub fn run_processes(world: &mut World) {
    if !world.contains_resource::<ProcessScheduler>() {
        return;
    }
    let time = world
        .get_resource::<WorldTime>()
        .map(|wt| wt.elapsed)
        .unwrap_or_default();
    world.resource_scope(|world, mut scheduler: Mut<ProcessScheduler>| {
        scheduler.tick(world, time);
    });
}

/// Attach `record` to `entity` and register a [`TimerProcess`] for it.
///
/// Creates the entity's [`Timers`] component if needed. Returns `None`
/// (and attaches nothing) if the entity does not exist or no scheduler is
/// installed.
pub fn schedule_timer(world: &mut World, entity: Entity, record: TimerRecord) -> Option<ProcessId> {
    if !world.contains_resource::<ProcessScheduler>() {
        warn!("cannot schedule timer on {:?}: no process scheduler", entity);
        return None;
    }
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        warn!("cannot schedule timer on {:?}: no such entity", entity);
        return None;
    };

    let timer = if let Some(mut timers) = entity_mut.get_mut::<Timers>() {
        timers.push(record)
    } else {
        let mut timers = Timers::new();
        let id = timers.push(record);
        entity_mut.insert(timers);
        id
    };

    let mut scheduler = world.resource_mut::<ProcessScheduler>();
    Some(scheduler.add(TimerProcess::new(entity, timer)))
}

/// Result of [`remove_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRemoval {
    /// The record was removed; `remaining` records are left on the entity.
    /// When `remaining` is zero the component was removed as well.
    Removed { remaining: usize },
    /// The entity has a timer collection but not this record.
    NotFound,
    /// The entity is gone or carries no timer collection.
    NoCollection,
}

/// Detach the record `timer` from `entity`'s [`Timers`].
///
/// Removes the component itself when its last record goes, so entities never
/// keep an empty collection. Sibling records keep their order.
pub fn remove_timer(world: &mut World, entity: Entity, timer: TimerId) -> TimerRemoval {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return TimerRemoval::NoCollection;
    };
    let (removed, remaining) = match entity_mut.get_mut::<Timers>() {
        Some(mut timers) => (timers.remove(timer).is_some(), timers.len()),
        None => return TimerRemoval::NoCollection,
    };
    if remaining == 0 {
        entity_mut.remove::<Timers>();
    }
    if removed {
        TimerRemoval::Removed { remaining }
    } else {
        TimerRemoval::NotFound
    }
}

/// Give `player` to the [`MediaPlayers`] resource and supervise it with a
/// [`PlaybackProcess`], optionally bound to `entity`.
///
/// Returns `None` if either resource is missing.
pub fn start_playback(
    world: &mut World,
    player: impl Player + 'static,
    entity: Option<Entity>,
) -> Option<ProcessId> {
    if !world.contains_resource::<ProcessScheduler>() {
        warn!("cannot start playback: no process scheduler");
        return None;
    }
    let Some(mut players) = world.get_resource_mut::<MediaPlayers>() else {
        warn!("cannot start playback: no media subsystem");
        return None;
    };
    let player_id = players.insert(player);

    let mut process = PlaybackProcess::new(player_id);
    if let Some(entity) = entity {
        process = process.with_entity(entity);
    }
    Some(world.resource_mut::<ProcessScheduler>().add(process))
}

/// Abort every process bound to `entity`, run their hooks, then despawn it.
///
/// Returns `false` if the entity did not exist.
pub fn despawn_with_processes(world: &mut World, entity: Entity) -> bool {
    if world.contains_resource::<ProcessScheduler>() {
        world.resource_scope(|world, mut scheduler: Mut<ProcessScheduler>| {
            if scheduler.abort_entity(entity) > 0 {
                scheduler.reap(world);
            }
        });
    }
    world.despawn(entity)
}
