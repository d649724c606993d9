//! Scripted timer records attached to entities.
//!
//! A script schedules a timed event on an entity by adding a [`TimerRecord`]
//! to that entity's [`Timers`] component. Each record is driven by exactly one
//! [`TimerProcess`](crate::processes::timer::TimerProcess), which runs the
//! record's bytecode entry points when the start and end boundaries are
//! crossed.
//!
//! # Ownership
//!
//! The [`Timers`] component owns every record of its entity. Timer processes
//! only hold the entity and the record's [`TimerId`] and go back through the
//! world to reach the record. Per-tick updates only touch the record's
//! `state`; records are removed exclusively from the processes' completion
//! hooks, and the component is removed together with its last record.
//!
//! # Related
//!
//! - [`crate::processes::timer::TimerProcess`] – state machine driving a record
//! - [`crate::systems::processes::schedule_timer`] – attaches a record and starts its process

use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a timer record, unique for the lifetime of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        TimerId(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle of a timer record. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TimerState {
    #[default]
    NotStarted,
    Started,
    Stopped,
}

/// One scheduled scripted interval on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerRecord {
    id: TimerId,
    /// Clock value at which the timer was created.
    pub created: f32,
    /// Delay after `created` before the start event fires.
    pub start_time: f32,
    /// Length of the interval between start and end events.
    pub duration: f32,
    /// Bytecode entry point run when the timer starts.
    pub start_offset: Option<u32>,
    /// Bytecode entry point run when the timer stops.
    pub end_offset: Option<u32>,
    state: TimerState,
}

impl TimerRecord {
    /// Create a record in the [`TimerState::NotStarted`] state with a fresh id.
    pub fn new(created: f32, start_time: f32, duration: f32) -> Self {
        TimerRecord {
            id: TimerId::next(),
            created,
            start_time,
            duration,
            start_offset: None,
            end_offset: None,
            state: TimerState::NotStarted,
        }
    }

    pub fn with_start_offset(mut self, offset: u32) -> Self {
        self.start_offset = Some(offset);
        self
    }

    pub fn with_end_offset(mut self, offset: u32) -> Self {
        self.end_offset = Some(offset);
        self
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Clock value at which the start event is due.
    pub fn start_at(&self) -> f32 {
        self.created + self.start_time
    }

    /// Clock value at which the end event is due.
    pub fn end_at(&self) -> f32 {
        self.created + self.start_time + self.duration
    }

    /// Move to `next`. Backward or repeated transitions are ignored and
    /// reported as `false`.
    pub fn advance(&mut self, next: TimerState) -> bool {
        if next <= self.state {
            return false;
        }
        self.state = next;
        true
    }
}

/// Per-entity ordered collection of active timer records.
///
/// An entity never carries an empty `Timers`; use
/// [`remove_timer`](crate::systems::processes::remove_timer) to detach
/// records so the component goes away with the last one.
#[derive(Component, Debug, Clone, Default)]
pub struct Timers {
    records: SmallVec<[TimerRecord; 4]>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its id.
    pub fn push(&mut self, record: TimerRecord) -> TimerId {
        let id = record.id;
        self.records.push(record);
        id
    }

    pub fn get(&self, id: TimerId) -> Option<&TimerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Remove the record with `id`, keeping the order of the others.
    pub fn remove(&mut self, id: TimerId) -> Option<TimerRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_get_distinct_ids() {
        let a = TimerRecord::new(0.0, 1.0, 1.0);
        let b = TimerRecord::new(0.0, 1.0, 1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_new_defaults() {
        let r = TimerRecord::new(1.5, 2.0, 3.0);
        assert_eq!(r.state(), TimerState::NotStarted);
        assert!(r.start_offset.is_none());
        assert!(r.end_offset.is_none());
        assert_eq!(r.start_at(), 3.5);
        assert_eq!(r.end_at(), 6.5);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut r = TimerRecord::new(0.0, 0.0, 0.0);
        assert!(r.advance(TimerState::Started));
        assert!(!r.advance(TimerState::Started));
        assert!(!r.advance(TimerState::NotStarted));
        assert!(r.advance(TimerState::Stopped));
        assert!(!r.advance(TimerState::Started));
        assert_eq!(r.state(), TimerState::Stopped);
    }

    #[test]
    fn test_remove_keeps_sibling_order() {
        let mut timers = Timers::new();
        let a = timers.push(TimerRecord::new(0.0, 1.0, 1.0));
        let b = timers.push(TimerRecord::new(0.0, 2.0, 1.0));
        let c = timers.push(TimerRecord::new(0.0, 3.0, 1.0));

        let removed = timers.remove(b).unwrap();
        assert_eq!(removed.id(), b);
        let ids: Vec<TimerId> = timers.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(timers.remove(b).is_none());
    }
}
