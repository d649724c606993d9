//! ECS components for entities.
//!
//! Submodules overview:
//! - [`timers`] – per-entity collection of scripted timer records

pub mod timers;
