//! Cue engine library.
//!
//! Cooperative process scheduling for scripted timers and media playback on
//! top of a `bevy_ecs` world. This module exposes the components, resources,
//! processes, systems, and events for use by the runner binary and in
//! integration tests.

pub mod components;
pub mod events;
pub mod processes;
pub mod resources;
pub mod scenario;
pub mod systems;
