//! ECS resources made available to systems.
//!
//! Overview
//! - `engineconfig` – runner settings loaded from INI
//! - `media` – playback sessions owned by the media subsystem
//! - `scheduler` – owner and driver of all cooperative processes
//! - `scripting` – bytecode VM bridge and shared script context
//! - `worldtime` – simulation time and delta
pub mod engineconfig;
pub mod media;
pub mod scheduler;
pub mod scripting;
pub mod worldtime;
