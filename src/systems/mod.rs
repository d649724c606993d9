//! Engine systems.
//!
//! Submodules overview
//! - [`media`] – drop playback sessions nothing supervises any more
//! - [`processes`] – tick the process scheduler; timer and playback helpers
//! - [`time`] – update simulation time and delta

pub mod media;
pub mod processes;
pub mod time;
