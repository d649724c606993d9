//! Event types used by the engine.
//!
//! Submodules:
//! - [`process`] – notification emitted when a scheduled process ends
pub mod process;
