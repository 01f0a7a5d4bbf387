//! Movement: turns held-key intent into controller displacement, gated by a
//! ring of short probes cast against the scene every frame.
//!
//! Each frame: read the controller pose, cast eight probes around the player,
//! clear the intents whose direction is obstructed, then apply what is left.
//!
//! # Invariants
//! - The scene is read-only here; only the controller and the intent mutate.
//! - Probes are recomputed from the current facing every frame.
//! - Gating never re-derives `Intent::moving`; a fully blocked frame still
//!   takes the movement branch and moves nothing.
//! - No diagonal normalization: forward + strafe compose additively.

pub mod config;
pub mod controller;
pub mod movement;
pub mod probe;

pub use config::{ConfigError, MovementConfig};
pub use controller::{Controller, PointerLockController};
pub use movement::{FrameReport, MovementLoop, gate};
pub use probe::{Heading, Obstacles, PROBE_COUNT, Probe, ProbeRing};
