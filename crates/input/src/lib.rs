//! Input: keyboard keys mapped to movement directions, and the intent record
//! the frame loop reads every tick.
//!
//! # Invariants
//! - `Intent::moving` is true iff at least one direction is held, re-derived
//!   on every key event.
//! - No windowing types leak in here; the desktop app translates its own key
//!   codes into [`Key`].

pub mod intent;
pub mod key;

pub use intent::Intent;
pub use key::{Direction, Key, KeyEvent};
