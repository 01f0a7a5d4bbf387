//! Shared value types used by every walkway crate.

mod types;

pub use types::{ObjectId, Transform};
