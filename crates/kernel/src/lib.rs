//! Scene kernel: the static geometry the player walks through, its materials,
//! the session clock animation, and the ray queries the movement loop runs
//! against it.
//!
//! # Invariants
//! - Geometry is read-only once the frame loop starts; only `advance` mutates
//!   node rotations, and only for nodes that carry a spin rate.
//! - Ray hits are reported in world space, nearest first.

pub mod raycast;
pub mod scene;

pub use raycast::{Hit, Ray, Raycaster};
pub use scene::{
    AmbientLight, Fog, MAX_SPHERE_SEGMENTS, Material, Mesh, Scene, SceneError, SceneNode, Shape,
    Side,
};
