//! wgpu render backend for the walkway scene.
//!
//! Draws every mesh node of a [`walkway_kernel::Scene`] with ambient Lambert
//! shading, emission and distance fog. Opaque meshes go first; transparent
//! ones follow back to front with alpha blending.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Face culling follows each material's `Side`, so what is drawn matches
//!   what the movement probes can hit.
//! - Render frame rate is independent of how the caller advances the scene.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::PerspectiveCamera;
pub use gpu::WgpuRenderer;
