//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Everything a frame needs comes from the scene plus a [`RenderView`].
//!
//! The GPU backend lives in `walkway-render-wgpu`; the text renderer here
//! serves the CLI and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
