use glam::Vec3;
use std::fmt::Write;
use walkway_kernel::{Scene, Shape};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Unit look direction.
    pub direction: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 19.0),
            direction: Vec3::NEG_Z,
            fov_degrees: 75.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the scene as seen from a view.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn describe(shape: &Shape) -> String {
    match shape {
        Shape::Plane { width, height } => format!("plane {width:.1}x{height:.1}"),
        Shape::Sphere { radius, .. } => format!("sphere r={radius:.1}"),
        Shape::Cuboid { size } => format!("box {:.1}x{:.1}x{:.1}", size.x, size.y, size.z),
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let _span = tracing::trace_span!("debug_text_render").entered();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (t={:.2}s, objects={}) ===",
            scene.elapsed(),
            scene.object_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) dir=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.direction.x,
            view.direction.y,
            view.direction.z,
            view.fov_degrees
        );

        scene.visit(|node, world| {
            let p = world.transform_point3(Vec3::ZERO);
            let shape = node
                .mesh
                .as_ref()
                .map(|mesh| describe(&mesh.shape))
                .unwrap_or_else(|| "group".to_string());
            let fog = scene.fog.factor(p.distance(view.eye));
            let _ = writeln!(
                out,
                "  {:<8} {:<18} pos=({:.2}, {:.2}, {:.2}) fog={:.2}",
                node.name, shape, p.x, p.y, p.z, fog
            );
        });

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("objects=0"));
        assert!(output.contains("fov=75"));
    }

    #[test]
    fn debug_renderer_lists_walkway_objects() {
        let scene = Scene::walkway().unwrap();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("objects=4"));
        assert!(output.contains("sphere r=20.0"));
        assert!(output.contains("box 1.0x3.0x1.0"));
        assert!(output.contains("plane 10.0x50.0"));
        assert_eq!(output.lines().count(), 2 + 4);
    }

    #[test]
    fn prism_is_fogged_from_the_start() {
        let scene = Scene::walkway().unwrap();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        let prism = output.lines().find(|l| l.contains("prism")).unwrap();
        // 29 units away, past the far fog plane
        assert!(prism.contains("fog=1.00"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.direction, Vec3::NEG_Z);
    }
}
