use glam::{Mat4, Vec3};
use walkway_render::RenderView;

/// Perspective projection for the first-person view. Pose comes from the
/// movement controller; this only owns the lens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn with_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.resize(width, height);
        camera
    }

    /// Track the surface size. Zero-sized surfaces (minimized windows) keep
    /// the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// A view from `eye` along `direction` through this lens.
    pub fn view(&self, eye: Vec3, direction: Vec3) -> RenderView {
        RenderView {
            eye,
            direction,
            fov_degrees: self.fov_degrees,
        }
    }

    pub fn view_matrix(&self, view: &RenderView) -> Mat4 {
        Mat4::look_to_rh(view.eye, view.direction, Vec3::Y)
    }

    pub fn projection_matrix(&self, view: &RenderView) -> Mat4 {
        Mat4::perspective_rh(
            view.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, view: &RenderView) -> Mat4 {
        self.projection_matrix(view) * self.view_matrix(view)
    }
}
