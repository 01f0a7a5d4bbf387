use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

/// First-person movement surface the loop drives.
pub trait Controller {
    fn position(&self) -> Vec3;

    /// Unit look direction, including pitch.
    fn direction(&self) -> Vec3;

    /// Unit horizontal forward that `move_forward` travels along. Defined
    /// for every pitch, including straight up or down.
    fn ground_forward(&self) -> Vec3;

    /// Move along `ground_forward`.
    fn move_forward(&mut self, distance: f32);

    /// Move along the camera's right vector.
    fn move_right(&mut self, distance: f32);
}

/// Pointer-lock style first-person camera: yaw/pitch look that only responds
/// to the mouse while locked, and ground-plane movement.
///
/// Yaw 0 looks down -Z; positive yaw turns left (counter-clockwise seen from
/// above).
#[derive(Debug, Clone, PartialEq)]
pub struct PointerLockController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
    locked: bool,
}

impl Default for PointerLockController {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 19.0))
    }
}

impl PointerLockController {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.002,
            locked: false,
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn lock(&mut self) {
        if !self.locked {
            tracing::info!("pointer locked");
        }
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        if self.locked {
            tracing::info!("pointer unlocked");
        }
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Apply a mouse delta in pixels. Ignored while unlocked.
    pub fn look(&mut self, dx: f32, dy: f32) {
        if !self.locked {
            return;
        }
        self.yaw -= dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

impl Controller for PointerLockController {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn direction(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// `up x right`, which depends on yaw alone.
    fn ground_forward(&self) -> Vec3 {
        Vec3::Y.cross(self.right())
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.ground_forward() * distance;
    }

    fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_pose() {
        let cam = PointerLockController::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 19.0));
        assert!(close(cam.direction(), Vec3::NEG_Z));
        assert!(close(cam.right(), Vec3::X));
        assert!(!cam.is_locked());
    }

    #[test]
    fn move_forward_ignores_pitch() {
        let mut cam = PointerLockController::new(Vec3::ZERO);
        cam.pitch = 1.0;
        cam.move_forward(2.0);
        assert!(close(cam.position, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn move_right_strafes() {
        let mut cam = PointerLockController::new(Vec3::ZERO);
        cam.move_right(-0.5);
        assert!(close(cam.position, Vec3::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn look_requires_lock() {
        let mut cam = PointerLockController::default();
        cam.look(100.0, 50.0);
        assert_eq!(cam.yaw, 0.0);
        assert_eq!(cam.pitch, 0.0);

        cam.lock();
        cam.look(100.0, 50.0);
        assert!((cam.yaw + 0.2).abs() < 1e-6);
        assert!((cam.pitch + 0.1).abs() < 1e-6);

        cam.unlock();
        cam.look(100.0, 0.0);
        assert!((cam.yaw + 0.2).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = PointerLockController::default();
        cam.lock();
        cam.look(0.0, -10_000.0);
        assert_eq!(cam.pitch, FRAC_PI_2);
        cam.look(0.0, 20_000.0);
        assert_eq!(cam.pitch, -FRAC_PI_2);
    }

    #[test]
    fn positive_yaw_turns_left() {
        let mut cam = PointerLockController::new(Vec3::ZERO);
        cam.yaw = FRAC_PI_2;
        assert!(close(cam.direction(), Vec3::NEG_X));
        assert!(close(cam.ground_forward(), Vec3::NEG_X));
        assert!(close(cam.right(), Vec3::NEG_Z));
    }

    #[test]
    fn ground_forward_survives_the_pitch_clamp() {
        let mut cam = PointerLockController::new(Vec3::ZERO);
        cam.yaw = 0.3;
        let level = cam.ground_forward();
        cam.lock();
        for dy in [-1.0e6, 1.0e6] {
            cam.look(0.0, dy);
            assert_eq!(cam.pitch.abs(), FRAC_PI_2);
            assert!(close(cam.ground_forward(), level));
            assert!((cam.ground_forward().length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn direction_is_unit_length() {
        let mut cam = PointerLockController::default();
        cam.yaw = 0.7;
        cam.pitch = -0.4;
        assert!((cam.direction().length() - 1.0).abs() < 1e-6);
    }
}
