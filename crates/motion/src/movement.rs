use crate::config::MovementConfig;
use crate::controller::Controller;
use crate::probe::{Heading, Obstacles, PROBE_COUNT, ProbeRing};
use glam::Vec3;
use walkway_input::Intent;

/// What one frame of the movement loop did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Headings whose probe blocked movement, in ring order.
    pub blocked: Vec<Heading>,
    /// Controller position change applied this frame.
    pub displacement: Vec3,
}

/// Clear the intents obstructed by probe hits at or under `block_distance`.
///
/// Only runs while `intent.moving`; never re-derives `moving` afterwards.
/// Returns the headings that blocked.
pub fn gate(
    intent: &mut Intent,
    hits: &[Option<f32>; PROBE_COUNT],
    block_distance: f32,
) -> Vec<Heading> {
    if !intent.moving {
        return Vec::new();
    }
    let mut blocked = Vec::new();
    for (heading, hit) in Heading::RING.iter().zip(hits) {
        let Some(distance) = *hit else {
            continue;
        };
        if distance > block_distance {
            continue;
        }
        tracing::debug!(heading = heading.label(), distance, "{heading}");
        for direction in heading.blocks() {
            intent.clear(*direction);
        }
        blocked.push(*heading);
    }
    blocked
}

/// The per-frame read, probe, gate, move pass.
#[derive(Debug, Clone, Default)]
pub struct MovementLoop {
    config: MovementConfig,
}

impl MovementLoop {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Run one frame against `obstacles`, mutating `intent` (gating) and
    /// `controller` (displacement).
    pub fn tick(
        &self,
        intent: &mut Intent,
        controller: &mut impl Controller,
        obstacles: &impl Obstacles,
    ) -> FrameReport {
        let start = controller.position();
        let ring = ProbeRing::around(start, controller.ground_forward(), &self.config);
        let hits = ring.cast(obstacles);
        let blocked = gate(intent, &hits, self.config.block_distance);

        self.apply(intent, controller);

        FrameReport {
            blocked,
            displacement: controller.position() - start,
        }
    }

    /// Translate whatever intent survived gating into controller motion.
    /// Forward and strafe steps add up; diagonals are not normalized.
    pub fn apply(&self, intent: &Intent, controller: &mut impl Controller) {
        if !intent.moving {
            return;
        }
        let speed = self.config.speed;
        let strafe = self.config.strafe_speed();
        if intent.forward {
            controller.move_forward(speed);
        }
        if intent.backward {
            controller.move_forward(-speed);
        }
        if intent.right {
            controller.move_right(strafe);
        }
        if intent.left {
            controller.move_right(-strafe);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PointerLockController;
    use walkway_input::Direction;
    use walkway_kernel::Raycaster;

    fn nothing(_: &Raycaster) -> Option<f32> {
        None
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn holding(directions: &[Direction]) -> Intent {
        let mut intent = Intent::new();
        for direction in directions {
            intent.press(*direction);
        }
        intent
    }

    #[test]
    fn forward_only_moves_exactly_speed() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = holding(&[Direction::Forward]);

        let report = looped.tick(&mut intent, &mut cam, &nothing);
        assert!(close(report.displacement, Vec3::new(0.0, 0.0, -0.07)));
        assert!(report.blocked.is_empty());
        assert!(intent.forward);
    }

    #[test]
    fn forward_and_right_compose_without_normalization() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = holding(&[Direction::Forward, Direction::Right]);

        let report = looped.tick(&mut intent, &mut cam, &nothing);
        assert!(close(report.displacement, Vec3::new(0.035, 0.0, -0.07)));
        assert!(report.displacement.length() > 0.07);
    }

    #[test]
    fn backward_and_left_mirror_forward_and_right() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = holding(&[Direction::Backward, Direction::Left]);

        let report = looped.tick(&mut intent, &mut cam, &nothing);
        assert!(close(report.displacement, Vec3::new(-0.035, 0.0, 0.07)));
    }

    #[test]
    fn left_wall_clears_left_but_keeps_forward() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = holding(&[Direction::Forward, Direction::Left]);
        let wall_on_left = |caster: &Raycaster| (caster.ray.direction.x < -0.9).then_some(0.2_f32);

        let report = looped.tick(&mut intent, &mut cam, &wall_on_left);
        assert_eq!(report.blocked, vec![Heading::Left]);
        assert!(!intent.left);
        assert!(intent.forward);
        assert!(close(report.displacement, Vec3::new(0.0, 0.0, -0.07)));
    }

    #[test]
    fn stale_flags_without_moving_do_not_move() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = Intent {
            forward: true,
            right: true,
            moving: false,
            ..Intent::default()
        };
        let report = looped.tick(&mut intent, &mut cam, &nothing);
        assert_eq!(report.displacement, Vec3::ZERO);
    }

    #[test]
    fn fully_blocked_frame_keeps_moving_flag() {
        let looped = MovementLoop::default();
        let mut cam = PointerLockController::default();
        let mut intent = holding(&Direction::ALL);
        let boxed_in = |_: &Raycaster| Some(0.1_f32);

        let report = looped.tick(&mut intent, &mut cam, &boxed_in);
        assert_eq!(report.blocked.len(), PROBE_COUNT);
        assert!(!intent.any());
        assert!(intent.moving);
        assert_eq!(report.displacement, Vec3::ZERO);
    }

    #[test]
    fn gate_clears_designated_flags_per_heading() {
        for heading in Heading::RING {
            let mut intent = holding(&Direction::ALL);
            let mut hits = [None; PROBE_COUNT];
            hits[heading.index()] = Some(0.3);

            let blocked = gate(&mut intent, &hits, 0.3);
            assert_eq!(blocked, vec![heading]);
            for direction in Direction::ALL {
                let should_clear = heading.blocks().contains(&direction);
                assert_eq!(
                    intent.is_set(direction),
                    !should_clear,
                    "{heading} / {direction:?}"
                );
            }
        }
    }

    #[test]
    fn gate_ignores_far_hits() {
        let mut intent = holding(&[Direction::Forward, Direction::Left]);
        let before = intent;
        let mut hits = [None; PROBE_COUNT];
        hits[Heading::Front.index()] = Some(0.31);
        hits[Heading::Left.index()] = Some(0.45);

        assert!(gate(&mut intent, &hits, 0.3).is_empty());
        assert_eq!(intent, before);
    }

    #[test]
    fn gate_is_idle_when_not_moving() {
        let mut intent = Intent::new();
        let hits = [Some(0.05); PROBE_COUNT];
        assert!(gate(&mut intent, &hits, 0.3).is_empty());
        assert_eq!(intent, Intent::new());
    }

    #[test]
    fn custom_speed_is_honored() {
        let looped = MovementLoop::new(MovementConfig {
            speed: 0.2,
            strafe_factor: 1.0,
            ..MovementConfig::default()
        });
        let mut cam = PointerLockController::default();
        let mut intent = holding(&[Direction::Right]);
        let report = looped.tick(&mut intent, &mut cam, &nothing);
        assert!(close(report.displacement, Vec3::new(0.2, 0.0, 0.0)));
    }
}
