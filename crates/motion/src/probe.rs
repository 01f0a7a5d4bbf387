use crate::config::MovementConfig;
use glam::Vec3;
use std::f32::consts::FRAC_PI_4;
use std::fmt;
use walkway_input::Direction;
use walkway_kernel::{Raycaster, Scene};

pub const PROBE_COUNT: usize = 8;

/// Where a probe points relative to the player's facing, in ring order.
///
/// Ring index `i` is the facing rotated by `-45° * i` about +Y, which walks
/// the ring front, front-left, left, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Front,
    FrontLeft,
    Left,
    BackLeft,
    Back,
    BackRight,
    Right,
    FrontRight,
}

impl Heading {
    pub const RING: [Heading; PROBE_COUNT] = [
        Heading::Front,
        Heading::FrontLeft,
        Heading::Left,
        Heading::BackLeft,
        Heading::Back,
        Heading::BackRight,
        Heading::Right,
        Heading::FrontRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation about +Y applied to the facing for this probe.
    pub fn angle(self) -> f32 {
        -FRAC_PI_4 * self.index() as f32
    }

    pub fn label(self) -> &'static str {
        match self {
            Heading::Front => "front",
            Heading::FrontLeft => "front-left",
            Heading::Left => "left",
            Heading::BackLeft => "back-left",
            Heading::Back => "back",
            Heading::BackRight => "back-right",
            Heading::Right => "right",
            Heading::FrontRight => "front-right",
        }
    }

    /// Intents an obstacle in this heading suppresses. Diagonals block both
    /// contributing axes so the player cannot slip into a corner.
    pub fn blocks(self) -> &'static [Direction] {
        match self {
            Heading::Front => &[Direction::Forward],
            Heading::FrontLeft => &[Direction::Forward, Direction::Left],
            Heading::Left => &[Direction::Left],
            Heading::BackLeft => &[Direction::Backward, Direction::Left],
            Heading::Back => &[Direction::Backward],
            Heading::BackRight => &[Direction::Backward, Direction::Right],
            Heading::Right => &[Direction::Right],
            Heading::FrontRight => &[Direction::Forward, Direction::Right],
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rotate `v` about the vertical axis by `angle` radians.
///
/// `x' = x cos a - z sin a`, `z' = x sin a + z cos a`; `y` is kept.
pub fn rotate_about_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Anything the probes can be cast against.
pub trait Obstacles {
    /// Distance to the nearest hit inside the caster's window.
    fn nearest_distance(&self, caster: &Raycaster) -> Option<f32>;
}

impl Obstacles for Scene {
    fn nearest_distance(&self, caster: &Raycaster) -> Option<f32> {
        self.nearest(caster).map(|hit| hit.distance)
    }
}

impl<F> Obstacles for F
where
    F: Fn(&Raycaster) -> Option<f32>,
{
    fn nearest_distance(&self, caster: &Raycaster) -> Option<f32> {
        self(caster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub heading: Heading,
    pub caster: Raycaster,
}

/// The eight frame-local probes around the player.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRing {
    probes: [Probe; PROBE_COUNT],
}

impl ProbeRing {
    /// Build the ring at `position` (height replaced by the configured probe
    /// height) around `facing`, normally the controller's ground forward.
    /// Any vertical component of `facing` is projected away.
    pub fn around(position: Vec3, facing: Vec3, config: &MovementConfig) -> Self {
        let origin = Vec3::new(position.x, config.probe_height, position.z);
        let flat = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
        let probes = Heading::RING.map(|heading| Probe {
            heading,
            caster: Raycaster::new(
                origin,
                rotate_about_y(flat, heading.angle()),
                config.probe_near,
                config.probe_far,
            ),
        });
        Self { probes }
    }

    pub fn probes(&self) -> &[Probe; PROBE_COUNT] {
        &self.probes
    }

    pub fn direction(&self, heading: Heading) -> Vec3 {
        self.probes[heading.index()].caster.ray.direction
    }

    /// Nearest-hit distance per probe, in ring order.
    pub fn cast(&self, obstacles: &impl Obstacles) -> [Option<f32>; PROBE_COUNT] {
        let _span = tracing::trace_span!("probe_cast").entered();
        self.probes.map(|probe| obstacles.nearest_distance(&probe.caster))
    }
}
