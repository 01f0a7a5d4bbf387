//! Walks the real walkway scene with the full movement loop.

use glam::Vec3;
use walkway_input::{Direction, Intent, Key, KeyEvent};
use walkway_kernel::Scene;
use walkway_motion::{Heading, MovementLoop, PointerLockController};

/// Hold `direction` for `frames` frames. The key is re-pressed every frame the
/// way OS key repeat does.
fn hold(
    scene: &Scene,
    cam: &mut PointerLockController,
    direction: Direction,
    frames: usize,
) -> Vec<Heading> {
    let looped = MovementLoop::default();
    let mut intent = Intent::new();
    let mut blocked = Vec::new();
    for _ in 0..frames {
        intent.press(direction);
        let report = looped.tick(&mut intent, cam, scene);
        blocked.extend(report.blocked);
    }
    blocked
}

#[test]
fn open_floor_walk_is_unobstructed() {
    let scene = Scene::walkway().unwrap();
    let mut cam = PointerLockController::default();
    let looped = MovementLoop::default();
    let mut intent = Intent::new();
    intent.apply(KeyEvent::Down(Key::W));

    for _ in 0..10 {
        let report = looped.tick(&mut intent, &mut cam, &scene);
        assert!(report.blocked.is_empty());
    }
    assert!((cam.position.z - (19.0 - 0.7)).abs() < 1e-4);
    assert_eq!(cam.position.x, 0.0);
}

#[test]
fn backing_into_the_dome_stops_short_of_it() {
    let scene = Scene::walkway().unwrap();
    let mut cam = PointerLockController::default();

    let blocked = hold(&scene, &mut cam, Direction::Backward, 100);

    assert!(blocked.contains(&Heading::Back));
    assert!(cam.position.z >= 19.7 - 1e-3, "z = {}", cam.position.z);
    assert!(cam.position.z < 19.8, "z = {}", cam.position.z);
}

#[test]
fn walking_into_the_cube_stops_in_front_of_it() {
    let mut scene = Scene::walkway().unwrap();
    scene.advance(0.0);
    let mut cam = PointerLockController::default();

    let blocked = hold(&scene, &mut cam, Direction::Forward, 400);

    assert!(blocked.contains(&Heading::Front));
    assert!(cam.position.z > 3.5, "z = {}", cam.position.z);
    assert!(cam.position.z <= 3.8 + 1e-3, "z = {}", cam.position.z);
}

#[test]
fn looking_fully_up_or_down_still_stops_at_the_cube() {
    let mut scene = Scene::walkway().unwrap();
    scene.advance(0.0);

    for dy in [-1.0e6, 1.0e6] {
        let mut cam = PointerLockController::new(Vec3::new(0.0, 0.0, 5.0));
        cam.lock();
        cam.look(0.0, dy);
        assert_eq!(cam.pitch.abs(), std::f32::consts::FRAC_PI_2);

        let blocked = hold(&scene, &mut cam, Direction::Forward, 100);

        assert!(blocked.contains(&Heading::Front), "pitch {}", cam.pitch);
        assert!(cam.position.z > 3.5, "z = {}", cam.position.z);
        assert!(cam.position.z <= 3.8 + 1e-3, "z = {}", cam.position.z);
    }
}

#[test]
fn strafing_past_the_prism_side() {
    let scene = Scene::walkway().unwrap();
    let mut cam = PointerLockController::new(Vec3::new(-3.0, 0.0, -10.0));

    let blocked = hold(&scene, &mut cam, Direction::Right, 200);

    assert!(blocked.contains(&Heading::Right));
    assert!(cam.position.x < -0.5, "x = {}", cam.position.x);
    assert!(cam.position.x >= -0.8 - 1e-3, "x = {}", cam.position.x);
    assert_eq!(cam.position.z, -10.0);
}

#[test]
fn releasing_keys_stops_the_player() {
    let scene = Scene::walkway().unwrap();
    let mut cam = PointerLockController::default();
    let looped = MovementLoop::default();
    let mut intent = Intent::new();

    intent.apply(KeyEvent::Down(Key::ArrowLeft));
    looped.tick(&mut intent, &mut cam, &scene);
    intent.apply(KeyEvent::Up(Key::ArrowLeft));
    let parked = cam.position;

    let report = looped.tick(&mut intent, &mut cam, &scene);
    assert_eq!(report.displacement, Vec3::ZERO);
    assert_eq!(cam.position, parked);
    assert!((parked.x + 0.035).abs() < 1e-6);
}
