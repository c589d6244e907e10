use formation_core::camera::{CameraTransform, Ray};
use formation_core::config::{PointerConfig, SmoothingMode};
use formation_core::pointer::{Plane, PointerProjector, FAR_AWAY};
use glam::{Vec2, Vec3};

fn front_camera() -> CameraTransform {
    CameraTransform::looking_at(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO)
}

fn converge(projector: &mut PointerProjector, camera: &CameraTransform, ndc: Vec2) -> Vec3 {
    for _ in 0..600 {
        projector.update(camera, ndc, 1.0 / 60.0);
    }
    projector.attractor()
}

#[test]
fn test_starts_far_away() {
    let projector = PointerProjector::new(&PointerConfig::default());
    assert_eq!(projector.attractor(), FAR_AWAY);
}

#[test]
fn test_center_pointer_converges_to_origin() {
    let mut projector = PointerProjector::new(&PointerConfig::default());
    let p = converge(&mut projector, &front_camera(), Vec2::ZERO);
    assert!(p.length() < 1e-2, "attractor {:?}", p);
}

#[test]
fn test_attractor_lies_on_plane() {
    let mut projector = PointerProjector::new(&PointerConfig::default());
    let p = converge(&mut projector, &front_camera(), Vec2::new(0.5, -0.3));
    assert!(p.z.abs() < 1e-2, "attractor off plane: {:?}", p);
    assert!(p.x > 0.0 && p.y < 0.0, "attractor on wrong side: {:?}", p);
}

#[test]
fn test_smoothing_moves_partially_each_frame() {
    let config = PointerConfig {
        smoothing_mode: SmoothingMode::PerFrame,
        ..Default::default()
    };
    let mut projector = PointerProjector::new(&config);
    let camera = front_camera();
    converge(&mut projector, &camera, Vec2::ZERO);

    let before = projector.attractor();
    let hit = camera
        .ray_through(Vec2::new(0.5, 0.0))
        .intersect_plane(projector.plane())
        .unwrap();
    let after = projector.update(&camera, Vec2::new(0.5, 0.0), 1.0 / 60.0);
    let expected = before.lerp(hit, 0.1);
    assert!((after - expected).length() < 1e-4, "{:?} vs {:?}", after, expected);
}

#[test]
fn test_per_frame_ignores_frame_duration() {
    let config = PointerConfig {
        smoothing_mode: SmoothingMode::PerFrame,
        ..Default::default()
    };
    let projector = PointerProjector::new(&config);
    assert_eq!(projector.smoothing_factor(1.0 / 30.0), projector.smoothing_factor(1.0 / 120.0));
}

#[test]
fn test_time_corrected_frame_rate_independent() {
    let camera = front_camera();
    let target = Vec2::new(0.2, 0.2);

    let mut fast = PointerProjector::new(&PointerConfig::default());
    let mut slow = PointerProjector::new(&PointerConfig::default());
    converge(&mut fast, &camera, Vec2::ZERO);
    converge(&mut slow, &camera, Vec2::ZERO);

    for _ in 0..12 {
        fast.update(&camera, target, 1.0 / 120.0);
    }
    for _ in 0..3 {
        slow.update(&camera, target, 1.0 / 30.0);
    }
    assert!((fast.attractor() - slow.attractor()).length() < 1e-3);
}

#[test]
fn test_parallel_ray_keeps_previous_attractor() {
    let mut projector = PointerProjector::new(&PointerConfig::default());
    let front = front_camera();
    let before = converge(&mut projector, &front, Vec2::ZERO);

    // Looking along the plane: every centre ray is parallel to it.
    let side = CameraTransform::looking_at(Vec3::new(-30.0, 0.0, 0.0), Vec3::new(30.0, 0.0, 0.0));
    let after = projector.update(&side, Vec2::ZERO, 1.0 / 60.0);
    assert_eq!(before, after);
}

#[test]
fn test_non_finite_pointer_keeps_previous_attractor() {
    let mut projector = PointerProjector::new(&PointerConfig::default());
    let camera = front_camera();
    let before = converge(&mut projector, &camera, Vec2::ZERO);
    let after = projector.update(&camera, Vec2::new(f32::NAN, 0.0), 1.0 / 60.0);
    assert_eq!(before, after);
}

#[test]
fn test_pointer_outside_range_is_clamped() {
    let camera = front_camera();
    let clamped = camera.ray_through(Vec2::new(5.0, -9.0));
    let edge = camera.ray_through(Vec2::new(1.0, -1.0));
    assert!((clamped.direction - edge.direction).length() < 1e-6);
}

#[test]
fn test_ray_plane_intersection_offset_plane() {
    let plane = Plane::new(Vec3::new(0.0, 0.0, 2.0), -4.0); // z = 2
    let ray = Ray {
        origin: Vec3::new(1.0, 1.0, 10.0),
        direction: Vec3::NEG_Z,
    };
    let hit = ray.intersect_plane(&plane).unwrap();
    assert!((hit - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
}
