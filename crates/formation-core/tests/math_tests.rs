use formation_core::math::*;
use glam::Vec3;

#[test]
fn test_ease_in_out_cubic_endpoints() {
    assert_eq!(ease_in_out_cubic(0.0), 0.0);
    assert_eq!(ease_in_out_cubic(1.0), 1.0);
    assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn test_ease_in_out_cubic_monotonic() {
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = ease_in_out_cubic(i as f32 / 100.0);
        assert!(v >= prev, "ease not monotonic at {}: {} < {}", i, v, prev);
        prev = v;
    }
}

#[test]
fn test_damp_converges_without_overshoot() {
    let mut x = 0.0;
    for _ in 0..600 {
        x = damp(x, 1.0, 2.0, 1.0 / 60.0);
        assert!(x <= 1.0);
    }
    assert!((x - 1.0).abs() < 1e-3, "x = {}", x);
}

#[test]
fn test_damp_zero_dt_is_identity() {
    assert_eq!(damp(0.3, 1.0, 5.0, 0.0), 0.3);
    assert_eq!(damp(0.3, 1.0, 5.0, f32::NAN), 0.3);
}

#[test]
fn test_rotate_y_quarter_turn() {
    let v = rotate_y(Vec3::X, std::f32::consts::FRAC_PI_2);
    assert!((v - Vec3::NEG_Z).length() < 1e-6, "{:?}", v);
}

#[test]
fn test_look_rotation_points_z_at_target() {
    let eye = Vec3::new(1.0, 2.0, 3.0);
    let target = Vec3::new(-4.0, 0.0, 7.0);
    let q = look_rotation(eye, target);
    let z = q * Vec3::Z;
    assert!((z - (target - eye).normalize()).length() < 1e-5);
    assert!((q * Vec3::Y).y > 0.0, "up vector flipped");
}

#[test]
fn test_look_rotation_degenerate_inputs_are_finite() {
    let same = look_rotation(Vec3::ONE, Vec3::ONE);
    assert!(same.is_finite());
    let vertical = look_rotation(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0));
    assert!(vertical.is_finite());
    assert!((vertical.length() - 1.0).abs() < 1e-4);
}
