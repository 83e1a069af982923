use super::*;

const MOTION: CameraMotion = CameraMotion {
    drift_per_sec: 60.0,
    velocity_gain: 1.0,
    velocity_decay: 0.92,
};

#[test]
fn drift_advances_with_time() {
    let mut cam = CameraState::default();
    let step = cam.integrate(0.5, MOTION, 2080.0);
    assert_eq!(step, 30.0);
    assert_eq!(cam.virtual_z, 30.0);
}

#[test]
fn velocity_decays_geometrically() {
    let mut cam = CameraState::default();
    cam.push_delta(100.0, 0.5);
    assert_eq!(cam.velocity, 50.0);

    cam.integrate(0.0, MOTION, 2080.0);
    assert_eq!(cam.virtual_z, 50.0);
    assert!((cam.velocity - 46.0).abs() < 1e-9);

    cam.integrate(0.0, MOTION, 2080.0);
    assert!((cam.virtual_z - 96.0).abs() < 1e-9);
    assert!((cam.velocity - 46.0 * 0.92).abs() < 1e-9);
}

#[test]
fn camera_wraps_both_directions() {
    let mut cam = CameraState {
        virtual_z: 2070.0,
        velocity: 0.0,
    };
    cam.integrate(0.5, MOTION, 2080.0);
    assert!((cam.virtual_z - 20.0).abs() < 1e-9);

    cam.push_delta(-100.0, 1.0);
    cam.integrate(0.0, MOTION, 2080.0);
    assert!((cam.virtual_z - 2000.0).abs() < 1e-9);
}

#[test]
fn velocity_settles_to_zero() {
    let mut cam = CameraState::default();
    cam.push_delta(10.0, 1.0);
    for _ in 0..400 {
        cam.integrate(0.0, MOTION, 2080.0);
    }
    assert_eq!(cam.velocity, 0.0);
}

#[test]
fn non_finite_inputs_are_ignored() {
    let mut cam = CameraState::default();
    cam.push_delta(f64::NAN, 1.0);
    assert_eq!(cam.velocity, 0.0);
    cam.integrate(f64::INFINITY, MOTION, 2080.0);
    assert_eq!(cam.virtual_z, 0.0);
}
