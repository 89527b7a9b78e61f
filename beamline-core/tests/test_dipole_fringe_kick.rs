//! Tests for the pole face fringe integrator

use beamline_core::context::{ThinElementLength, TrackingContext};
use beamline_core::equation::EquationOfMotion;
use beamline_core::geometry::BendGeometry;
use beamline_core::integrator::dipole_fringe::PoleFace;
use beamline_core::integrator::{DipoleFringeIntegrator, DipoleIntegrator, Integrator};
use beamline_core::strength::MagnetStrength;
use beamline_core::tests::test_helpers::{approx_eq, max_difference, reference_drift};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn momentum(y: &[f64; 6]) -> f64 {
    (y[3] * y[3] + y[4] * y[4] + y[5] * y[5]).sqrt()
}

fn counting_context(calls: Arc<AtomicUsize>, length: f64) -> TrackingContext {
    let thin = ThinElementLength::lazy(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        length
    });
    TrackingContext::builder()
        .thin_element_length(Arc::new(thin))
        .build()
        .unwrap()
}

#[test]
fn test_zero_strength_dipole_is_a_drift() {
    let calls = Arc::new(AtomicUsize::new(0));
    let context = counting_context(calls.clone(), 1e-6);
    let geometry = BendGeometry::straight(1.0).with_pole_faces(0.3, 0.3);
    let fringe = DipoleFringeIntegrator::new(
        &MagnetStrength::new(),
        &geometry,
        PoleFace::Entrance,
        5.0,
        EquationOfMotion::new(1.0),
        &context,
    );

    let y = [0.02, -0.01, 0.0, 0.001, 0.002, 1.0];
    let result = fringe.stepper(&y, &fringe.right_hand_side(&y), 1e-6);
    assert!(max_difference(&result.y_out, &reference_drift(&y, 1e-6)) < 1e-15);
    assert_eq!(result.y_err, [0.0; 6]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_thin_length_resolved_once_on_first_step() {
    let calls = Arc::new(AtomicUsize::new(0));
    let context = counting_context(calls.clone(), 1e-6);
    let geometry = BendGeometry::sector(1.0, 0.1).with_pole_faces(0.1, 0.1);
    let fringe = DipoleFringeIntegrator::new(
        &MagnetStrength::new(),
        &geometry,
        PoleFace::Exit,
        5.0,
        EquationOfMotion::new(1.0),
        &context,
    );
    assert!(!context.thin_element_length.is_resolved());

    let y = [0.01, 0.01, 0.0, 0.0, 0.0, 1.5];
    for _ in 0..3 {
        fringe.stepper(&y, &fringe.right_hand_side(&y), 1e-6);
    }
    assert!(context.thin_element_length.is_resolved());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_edge_kick_matches_thin_matrix() {
    let eq = EquationOfMotion::new(1.0);
    let brho = 5.0;
    let e = 0.2;
    let geometry = BendGeometry::sector(1.0, 0.1)
        .with_pole_faces(e, 0.0)
        .with_fringe(0.5, 0.03);
    let context = TrackingContext::default();
    let fringe =
        DipoleFringeIntegrator::new(&MagnetStrength::new(), &geometry, PoleFace::Entrance, brho, eq, &context);
    let psi = geometry.fringe_correction_in();
    assert!(psi > 0.0);
    assert_eq!(fringe.fringe_correction(), psi);

    let p0 = eq.nominal_momentum(brho);
    let (x, y) = (0.01, -0.02);
    let start = [x, y, 0.0, 0.0, 0.0, p0];
    let kicked = fringe.one_step(&start, 1.0);

    // kappa = 1 / rho = 0.1 for the reference particle
    let kappa = 0.1;
    assert!(approx_eq(kicked[3] / kicked[5], kappa * e.tan() * x, 1e-14));
    assert!(approx_eq(kicked[4] / kicked[5], -kappa * (e - psi).tan() * y, 1e-14));
    assert_eq!(&kicked[..3], &start[..3]);
    assert!(approx_eq(momentum(&kicked), p0, 1e-14));
}

#[test]
fn test_step_is_kick_then_dipole() {
    let eq = EquationOfMotion::new(1.0);
    let geometry = BendGeometry::sector(1.0, 0.1).with_pole_faces(0.15, 0.0);
    let context = TrackingContext::default();
    let fringe =
        DipoleFringeIntegrator::new(&MagnetStrength::new(), &geometry, PoleFace::Entrance, 5.0, eq, &context);
    let dipole = DipoleIntegrator::new(&MagnetStrength::new(), &geometry, 5.0, eq);

    let y = [0.005, 0.002, 0.0, 1e-4, 0.0, 1.4];
    let dydx = fringe.right_hand_side(&y);
    let result = fringe.stepper(&y, &dydx, 2e-6);
    let expected = dipole.stepper(&fringe.one_step(&y, 2e-6), &dydx, 2e-6);
    assert_eq!(result, expected);
    assert!(approx_eq(momentum(&result.y_out), momentum(&y), 1e-14));
}

#[test]
fn test_exit_face_uses_exit_angle() {
    let eq = EquationOfMotion::new(1.0);
    let geometry = BendGeometry::sector(1.0, 0.1).with_pole_faces(0.1, -0.25);
    let context = TrackingContext::default();
    let entrance =
        DipoleFringeIntegrator::new(&MagnetStrength::new(), &geometry, PoleFace::Entrance, 5.0, eq, &context);
    let exit = DipoleFringeIntegrator::new(&MagnetStrength::new(), &geometry, PoleFace::Exit, 5.0, eq, &context);
    assert_eq!(entrance.pole_face_angle(), 0.1);
    assert_eq!(exit.pole_face_angle(), -0.25);
}
