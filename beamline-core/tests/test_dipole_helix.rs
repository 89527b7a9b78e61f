//! Tests for the analytic dipole integrator

use beamline_core::equation::EquationOfMotion;
use beamline_core::field::SectorDipoleQuadrupoleField;
use beamline_core::geometry::BendGeometry;
use beamline_core::integrator::{DipoleIntegrator, Integrator};
use beamline_core::strength::{MagnetStrength, StrengthKey};
use beamline_core::tests::test_helpers::{
    approx_eq, approx_eq_state, max_difference, reference_drift, reference_rk4,
};

fn momentum(y: &[f64; 6]) -> f64 {
    (y[3] * y[3] + y[4] * y[4] + y[5] * y[5]).sqrt()
}

fn with_k1(k1: f64) -> MagnetStrength {
    let mut strength = MagnetStrength::new();
    strength.set(StrengthKey::K1, k1);
    strength
}

#[test]
fn test_reference_particle_follows_the_arc() {
    // angle 0.1 over 1 m at 5 T.m is a 0.5 T field and a 10 m radius
    let eq = EquationOfMotion::new(1.0);
    let geometry = BendGeometry::sector(1.0, 0.1);
    let dipole = DipoleIntegrator::new(&MagnetStrength::new(), &geometry, 5.0, eq);
    assert!(approx_eq(dipole.b_field(), 0.5, 1e-15));

    let p0 = eq.nominal_momentum(5.0);
    let y = [0.0, 0.0, 0.0, 0.0, 0.0, p0];
    let result = dipole.stepper(&y, &dipole.right_hand_side(&y), 1.0);
    let out = result.y_out;

    let (sin, cos) = 0.1_f64.sin_cos();
    assert!(approx_eq(out[0], -10.0 * (1.0 - cos), 1e-12));
    assert!(approx_eq(out[1], 0.0, 1e-15));
    assert!(approx_eq(out[2], 10.0 * sin, 1e-12));
    assert!(approx_eq(out[3], -p0 * sin, 1e-12));
    assert!(approx_eq(out[5], p0 * cos, 1e-12));

    let chord = (out[0] * out[0] + out[2] * out[2]).sqrt();
    assert!(approx_eq(chord, geometry.chord_length(), 1e-12));
    assert!(result.max_error() < 1e-12);
}

#[test]
fn test_zero_field_is_a_drift() {
    let eq = EquationOfMotion::new(1.0);
    let dipole = DipoleIntegrator::new(&MagnetStrength::new(), &BendGeometry::straight(1.0), 5.0, eq);
    assert!(dipole.is_zero_strength());

    let y = [1e-3, -2e-3, 0.0, 0.01, 0.02, 1.0];
    let result = dipole.stepper(&y, &dipole.right_hand_side(&y), 0.75);
    assert!(max_difference(&result.y_out, &reference_drift(&y, 0.75)) < 1e-15);
    assert_eq!(result.y_err, [0.0; 6]);
}

#[test]
fn test_momentum_magnitude_is_preserved() {
    let eq = EquationOfMotion::new(-1.0);
    let dipole = DipoleIntegrator::new(&with_k1(0.8), &BendGeometry::sector(2.0, -0.3), 4.0, eq);

    let mut y = [0.01, -0.004, 0.0, 0.02, -0.01, 1.2];
    let p_in = momentum(&y);
    for _ in 0..20 {
        y = dipole.stepper(&y, &dipole.right_hand_side(&y), 0.1).y_out;
    }
    assert!(approx_eq(momentum(&y), p_in, 1e-12 * p_in));
}

#[test]
fn test_error_estimate_shrinks_as_step_cubed() {
    let eq = EquationOfMotion::new(1.0);
    let dipole = DipoleIntegrator::new(&with_k1(1.0), &BendGeometry::sector(1.0, 0.05), 5.0, eq);
    let p0 = eq.nominal_momentum(5.0);
    let y = [0.01, -0.005, 0.0, 3e-4 * p0, -2e-4 * p0, p0];
    let dydx = dipole.right_hand_side(&y);

    let coarse = dipole.stepper(&y, &dydx, 0.1).max_error();
    let fine = dipole.stepper(&y, &dydx, 0.05).max_error();
    let ratio = coarse / fine;
    assert!(ratio > 6.0 && ratio < 10.5, "error ratio {}", ratio);
}

#[test]
fn test_gradient_focuses_horizontally() {
    let eq = EquationOfMotion::new(1.0);
    let dipole = DipoleIntegrator::new(&with_k1(2.0), &BendGeometry::straight(1.0), 5.0, eq);
    let p0 = eq.nominal_momentum(5.0);
    let y = [0.01, 0.01, 0.0, 0.0, 0.0, p0];
    let out = dipole.stepper(&y, &dipole.right_hand_side(&y), 0.1).y_out;
    // k1 > 0 pulls x back to the axis and pushes y away
    assert!(out[3] < 0.0);
    assert!(out[4] > 0.0);
}

#[test]
fn test_reference_particle_stays_on_orbit_with_gradient() {
    let eq = EquationOfMotion::new(1.0);
    let geometry = BendGeometry::sector(1.0, 0.1);
    let dipole = DipoleIntegrator::new(&with_k1(0.5), &geometry, 5.0, eq);

    let p0 = eq.nominal_momentum(5.0);
    let mut y = [0.0, 0.0, 0.0, 0.0, 0.0, p0];
    for _ in 0..100 {
        y = dipole.stepper(&y, &dipole.right_hand_side(&y), 0.01).y_out;
    }

    let (sin, cos) = 0.1_f64.sin_cos();
    assert!(approx_eq(y[0], -10.0 * (1.0 - cos), 1e-10));
    assert!(approx_eq(y[2], 10.0 * sin, 1e-10));
    assert!(approx_eq(y[3], -p0 * sin, 1e-10));
    assert!(approx_eq(y[5], p0 * cos, 1e-10));
}

#[test]
fn test_gradient_in_bend_agrees_with_rk4() {
    let eq = EquationOfMotion::new(1.0);
    let brho = 5.0;
    let k1 = 0.5;
    let geometry = BendGeometry::sector(1.0, 0.1);
    let dipole = DipoleIntegrator::new(&with_k1(k1), &geometry, brho, eq);

    let p0 = eq.nominal_momentum(brho);
    let start = [1e-3, 5e-4, 0.0, 1e-4 * p0, -2e-4 * p0, p0];
    let mut y = start;
    for _ in 0..100 {
        y = dipole.stepper(&y, &dipole.right_hand_side(&y), 0.01).y_out;
    }

    let field = SectorDipoleQuadrupoleField::new(geometry.field(brho), k1 * brho, geometry.curvature());
    let expected = reference_rk4(eq.coupling(), &field, &start, 1.0, 2000);
    assert!(approx_eq_state(&y, &expected, 1e-6, 1e-6));
}
