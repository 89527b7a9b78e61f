//! Analytic helix transport through a uniform bending field
//!
//! The dipole part of the motion is an exact helix, so the integrator does
//! not accumulate the chord error of a polynomial stepper on curved paths. A
//! quadrupole gradient, when present, is applied as a momentum rotation in
//! the frozen gradient field between two half helices. The gradient acts on
//! the offsets from the curved reference orbit, not on the Cartesian position.

use super::drift::advance_drift;
use super::{difference, Integrator, IntegratorType, StepResult};
use crate::coords::{join_state, split_state, StepState};
use crate::curvilinear::CurvilinearFrame;
use crate::equation::EquationOfMotion;
use crate::geometry::{is_finite_strength, BendGeometry};
use crate::strength::{MagnetStrength, StrengthKey};
use glam::DVec3;
use tracing::debug;

/// Rotate a unit direction about the unit field axis by `theta` (right-handed about -b_hat)
///
/// Returns the rotated direction and the transverse part rotated by half the angle.
fn rotate_about_field(direction: DVec3, b_hat: DVec3, theta: f64) -> (DVec3, DVec3) {
    let parallel = direction.dot(b_hat) * b_hat;
    let transverse = direction - parallel;
    let binormal = transverse.cross(b_hat);
    let (sin, cos) = theta.sin_cos();
    let (sin_half, cos_half) = (0.5 * theta).sin_cos();
    (
        parallel + transverse * cos + binormal * sin,
        transverse * cos_half + binormal * sin_half,
    )
}

/// Exact step of length `h` along a helix in the uniform field `b`
///
/// The transverse displacement is the chord 2 R sin(theta/2) taken along the
/// transverse direction rotated by theta/2; the field-parallel part drifts.
pub fn advance_helix(eq: &EquationOfMotion, y_in: &StepState, b: DVec3, h: f64) -> StepState {
    let (position, momentum) = split_state(y_in);
    let field = b.length();
    let p = momentum.length();
    if !is_finite_strength(field) || p == 0.0 {
        return advance_drift(y_in, h);
    }

    let b_hat = b / field;
    let direction = momentum / p;
    let kappa = eq.curvature(field, p);
    let theta = kappa * h;
    let (new_direction, mid_transverse) = rotate_about_field(direction, b_hat, theta);

    let chord = if is_finite_strength(kappa) {
        2.0 * (0.5 * theta).sin() / kappa
    } else {
        h
    };
    let parallel = direction.dot(b_hat) * b_hat;
    let new_position = position + parallel * h + chord * mid_transverse;

    join_state(new_position, p * new_direction)
}

/// Rotate `momentum` in the field `b` over path length `h` with the position held fixed
pub fn rotate_momentum(eq: &EquationOfMotion, momentum: DVec3, b: DVec3, h: f64) -> DVec3 {
    let field = b.length();
    let p = momentum.length();
    if !is_finite_strength(field) || p == 0.0 {
        return momentum;
    }
    let theta = eq.curvature(field, p) * h;
    let (new_direction, _) = rotate_about_field(momentum / p, b / field, theta);
    p * new_direction
}

/// Dipole integrator with optional quadrupole gradient
#[derive(Debug, Clone)]
pub struct DipoleIntegrator {
    eq: EquationOfMotion,
    /// Uniform vertical field (T)
    b_field: f64,
    /// Quadrupole gradient B' (T/m)
    b_prime: f64,
    angle: f64,
    length: f64,
    frame: CurvilinearFrame,
}

impl DipoleIntegrator {
    pub fn new(
        strength: &MagnetStrength,
        geometry: &BendGeometry,
        brho: f64,
        eq: EquationOfMotion,
    ) -> Self {
        let integrator = Self {
            eq,
            b_field: geometry.field(brho),
            b_prime: strength.get(StrengthKey::K1) * brho,
            angle: geometry.angle,
            length: geometry.arc_length,
            frame: CurvilinearFrame::new(geometry.curvature()),
        };
        debug!(
            "dipole integrator: angle {} length {} B {} T B' {} T/m",
            integrator.angle, integrator.length, integrator.b_field, integrator.b_prime
        );
        integrator
    }

    /// A dipole without gradient
    pub fn pure(geometry: &BendGeometry, brho: f64, eq: EquationOfMotion) -> Self {
        Self::new(&MagnetStrength::new(), geometry, brho, eq)
    }

    pub fn b_field(&self) -> f64 {
        self.b_field
    }

    pub fn b_prime(&self) -> f64 {
        self.b_prime
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Frame of the reference orbit the gradient is measured against
    pub fn frame(&self) -> &CurvilinearFrame {
        &self.frame
    }

    pub fn is_zero_strength(&self) -> bool {
        !is_finite_strength(self.b_field) && !is_finite_strength(self.b_prime)
    }

    fn dipole_field(&self) -> DVec3 {
        DVec3::new(0.0, self.b_field, 0.0)
    }

    /// Quadrupole field of the offsets (x, y) from the orbit; the horizontal
    /// component lies along the orbit normal
    fn gradient_field(&self, position: DVec3) -> DVec3 {
        if !is_finite_strength(self.b_prime) {
            return DVec3::ZERO;
        }
        let (x, y, s) = self.frame.position(position);
        DVec3::new(0.0, self.b_prime * x, 0.0) + self.b_prime * y * self.frame.normal(s)
    }

    /// One analytic step without error estimate
    pub fn advance(&self, y_in: &StepState, h: f64) -> StepState {
        if !is_finite_strength(self.b_prime) {
            return advance_helix(&self.eq, y_in, self.dipole_field(), h);
        }
        let half = 0.5 * h;
        let first = advance_helix(&self.eq, y_in, self.dipole_field(), half);
        let (position, momentum) = split_state(&first);
        let kicked = rotate_momentum(&self.eq, momentum, self.gradient_field(position), h);
        advance_helix(
            &self.eq,
            &join_state(position, kicked),
            self.dipole_field(),
            half,
        )
    }
}

impl Integrator for DipoleIntegrator {
    fn kind(&self) -> IntegratorType {
        IntegratorType::Dipole
    }

    fn right_hand_side(&self, y: &StepState) -> StepState {
        let (position, momentum) = split_state(y);
        let b = self.dipole_field() + self.gradient_field(position);
        join_state(momentum.normalize_or_zero(), self.eq.force(momentum, b))
    }

    fn stepper(&self, y_in: &StepState, _dydx: &StepState, h: f64) -> StepResult {
        if self.is_zero_strength() {
            return StepResult::exact(advance_drift(y_in, h));
        }
        let half = 0.5 * h;
        let y_full = self.advance(y_in, h);
        let y_mid = self.advance(y_in, half);
        let y_out = self.advance(&y_mid, half);
        StepResult {
            y_out,
            y_err: difference(&y_out, &y_full),
        }
    }
}
