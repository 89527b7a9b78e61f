//! Pole face and fringe field kick followed by dipole transport
//!
//! The thin edge focusing of a rotated pole face is applied to the incoming
//! slopes, then the kicked particle is advanced through the body field with
//! the analytic dipole helix. A step shorter than the thin element length
//! receives the matching fraction of the kick, so a fringe element is meant
//! to be tracked over one thin element length in total. Offsets and slopes
//! are taken in the curvilinear frame of the bend.

use super::dipole::DipoleIntegrator;
use super::drift::advance_drift;
use super::{Integrator, IntegratorType, StepResult};
use crate::context::{ThinElementLength, TrackingContext};
use crate::coords::{join_state, split_state, StepState};
use crate::curvilinear::CurvilinearCoords;
use crate::equation::EquationOfMotion;
use crate::geometry::{is_finite_strength, BendGeometry};
use crate::strength::MagnetStrength;
use std::sync::Arc;
use tracing::{debug, trace};

/// Which face of the magnet the fringe integrator sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoleFace {
    #[default]
    Entrance,
    Exit,
}

#[derive(Debug)]
pub struct DipoleFringeIntegrator {
    eq: EquationOfMotion,
    dipole: DipoleIntegrator,
    /// Pole face rotation angle e (rad)
    pole_face_angle: f64,
    /// Vertical fringe correction psi (rad)
    fringe_correction: f64,
    thin_element_length: Arc<ThinElementLength>,
}

impl DipoleFringeIntegrator {
    pub fn new(
        strength: &MagnetStrength,
        geometry: &BendGeometry,
        face: PoleFace,
        brho: f64,
        eq: EquationOfMotion,
        context: &TrackingContext,
    ) -> Self {
        let (pole_face_angle, fringe_correction) = match face {
            PoleFace::Entrance => (geometry.pole_face_in, geometry.fringe_correction_in()),
            PoleFace::Exit => (geometry.pole_face_out, geometry.fringe_correction_out()),
        };
        debug!(
            "dipole fringe integrator on {:?} face: e {} rad psi {} rad",
            face, pole_face_angle, fringe_correction
        );
        Self {
            eq,
            dipole: DipoleIntegrator::new(strength, geometry, brho, eq),
            pole_face_angle,
            fringe_correction,
            thin_element_length: Arc::clone(&context.thin_element_length),
        }
    }

    pub fn pole_face_angle(&self) -> f64 {
        self.pole_face_angle
    }

    pub fn fringe_correction(&self) -> f64 {
        self.fringe_correction
    }

    /// Fraction of the full thin kick applied over a step of length `h`
    fn kick_fraction(&self, h: f64) -> f64 {
        let thin = self.thin_element_length.get();
        if thin > 0.0 {
            (h / thin).min(1.0)
        } else {
            1.0
        }
    }

    /// Apply the edge kick for a step of length `h`; position and |p| are unchanged
    pub fn one_step(&self, y_in: &StepState, h: f64) -> StepState {
        let (position, momentum) = split_state(y_in);
        let p = momentum.length();
        let frame = self.dipole.frame();
        let coords = frame.to_curvilinear(position, momentum);
        if p == 0.0 || coords.ps <= 0.0 {
            return *y_in;
        }

        let kappa = self.eq.curvature(self.dipole.b_field(), p);
        let fraction = self.kick_fraction(h);
        let xp = coords.xp() + fraction * kappa * self.pole_face_angle.tan() * coords.x;
        let yp = coords.yp()
            - fraction * kappa * (self.pole_face_angle - self.fringe_correction).tan() * coords.y;
        trace!("fringe kick fraction {} slopes ({}, {})", fraction, xp, yp);

        let kicked = CurvilinearCoords::from_slopes(coords.x, coords.y, coords.s, xp, yp, p);
        let (_, momentum) = frame.to_local(&kicked);
        join_state(position, momentum)
    }
}

impl Integrator for DipoleFringeIntegrator {
    fn kind(&self) -> IntegratorType {
        IntegratorType::DipoleFringe
    }

    fn right_hand_side(&self, y: &StepState) -> StepState {
        self.dipole.right_hand_side(y)
    }

    fn stepper(&self, y_in: &StepState, dydx: &StepState, h: f64) -> StepResult {
        if !is_finite_strength(self.dipole.b_field()) {
            return StepResult::exact(advance_drift(y_in, h));
        }
        let kicked = self.one_step(y_in, h);
        self.dipole.stepper(&kicked, dydx, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context(thin: f64) -> TrackingContext {
        TrackingContext::builder()
            .thin_element_length(Arc::new(ThinElementLength::fixed(thin)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_kick_scales_with_short_steps() {
        let eq = EquationOfMotion::new(1.0);
        let geometry = BendGeometry::sector(1.0, 0.1).with_pole_faces(0.2, 0.0);
        let fringe = DipoleFringeIntegrator::new(
            &MagnetStrength::new(),
            &geometry,
            PoleFace::Entrance,
            5.0,
            eq,
            &context(1e-3),
        );
        let y = [0.01, 0.0, 0.0, 0.0, 0.0, 1.0];
        let full = fringe.one_step(&y, 1e-3);
        let half = fringe.one_step(&y, 0.5e-3);
        let full_slope = full[3] / full[5];
        let half_slope = half[3] / half[5];
        assert_relative_eq!(half_slope, 0.5 * full_slope, epsilon = 1e-15);
    }

    #[test]
    fn test_offset_is_measured_from_curved_orbit() {
        let eq = EquationOfMotion::new(1.0);
        let geometry = BendGeometry::sector(1.0, 0.1).with_pole_faces(0.2, 0.0);
        let fringe = DipoleFringeIntegrator::new(
            &MagnetStrength::new(),
            &geometry,
            PoleFace::Entrance,
            5.0,
            eq,
            &context(1e-6),
        );
        let frame = fringe.dipole.frame();
        let p = eq.nominal_momentum(5.0);
        // 1 cm outside the orbit half way through the bend, moving along it
        let on_orbit = CurvilinearCoords::from_slopes(0.01, 0.0, 0.5, 0.0, 0.0, p);
        let (position, momentum) = frame.to_local(&on_orbit);
        let kicked = fringe.one_step(&join_state(position, momentum), 1.0);

        let (_, kicked_momentum) = split_state(&kicked);
        let coords = frame.to_curvilinear(position, kicked_momentum);
        assert_relative_eq!(coords.xp(), 0.1 * 0.2_f64.tan() * 0.01, epsilon = 1e-12);
        assert_relative_eq!(coords.yp(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_pole_face_does_not_kick() {
        let eq = EquationOfMotion::new(1.0);
        let fringe = DipoleFringeIntegrator::new(
            &MagnetStrength::new(),
            &BendGeometry::sector(1.0, 0.1),
            PoleFace::Exit,
            5.0,
            eq,
            &context(1e-6),
        );
        let y = [0.01, -0.02, 0.0, 0.001, 0.002, 1.0];
        let out = fringe.one_step(&y, 1.0);
        for (a, b) in out.iter().zip(y.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }
}
