//! Linear transfer matrix for a combined function (dipole plus gradient) magnet
//!
//! Paraxial particles are transported with the thick-lens matrix of the
//! curvilinear equations of motion including momentum dispersion:
//!
//! ```text
//! x'' = h (1 - r) - (r k1 + (2r - 1) h^2) x
//! y'' = r k1 y
//! ```
//!
//! where `h` is the reference curvature and `r = p0 / p` the relative
//! rigidity of the particle. Particles outside the paraxial regime are handed
//! to a classical RK4 over the same field.

use super::dipole::DipoleIntegrator;
use super::rk4::ClassicalRk4;
use super::{Integrator, IntegratorType, StepResult};
use crate::context::{ParaxialCriterion, TrackingContext};
use crate::coords::{join_state, split_state, StepState};
use crate::curvilinear::{CurvilinearCoords, CurvilinearFrame};
use crate::equation::EquationOfMotion;
use crate::field::SectorDipoleQuadrupoleField;
use crate::geometry::{is_finite_strength, BendGeometry};
use crate::strength::{MagnetStrength, StrengthKey};
use tracing::debug;

/// Below this |omega^2 s^2| the focusing functions use their series form
const SERIES_THRESHOLD: f64 = 1e-8;

/// Solutions of u'' = -omega2 u and u'' = -omega2 u + 1 over length `s`
///
/// Returns (C, S, D) with C(0) = 1, S'(0) = 1 and D = (1 - C) / omega2.
fn focusing_functions(omega2: f64, s: f64) -> (f64, f64, f64) {
    let phase2 = omega2 * s * s;
    if phase2.abs() < SERIES_THRESHOLD {
        let c = 1.0 - 0.5 * phase2;
        let sn = s * (1.0 - phase2 / 6.0);
        let d = 0.5 * s * s * (1.0 - phase2 / 12.0);
        return (c, sn, d);
    }
    if omega2 > 0.0 {
        let omega = omega2.sqrt();
        let phase = omega * s;
        let half = (0.5 * phase).sin();
        (phase.cos(), phase.sin() / omega, 2.0 * half * half / omega2)
    } else {
        let omega = (-omega2).sqrt();
        let phase = omega * s;
        let half = (0.5 * phase).sinh();
        (phase.cosh(), phase.sinh() / omega, -2.0 * half * half / omega2)
    }
}

/// Matrix integrator for combined function magnets
#[derive(Debug)]
pub struct DipoleQuadrupoleIntegrator {
    eq: EquationOfMotion,
    dipole: DipoleIntegrator,
    backup: ClassicalRk4,
    frame: CurvilinearFrame,
    brho: f64,
    k1: f64,
    b_field: f64,
    b_prime: f64,
    minimum_radius_of_curvature: f64,
    paraxial: ParaxialCriterion,
}

impl DipoleQuadrupoleIntegrator {
    pub fn new(
        strength: &MagnetStrength,
        geometry: &BendGeometry,
        brho: f64,
        eq: EquationOfMotion,
        context: &TrackingContext,
    ) -> Self {
        let k1 = strength.get(StrengthKey::K1);
        let b_field = geometry.field(brho);
        let b_prime = k1 * brho;
        let curvature = geometry.curvature();
        debug!(
            "dipole quadrupole integrator: h {} 1/m k1 {} 1/m^2 B {} T",
            curvature, k1, b_field
        );
        Self {
            eq,
            dipole: DipoleIntegrator::pure(geometry, brho, eq),
            backup: ClassicalRk4::new(
                eq,
                SectorDipoleQuadrupoleField::new(b_field, b_prime, curvature),
            ),
            frame: CurvilinearFrame::new(curvature),
            brho,
            k1,
            b_field,
            b_prime,
            minimum_radius_of_curvature: context.minimum_radius_of_curvature,
            paraxial: context.paraxial,
        }
    }

    pub fn k1(&self) -> f64 {
        self.k1
    }

    pub fn frame(&self) -> &CurvilinearFrame {
        &self.frame
    }

    /// Local radius of curvature from the dipole field plus the gradient at the particle
    pub fn radius_of_curvature(&self, coords: &CurvilinearCoords) -> f64 {
        let field = self.b_field.abs() + self.b_prime.abs() * coords.transverse_amplitude();
        let bending = self.eq.coupling().abs() * field;
        if bending > 0.0 {
            coords.momentum() / bending
        } else {
            f64::INFINITY
        }
    }

    /// Whether the linear matrix is valid for this particle
    pub fn is_paraxial(&self, coords: &CurvilinearCoords) -> bool {
        self.paraxial.accepts(
            coords.forward_cosine(),
            self.radius_of_curvature(coords),
            self.minimum_radius_of_curvature,
        )
    }

    /// Transport curvilinear coordinates through path length `h` with the linear matrix
    pub fn one_step(&self, coords: &CurvilinearCoords, h: f64) -> CurvilinearCoords {
        let momentum = coords.momentum();
        let curvature = self.frame.curvature();
        let ratio = self.eq.coupling() * self.brho / momentum;
        let (x0, y0) = (coords.x, coords.y);
        let (xp0, yp0) = (coords.xp(), coords.yp());

        let omega_x2 = ratio * self.k1 + (2.0 * ratio - 1.0) * curvature * curvature;
        let omega_y2 = -ratio * self.k1;
        let source = curvature * (1.0 - ratio);
        let transport = |ds: f64| -> (f64, f64, f64, f64) {
            let (cx, sx, dx) = focusing_functions(omega_x2, ds);
            let (cy, sy, _) = focusing_functions(omega_y2, ds);
            (
                x0 * cx + xp0 * sx + source * dx,
                -omega_x2 * sx * x0 + xp0 * cx + source * sx,
                y0 * cy + yp0 * sy,
                -omega_y2 * sy * y0 + yp0 * cy,
            )
        };
        let projected = |x: f64, xp: f64, yp: f64| -> f64 {
            h / ((1.0 + curvature * x) * (1.0 + xp * xp + yp * yp).sqrt())
        };

        // path length h projected onto the reference orbit, using the mean
        // offset and slopes of a first estimate
        let (x1, xp1, _, yp1) = transport(projected(x0, xp0, yp0));
        let ds = projected(0.5 * (x0 + x1), 0.5 * (xp0 + xp1), 0.5 * (yp0 + yp1));
        let (x1, xp1, y1, yp1) = transport(ds);

        CurvilinearCoords::from_slopes(x1, y1, coords.s + ds, xp1, yp1, momentum)
    }
}

impl Integrator for DipoleQuadrupoleIntegrator {
    fn kind(&self) -> IntegratorType {
        IntegratorType::DipoleQuadrupole
    }

    fn right_hand_side(&self, y: &StepState) -> StepState {
        self.backup.right_hand_side(y)
    }

    fn stepper(&self, y_in: &StepState, dydx: &StepState, h: f64) -> StepResult {
        if !is_finite_strength(self.k1) {
            return self.dipole.stepper(y_in, dydx, h);
        }

        let (position, momentum) = split_state(y_in);
        let coords = self.frame.to_curvilinear(position, momentum);
        if !self.is_paraxial(&coords) {
            debug!(
                "non-paraxial particle (cos {:.6}, R {:.4} m), using rk4",
                coords.forward_cosine(),
                self.radius_of_curvature(&coords)
            );
            return self.backup.stepper(y_in, dydx, h);
        }

        let (position, momentum) = self.frame.to_local(&self.one_step(&coords, h));
        StepResult::exact(join_state(position, momentum))
    }
}
