//! Lorentz-force equation of motion in a static magnetic field

use crate::coords::{join_state, split_state, StepState};
use crate::field::FieldMag;
use glam::DVec3;

/// Speed of light in the unit system GeV/c, tesla and metre
pub const C_LIGHT: f64 = 0.299_792_458;

/// Right-hand side of dy/ds for a particle of fixed charge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquationOfMotion {
    charge: f64,
}

impl EquationOfMotion {
    pub fn new(charge: f64) -> Self {
        Self { charge }
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Coupling c_q in dp/ds = c_q (p_hat x B)
    pub fn coupling(&self) -> f64 {
        C_LIGHT * self.charge
    }

    /// Rigidity (T.m) of a particle of this charge with momentum magnitude `momentum`
    pub fn rigidity(&self, momentum: f64) -> f64 {
        momentum / self.coupling().abs()
    }

    /// Momentum magnitude (GeV/c) of a particle of this charge with rigidity `brho`
    pub fn nominal_momentum(&self, brho: f64) -> f64 {
        (brho * self.coupling()).abs()
    }

    /// Signed curvature (1/m) of a particle with momentum `momentum` in field magnitude `b`
    pub fn curvature(&self, b: f64, momentum: f64) -> f64 {
        self.coupling() * b / momentum
    }

    /// Rate of change of momentum along the path for momentum `momentum` in field `b`
    pub fn force(&self, momentum: DVec3, b: DVec3) -> DVec3 {
        let direction = momentum.normalize_or_zero();
        self.coupling() * direction.cross(b)
    }

    /// dy/ds at `y` in `field`
    pub fn derivatives(&self, field: &dyn FieldMag, y: &StepState) -> StepState {
        let (position, momentum) = split_state(y);
        let direction = momentum.normalize_or_zero();
        let b = field.field(position);
        join_state(direction, self.coupling() * direction.cross(b))
    }
}
