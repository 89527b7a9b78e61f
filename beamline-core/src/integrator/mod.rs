//! Stepping strategies
//!
//! Every integrator advances a step state by a path length `h` and reports a
//! local error estimate for the external adaptive controller. Integrators are
//! immutable after construction and are shared read-only between threads.

pub mod dipole;
pub mod dipole_fringe;
pub mod dipole_quadrupole;
pub mod drift;
pub mod rk4;

pub use dipole::DipoleIntegrator;
pub use dipole_fringe::DipoleFringeIntegrator;
pub use dipole_quadrupole::DipoleQuadrupoleIntegrator;
pub use drift::DriftIntegrator;
pub use rk4::ClassicalRk4;

use crate::context::ConfigError;
use crate::coords::StepState;
use std::fmt;
use std::str::FromStr;

/// Outgoing state and local error estimate of one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub y_out: StepState,
    pub y_err: StepState,
}

impl StepResult {
    /// A step whose result is exact within the integrator's model
    pub fn exact(y_out: StepState) -> Self {
        Self {
            y_out,
            y_err: [0.0; 6],
        }
    }

    /// Largest absolute component of the error estimate
    pub fn max_error(&self) -> f64 {
        self.y_err.iter().fold(0.0, |acc: f64, e| acc.max(e.abs()))
    }
}

/// A stepping strategy for the generic stepping loop
pub trait Integrator: Send + Sync + fmt::Debug {
    fn kind(&self) -> IntegratorType;

    /// dy/ds at `y`
    fn right_hand_side(&self, y: &StepState) -> StepState;

    /// Advance `y_in` by path length `h`; `dydx` is the derivative at `y_in`
    fn stepper(&self, y_in: &StepState, dydx: &StepState, h: f64) -> StepResult;
}

/// Algorithm identifiers selectable through an integrator set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegratorType {
    Drift,
    Dipole,
    DipoleQuadrupole,
    DipoleFringe,
    ClassicalRk4,
}

impl IntegratorType {
    pub const ALL: [IntegratorType; 5] = [
        IntegratorType::Drift,
        IntegratorType::Dipole,
        IntegratorType::DipoleQuadrupole,
        IntegratorType::DipoleFringe,
        IntegratorType::ClassicalRk4,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntegratorType::Drift => "drift",
            IntegratorType::Dipole => "dipole",
            IntegratorType::DipoleQuadrupole => "dipolequadrupole",
            IntegratorType::DipoleFringe => "dipolefringe",
            IntegratorType::ClassicalRk4 => "classicalrk4",
        }
    }
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        IntegratorType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| ConfigError::UnknownIntegratorType(s.to_string()))
    }
}

/// Componentwise difference a - b
pub(crate) fn difference(a: &StepState, b: &StepState) -> StepState {
    std::array::from_fn(|i| a[i] - b[i])
}
