//! Straight-line transport

use super::{Integrator, IntegratorType, StepResult};
use crate::coords::{join_state, split_state, StepState};

/// Advance position along the unit momentum; momentum unchanged
pub fn advance_drift(y_in: &StepState, h: f64) -> StepState {
    let (position, momentum) = split_state(y_in);
    let direction = momentum.normalize_or_zero();
    join_state(position + h * direction, momentum)
}

/// Field-free integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftIntegrator;

impl DriftIntegrator {
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for DriftIntegrator {
    fn kind(&self) -> IntegratorType {
        IntegratorType::Drift
    }

    fn right_hand_side(&self, y: &StepState) -> StepState {
        let (_, momentum) = split_state(y);
        let direction = momentum.normalize_or_zero();
        [direction.x, direction.y, direction.z, 0.0, 0.0, 0.0]
    }

    fn stepper(&self, y_in: &StepState, _dydx: &StepState, h: f64) -> StepResult {
        StepResult::exact(advance_drift(y_in, h))
    }
}
