//! Classical fourth-order Runge-Kutta over an arbitrary field

use super::{difference, Integrator, IntegratorType, StepResult};
use crate::coords::StepState;
use crate::equation::EquationOfMotion;
use crate::field::FieldMag;

/// Generic numerical integrator with a step-doubling error estimate
///
/// The output is the result of two half steps; the error is its difference
/// from a single full step.
#[derive(Debug)]
pub struct ClassicalRk4 {
    eq: EquationOfMotion,
    field: Box<dyn FieldMag>,
}

impl ClassicalRk4 {
    pub fn new(eq: EquationOfMotion, field: impl FieldMag + 'static) -> Self {
        Self::from_boxed(eq, Box::new(field))
    }

    pub fn from_boxed(eq: EquationOfMotion, field: Box<dyn FieldMag>) -> Self {
        Self { eq, field }
    }

    pub fn field(&self) -> &dyn FieldMag {
        self.field.as_ref()
    }

    /// One RK4 step of length `h` without error estimate
    pub fn single_step(&self, y: &StepState, dydx: &StepState, h: f64) -> StepState {
        let offset = |k: &StepState, scale: f64| -> StepState {
            std::array::from_fn(|i| y[i] + scale * k[i])
        };

        let k1 = *dydx;
        let k2 = self.right_hand_side(&offset(&k1, 0.5 * h));
        let k3 = self.right_hand_side(&offset(&k2, 0.5 * h));
        let k4 = self.right_hand_side(&offset(&k3, h));

        std::array::from_fn(|i| y[i] + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
    }
}

impl Integrator for ClassicalRk4 {
    fn kind(&self) -> IntegratorType {
        IntegratorType::ClassicalRk4
    }

    fn right_hand_side(&self, y: &StepState) -> StepState {
        self.eq.derivatives(self.field.as_ref(), y)
    }

    fn stepper(&self, y_in: &StepState, dydx: &StepState, h: f64) -> StepResult {
        let half = 0.5 * h;
        let y_full = self.single_step(y_in, dydx, h);
        let y_mid = self.single_step(y_in, dydx, half);
        let dydx_mid = self.right_hand_side(&y_mid);
        let y_out = self.single_step(&y_mid, &dydx_mid, half);
        StepResult {
            y_out,
            y_err: difference(&y_out, &y_full),
        }
    }
}
