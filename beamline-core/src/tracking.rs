//! Fixed-step tracking through a single element

use crate::context::{ConfigError, TrackingContext};
use crate::coords::{ParticleCoordsFull, ParticleDefinition, StepState};
use crate::equation::{EquationOfMotion, C_LIGHT};
use crate::factory::{build_integrator, FieldInfo};
use crate::integrator::Integrator;
use crate::integrator_set::IntegratorSet;
use tracing::{debug, trace};

/// State after one step of the tracking loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub state: StepState,
    /// Accumulated path length (m)
    pub s: f64,
    /// Largest component of the step's error estimate
    pub max_error: f64,
}

/// Advance `initial` through path length `length` in `steps` equal steps
pub fn track(
    integrator: &dyn Integrator,
    initial: StepState,
    length: f64,
    steps: usize,
) -> Vec<StepRecord> {
    let mut records = Vec::with_capacity(steps);
    if steps == 0 {
        return records;
    }
    let h = length / steps as f64;
    let mut state = initial;
    let mut s = 0.0;

    for step in 0..steps {
        let dydx = integrator.right_hand_side(&state);
        let result = integrator.stepper(&state, &dydx, h);
        state = result.y_out;
        s += h;
        let max_error = result.max_error();
        trace!("step {} s {} state {:?} error {:e}", step, s, state, max_error);
        records.push(StepRecord {
            state,
            s,
            max_error,
        });
    }
    records
}

/// Track one particle through the element described by `info`
///
/// Returns the particle coordinates after each step; the time coordinate is
/// advanced by path length over velocity. The element is tracked over
/// `FieldInfo::tracked_length`.
pub fn track_particle(
    info: &FieldInfo,
    set: &IntegratorSet,
    particle: &ParticleDefinition,
    start: &ParticleCoordsFull,
    steps: usize,
    context: &TrackingContext,
) -> Result<Vec<ParticleCoordsFull>, ConfigError> {
    let eq = EquationOfMotion::new(particle.charge);
    let integrator = build_integrator(info, set, eq, context)?;
    let initial = start.to_state(particle);
    let length = info.tracked_length(context);
    debug!(
        "tracking {} through {} m of {} field with {} integrator",
        particle.name,
        length,
        info.field_type,
        integrator.kind()
    );

    // magnetic transport keeps |p| and therefore the velocity
    let beta = particle.momentum(start.total_energy) / start.total_energy;
    let speed = beta * C_LIGHT;

    let coords = track(integrator.as_ref(), initial, length, steps)
        .into_iter()
        .map(|record| {
            let t = if speed > 0.0 {
                start.local.t + record.s / speed
            } else {
                start.local.t
            };
            ParticleCoordsFull::from_state(
                &record.state,
                start.s + record.s,
                t,
                particle,
                start.weight,
            )
        })
        .collect();
    Ok(coords)
}
