pub mod context;
pub mod coords;
pub mod curvilinear;
pub mod equation;
pub mod factory;
pub mod field;
pub mod geometry;
pub mod integrator;
pub mod integrator_set;
pub mod skew;
pub mod strength;
pub mod tracking;

pub use context::{
    ConfigError, ParaxialCriterion, ThinElementLength, ThresholdComparison, TrackingContext,
};
pub use coords::{ParticleCoords, ParticleCoordsFull, ParticleDefinition, StepState};
pub use curvilinear::{CurvilinearCoords, CurvilinearFrame};
pub use equation::EquationOfMotion;
pub use factory::{build_integrator, FieldInfo};
pub use field::{build_field, FieldMag, FieldType};
pub use geometry::BendGeometry;
pub use integrator::dipole_fringe::PoleFace;
pub use integrator::{
    ClassicalRk4, DipoleFringeIntegrator, DipoleIntegrator, DipoleQuadrupoleIntegrator,
    DriftIntegrator, Integrator, IntegratorType, StepResult,
};
pub use integrator_set::{integrator_set, IntegratorSet, IntegratorSetType};
pub use skew::SkewField;
pub use strength::{MagnetStrength, StrengthError, StrengthKey};
pub use tracking::{track, track_particle, StepRecord};
