//! Construction of integrators from an element description

use crate::context::{ConfigError, TrackingContext};
use crate::equation::EquationOfMotion;
use crate::field::{build_field, FieldType};
use crate::geometry::BendGeometry;
use crate::integrator::dipole_fringe::PoleFace;
use crate::integrator::{
    ClassicalRk4, DipoleFringeIntegrator, DipoleIntegrator, DipoleQuadrupoleIntegrator,
    DriftIntegrator, Integrator, IntegratorType,
};
use crate::integrator_set::IntegratorSet;
use crate::strength::MagnetStrength;
use tracing::debug;

/// Everything needed to build the integrator of one element
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub field_type: FieldType,
    /// Design rigidity (T.m), signed by the design particle charge
    pub brho: f64,
    pub strength: MagnetStrength,
    pub geometry: BendGeometry,
    pub pole_face: PoleFace,
}

impl FieldInfo {
    pub fn new(
        field_type: FieldType,
        brho: f64,
        strength: MagnetStrength,
        geometry: BendGeometry,
    ) -> Self {
        Self {
            field_type,
            brho,
            strength,
            geometry,
            pole_face: PoleFace::default(),
        }
    }

    pub fn with_pole_face(mut self, pole_face: PoleFace) -> Self {
        self.pole_face = pole_face;
        self
    }

    /// Path length the element is tracked over
    ///
    /// A fringe element is one thin element long and carries the field of its
    /// parent bend, which `geometry` describes.
    pub fn tracked_length(&self, context: &TrackingContext) -> f64 {
        match self.field_type {
            FieldType::DipoleFringe => context.thin_element_length.get(),
            _ => self.geometry.arc_length,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.brho.is_finite() || self.brho == 0.0 {
            return Err(ConfigError::InvalidRigidity(self.brho));
        }
        self.geometry.validate()
    }
}

/// Build the integrator `set` selects for the element described by `info`
pub fn build_integrator(
    info: &FieldInfo,
    set: &IntegratorSet,
    eq: EquationOfMotion,
    context: &TrackingContext,
) -> Result<Box<dyn Integrator>, ConfigError> {
    info.validate()?;
    let kind = set.integrator_for(info.field_type);
    debug!(
        "{} field with {} set uses {} integrator",
        info.field_type,
        set.name(),
        kind
    );

    let integrator: Box<dyn Integrator> = match kind {
        IntegratorType::Drift => Box::new(DriftIntegrator::new()),
        IntegratorType::Dipole => Box::new(DipoleIntegrator::new(
            &info.strength,
            &info.geometry,
            info.brho,
            eq,
        )),
        IntegratorType::DipoleQuadrupole => Box::new(DipoleQuadrupoleIntegrator::new(
            &info.strength,
            &info.geometry,
            info.brho,
            eq,
            context,
        )),
        IntegratorType::DipoleFringe => Box::new(DipoleFringeIntegrator::new(
            &info.strength,
            &info.geometry,
            info.pole_face,
            info.brho,
            eq,
            context,
        )),
        IntegratorType::ClassicalRk4 => Box::new(ClassicalRk4::from_boxed(
            eq,
            build_field(info.field_type, &info.strength, &info.geometry, info.brho)?,
        )),
    };
    Ok(integrator)
}
