//! Pure magnetic field evaluators in element-local coordinates

use crate::context::ConfigError;
use crate::curvilinear::CurvilinearFrame;
use crate::geometry::BendGeometry;
use crate::skew::SkewField;
use crate::strength::{MagnetStrength, StrengthKey};
use glam::DVec3;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// A static magnetic field queried in the element-local frame
pub trait FieldMag: Send + Sync + fmt::Debug {
    /// Field (T) at `position` (m)
    fn field(&self, position: DVec3) -> DVec3;
}

impl<F: FieldMag + ?Sized> FieldMag for Box<F> {
    fn field(&self, position: DVec3) -> DVec3 {
        (**self).field(position)
    }
}

/// Field that is the same everywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformField {
    b: DVec3,
}

impl UniformField {
    pub fn new(b: DVec3) -> Self {
        Self { b }
    }

    pub fn zero() -> Self {
        Self::new(DVec3::ZERO)
    }

    /// Vertical dipole field of magnitude `b_y`
    pub fn dipole(b_y: f64) -> Self {
        Self::new(DVec3::new(0.0, b_y, 0.0))
    }
}

impl FieldMag for UniformField {
    fn field(&self, _position: DVec3) -> DVec3 {
        self.b
    }
}

/// Normal quadrupole: B = g (y, x, 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrupoleField {
    gradient: f64,
}

impl QuadrupoleField {
    pub fn new(gradient: f64) -> Self {
        Self { gradient }
    }
}

impl FieldMag for QuadrupoleField {
    fn field(&self, position: DVec3) -> DVec3 {
        DVec3::new(self.gradient * position.y, self.gradient * position.x, 0.0)
    }
}

/// Highest multipole order carried by `MultipoleField`
pub const MAX_MULTIPOLE_ORDER: usize = 12;

/// Sum of normal and skew multipoles of orders 1..=12
///
/// B_y + i B_x = sum_n (b_n + i a_n) / n! (x + i y)^n
#[derive(Debug, Clone, PartialEq)]
pub struct MultipoleField {
    normal: [f64; MAX_MULTIPOLE_ORDER],
    skew: [f64; MAX_MULTIPOLE_ORDER],
}

impl MultipoleField {
    /// All normal and skew strengths of `strength`, scaled by `brho`
    pub fn from_strength(strength: &MagnetStrength, brho: f64) -> Self {
        let mut field = Self {
            normal: [0.0; MAX_MULTIPOLE_ORDER],
            skew: [0.0; MAX_MULTIPOLE_ORDER],
        };
        for order in 1..=MAX_MULTIPOLE_ORDER {
            if let Some(key) = StrengthKey::normal(order) {
                field.normal[order - 1] = strength.get(key) * brho;
            }
            if let Some(key) = StrengthKey::skew(order) {
                field.skew[order - 1] = strength.get(key) * brho;
            }
        }
        field
    }

    /// A single normal multipole of `order` with coefficient `coefficient` (T/m^order)
    pub fn single(order: usize, coefficient: f64) -> Self {
        let mut field = Self {
            normal: [0.0; MAX_MULTIPOLE_ORDER],
            skew: [0.0; MAX_MULTIPOLE_ORDER],
        };
        if (1..=MAX_MULTIPOLE_ORDER).contains(&order) {
            field.normal[order - 1] = coefficient;
        }
        field
    }
}

impl FieldMag for MultipoleField {
    fn field(&self, position: DVec3) -> DVec3 {
        let (x, y) = (position.x, position.y);
        // running (x + iy)^n / n!
        let (mut re, mut im) = (1.0, 0.0);
        let (mut b_y, mut b_x) = (0.0, 0.0);
        for order in 1..=MAX_MULTIPOLE_ORDER {
            let n = order as f64;
            let next_re = (re * x - im * y) / n;
            let next_im = (re * y + im * x) / n;
            re = next_re;
            im = next_im;
            let (b, a) = (self.normal[order - 1], self.skew[order - 1]);
            b_y += b * re - a * im;
            b_x += b * im + a * re;
        }
        DVec3::new(b_x, b_y, 0.0)
    }
}

/// Dipole plus quadrupole gradient following a circular reference orbit
///
/// The gradient is taken against the curvilinear offsets, so on the orbit the
/// field is the pure dipole whatever the local Cartesian position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorDipoleQuadrupoleField {
    b0: f64,
    gradient: f64,
    frame: CurvilinearFrame,
}

impl SectorDipoleQuadrupoleField {
    pub fn new(b0: f64, gradient: f64, curvature: f64) -> Self {
        Self {
            b0,
            gradient,
            frame: CurvilinearFrame::new(curvature),
        }
    }
}

impl FieldMag for SectorDipoleQuadrupoleField {
    fn field(&self, position: DVec3) -> DVec3 {
        let (x, y, s) = self.frame.position(position);
        let vertical = DVec3::new(0.0, self.b0 + self.gradient * x, 0.0);
        vertical + self.gradient * y * self.frame.normal(s)
    }
}

/// The category of field attached to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    None,
    Solenoid,
    Dipole,
    DipoleQuadrupole,
    DipoleFringe,
    Quadrupole,
    Sextupole,
    Octupole,
    Decapole,
    Multipole,
    MuonSpoiler,
    RfCavity,
    Rf,
    General,
    SkewQuadrupole,
    SkewSextupole,
    SkewOctupole,
    SkewDecapole,
}

impl FieldType {
    pub const ALL: [FieldType; 18] = [
        FieldType::None,
        FieldType::Solenoid,
        FieldType::Dipole,
        FieldType::DipoleQuadrupole,
        FieldType::DipoleFringe,
        FieldType::Quadrupole,
        FieldType::Sextupole,
        FieldType::Octupole,
        FieldType::Decapole,
        FieldType::Multipole,
        FieldType::MuonSpoiler,
        FieldType::RfCavity,
        FieldType::Rf,
        FieldType::General,
        FieldType::SkewQuadrupole,
        FieldType::SkewSextupole,
        FieldType::SkewOctupole,
        FieldType::SkewDecapole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldType::None => "none",
            FieldType::Solenoid => "solenoid",
            FieldType::Dipole => "dipole",
            FieldType::DipoleQuadrupole => "dipolequadrupole",
            FieldType::DipoleFringe => "dipolefringe",
            FieldType::Quadrupole => "quadrupole",
            FieldType::Sextupole => "sextupole",
            FieldType::Octupole => "octupole",
            FieldType::Decapole => "decapole",
            FieldType::Multipole => "multipole",
            FieldType::MuonSpoiler => "muonspoiler",
            FieldType::RfCavity => "rfcavity",
            FieldType::Rf => "rf",
            FieldType::General => "general",
            FieldType::SkewQuadrupole => "skewquadrupole",
            FieldType::SkewSextupole => "skewsextupole",
            FieldType::SkewOctupole => "skewoctupole",
            FieldType::SkewDecapole => "skewdecapole",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        FieldType::ALL
            .iter()
            .copied()
            .find(|field| field.name() == lowered)
            .ok_or_else(|| ConfigError::UnknownFieldType(s.to_string()))
    }
}

/// Rotation that turns a normal multipole of `order` into its skew partner
pub fn skew_angle(order: usize) -> f64 {
    PI / (2.0 * (order as f64 + 1.0))
}

/// Build the pure field of an element for the generic integrators
pub fn build_field(
    field_type: FieldType,
    strength: &MagnetStrength,
    geometry: &BendGeometry,
    brho: f64,
) -> Result<Box<dyn FieldMag>, ConfigError> {
    let normal = |order: usize| -> f64 {
        StrengthKey::normal(order)
            .map(|key| strength.get(key) * brho)
            .unwrap_or(0.0)
    };
    let field: Box<dyn FieldMag> = match field_type {
        FieldType::None => Box::new(UniformField::zero()),
        FieldType::Solenoid => Box::new(UniformField::new(DVec3::new(0.0, 0.0, normal(0)))),
        FieldType::Dipole | FieldType::DipoleFringe => {
            Box::new(UniformField::dipole(geometry.field(brho)))
        }
        FieldType::DipoleQuadrupole => Box::new(SectorDipoleQuadrupoleField::new(
            geometry.field(brho),
            normal(1),
            geometry.curvature(),
        )),
        FieldType::Quadrupole => Box::new(QuadrupoleField::new(normal(1))),
        FieldType::Sextupole => Box::new(MultipoleField::single(2, normal(2))),
        FieldType::Octupole => Box::new(MultipoleField::single(3, normal(3))),
        FieldType::Decapole => Box::new(MultipoleField::single(4, normal(4))),
        FieldType::Multipole => Box::new(MultipoleField::from_strength(strength, brho)),
        FieldType::SkewQuadrupole => Box::new(SkewField::new(
            QuadrupoleField::new(normal(1)),
            skew_angle(1),
        )),
        FieldType::SkewSextupole => Box::new(SkewField::new(
            MultipoleField::single(2, normal(2)),
            skew_angle(2),
        )),
        FieldType::SkewOctupole => Box::new(SkewField::new(
            MultipoleField::single(3, normal(3)),
            skew_angle(3),
        )),
        FieldType::SkewDecapole => Box::new(SkewField::new(
            MultipoleField::single(4, normal(4)),
            skew_angle(4),
        )),
        FieldType::MuonSpoiler | FieldType::RfCavity | FieldType::Rf | FieldType::General => {
            return Err(ConfigError::UnsupportedField(field_type.name().to_string()))
        }
    };
    Ok(field)
}
