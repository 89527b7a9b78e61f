//! Skew (tilted) wrapper for pure field evaluators

use crate::field::FieldMag;
use glam::{DMat3, DVec3};

/// A field rotated about the local z axis by a fixed angle
///
/// B'(P) = R(angle) B(R(-angle) P)
#[derive(Debug, Clone)]
pub struct SkewField<F> {
    field: F,
    angle: f64,
    rotation: DMat3,
    anti_rotation: DMat3,
}

impl<F: FieldMag> SkewField<F> {
    pub fn new(field: F, angle: f64) -> Self {
        Self {
            field,
            angle,
            rotation: DMat3::from_rotation_z(angle),
            anti_rotation: DMat3::from_rotation_z(-angle),
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn inner(&self) -> &F {
        &self.field
    }
}

impl<F: FieldMag> FieldMag for SkewField<F> {
    fn field(&self, position: DVec3) -> DVec3 {
        let rotated_position = self.anti_rotation * position;
        let normal_field = self.field.field(rotated_position);
        self.rotation * normal_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{skew_angle, QuadrupoleField, UniformField};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_zero_angle_is_identity() {
        let quad = QuadrupoleField::new(2.0);
        let skew = SkewField::new(quad, 0.0);
        let point = DVec3::new(0.01, 0.03, 0.0);
        let a = skew.field(point);
        let b = quad.field(point);
        assert_relative_eq!(a.x, b.x);
        assert_relative_eq!(a.y, b.y);
    }

    #[test]
    fn test_skew_quadrupole_on_x_axis() {
        // a quadrupole turned by pi/4 has B = (-g x, 0) on the x axis
        let skew = SkewField::new(QuadrupoleField::new(2.0), skew_angle(1));
        let b = skew.field(DVec3::new(0.01, 0.0, 0.0));
        assert_relative_eq!(b.x, -0.02, epsilon = 1e-15);
        assert_relative_eq!(b.y, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_quarter_turn_negates_quadrupole() {
        let quad = QuadrupoleField::new(1.5);
        let skew = SkewField::new(quad, FRAC_PI_2);
        let point = DVec3::new(0.02, -0.01, 0.3);
        let a = skew.field(point);
        let b = quad.field(point);
        assert_relative_eq!(a.x, -b.x, epsilon = 1e-15);
        assert_relative_eq!(a.y, -b.y, epsilon = 1e-15);
    }

    #[test]
    fn test_quarter_turn_makes_dipole_horizontal() {
        let skew = SkewField::new(UniformField::dipole(1.0), FRAC_PI_2);
        let b = skew.field(DVec3::ZERO);
        assert_relative_eq!(b.x, -1.0, epsilon = 1e-15);
        assert_relative_eq!(b.y, 0.0, epsilon = 1e-15);
    }
}
