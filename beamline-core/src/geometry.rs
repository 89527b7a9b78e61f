//! Geometric parameters of a bending element

use crate::context::ConfigError;
use tracing::warn;

/// Magnitudes at or below this are treated as zero when choosing algorithms
pub const NUMERICAL_ZERO: f64 = f64::EPSILON;

/// Whether `value` is distinguishable from zero
pub fn is_finite_strength(value: f64) -> bool {
    value.abs() > NUMERICAL_ZERO
}

/// Arc length, bend angle and pole-face parameters of an element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BendGeometry {
    pub arc_length: f64,
    pub angle: f64,
    /// Entrance pole-face rotation (rad)
    pub pole_face_in: f64,
    /// Exit pole-face rotation (rad)
    pub pole_face_out: f64,
    /// Fringe field integral (fint)
    pub fringe_integral: f64,
    /// Half gap of the magnet poles (m)
    pub half_gap: f64,
}

impl BendGeometry {
    /// A sector bend without pole-face rotation or fringe parameters
    pub fn sector(arc_length: f64, angle: f64) -> Self {
        Self {
            arc_length,
            angle,
            ..Self::default()
        }
    }

    /// A straight element
    pub fn straight(arc_length: f64) -> Self {
        Self::sector(arc_length, 0.0)
    }

    pub fn with_pole_faces(mut self, pole_face_in: f64, pole_face_out: f64) -> Self {
        self.pole_face_in = pole_face_in;
        self.pole_face_out = pole_face_out;
        self
    }

    pub fn with_fringe(mut self, fringe_integral: f64, half_gap: f64) -> Self {
        self.fringe_integral = fringe_integral;
        self.half_gap = half_gap;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("arc length", self.arc_length),
            ("angle", self.angle),
            ("entrance pole face", self.pole_face_in),
            ("exit pole face", self.pole_face_out),
            ("fringe integral", self.fringe_integral),
            ("half gap", self.half_gap),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::InvalidGeometry(format!(
                    "{} is not finite ({})",
                    name, value
                )));
            }
        }
        if self.arc_length < 0.0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "negative arc length {}",
                self.arc_length
            )));
        }
        if is_finite_strength(self.angle) && !is_finite_strength(self.arc_length) {
            return Err(ConfigError::InvalidGeometry(format!(
                "bend angle {} on a zero length element",
                self.angle
            )));
        }
        Ok(())
    }

    pub fn is_bent(&self) -> bool {
        is_finite_strength(self.angle) && is_finite_strength(self.arc_length)
    }

    /// Signed reference curvature angle / length (1/m), zero when straight
    pub fn curvature(&self) -> f64 {
        if self.is_bent() {
            self.angle / self.arc_length
        } else {
            0.0
        }
    }

    /// Signed bending radius, None for a straight element
    pub fn bending_radius(&self) -> Option<f64> {
        self.is_bent().then(|| self.arc_length / self.angle)
    }

    /// Straight-line distance between the entrance and exit of the reference orbit
    pub fn chord_length(&self) -> f64 {
        if self.is_bent() {
            2.0 * self.arc_length * (0.5 * self.angle).sin() / self.angle
        } else {
            self.arc_length
        }
    }

    /// Vertical dipole field (T) that bends a particle of rigidity `brho` by `angle`
    pub fn field(&self, brho: f64) -> f64 {
        brho * self.curvature()
    }

    /// Fringe field correction for the entrance face
    pub fn fringe_correction_in(&self) -> f64 {
        self.bending_radius()
            .map(|rho| {
                fringe_field_correction(rho, self.pole_face_in, self.fringe_integral, self.half_gap)
            })
            .unwrap_or(0.0)
    }

    /// Fringe field correction for the exit face
    pub fn fringe_correction_out(&self) -> f64 {
        self.bending_radius()
            .map(|rho| {
                fringe_field_correction(rho, self.pole_face_out, self.fringe_integral, self.half_gap)
            })
            .unwrap_or(0.0)
    }
}

/// Vertical focusing correction of a finite-extent fringe field
///
/// psi = 2 fint hgap (1 + sin^2 e) / (rho cos e)
pub fn fringe_field_correction(rho: f64, pole_face: f64, fint: f64, hgap: f64) -> f64 {
    if !is_finite_strength(fint) || !is_finite_strength(hgap) || !is_finite_strength(rho) {
        return 0.0;
    }
    let sin_e = pole_face.sin();
    let correction = 2.0 * fint * hgap * (1.0 + sin_e * sin_e) / (rho * pole_face.cos());
    if correction.abs() > pole_face.abs() && is_finite_strength(pole_face) {
        warn!(
            "fringe field correction {} exceeds pole face angle {}",
            correction, pole_face
        );
    }
    correction
}
