//! Curvilinear coordinates following a circular reference orbit
//!
//! The local frame has its origin on the reference orbit with z along the
//! orbit tangent. For a curvature h the centre of curvature sits at
//! (-1/h, 0, 0). `x` is measured along the orbit normal, `s` along the
//! orbit. A zero curvature reduces to the identity mapping.

use crate::geometry::is_finite_strength;
use glam::DVec3;

/// A point in phase space expressed relative to the reference orbit
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurvilinearCoords {
    /// Offset along the orbit normal (m)
    pub x: f64,
    /// Vertical offset (m)
    pub y: f64,
    /// Distance along the reference orbit (m)
    pub s: f64,
    /// Momentum along the normal (GeV/c)
    pub px: f64,
    /// Vertical momentum (GeV/c)
    pub py: f64,
    /// Momentum along the orbit tangent (GeV/c)
    pub ps: f64,
}

impl CurvilinearCoords {
    /// Coordinates from slopes dx/ds and dy/ds taken against the local tangent
    pub fn from_slopes(x: f64, y: f64, s: f64, xp: f64, yp: f64, momentum: f64) -> Self {
        let ps = momentum / (1.0 + xp * xp + yp * yp).sqrt();
        Self {
            x,
            y,
            s,
            px: xp * ps,
            py: yp * ps,
            ps,
        }
    }

    pub fn momentum(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.ps * self.ps).sqrt()
    }

    pub fn xp(&self) -> f64 {
        self.px / self.ps
    }

    pub fn yp(&self) -> f64 {
        self.py / self.ps
    }

    /// Component of the unit momentum along the orbit tangent
    pub fn forward_cosine(&self) -> f64 {
        let momentum = self.momentum();
        if momentum > 0.0 {
            self.ps / momentum
        } else {
            0.0
        }
    }

    /// Transverse distance from the reference orbit
    pub fn transverse_amplitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Mapping between the local Cartesian frame and curvilinear coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvilinearFrame {
    curvature: f64,
}

impl CurvilinearFrame {
    pub fn new(curvature: f64) -> Self {
        let curvature = if is_finite_strength(curvature) {
            curvature
        } else {
            0.0
        };
        Self { curvature }
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    pub fn is_straight(&self) -> bool {
        self.curvature == 0.0
    }

    /// Orbit angle turned after a distance `s`
    fn angle(&self, s: f64) -> f64 {
        self.curvature * s
    }

    /// Unit tangent of the reference orbit at distance `s`
    pub fn tangent(&self, s: f64) -> DVec3 {
        let (sin, cos) = self.angle(s).sin_cos();
        DVec3::new(-sin, 0.0, cos)
    }

    /// Unit normal of the reference orbit at distance `s`
    pub fn normal(&self, s: f64) -> DVec3 {
        let (sin, cos) = self.angle(s).sin_cos();
        DVec3::new(cos, 0.0, sin)
    }

    /// Curvilinear (x, y, s) of a local position
    pub fn position(&self, position: DVec3) -> (f64, f64, f64) {
        if self.is_straight() {
            return (position.x, position.y, position.z);
        }
        let inverse = 1.0 / self.curvature;
        let sign = self.curvature.signum();
        let u = position.x + inverse;
        let radius = u.hypot(position.z);
        let phi = (sign * position.z).atan2(sign * u);
        (sign * radius - inverse, position.y, phi / self.curvature)
    }

    pub fn to_curvilinear(&self, position: DVec3, momentum: DVec3) -> CurvilinearCoords {
        let (x, y, s) = self.position(position);
        CurvilinearCoords {
            x,
            y,
            s,
            px: momentum.dot(self.normal(s)),
            py: momentum.y,
            ps: momentum.dot(self.tangent(s)),
        }
    }

    /// Local position and momentum of curvilinear coordinates
    pub fn to_local(&self, coords: &CurvilinearCoords) -> (DVec3, DVec3) {
        let normal = self.normal(coords.s);
        let tangent = self.tangent(coords.s);
        let momentum = coords.px * normal + DVec3::new(0.0, coords.py, 0.0) + coords.ps * tangent;
        if self.is_straight() {
            return (DVec3::new(coords.x, coords.y, coords.s), momentum);
        }
        let inverse = 1.0 / self.curvature;
        let arm = inverse + coords.x;
        let position = DVec3::new(-inverse, coords.y, 0.0) + arm * normal;
        (position, momentum)
    }
}
