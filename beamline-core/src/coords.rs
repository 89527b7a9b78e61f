//! Particle coordinates and the integrators' step state

use glam::DVec3;
use std::fmt;

/// Position (m) followed by momentum (GeV/c) in the element-local frame
pub type StepState = [f64; 6];

/// Split a step state into its position and momentum vectors
pub fn split_state(y: &StepState) -> (DVec3, DVec3) {
    (DVec3::new(y[0], y[1], y[2]), DVec3::new(y[3], y[4], y[5]))
}

/// Pack position and momentum into a step state
pub fn join_state(position: DVec3, momentum: DVec3) -> StepState {
    [
        position.x, position.y, position.z, momentum.x, momentum.y, momentum.z,
    ]
}

/// Particle species used to convert between energy and momentum
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDefinition {
    pub name: String,
    /// Rest mass (GeV)
    pub mass: f64,
    /// Charge in units of the elementary charge
    pub charge: f64,
}

impl ParticleDefinition {
    pub fn proton() -> Self {
        Self {
            name: "proton".to_string(),
            mass: 0.938_272_088_16,
            charge: 1.0,
        }
    }

    pub fn electron() -> Self {
        Self {
            name: "e-".to_string(),
            mass: 0.000_510_998_950,
            charge: -1.0,
        }
    }

    pub fn positron() -> Self {
        Self {
            name: "e+".to_string(),
            mass: 0.000_510_998_950,
            charge: 1.0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "proton" | "p" => Some(Self::proton()),
            "electron" | "e-" => Some(Self::electron()),
            "positron" | "e+" => Some(Self::positron()),
            _ => None,
        }
    }

    /// Momentum magnitude (GeV/c) for a total energy (GeV); zero below the rest mass
    pub fn momentum(&self, total_energy: f64) -> f64 {
        (total_energy * total_energy - self.mass * self.mass)
            .max(0.0)
            .sqrt()
    }

    pub fn total_energy(&self, momentum: f64) -> f64 {
        (momentum * momentum + self.mass * self.mass).sqrt()
    }
}

/// Local coordinates of a particle: position, unit direction and time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleCoords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xp: f64,
    pub yp: f64,
    pub zp: f64,
    pub t: f64,
}

impl ParticleCoords {
    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn direction(&self) -> DVec3 {
        DVec3::new(self.xp, self.yp, self.zp)
    }
}

impl fmt::Display for ParticleCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {} y: {} z: {} xp: {} yp: {} zp: {} t: {}",
            self.x, self.y, self.z, self.xp, self.yp, self.zp, self.t
        )
    }
}

/// Local coordinates plus path length, total energy and statistical weight
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleCoordsFull {
    pub local: ParticleCoords,
    pub s: f64,
    pub total_energy: f64,
    pub weight: f64,
}

impl ParticleCoordsFull {
    /// Step state for this particle; the direction is normalised and scaled
    /// by the momentum that corresponds to the total energy
    pub fn to_state(&self, particle: &ParticleDefinition) -> StepState {
        let direction = self.local.direction().normalize_or_zero();
        let momentum = direction * particle.momentum(self.total_energy);
        join_state(self.local.position(), momentum)
    }

    /// Coordinates of a step state at path length `s` and time `t`
    pub fn from_state(
        y: &StepState,
        s: f64,
        t: f64,
        particle: &ParticleDefinition,
        weight: f64,
    ) -> Self {
        let (position, momentum) = split_state(y);
        let direction = momentum.normalize_or_zero();
        Self {
            local: ParticleCoords {
                x: position.x,
                y: position.y,
                z: position.z,
                xp: direction.x,
                yp: direction.y,
                zp: direction.z,
                t,
            },
            s,
            total_energy: particle.total_energy(momentum.length()),
            weight,
        }
    }
}

impl fmt::Display for ParticleCoordsFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s: {} E: {} w: {}",
            self.local, self.s, self.total_energy, self.weight
        )
    }
}
