//! Named integrator profiles
//!
//! A profile maps each category of magnet field onto the integrator algorithm
//! used to transport particles through it.

use crate::context::ConfigError;
use crate::field::FieldType;
use crate::integrator::IntegratorType;
use std::fmt;
use std::str::FromStr;

use crate::integrator::IntegratorType::{ClassicalRk4 as Rk4, Dipole, DipoleFringe, DipoleQuadrupole};

/// The selectable profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegratorSetType {
    Geant4,
    BdsimOne,
    BdsimTwo,
    BdsimMatrix,
}

impl IntegratorSetType {
    pub const ALL: [IntegratorSetType; 4] = [
        IntegratorSetType::Geant4,
        IntegratorSetType::BdsimOne,
        IntegratorSetType::BdsimTwo,
        IntegratorSetType::BdsimMatrix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntegratorSetType::Geant4 => "geant4",
            IntegratorSetType::BdsimOne => "bdsimone",
            IntegratorSetType::BdsimTwo => "bdsimtwo",
            IntegratorSetType::BdsimMatrix => "bdsimmatrix",
        }
    }

    pub fn set(self) -> &'static IntegratorSet {
        match self {
            IntegratorSetType::Geant4 => &GEANT4,
            IntegratorSetType::BdsimOne => &BDSIM_ONE,
            IntegratorSetType::BdsimTwo => &BDSIM_TWO,
            IntegratorSetType::BdsimMatrix => &BDSIM_MATRIX,
        }
    }
}

impl fmt::Display for IntegratorSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorSetType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        if lowered == "default" {
            return Ok(IntegratorSetType::BdsimTwo);
        }
        IntegratorSetType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| ConfigError::UnknownIntegratorSet(s.to_string()))
    }
}

/// Integrator choice per field category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegratorSet {
    pub kind: IntegratorSetType,
    pub solenoid: IntegratorType,
    pub dipole: IntegratorType,
    pub dipole_quadrupole: IntegratorType,
    pub dipole_fringe: IntegratorType,
    pub quadrupole: IntegratorType,
    pub sextupole: IntegratorType,
    pub octupole: IntegratorType,
    pub decapole: IntegratorType,
    pub multipole: IntegratorType,
    pub muon_spoiler: IntegratorType,
    pub rf_cavity: IntegratorType,
    pub rf: IntegratorType,
    pub general: IntegratorType,
    pub skew_quadrupole: IntegratorType,
    pub skew_sextupole: IntegratorType,
    pub skew_octupole: IntegratorType,
    pub skew_decapole: IntegratorType,
}

impl IntegratorSet {
    pub const ALL: [&'static IntegratorSet; 4] = [&GEANT4, &BDSIM_ONE, &BDSIM_TWO, &BDSIM_MATRIX];

    /// A profile with the classical RK4 in every category
    const fn runge_kutta(kind: IntegratorSetType) -> Self {
        Self {
            kind,
            solenoid: Rk4,
            dipole: Rk4,
            dipole_quadrupole: Rk4,
            dipole_fringe: Rk4,
            quadrupole: Rk4,
            sextupole: Rk4,
            octupole: Rk4,
            decapole: Rk4,
            multipole: Rk4,
            muon_spoiler: Rk4,
            rf_cavity: Rk4,
            rf: Rk4,
            general: Rk4,
            skew_quadrupole: Rk4,
            skew_sextupole: Rk4,
            skew_octupole: Rk4,
            skew_decapole: Rk4,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Category lookup; total over every field type
    pub fn integrator_for(&self, field_type: FieldType) -> IntegratorType {
        match field_type {
            FieldType::None | FieldType::General => self.general,
            FieldType::Solenoid => self.solenoid,
            FieldType::Dipole => self.dipole,
            FieldType::DipoleQuadrupole => self.dipole_quadrupole,
            FieldType::DipoleFringe => self.dipole_fringe,
            FieldType::Quadrupole => self.quadrupole,
            FieldType::Sextupole => self.sextupole,
            FieldType::Octupole => self.octupole,
            FieldType::Decapole => self.decapole,
            FieldType::Multipole => self.multipole,
            FieldType::MuonSpoiler => self.muon_spoiler,
            FieldType::RfCavity => self.rf_cavity,
            FieldType::Rf => self.rf,
            FieldType::SkewQuadrupole => self.skew_quadrupole,
            FieldType::SkewSextupole => self.skew_sextupole,
            FieldType::SkewOctupole => self.skew_octupole,
            FieldType::SkewDecapole => self.skew_decapole,
        }
    }
}

impl fmt::Display for IntegratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name())?;
        for field_type in FieldType::ALL {
            writeln!(f, "  {:<16} {}", field_type.name(), self.integrator_for(field_type))?;
        }
        Ok(())
    }
}

pub const GEANT4: IntegratorSet = IntegratorSet::runge_kutta(IntegratorSetType::Geant4);

pub const BDSIM_ONE: IntegratorSet = IntegratorSet {
    dipole: Dipole,
    dipole_quadrupole: Dipole,
    dipole_fringe: Dipole,
    ..IntegratorSet::runge_kutta(IntegratorSetType::BdsimOne)
};

pub const BDSIM_TWO: IntegratorSet = IntegratorSet {
    dipole: Dipole,
    dipole_quadrupole: Dipole,
    dipole_fringe: DipoleFringe,
    ..IntegratorSet::runge_kutta(IntegratorSetType::BdsimTwo)
};

pub const BDSIM_MATRIX: IntegratorSet = IntegratorSet {
    dipole: Dipole,
    dipole_quadrupole: DipoleQuadrupole,
    dipole_fringe: DipoleFringe,
    quadrupole: DipoleQuadrupole,
    ..IntegratorSet::runge_kutta(IntegratorSetType::BdsimMatrix)
};

/// Look up a profile by name; "default" selects bdsimtwo
pub fn integrator_set(name: &str) -> Result<&'static IntegratorSet, ConfigError> {
    let kind = name.parse::<IntegratorSetType>().map_err(|err| {
        tracing::error!("{}", err);
        err
    })?;
    Ok(kind.set())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alias() {
        let set = integrator_set("default").unwrap();
        assert_eq!(set.kind, IntegratorSetType::BdsimTwo);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let set = integrator_set("BDSIMMatrix").unwrap();
        assert_eq!(set.kind, IntegratorSetType::BdsimMatrix);
    }

    #[test]
    fn test_every_set_is_listed_once() {
        for (set, kind) in IntegratorSet::ALL.iter().zip(IntegratorSetType::ALL) {
            assert_eq!(set.kind, kind);
            assert_eq!(kind.set(), *set);
        }
    }
}
