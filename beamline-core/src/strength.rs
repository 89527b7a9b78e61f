//! Magnet strength records
//!
//! A sparse record of normalised multipole strengths (k0..k12 and their skew
//! counterparts) for a single beamline element. Built once by the element
//! factory and lent to the integrators for the rest of the run.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

/// Error raised when a strength is addressed with a name outside the key set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrengthError {
    #[error("invalid magnet strength key \"{0}\"")]
    InvalidKey(String),
}

/// The fixed set of strength keys, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthKey {
    K0,
    K1,
    K1s,
    K2,
    K2s,
    K3,
    K3s,
    K4,
    K4s,
    K5,
    K5s,
    K6,
    K6s,
    K7,
    K7s,
    K8,
    K8s,
    K9,
    K9s,
    K10,
    K10s,
    K11,
    K11s,
    K12,
    K12s,
}

impl StrengthKey {
    /// Every key in canonical (printing and comparison) order
    pub const ALL: [StrengthKey; 25] = [
        StrengthKey::K0,
        StrengthKey::K1,
        StrengthKey::K1s,
        StrengthKey::K2,
        StrengthKey::K2s,
        StrengthKey::K3,
        StrengthKey::K3s,
        StrengthKey::K4,
        StrengthKey::K4s,
        StrengthKey::K5,
        StrengthKey::K5s,
        StrengthKey::K6,
        StrengthKey::K6s,
        StrengthKey::K7,
        StrengthKey::K7s,
        StrengthKey::K8,
        StrengthKey::K8s,
        StrengthKey::K9,
        StrengthKey::K9s,
        StrengthKey::K10,
        StrengthKey::K10s,
        StrengthKey::K11,
        StrengthKey::K11s,
        StrengthKey::K12,
        StrengthKey::K12s,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrengthKey::K0 => "k0",
            StrengthKey::K1 => "k1",
            StrengthKey::K1s => "k1s",
            StrengthKey::K2 => "k2",
            StrengthKey::K2s => "k2s",
            StrengthKey::K3 => "k3",
            StrengthKey::K3s => "k3s",
            StrengthKey::K4 => "k4",
            StrengthKey::K4s => "k4s",
            StrengthKey::K5 => "k5",
            StrengthKey::K5s => "k5s",
            StrengthKey::K6 => "k6",
            StrengthKey::K6s => "k6s",
            StrengthKey::K7 => "k7",
            StrengthKey::K7s => "k7s",
            StrengthKey::K8 => "k8",
            StrengthKey::K8s => "k8s",
            StrengthKey::K9 => "k9",
            StrengthKey::K9s => "k9s",
            StrengthKey::K10 => "k10",
            StrengthKey::K10s => "k10s",
            StrengthKey::K11 => "k11",
            StrengthKey::K11s => "k11s",
            StrengthKey::K12 => "k12",
            StrengthKey::K12s => "k12s",
        }
    }

    /// Normal (non-skew) key of multipole order `n` (0 = dipole, 1 = quadrupole, ...)
    pub fn normal(order: usize) -> Option<StrengthKey> {
        match order {
            0 => Some(StrengthKey::K0),
            1..=12 => Some(Self::ALL[2 * order - 1]),
            _ => None,
        }
    }

    /// Skew key of multipole order `n`; there is no skew dipole key
    pub fn skew(order: usize) -> Option<StrengthKey> {
        match order {
            1..=12 => Some(Self::ALL[2 * order]),
            _ => None,
        }
    }
}

impl fmt::Display for StrengthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrengthKey {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrengthKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| StrengthError::InvalidKey(s.to_string()))
    }
}

/// Sparse named multipole strengths for one element
///
/// Keys that were never set read as 0.0. There is no removal operation.
#[derive(Debug, Clone, Default)]
pub struct MagnetStrength {
    strengths: BTreeMap<StrengthKey, f64>,
}

impl MagnetStrength {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from name/value pairs, failing on the first unknown name
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, StrengthError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut strength = Self::new();
        for (name, value) in pairs {
            strength.set_by_name(name, value)?;
        }
        Ok(strength)
    }

    pub fn get(&self, key: StrengthKey) -> f64 {
        self.strengths.get(&key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: StrengthKey, value: f64) {
        self.strengths.insert(key, value);
    }

    /// Whether `key` carries an explicitly set value
    pub fn is_set(&self, key: StrengthKey) -> bool {
        self.strengths.contains_key(&key)
    }

    /// Read a strength by its textual key name
    pub fn get_by_name(&self, name: &str) -> Result<f64, StrengthError> {
        let key = parse_key(name)?;
        Ok(self.get(key))
    }

    /// Set a strength by its textual key name; an invalid name leaves the record untouched
    pub fn set_by_name(&mut self, name: &str, value: f64) -> Result<(), StrengthError> {
        let key = parse_key(name)?;
        self.set(key, value);
        Ok(())
    }

    /// Iterate all keys and their values in canonical order, unset keys as 0.0
    pub fn iter(&self) -> impl Iterator<Item = (StrengthKey, f64)> + '_ {
        StrengthKey::ALL.iter().map(move |key| (*key, self.get(*key)))
    }
}

fn parse_key(name: &str) -> Result<StrengthKey, StrengthError> {
    name.parse().map_err(|e| {
        error!("{e}");
        e
    })
}

impl PartialEq for MagnetStrength {
    fn eq(&self, other: &Self) -> bool {
        StrengthKey::ALL
            .iter()
            .all(|key| self.get(*key) == other.get(*key))
    }
}

impl fmt::Display for MagnetStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}
