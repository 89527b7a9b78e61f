//! Run-wide tracking configuration
//!
//! Everything an integrator needs beyond its own magnet is handed over in a
//! `TrackingContext` at construction time. The context is read-only once
//! built and may be shared between threads.

use crate::strength::StrengthError;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Default length of the thin elements that carry pole-face fringe kicks (m)
pub const DEFAULT_THIN_ELEMENT_LENGTH: f64 = 1e-6;
/// Default minimum radius of curvature below which matrix transport is abandoned (m)
pub const DEFAULT_MINIMUM_RADIUS_OF_CURVATURE: f64 = 0.05;
/// Default minimum forward component of the unit momentum for matrix transport
pub const DEFAULT_MINIMUM_FORWARD_COSINE: f64 = 0.9;

/// Setup-time configuration faults
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown integrator set \"{0}\"")]
    UnknownIntegratorSet(String),
    #[error("unknown integrator type \"{0}\"")]
    UnknownIntegratorType(String),
    #[error("unknown field type \"{0}\"")]
    UnknownFieldType(String),
    #[error("field type \"{0}\" cannot be built by the tracking core")]
    UnsupportedField(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid rigidity {0} T.m: must be finite and non-zero")]
    InvalidRigidity(f64),
    #[error("invalid tracking parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Strength(#[from] StrengthError),
}

/// How the local radius of curvature is compared against the configured minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdComparison {
    /// Fall back when radius < limit
    #[default]
    Strict,
    /// Fall back when radius <= limit
    Inclusive,
}

impl ThresholdComparison {
    /// Whether `radius` violates `limit`
    pub fn violated(self, radius: f64, limit: f64) -> bool {
        match self {
            ThresholdComparison::Strict => radius < limit,
            ThresholdComparison::Inclusive => radius <= limit,
        }
    }
}

/// Validity test for paraxial (matrix) transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParaxialCriterion {
    /// Smallest accepted `p_s / |p|` along the reference orbit
    pub minimum_forward_cosine: f64,
    /// Multiplier applied to the minimum radius of curvature
    pub margin: f64,
    pub comparison: ThresholdComparison,
}

impl Default for ParaxialCriterion {
    fn default() -> Self {
        Self {
            minimum_forward_cosine: DEFAULT_MINIMUM_FORWARD_COSINE,
            margin: 1.0,
            comparison: ThresholdComparison::Strict,
        }
    }
}

impl ParaxialCriterion {
    /// True when a particle with this forward cosine and local radius of
    /// curvature can be transported by the linear matrix
    pub fn accepts(&self, forward_cosine: f64, radius_of_curvature: f64, minimum_radius: f64) -> bool {
        if forward_cosine < self.minimum_forward_cosine {
            return false;
        }
        !self
            .comparison
            .violated(radius_of_curvature, minimum_radius * self.margin)
    }
}

type Resolver = Box<dyn Fn() -> f64 + Send + Sync>;

/// Thin element length, resolved once on first use and cached
///
/// The resolver runs at most once even when several threads race to the
/// first `get`; every caller observes the same value.
pub struct ThinElementLength {
    value: OnceLock<f64>,
    resolver: Resolver,
}

impl ThinElementLength {
    /// A length resolved lazily by `resolver`
    pub fn lazy(resolver: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self {
            value: OnceLock::new(),
            resolver: Box::new(resolver),
        }
    }

    /// A length known up front
    pub fn fixed(length: f64) -> Self {
        let value = OnceLock::new();
        let _ = value.set(length);
        Self {
            value,
            resolver: Box::new(move || length),
        }
    }

    pub fn get(&self) -> f64 {
        *self.value.get_or_init(|| (self.resolver)())
    }

    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Debug for ThinElementLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThinElementLength")
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}

/// Configuration shared by every integrator of a run
#[derive(Debug, Clone)]
pub struct TrackingContext {
    pub minimum_radius_of_curvature: f64,
    pub paraxial: ParaxialCriterion,
    pub thin_element_length: Arc<ThinElementLength>,
}

impl Default for TrackingContext {
    fn default() -> Self {
        Self {
            minimum_radius_of_curvature: DEFAULT_MINIMUM_RADIUS_OF_CURVATURE,
            paraxial: ParaxialCriterion::default(),
            thin_element_length: Arc::new(ThinElementLength::fixed(DEFAULT_THIN_ELEMENT_LENGTH)),
        }
    }
}

impl TrackingContext {
    pub fn builder() -> TrackingContextBuilder {
        TrackingContextBuilder::default()
    }
}

/// Builder validating the numeric settings of a `TrackingContext`
#[derive(Debug, Default)]
pub struct TrackingContextBuilder {
    minimum_radius_of_curvature: Option<f64>,
    paraxial: Option<ParaxialCriterion>,
    thin_element_length: Option<Arc<ThinElementLength>>,
}

impl TrackingContextBuilder {
    pub fn minimum_radius_of_curvature(mut self, radius: f64) -> Self {
        self.minimum_radius_of_curvature = Some(radius);
        self
    }

    pub fn paraxial(mut self, criterion: ParaxialCriterion) -> Self {
        self.paraxial = Some(criterion);
        self
    }

    pub fn thin_element_length(mut self, length: Arc<ThinElementLength>) -> Self {
        self.thin_element_length = Some(length);
        self
    }

    pub fn build(self) -> Result<TrackingContext, ConfigError> {
        let defaults = TrackingContext::default();
        let minimum_radius_of_curvature = self
            .minimum_radius_of_curvature
            .unwrap_or(defaults.minimum_radius_of_curvature);
        if !minimum_radius_of_curvature.is_finite() || minimum_radius_of_curvature < 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "minimum radius of curvature {} must be finite and non-negative",
                minimum_radius_of_curvature
            )));
        }
        let paraxial = self.paraxial.unwrap_or(defaults.paraxial);
        if !paraxial.margin.is_finite() || paraxial.margin <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "paraxial margin {} must be positive",
                paraxial.margin
            )));
        }
        Ok(TrackingContext {
            minimum_radius_of_curvature,
            paraxial,
            thin_element_length: self
                .thin_element_length
                .unwrap_or(defaults.thin_element_length),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_thin_length_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let length = Arc::new(ThinElementLength::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            2.5e-6
        }));
        assert!(!length.is_resolved());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let length = Arc::clone(&length);
                thread::spawn(move || length.get())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2.5e-6);
        }
        assert_eq!(length.get(), 2.5e-6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(length.is_resolved());
    }

    #[test]
    fn test_comparison_modes() {
        assert!(!ThresholdComparison::Strict.violated(1.0, 1.0));
        assert!(ThresholdComparison::Inclusive.violated(1.0, 1.0));
        assert!(ThresholdComparison::Strict.violated(0.5, 1.0));
    }

    #[test]
    fn test_builder_rejects_negative_radius() {
        let result = TrackingContext::builder()
            .minimum_radius_of_curvature(-1.0)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidParameter(_))));
    }
}
