//! Shared types for the tourline simplifier.

use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// One sample of a recorded series.
///
/// `x` is the independent coordinate (elapsed time, distance, or sample
/// position) and `y` the dependent one (elevation, speed, power).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Independent coordinate.
    pub x: f64,
    /// Dependent coordinate.
    pub y: f64,
    /// Position of this sample in the source series.
    ///
    /// Carried through simplification unchanged so callers can map a
    /// retained point back to per-sample metadata (timestamps, markers).
    pub original_index: usize,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, original_index: usize) -> Self {
        Self {
            x,
            y,
            original_index,
        }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D difference or direction, used for projection math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Vector {
    /// Create a new vector.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.dx.mul_add(other.dx, self.dy * other.dy)
    }

    /// This vector scaled by `b`.
    #[must_use]
    pub fn scale(self, b: f64) -> Self {
        Self::new(self.dx * b, self.dy * b)
    }

    /// Squared length (`self · self`).
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

/// Configuration for simplifying a series.
///
/// Mirrors the knobs a host application exposes as preferences: the
/// tolerance, and whether the start of every concatenated tour must
/// survive simplification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Maximum distance, in data units, between a discarded point and
    /// the segment that replaces it.
    pub tolerance: f64,

    /// Whether tour start indices are passed to the simplifier as
    /// forced indices when several tours are concatenated.
    pub respect_tour_boundaries: bool,
}

impl SimplifyConfig {
    /// Default tolerance in data units (e.g. metres of elevation).
    pub const DEFAULT_TOLERANCE: f64 = 5.0;

    /// Default for [`respect_tour_boundaries`](Self::respect_tour_boundaries).
    pub const DEFAULT_RESPECT_TOUR_BOUNDARIES: bool = true;

    /// Check the configuration for values the simplifier would reject.
    ///
    /// # Errors
    ///
    /// Returns [`SimplifyError::InvalidConfig`] if the tolerance is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), SimplifyError> {
        crate::simplify::validate_tolerance(self.tolerance)
            .map_err(|e| SimplifyError::InvalidConfig(e.to_string()))
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            respect_tour_boundaries: Self::DEFAULT_RESPECT_TOUR_BOUNDARIES,
        }
    }
}

/// Errors that can occur when simplifying a series.
///
/// Every variant describes a violated precondition and is reported
/// before any computation starts; no partial output is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum SimplifyError {
    /// The tolerance is below zero.
    #[error("tolerance must be >= 0, got {0}")]
    NegativeTolerance(f64),

    /// The tolerance is NaN or infinite.
    #[error("tolerance must be finite, got {0}")]
    NonFiniteTolerance(f64),

    /// A forced index does not address a point of the input.
    #[error("forced index {index} is out of range for {len} points")]
    ForcedIndexOutOfRange {
        /// The offending forced index.
        index: usize,
        /// Number of input points.
        len: usize,
    },

    /// Forced indices are unsorted or contain a duplicate.
    #[error(
        "forced indices must be strictly increasing: entry {position} is {current} after {previous}"
    )]
    ForcedIndicesNotIncreasing {
        /// Position within the forced index list.
        position: usize,
        /// The preceding forced index.
        previous: usize,
        /// The forced index at `position`.
        current: usize,
    },

    /// Input points are not in strictly increasing `original_index` order.
    #[error(
        "original indices must be strictly increasing: point {position} has {current} after {previous}"
    )]
    OriginalIndexNotIncreasing {
        /// Position of the offending point in the input.
        position: usize,
        /// `original_index` of the preceding point.
        previous: usize,
        /// `original_index` of the point at `position`.
        current: usize,
    },

    /// A point has a NaN or infinite coordinate.
    #[error("point {position} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending point in the input.
        position: usize,
    },

    /// Parallel `x` and `y` series differ in length.
    #[error("series lengths differ: {x_len} x values, {y_len} y values")]
    SeriesLengthMismatch {
        /// Length of the `x` series.
        x_len: usize,
        /// Length of the `y` series.
        y_len: usize,
    },

    /// A [`SimplifyConfig`] failed validation.
    #[error("invalid simplify configuration: {0}")]
    InvalidConfig(String),
}

impl SimplifyError {
    /// Whether this error reports invalid caller input.
    ///
    /// All current variants do; the method exists so callers can match
    /// on the category without enumerating variants.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        match self {
            Self::NegativeTolerance(_)
            | Self::NonFiniteTolerance(_)
            | Self::ForcedIndexOutOfRange { .. }
            | Self::ForcedIndicesNotIncreasing { .. }
            | Self::OriginalIndexNotIncreasing { .. }
            | Self::NonFiniteCoordinate { .. }
            | Self::SeriesLengthMismatch { .. }
            | Self::InvalidConfig(_) => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_new() {
        let p = Point::new(3.0, 4.0, 7);
        assert!((p.x - 3.0).abs() < f64::EPSILON);
        assert!((p.y - 4.0).abs() < f64::EPSILON);
        assert_eq!(p.original_index, 7);
    }

    #[test]
    fn point_equality_includes_index() {
        assert_eq!(Point::new(1.0, 2.0, 0), Point::new(1.0, 2.0, 0));
        assert_ne!(Point::new(1.0, 2.0, 0), Point::new(1.0, 2.0, 1));
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0, 0);
        let b = Point::new(3.0, 4.0, 1);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_difference_is_vector() {
        let v = Point::new(5.0, 1.0, 1) - Point::new(2.0, 3.0, 0);
        assert_eq!(v, Vector::new(3.0, -2.0));
    }

    #[test]
    fn point_is_finite() {
        assert!(Point::new(1.0, 2.0, 0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0, 0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY, 0).is_finite());
    }

    // --- Vector tests ---

    #[test]
    fn vector_dot() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(3.0, -4.0);
        assert!((a.dot(b) - -5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_dot_perpendicular_is_zero() {
        let a = Vector::new(2.0, 0.0);
        let b = Vector::new(0.0, 7.0);
        assert!(a.dot(b).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_scale_and_length() {
        let v = Vector::new(3.0, 4.0).scale(2.0);
        assert_eq!(v, Vector::new(6.0, 8.0));
        assert!((v.length_squared() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_sub() {
        let v = Vector::new(3.0, 4.0) - Vector::new(1.0, 1.0);
        assert_eq!(v, Vector::new(2.0, 3.0));
    }

    // --- SimplifyConfig tests ---

    #[test]
    fn config_default_is_valid() {
        let config = SimplifyConfig::default();
        assert!((config.tolerance - SimplifyConfig::DEFAULT_TOLERANCE).abs() < f64::EPSILON);
        assert!(config.respect_tour_boundaries);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn config_negative_tolerance_is_invalid() {
        let config = SimplifyConfig {
            tolerance: -1.0,
            ..SimplifyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimplifyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: SimplifyConfig = serde_json::from_str(r#"{"tolerance": 2.5}"#).unwrap();
        assert!((config.tolerance - 2.5).abs() < f64::EPSILON);
        assert!(config.respect_tour_boundaries);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = SimplifyConfig {
            tolerance: 0.5,
            respect_tour_boundaries: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SimplifyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    // --- SimplifyError tests ---

    #[test]
    fn error_messages_name_the_precondition() {
        let e = SimplifyError::ForcedIndexOutOfRange { index: 9, len: 4 };
        assert_eq!(e.to_string(), "forced index 9 is out of range for 4 points");
        assert!(e.is_invalid_argument());

        let e = SimplifyError::NegativeTolerance(-0.5);
        assert!(e.to_string().contains("-0.5"));
    }
}
