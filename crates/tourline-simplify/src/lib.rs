//! tourline-simplify: Douglas-Peucker simplification of recorded series (sans-IO).
//!
//! Reduces the point count of a sampled trajectory (elevation, speed or
//! power over distance or time) while keeping every discarded sample
//! within a caller-supplied tolerance of the simplified curve. Selected
//! indices, typically the joins between concatenated tours, can be
//! forced to survive.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! slices and returns owned results. Reading device formats and
//! rendering the output are left to the caller.
//!
//! # Example
//!
//! ```
//! use tourline_simplify::series::ConcatenatedSeries;
//!
//! let series = ConcatenatedSeries::from_tours(&[
//!     vec![(0.0, 100.0), (10.0, 100.2), (20.0, 100.1)],
//!     vec![(30.0, 100.0), (40.0, 100.3)],
//! ]);
//! let simplified = tourline_simplify::simplify(&series.points, 1.0, series.forced_indices())?;
//! let kept: Vec<usize> = simplified.iter().map(|p| p.original_index).collect();
//! assert_eq!(kept, [0, 3, 4]);
//! # Ok::<(), tourline_simplify::SimplifyError>(())
//! ```

pub mod diagnostics;
pub mod elevation;
pub mod series;
pub mod simplify;
pub mod types;

pub use simplify::{
    RetainedPoint, RetentionReason, Simplifier, segment_distance_squared, simplify,
};
pub use types::{Point, SimplifyConfig, SimplifyError, Vector};
