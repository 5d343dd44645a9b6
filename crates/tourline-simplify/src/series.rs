//! Building simplifier input from raw series data.
//!
//! Recorded tours arrive as parallel numeric series (e.g. distance and
//! elevation). When several tours are viewed together their samples are
//! concatenated into one series, and the first sample of every tour after
//! the first becomes a forced index so the join is never smoothed away.

use serde::{Deserialize, Serialize};

use crate::types::{Point, SimplifyError};

/// Pair two parallel series into points indexed by position.
///
/// # Errors
///
/// Returns [`SimplifyError::SeriesLengthMismatch`] if `xs` and `ys`
/// differ in length.
///
/// # Examples
///
/// ```
/// use tourline_simplify::series::points_from_series;
///
/// let points = points_from_series(&[0.0, 10.0, 20.0], &[312.0, 318.5, 316.0])?;
/// assert_eq!(points[2].original_index, 2);
/// # Ok::<(), tourline_simplify::SimplifyError>(())
/// ```
pub fn points_from_series(xs: &[f64], ys: &[f64]) -> Result<Vec<Point>, SimplifyError> {
    if xs.len() != ys.len() {
        return Err(SimplifyError::SeriesLengthMismatch {
            x_len: xs.len(),
            y_len: ys.len(),
        });
    }
    Ok(xs
        .iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (&x, &y))| Point::new(x, y, i))
        .collect())
}

/// Several tours joined into one point sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcatenatedSeries {
    /// All samples, with `original_index` equal to the position in this
    /// sequence.
    pub points: Vec<Point>,
    /// Index of the first sample of each non-empty tour, ascending.
    pub tour_starts: Vec<usize>,
}

impl ConcatenatedSeries {
    /// Concatenate tours given as `(x, y)` samples.
    ///
    /// Empty tours contribute nothing and get no start index.
    #[must_use]
    pub fn from_tours<T: AsRef<[(f64, f64)]>>(tours: &[T]) -> Self {
        let total = tours.iter().map(|t| t.as_ref().len()).sum();
        let mut points = Vec::with_capacity(total);
        let mut tour_starts = Vec::with_capacity(tours.len());

        for tour in tours {
            let samples = tour.as_ref();
            if samples.is_empty() {
                continue;
            }
            tour_starts.push(points.len());
            for &(x, y) in samples {
                points.push(Point::new(x, y, points.len()));
            }
        }

        Self {
            points,
            tour_starts,
        }
    }

    /// Number of non-empty tours.
    #[must_use]
    pub fn tour_count(&self) -> usize {
        self.tour_starts.len()
    }

    /// Start indices that must survive simplification.
    ///
    /// The first tour's start is index 0, which is always kept as an
    /// endpoint, so it is left out.
    #[must_use]
    pub fn forced_indices(&self) -> &[usize] {
        self.tour_starts.get(1..).unwrap_or_default()
    }
}

/// Original indices of a simplified sequence, in order.
///
/// Callers use these to look up per-sample metadata for the retained
/// points.
#[must_use]
pub fn simplified_indices(points: &[Point]) -> Vec<usize> {
    points.iter().map(|p| p.original_index).collect()
}
