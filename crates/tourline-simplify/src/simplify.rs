//! Series simplification using the Ramer-Douglas-Peucker algorithm,
//! extended with forced retention points.
//!
//! Reduces the point count of a recorded series while keeping every
//! discarded point within `tolerance` of the segment that replaces it.
//! Forced indices always survive, which keeps the boundaries between
//! concatenated tours from being smoothed away.
//!
//! Forced indices are anchored before the geometric pass, splitting the
//! input into spans that are simplified independently. Anchoring them
//! afterwards would break the tolerance guarantee: a forced point may sit
//! up to `tolerance` off the original segment, and a discarded neighbour
//! on the other side can then end up farther than `tolerance` from the
//! new segment through the forced point.
//!
//! The divide-and-conquer step runs on an explicit work list of index
//! ranges rather than the call stack, so a maximally jagged input costs
//! heap memory proportional to its length instead of recursion depth.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{Point, SimplifyError};

/// Why a point survived simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionReason {
    /// First or last point of the input.
    Endpoint,
    /// Split point whose deviation exceeded the tolerance.
    Geometric,
    /// Listed in the forced indices (and not an endpoint).
    Forced,
}

/// A point of the simplified output together with the reason it was kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetainedPoint {
    /// The retained input point.
    pub point: Point,
    /// Why it was retained.
    pub reason: RetentionReason,
}

/// Counters gathered while walking the work list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct WalkStats {
    /// Largest number of pending ranges on the work list at once.
    pub peak_work_list: usize,
    /// Largest squared deviation of any point that was not split on.
    pub max_discarded_distance_squared: f64,
}

/// Validated simplification request.
///
/// Construction checks every precondition; [`simplify`](Self::simplify)
/// itself cannot fail.
///
/// ```
/// use tourline_simplify::{Point, Simplifier};
///
/// let points = [
///     Point::new(0.0, 0.0, 0),
///     Point::new(1.0, 0.0, 1),
///     Point::new(2.0, 5.0, 2),
///     Point::new(3.0, 0.0, 3),
/// ];
/// let simplified = Simplifier::new(1.0, &points, &[])?.simplify();
/// let kept: Vec<usize> = simplified.iter().map(|p| p.original_index).collect();
/// assert_eq!(kept, [0, 2, 3]);
/// # Ok::<(), tourline_simplify::SimplifyError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Simplifier<'a> {
    tolerance: f64,
    points: &'a [Point],
    forced_indices: &'a [usize],
}

impl<'a> Simplifier<'a> {
    /// Validate the inputs and build a simplifier.
    ///
    /// # Errors
    ///
    /// - [`SimplifyError::NegativeTolerance`] / [`SimplifyError::NonFiniteTolerance`]
    ///   if `tolerance` is below zero, NaN, or infinite.
    /// - [`SimplifyError::ForcedIndexOutOfRange`] if a forced index is
    ///   not a valid position in `points`.
    /// - [`SimplifyError::ForcedIndicesNotIncreasing`] if forced indices
    ///   are unsorted or duplicated.
    /// - [`SimplifyError::OriginalIndexNotIncreasing`] if the points'
    ///   `original_index` values are not strictly increasing.
    /// - [`SimplifyError::NonFiniteCoordinate`] if a coordinate is NaN or
    ///   infinite.
    pub fn new(
        tolerance: f64,
        points: &'a [Point],
        forced_indices: &'a [usize],
    ) -> Result<Self, SimplifyError> {
        validate_tolerance(tolerance)?;
        validate_points(points)?;
        validate_forced_indices(forced_indices, points.len())?;
        Ok(Self {
            tolerance,
            points,
            forced_indices,
        })
    }

    /// The tolerance this simplifier was built with.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Simplify the input, returning the retained points in input order.
    #[must_use = "returns the simplified points"]
    pub fn simplify(&self) -> Vec<Point> {
        self.simplify_with_reasons()
            .into_iter()
            .map(|retained| retained.point)
            .collect()
    }

    /// Simplify the input, tagging every retained point with why it was kept.
    #[must_use = "returns the simplified points"]
    pub fn simplify_with_reasons(&self) -> Vec<RetainedPoint> {
        self.run().0
    }

    /// Shared implementation that also reports walk statistics.
    pub(crate) fn run(&self) -> (Vec<RetainedPoint>, WalkStats) {
        let n = self.points.len();

        if n <= 1 {
            let retained = self
                .points
                .iter()
                .map(|&point| RetainedPoint {
                    point,
                    reason: RetentionReason::Endpoint,
                })
                .collect();
            return (retained, WalkStats::default());
        }

        let mut kept: Vec<Option<RetentionReason>> = vec![None; n];
        kept[0] = Some(RetentionReason::Endpoint);
        kept[n - 1] = Some(RetentionReason::Endpoint);
        for &i in self.forced_indices {
            if kept[i].is_none() {
                kept[i] = Some(RetentionReason::Forced);
            }
        }

        let anchors: Vec<usize> = std::iter::once(0)
            .chain(
                self.forced_indices
                    .iter()
                    .copied()
                    .filter(|&i| i > 0 && i < n - 1),
            )
            .chain(std::iter::once(n - 1))
            .collect();
        let spans = anchors.windows(2).map(|w| (w[0], w[1]));

        let stats = mark_splits(self.points, spans, self.tolerance * self.tolerance, &mut kept);

        let retained: Vec<RetainedPoint> = self
            .points
            .iter()
            .zip(&kept)
            .filter_map(|(&point, reason)| reason.map(|reason| RetainedPoint { point, reason }))
            .collect();

        debug!(
            tolerance = self.tolerance,
            points_before = n,
            points_after = retained.len(),
            forced = self.forced_indices.len(),
            peak_work_list = stats.peak_work_list,
            "simplified series"
        );

        (retained, stats)
    }
}

/// Simplify `points` in one call.
///
/// Convenience wrapper around [`Simplifier::new`] followed by
/// [`Simplifier::simplify`].
///
/// # Errors
///
/// Returns the same errors as [`Simplifier::new`].
pub fn simplify(
    points: &[Point],
    tolerance: f64,
    forced_indices: &[usize],
) -> Result<Vec<Point>, SimplifyError> {
    Ok(Simplifier::new(tolerance, points, forced_indices)?.simplify())
}

/// Mark geometric split points within each of `spans`.
///
/// Each span, like every later work-list entry, is an inclusive
/// `(start, end)` range whose endpoints are already kept.
fn mark_splits(
    points: &[Point],
    spans: impl DoubleEndedIterator<Item = (usize, usize)>,
    tolerance_squared: f64,
    kept: &mut [Option<RetentionReason>],
) -> WalkStats {
    let mut stats = WalkStats::default();
    let mut work_list: Vec<(usize, usize)> = spans.rev().collect();
    stats.peak_work_list = work_list.len();

    while let Some((start, end)) = work_list.pop() {
        let Some((max_i, max_d2)) = farthest_interior_point(points, start, end) else {
            continue;
        };

        if max_d2 > tolerance_squared {
            trace!(start, end, split = max_i, deviation = max_d2.sqrt(), "split");
            kept[max_i] = Some(RetentionReason::Geometric);
            work_list.push((max_i, end));
            work_list.push((start, max_i));
            stats.peak_work_list = stats.peak_work_list.max(work_list.len());
        } else {
            stats.max_discarded_distance_squared = stats.max_discarded_distance_squared.max(max_d2);
        }
    }

    stats
}

/// Find the interior point of `start..=end` farthest from the segment
/// `points[start]`–`points[end]`.
///
/// Returns the index and squared distance, or `None` when the range has
/// no interior points. Ties resolve to the lowest index.
fn farthest_interior_point(points: &[Point], start: usize, end: usize) -> Option<(usize, f64)> {
    if end <= start + 1 {
        return None;
    }

    let p0 = points[start];
    let p1 = points[end];
    let mut farthest: Option<(usize, f64)> = None;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d2 = segment_distance_squared(p, p0, p1);
        if farthest.is_none_or(|(_, max_d2)| d2 > max_d2) {
            farthest = Some((i, d2));
        }
    }

    farthest
}

/// Squared distance from `p` to the closed segment `a`–`b`.
///
/// Projects `p` onto the segment with dot products and clamps to the
/// nearer endpoint when the projection falls outside it. When `a` and `b`
/// coincide the segment is a single point and the result is the squared
/// distance from `p` to `a`.
#[must_use]
pub fn segment_distance_squared(p: Point, a: Point, b: Point) -> f64 {
    let u = b - a;
    let cu = u.dot(u);

    if cu == 0.0 {
        // Degenerate segment: duplicate fixes or timestamps.
        return p.distance_squared(a);
    }

    let w = p - a;
    let cw = w.dot(u);

    if cw <= 0.0 {
        p.distance_squared(a)
    } else if cw >= cu {
        p.distance_squared(b)
    } else {
        (w - u.scale(cw / cu)).length_squared()
    }
}

/// Reject tolerances that are negative, NaN, or infinite.
pub(crate) fn validate_tolerance(tolerance: f64) -> Result<(), SimplifyError> {
    if !tolerance.is_finite() {
        return Err(SimplifyError::NonFiniteTolerance(tolerance));
    }
    if tolerance < 0.0 {
        return Err(SimplifyError::NegativeTolerance(tolerance));
    }
    Ok(())
}

/// Check coordinates are finite and original indices strictly increase.
fn validate_points(points: &[Point]) -> Result<(), SimplifyError> {
    if let Some(position) = points.iter().position(|p| !p.is_finite()) {
        return Err(SimplifyError::NonFiniteCoordinate { position });
    }
    for (position, pair) in points.windows(2).enumerate() {
        if pair[1].original_index <= pair[0].original_index {
            return Err(SimplifyError::OriginalIndexNotIncreasing {
                position: position + 1,
                previous: pair[0].original_index,
                current: pair[1].original_index,
            });
        }
    }
    Ok(())
}

/// Check forced indices are in range and strictly increasing.
fn validate_forced_indices(forced_indices: &[usize], len: usize) -> Result<(), SimplifyError> {
    if let Some(&index) = forced_indices.iter().find(|&&i| i >= len) {
        return Err(SimplifyError::ForcedIndexOutOfRange { index, len });
    }
    for (position, pair) in forced_indices.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(SimplifyError::ForcedIndicesNotIncreasing {
                position: position + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}
