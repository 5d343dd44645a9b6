//! Elevation analysis on a simplified altitude profile.
//!
//! Summing raw sample-to-sample differences overstates ascent because
//! sensor noise adds many small climbs and drops. Summing over a
//! simplified profile instead counts only changes larger than the
//! tolerance.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Total ascent and descent along a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevationChange {
    /// Sum of all positive `y` differences.
    pub gain: f64,
    /// Sum of all negative `y` differences, as a positive magnitude.
    pub loss: f64,
}

/// Sum the climbs and drops between consecutive points.
///
/// Intended for the output of [`crate::simplify`] over an
/// `(distance, altitude)` series.
///
/// ```
/// use tourline_simplify::{Point, elevation::elevation_change};
///
/// let profile = [
///     Point::new(0.0, 100.0, 0),
///     Point::new(1.0, 150.0, 4),
///     Point::new(2.0, 120.0, 9),
/// ];
/// let change = elevation_change(&profile);
/// assert!((change.gain - 50.0).abs() < 1e-9);
/// assert!((change.loss - 30.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn elevation_change(profile: &[Point]) -> ElevationChange {
    profile
        .windows(2)
        .fold(ElevationChange::default(), |mut acc, pair| {
            let dy = pair[1].y - pair[0].y;
            if dy > 0.0 {
                acc.gain += dy;
            } else {
                acc.loss -= dy;
            }
            acc
        })
}

/// Split a simplified profile into runs of constant vertical direction.
///
/// Consecutive segments that both climb (`dy >= 0`) or both descend
/// (`dy < 0`) are merged. A boundary is placed wherever the direction
/// flips, and at every retained point whose `original_index` appears in
/// `forced_indices` (so tour joins stay visible). The first and last
/// points are always boundaries.
///
/// Returns the boundaries' `original_index` values, strictly increasing.
#[must_use]
pub fn direction_segments(profile: &[Point], forced_indices: &[usize]) -> Vec<usize> {
    let Some((first, rest)) = profile.split_first() else {
        return Vec::new();
    };

    let mut boundaries = vec![first.original_index];
    let mut push = |index: usize| {
        if boundaries.last().is_none_or(|&last| index > last) {
            boundaries.push(index);
        }
    };

    let mut prev = *first;
    let mut climbing: Option<bool> = None;

    for &current in rest {
        let up = current.y - prev.y >= 0.0;

        let forced = forced_indices.binary_search(&prev.original_index).is_ok();
        let flipped = climbing.is_some_and(|was_up| was_up != up);
        if forced || flipped {
            push(prev.original_index);
        }

        climbing = Some(up);
        prev = current;
    }

    push(prev.original_index);
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(coords: &[(f64, f64, usize)]) -> Vec<Point> {
        coords
            .iter()
            .map(|&(x, y, i)| Point::new(x, y, i))
            .collect()
    }

    // --- elevation_change ---

    #[test]
    fn empty_and_single_profiles_have_no_change() {
        assert_eq!(elevation_change(&[]), ElevationChange::default());
        assert_eq!(
            elevation_change(&profile(&[(0.0, 5.0, 0)])),
            ElevationChange::default()
        );
    }

    #[test]
    fn gain_and_loss_are_summed_separately() {
        let p = profile(&[
            (0.0, 100.0, 0),
            (1.0, 110.0, 1),
            (2.0, 105.0, 2),
            (3.0, 125.0, 3),
            (4.0, 90.0, 4),
        ]);
        let change = elevation_change(&p);
        assert!((change.gain - 30.0).abs() < 1e-9);
        assert!((change.loss - 40.0).abs() < 1e-9);
    }

    #[test]
    fn flat_profile_has_no_change() {
        let p = profile(&[(0.0, 7.0, 0), (1.0, 7.0, 1), (2.0, 7.0, 2)]);
        let change = elevation_change(&p);
        assert!(change.gain.abs() < f64::EPSILON);
        assert!(change.loss.abs() < f64::EPSILON);
    }

    #[test]
    fn simplification_suppresses_noise() {
        // A steady climb with +-0.4 jitter: raw gain is far larger than 10.
        let raw: Vec<Point> = (0..=100_u32)
            .enumerate()
            .map(|(index, i)| {
                let jitter = if i % 2 == 0 { 0.4 } else { -0.4 };
                Point::new(f64::from(i), f64::from(i).mul_add(0.1, jitter), index)
            })
            .collect();
        let raw_gain = elevation_change(&raw).gain;
        let simplified = crate::simplify(&raw, 1.0, &[]).unwrap_or_default();
        let gain = elevation_change(&simplified).gain;
        assert!(raw_gain > 40.0, "raw gain {raw_gain}");
        assert!((gain - 10.0).abs() < 1e-9, "simplified gain {gain}");
    }

    // --- direction_segments ---

    #[test]
    fn empty_profile_has_no_segments() {
        assert!(direction_segments(&[], &[]).is_empty());
    }

    #[test]
    fn single_point_is_one_boundary() {
        assert_eq!(direction_segments(&profile(&[(0.0, 0.0, 3)]), &[]), [3]);
    }

    #[test]
    fn monotonic_climb_is_one_segment() {
        let p = profile(&[(0.0, 0.0, 0), (1.0, 1.0, 4), (2.0, 3.0, 9)]);
        assert_eq!(direction_segments(&p, &[]), [0, 9]);
    }

    #[test]
    fn direction_flips_become_boundaries() {
        let p = profile(&[
            (0.0, 0.0, 0),
            (1.0, 5.0, 2),
            (2.0, 8.0, 5),
            (3.0, 2.0, 7),
            (4.0, 1.0, 8),
            (5.0, 6.0, 11),
        ]);
        assert_eq!(direction_segments(&p, &[]), [0, 5, 8, 11]);
    }

    #[test]
    fn level_segments_count_as_climbing() {
        let p = profile(&[(0.0, 0.0, 0), (1.0, 2.0, 1), (2.0, 2.0, 2), (3.0, 4.0, 3)]);
        assert_eq!(direction_segments(&p, &[]), [0, 3]);
    }

    #[test]
    fn forced_index_becomes_boundary() {
        let p = profile(&[(0.0, 0.0, 0), (1.0, 1.0, 3), (2.0, 2.0, 6), (3.0, 3.0, 9)]);
        assert_eq!(direction_segments(&p, &[6]), [0, 6, 9]);
    }

    #[test]
    fn forced_flip_is_not_duplicated() {
        let p = profile(&[(0.0, 0.0, 0), (1.0, 4.0, 3), (2.0, 1.0, 6), (3.0, 5.0, 9)]);
        assert_eq!(direction_segments(&p, &[3, 9]), [0, 3, 6, 9]);
    }
}
