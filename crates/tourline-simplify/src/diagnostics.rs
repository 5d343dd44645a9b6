//! Simplification diagnostics: timing, counts, and deviation metrics.
//!
//! Intended for tolerance tuning and regression checks. Timing goes
//! through the [`Clock`] trait so the library never touches a platform
//! timer directly; [`WebClock`] uses the `web-time` crate, which maps to
//! `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::simplify::{RetainedPoint, RetentionReason, Simplifier};
use crate::types::{Point, SimplifyConfig, SimplifyError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single simplification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyDiagnostics {
    /// Wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Tolerance used.
    pub tolerance: f64,
    /// Number of input points.
    pub points_before: usize,
    /// Number of retained points.
    pub points_after: usize,
    /// Reduction ratio: `1.0 - (after / before)`.
    pub reduction_ratio: f64,
    /// Points retained because they were split points.
    pub geometric_splits: usize,
    /// Points retained only because they were forced.
    pub forced_only: usize,
    /// Largest number of pending ranges on the work list at once.
    pub peak_work_list: usize,
    /// Largest distance from a discarded point to its replacement segment.
    pub max_discarded_deviation: f64,
}

impl SimplifyDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Simplification Diagnostics\n{}", "=".repeat(60)));
        lines.push(format!("Duration: {:.3}ms", duration_ms(self.duration)));
        lines.push(format!("Tolerance: {:.3}", self.tolerance));
        lines.push(format!(
            "Points: {} -> {} ({:.1}% reduction)",
            self.points_before,
            self.points_after,
            self.reduction_ratio * 100.0,
        ));
        lines.push(String::new());

        lines.push(format!("{:<28} {:>12}", "Metric", "Value"));
        lines.push("-".repeat(41));
        lines.push(format!("{:<28} {:>12}", "Geometric splits", self.geometric_splits));
        lines.push(format!("{:<28} {:>12}", "Forced-only points", self.forced_only));
        lines.push(format!("{:<28} {:>12}", "Peak work list", self.peak_work_list));
        lines.push(format!(
            "{:<28} {:>12.4}",
            "Max discarded deviation", self.max_discarded_deviation
        ));

        lines.join("\n")
    }
}

/// Run the simplifier described by `config` and collect diagnostics.
///
/// When `config.respect_tour_boundaries` is `false`, `forced_indices` is
/// ignored.
///
/// # Errors
///
/// Returns [`SimplifyError::InvalidConfig`] if `config` fails
/// validation, or any error from [`Simplifier::new`].
pub fn simplify_with_diagnostics<C: Clock>(
    config: &SimplifyConfig,
    points: &[Point],
    forced_indices: &[usize],
    clock: &C,
) -> Result<(Vec<RetainedPoint>, SimplifyDiagnostics), SimplifyError> {
    config.validate()?;
    let forced: &[usize] = if config.respect_tour_boundaries {
        forced_indices
    } else {
        &[]
    };

    let start = clock.now();
    let simplifier = Simplifier::new(config.tolerance, points, forced)?;
    let (retained, stats) = simplifier.run();
    let duration = clock.elapsed(&start);

    let diagnostics = SimplifyDiagnostics {
        duration,
        tolerance: config.tolerance,
        points_before: points.len(),
        points_after: retained.len(),
        reduction_ratio: reduction_ratio(points.len(), retained.len()),
        geometric_splits: count_reason(&retained, RetentionReason::Geometric),
        forced_only: count_reason(&retained, RetentionReason::Forced),
        peak_work_list: stats.peak_work_list,
        max_discarded_deviation: stats.max_discarded_distance_squared.sqrt(),
    };

    Ok((retained, diagnostics))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// `1.0 - after / before`, or `0.0` for empty input.
#[allow(clippy::cast_precision_loss)]
fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

fn count_reason(retained: &[RetainedPoint], reason: RetentionReason) -> usize {
    retained.iter().filter(|r| r.reason == reason).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that advances a fixed step on every reading.
    struct StepClock {
        ticks: Cell<u64>,
    }

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis((self.now() - since) * 3)
        }
    }

    fn line_with_spike() -> Vec<Point> {
        [(0.0, 0.0), (1.0, 0.0), (2.0, 5.0), (3.0, 0.0), (4.0, 0.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(x, y, i))
            .collect()
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        assert!((duration_ms(d) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn reduction_ratio_handles_empty_input() {
        assert!(reduction_ratio(0, 0).abs() < f64::EPSILON);
        assert!((reduction_ratio(10, 4) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn diagnostics_count_reasons() {
        let clock = StepClock {
            ticks: Cell::new(0),
        };
        let config = SimplifyConfig {
            tolerance: 1.0,
            respect_tour_boundaries: true,
        };
        let points = line_with_spike();
        let (retained, diag) = simplify_with_diagnostics(&config, &points, &[3], &clock).unwrap();

        assert_eq!(retained.len(), 4);
        assert_eq!(diag.points_before, 5);
        assert_eq!(diag.points_after, 4);
        assert_eq!(diag.geometric_splits, 1);
        assert_eq!(diag.forced_only, 1);
        assert!((diag.reduction_ratio - 0.2).abs() < 1e-12);
        assert_eq!(diag.duration, Duration::from_millis(3));
        assert!(diag.max_discarded_deviation <= 1.0);
    }

    #[test]
    fn forced_indices_ignored_when_boundaries_disabled() {
        let config = SimplifyConfig {
            tolerance: 1.0,
            respect_tour_boundaries: false,
        };
        let points = line_with_spike();
        let (retained, diag) =
            simplify_with_diagnostics(&config, &points, &[3], &WebClock).unwrap();
        assert_eq!(retained.len(), 3);
        assert_eq!(diag.forced_only, 0);
    }

    #[test]
    fn invalid_config_rejected_before_running() {
        let config = SimplifyConfig {
            tolerance: f64::NAN,
            respect_tour_boundaries: true,
        };
        let result = simplify_with_diagnostics(&config, &line_with_spike(), &[], &WebClock);
        assert!(matches!(result, Err(SimplifyError::InvalidConfig(_))));
    }

    #[test]
    fn diagnostics_serialize_duration_as_seconds() {
        let diag = SimplifyDiagnostics {
            duration: Duration::from_millis(1500),
            tolerance: 2.0,
            points_before: 100,
            points_after: 10,
            reduction_ratio: 0.9,
            geometric_splits: 7,
            forced_only: 1,
            peak_work_list: 4,
            max_discarded_deviation: 1.75,
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert!((json["duration"].as_f64().unwrap() - 1.5).abs() < 1e-12);
        let back: SimplifyDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn negative_duration_rejected_on_deserialize() {
        let json = serde_json::json!({
            "duration": -1.0,
            "tolerance": 2.0,
            "points_before": 1,
            "points_after": 1,
            "reduction_ratio": 0.0,
            "geometric_splits": 0,
            "forced_only": 0,
            "peak_work_list": 0,
            "max_discarded_deviation": 0.0,
        });
        assert!(serde_json::from_value::<SimplifyDiagnostics>(json).is_err());
    }

    #[test]
    fn report_produces_nonempty_string() {
        let config = SimplifyConfig::default();
        let (_, diag) =
            simplify_with_diagnostics(&config, &line_with_spike(), &[], &WebClock).unwrap();
        let report = diag.report();
        assert!(report.contains("Simplification Diagnostics"));
        assert!(report.contains("Geometric splits"));
        assert!(report.contains("Max discarded deviation"));
    }
}
