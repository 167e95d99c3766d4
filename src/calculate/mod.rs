//! Percentile comparison engine.
//!
//! Pure, synchronous computations over already-fetched profiles:
//! - Percentile resolution with league/global fallback
//! - Radar axis resolution with supplementation from the metric pool
//! - Overlay series for 2-3 entities
//! - Squad-level averages over the all-round axis set
//! - Union tables across every metric any entity reports

mod axes;
mod compare;
mod overlay;
mod squad;
mod union;

pub use axes::*;
pub use compare::*;
pub use overlay::*;
pub use squad::*;
pub use union::*;

use crate::models::{MetricSample, PercentileMode};

/// A radar needs at least this many axes to be drawn.
pub const MIN_RADAR_AXES: usize = 3;

/// Percentile the upstream feed writes for statistics it has no data for.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// Resolve the percentile to surface for a sample.
///
/// Prefers the rank matching `mode` and falls back to the other one.
/// `None` means neither rank is present.
pub fn resolve(sample: &MetricSample, mode: PercentileMode) -> Option<f64> {
    match mode {
        PercentileMode::League => sample.league_percentile.or(sample.global_percentile),
        PercentileMode::Global => sample.global_percentile.or(sample.league_percentile),
    }
}

/// Tells real statistics apart from feed placeholders.
///
/// The feed fills absent stats with `value = 0, percentile = neutral`. A
/// sample counts as real if its value is non-zero or its resolved percentile
/// differs from the neutral placeholder. A zero value with no percentile at
/// all carries no signal and is not real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultDetector {
    pub neutral_percentile: f64,
}

impl Default for DefaultDetector {
    fn default() -> Self {
        Self {
            neutral_percentile: NEUTRAL_PERCENTILE,
        }
    }
}

impl DefaultDetector {
    pub fn new(neutral_percentile: f64) -> Self {
        Self { neutral_percentile }
    }

    pub fn is_real(&self, sample: &MetricSample, mode: PercentileMode) -> bool {
        sample.value != 0.0
            || resolve(sample, mode).is_some_and(|p| p != self.neutral_percentile)
    }
}

/// Real-data check with the feed's default neutral percentile.
pub fn has_real_data(sample: &MetricSample, mode: PercentileMode) -> bool {
    DefaultDetector::default().is_real(sample, mode)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mean of the values, summed in sorted order so the result does not depend
/// on input order.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut v: Vec<f64> = values.into_iter().collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{EntityId, EntityKind, EntityProfile, MetricSample};

    /// Sample with the same rank in both pools.
    pub fn sample(key: &str, value: f64, pct: f64) -> MetricSample {
        MetricSample::new(key, key, value, Some(pct), Some(pct))
    }

    /// Sample with distinct league and global ranks.
    pub fn sample2(key: &str, value: f64, league: f64, global: f64) -> MetricSample {
        MetricSample::new(key, key, value, Some(league), Some(global))
    }

    pub fn player(id: &str, metrics: Vec<MetricSample>) -> EntityProfile {
        EntityProfile::no_data(EntityId::from(id), id, EntityKind::Player).with_metrics(metrics)
    }

    pub fn empty_player(id: &str) -> EntityProfile {
        EntityProfile::no_data(EntityId::from(id), id, EntityKind::Player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_league_prefers_league() {
        let s = MetricSample::new("k", "k", 1.0, Some(70.0), Some(40.0));
        assert_eq!(resolve(&s, PercentileMode::League), Some(70.0));
        assert_eq!(resolve(&s, PercentileMode::Global), Some(40.0));
    }

    #[test]
    fn test_resolve_falls_back_to_other_pool() {
        let league_only = MetricSample::new("k", "k", 1.0, Some(70.0), None);
        let global_only = MetricSample::new("k", "k", 1.0, None, Some(40.0));

        assert_eq!(resolve(&league_only, PercentileMode::Global), Some(70.0));
        assert_eq!(resolve(&global_only, PercentileMode::League), Some(40.0));
    }

    #[test]
    fn test_resolve_absent_is_none() {
        let s = MetricSample::new("k", "k", 1.0, None, None);
        assert_eq!(resolve(&s, PercentileMode::League), None);
        assert_eq!(resolve(&s, PercentileMode::Global), None);
    }

    #[test]
    fn test_resolve_stays_in_range() {
        let samples = [
            MetricSample::new("a", "a", 1.0, Some(250.0), None),
            MetricSample::new("b", "b", 1.0, None, Some(-10.0)),
            MetricSample::new("c", "c", 1.0, Some(0.0), Some(100.0)),
        ];
        for s in &samples {
            for mode in [PercentileMode::League, PercentileMode::Global] {
                let p = resolve(s, mode).unwrap();
                assert!((0.0..=100.0).contains(&p));
                assert_eq!(resolve(s, mode), Some(p));
            }
        }
    }

    #[test]
    fn test_real_data_predicate() {
        let placeholder = MetricSample::new("k", "k", 0.0, Some(50.0), Some(50.0));
        let zero_but_ranked = MetricSample::new("k", "k", 0.0, Some(92.0), Some(88.0));
        let valued = MetricSample::new("k", "k", 1.4, Some(50.0), None);
        let bare_zero = MetricSample::new("k", "k", 0.0, None, None);

        assert!(!has_real_data(&placeholder, PercentileMode::League));
        assert!(has_real_data(&zero_but_ranked, PercentileMode::League));
        assert!(has_real_data(&valued, PercentileMode::Global));
        assert!(!has_real_data(&bare_zero, PercentileMode::League));
    }

    #[test]
    fn test_real_data_predicate_depends_on_mode() {
        let s = MetricSample::new("k", "k", 0.0, Some(50.0), Some(61.0));
        assert!(!has_real_data(&s, PercentileMode::League));
        assert!(has_real_data(&s, PercentileMode::Global));
    }

    #[test]
    fn test_detector_with_custom_neutral() {
        let detector = DefaultDetector::new(0.0);
        let s = MetricSample::new("k", "k", 0.0, Some(50.0), None);
        let placeholder = MetricSample::new("k", "k", 0.0, Some(0.0), None);

        assert!(detector.is_real(&s, PercentileMode::League));
        assert!(!detector.is_real(&placeholder, PercentileMode::League));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(84.33333, 2), 84.33);
        assert_eq!(round_to(70.999, 0), 71.0);
        assert_eq!(round_to(1.005001, 2), 1.01);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([2.0, 4.0]), Some(3.0));
        assert_eq!(mean([0.1, 0.2, 0.3]), mean([0.3, 0.1, 0.2]));
    }
}
