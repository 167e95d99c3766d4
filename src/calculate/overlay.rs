use super::resolve;
use crate::models::{AxisSpec, EntityProfile, OverlaySeries, PercentileMode};

/// Build one series per entity, aligned to `axes`.
///
/// A missing metric contributes 0 to both the percentile and raw series, as
/// does a present metric with no resolvable percentile (percentile only).
pub fn build_overlay(
    axes: &[AxisSpec],
    entities: &[EntityProfile],
    mode: PercentileMode,
) -> Vec<OverlaySeries> {
    entities
        .iter()
        .map(|entity| series_for(axes, entity, mode))
        .collect()
}

pub fn series_for(axes: &[AxisSpec], entity: &EntityProfile, mode: PercentileMode) -> OverlaySeries {
    let (percentile_values, raw_display_values): (Vec<f64>, Vec<f64>) = axes
        .iter()
        .map(|axis| match entity.metric(&axis.key) {
            Some(m) => (resolve(m, mode).unwrap_or(0.0), m.value),
            None => (0.0, 0.0),
        })
        .unzip();

    OverlaySeries {
        entity_id: entity.id.clone(),
        display_name: entity.display_name.clone(),
        percentile_values,
        raw_display_values,
    }
}

/// Round a per-axis maximum up to a readable scale.
///
/// Non-positive maxima scale to 1, fractions to the next tenth, single digits
/// to the next integer, anything larger to the next multiple of 5.
pub fn nice_axis_max(max: f64) -> f64 {
    // Absorbs float noise such as 0.3 * 10 = 3.0000000000000004.
    const EPS: f64 = 1e-9;

    if !max.is_finite() || max <= 0.0 {
        1.0
    } else if max <= 1.0 {
        (max * 10.0 - EPS).ceil() / 10.0
    } else if max <= 10.0 {
        (max - EPS).ceil()
    } else {
        (max / 5.0 - EPS).ceil() * 5.0
    }
}

/// Per-axis scale for raw-value rendering, from the largest value on each axis.
pub fn raw_axis_maxima(series: &[OverlaySeries], axis_count: usize) -> Vec<f64> {
    (0..axis_count)
        .map(|i| {
            let max = series
                .iter()
                .filter_map(|s| s.raw_display_values.get(i).copied())
                .fold(0.0_f64, f64::max);
            nice_axis_max(max)
        })
        .collect()
}

/// Raw values as 0-100 fractions of each axis maximum.
pub fn scale_raw(series: &OverlaySeries, maxima: &[f64]) -> Vec<f64> {
    series
        .raw_display_values
        .iter()
        .zip(maxima)
        .map(|(value, max)| (value / max * 100.0).clamp(0.0, 100.0))
        .collect()
}
