use tracing::debug;

use super::{mean, resolve, round_to, DefaultDetector};
use crate::models::{
    AxisSpec, EntityId, EntityKind, EntityProfile, MetricSample, PercentileMode, SquadAggregate,
};
use crate::templates::all_round_axes;

/// Aggregate a squad over the all-round axis set.
pub fn aggregate(players: &[EntityProfile], mode: PercentileMode) -> SquadAggregate {
    aggregate_with(players, mode, &DefaultDetector::default())
}

pub fn aggregate_with(
    players: &[EntityProfile],
    mode: PercentileMode,
    detector: &DefaultDetector,
) -> SquadAggregate {
    aggregate_over(&all_round_axes(), players, mode, detector)
}

/// Aggregate a squad over an arbitrary axis set.
///
/// Per axis, only players whose sample passes the real-data check contribute.
/// The percentile average covers contributors with a resolvable percentile
/// and is rounded to an integer. The value average covers all contributors
/// and is rounded to 2 decimals. Axes with no contributors report 0 for both.
pub fn aggregate_over(
    axes: &[AxisSpec],
    players: &[EntityProfile],
    mode: PercentileMode,
    detector: &DefaultDetector,
) -> SquadAggregate {
    let mut percentiles = Vec::with_capacity(axes.len());
    let mut values = Vec::with_capacity(axes.len());
    let mut contributors_per_axis = Vec::with_capacity(axes.len());

    for axis in axes {
        let contributors: Vec<&MetricSample> = players
            .iter()
            .filter_map(|p| p.metric(&axis.key))
            .filter(|m| detector.is_real(m, mode))
            .collect();

        let pct = mean(contributors.iter().filter_map(|m| resolve(m, mode)))
            .map(|p| p.round().clamp(0.0, 100.0))
            .unwrap_or(0.0);
        let value = mean(contributors.iter().map(|m| m.value))
            .map(|v| round_to(v, 2))
            .unwrap_or(0.0);

        percentiles.push(pct);
        values.push(value);
        contributors_per_axis.push(contributors.len());
    }

    let contributing_player_count = players.iter().filter(|p| p.has_data()).count();
    debug!(
        players = players.len(),
        contributing = contributing_player_count,
        mode = %mode,
        "Aggregated squad"
    );

    SquadAggregate {
        mode,
        axes: axes.to_vec(),
        per_axis_average_percentile: percentiles,
        per_axis_average_value: values,
        per_axis_contributors: contributors_per_axis,
        contributing_player_count,
    }
}

/// Turn a squad aggregate into a team profile so squads can be compared
/// like any other entities.
///
/// Axes nobody contributed to are left out of the pool, so they show as
/// absent in union tables instead of as a real zero.
pub fn squad_profile(
    aggregate: &SquadAggregate,
    id: EntityId,
    display_name: impl Into<String>,
) -> EntityProfile {
    let profile = EntityProfile::no_data(id, display_name, EntityKind::Team);
    if aggregate.is_insufficient() {
        return profile;
    }

    let metrics: Vec<MetricSample> = aggregate
        .axes
        .iter()
        .enumerate()
        .filter(|(i, _)| aggregate.per_axis_contributors.get(*i).copied().unwrap_or(0) > 0)
        .map(|(i, axis)| {
            let pct = aggregate.per_axis_average_percentile.get(i).copied();
            let value = aggregate.per_axis_average_value.get(i).copied().unwrap_or(0.0);
            match aggregate.mode {
                PercentileMode::League => MetricSample::new(&axis.key, &axis.label, value, pct, None),
                PercentileMode::Global => MetricSample::new(&axis.key, &axis.label, value, None, pct),
            }
        })
        .collect();

    if metrics.is_empty() {
        return profile;
    }
    profile.with_metrics(metrics)
}
