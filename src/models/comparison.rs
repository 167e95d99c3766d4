//! Comparison outputs handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::{AxisSpec, EntityId, PercentileMode, PositionGroup};

/// One entity's values aligned positionally to a radar's axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySeries {
    pub entity_id: EntityId,
    pub display_name: String,

    /// Resolved percentile per axis (0 when missing)
    pub percentile_values: Vec<f64>,

    /// Raw stat per axis (0 when missing)
    pub raw_display_values: Vec<f64>,
}

/// A renderable radar: axes plus one series per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarChart {
    pub title: String,
    pub mode: PercentileMode,
    pub axes: Vec<AxisSpec>,
    pub series: Vec<OverlaySeries>,

    /// Per-axis scale for raw-value rendering
    pub raw_axis_max: Vec<f64>,

    /// Raw values rescaled to 0-100 of `raw_axis_max`, one row per series
    pub raw_scaled_values: Vec<Vec<f64>>,

    /// Axes appended from outside the template
    pub supplemented_axes: usize,
}

/// One entity's entry in a union table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MetricCell {
    /// The entity has no sample for this key. Distinct from a real zero.
    Absent,
    Present {
        value: f64,
        percentile: Option<f64>,
        best: bool,
    },
}

impl MetricCell {
    pub fn is_absent(&self) -> bool {
        matches!(self, MetricCell::Absent)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            MetricCell::Absent => None,
            MetricCell::Present { value, .. } => Some(*value),
        }
    }

    pub fn percentile(&self) -> Option<f64> {
        match self {
            MetricCell::Absent => None,
            MetricCell::Present { percentile, .. } => *percentile,
        }
    }

    pub fn is_best(&self) -> bool {
        matches!(self, MetricCell::Present { best: true, .. })
    }
}

/// One metric across all compared entities, cells in entity order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionRow {
    pub key: String,
    pub label: String,
    pub cells: Vec<MetricCell>,
}

/// Squad-level averages over the all-round axis set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadAggregate {
    pub mode: PercentileMode,
    pub axes: Vec<AxisSpec>,
    pub per_axis_average_percentile: Vec<f64>,
    pub per_axis_average_value: Vec<f64>,

    /// Players whose sample counted towards each axis
    pub per_axis_contributors: Vec<usize>,

    /// Players with any usable profile
    pub contributing_player_count: usize,
}

impl SquadAggregate {
    /// A squad with no profiled players cannot be charted.
    pub fn is_insufficient(&self) -> bool {
        self.contributing_player_count == 0
    }
}

/// Everything a comparison view needs, in one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub mode: PercentileMode,

    /// Template the position radar was built from; `None` for teams
    pub template_group: Option<PositionGroup>,

    pub entities: Vec<ComparedEntity>,

    /// Position (or team) radar; `None` when fewer than 3 axes survive
    pub radar: Option<RadarChart>,

    /// All-round radar for player comparisons
    pub all_round_radar: Option<RadarChart>,

    pub table: Vec<UnionRow>,

    /// Populated for squad-based team comparisons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub squads: Vec<SquadAggregate>,
}

/// Header info for one compared entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparedEntity {
    pub id: EntityId,
    pub display_name: String,
    pub position_group: Option<PositionGroup>,
    pub competition_name: Option<String>,
    pub has_data: bool,
}
