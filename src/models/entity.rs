//! Players and teams as seen by the comparison engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{EntityId, MetricSample};

/// Canonical player role used to pick a statistics template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "CB")]
    CentreBack,
    #[serde(rename = "WB")]
    WingBack,
    #[serde(rename = "DM")]
    DefensiveMidfield,
    #[serde(rename = "CM")]
    CentralMidfield,
    #[serde(rename = "AM")]
    AttackingMidfield,
    #[serde(rename = "FW")]
    Forward,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 7] = [
        PositionGroup::Goalkeeper,
        PositionGroup::CentreBack,
        PositionGroup::WingBack,
        PositionGroup::DefensiveMidfield,
        PositionGroup::CentralMidfield,
        PositionGroup::AttackingMidfield,
        PositionGroup::Forward,
    ];

    /// Short code used by the data feed.
    pub fn code(&self) -> &'static str {
        match self {
            PositionGroup::Goalkeeper => "GK",
            PositionGroup::CentreBack => "CB",
            PositionGroup::WingBack => "WB",
            PositionGroup::DefensiveMidfield => "DM",
            PositionGroup::CentralMidfield => "CM",
            PositionGroup::AttackingMidfield => "AM",
            PositionGroup::Forward => "FW",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionGroup::Goalkeeper => "Goalkeeper",
            PositionGroup::CentreBack => "Centre-Back",
            PositionGroup::WingBack => "Wing-Back",
            PositionGroup::DefensiveMidfield => "Def. Midfield",
            PositionGroup::CentralMidfield => "Central Midfield",
            PositionGroup::AttackingMidfield => "Att. Midfield",
            PositionGroup::Forward => "Forward",
        }
    }

    /// Map a free-text position ("Left-Back", "Centre-Forward", "DMF") onto a group.
    ///
    /// Wide midfielders and wingers fold into attacking midfield. Anything
    /// unrecognised lands in central midfield.
    pub fn from_position(position: &str) -> Self {
        let p = position.trim().to_lowercase();
        let is = |codes: &[&str]| codes.contains(&p.as_str());

        if p.contains("goalkeeper") || is(&["gk", "g"]) {
            return PositionGroup::Goalkeeper;
        }
        if p.contains("left-back")
            || p.contains("right-back")
            || p.contains("wing-back")
            || p.contains("wingback")
            || p.contains("full-back")
            || p.contains("fullback")
            || is(&["lb", "rb", "lwb", "rwb", "wb", "fb"])
        {
            return PositionGroup::WingBack;
        }
        if p.contains("centre-back")
            || p.contains("center-back")
            || p.contains("defender")
            || is(&["cb", "lcb", "rcb"])
        {
            return PositionGroup::CentreBack;
        }
        if p.contains("winger")
            || p.contains("left midfield")
            || p.contains("right midfield")
            || is(&["lw", "rw", "lm", "rm", "lwf", "rwf"])
        {
            return PositionGroup::AttackingMidfield;
        }
        if p.contains("centre-forward")
            || p.contains("center-forward")
            || p.contains("striker")
            || is(&["cf", "st", "ss", "fw"])
        {
            return PositionGroup::Forward;
        }
        if p.contains("attacking midfield") || is(&["am", "cam", "amf"]) {
            return PositionGroup::AttackingMidfield;
        }
        if p.contains("defensive midfield") || is(&["dm", "cdm", "dmf"]) {
            return PositionGroup::DefensiveMidfield;
        }
        if p.contains("midfield") || is(&["cm", "cmf"]) {
            return PositionGroup::CentralMidfield;
        }
        if p.contains("attack") || p.contains("forward") {
            return PositionGroup::Forward;
        }
        if p.contains("defen") || p.contains("back") {
            return PositionGroup::CentreBack;
        }

        PositionGroup::CentralMidfield
    }
}

impl std::fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for PositionGroup {
    type Err = String;

    /// Accepts feed codes and the long labels, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PositionGroup::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(needle) || g.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown position group: {}", needle))
    }
}

/// Whether a compared entity is a player or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Player,
    Team,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Player => write!(f, "player"),
            EntityKind::Team => write!(f, "team"),
        }
    }
}

/// One metric as it arrives from the data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetric {
    pub key: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,

    #[serde(default, alias = "percentile", deserialize_with = "lenient_f64")]
    pub league_percentile: Option<f64>,

    #[serde(default, alias = "gp", deserialize_with = "lenient_f64")]
    pub global_percentile: Option<f64>,
}

/// Numbers sometimes arrive as strings ("61.5") or junk; junk reads as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl PayloadMetric {
    /// Samples without a numeric value carry nothing to compare.
    fn into_sample(self) -> Option<MetricSample> {
        let value = self.value.filter(|v| v.is_finite())?;
        let key = self.key.trim().to_string();
        if key.is_empty() {
            return None;
        }
        let label = self
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| key.clone());
        Some(MetricSample::new(
            key,
            label,
            value,
            self.league_percentile,
            self.global_percentile,
        ))
    }
}

/// The per-entity percentile payload served by the data source.
///
/// Older feed files use `pg`/`comp`/`radar`/`allround`; those names are
/// accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentilePayload {
    pub has_percentiles: bool,

    #[serde(default, alias = "pg")]
    pub position_group: Option<String>,

    #[serde(default, alias = "comp")]
    pub competition_name: Option<String>,

    #[serde(default, alias = "n", alias = "name")]
    pub display_name: Option<String>,

    #[serde(default, alias = "radar")]
    pub template_metrics: Vec<PayloadMetric>,

    #[serde(default, alias = "allround")]
    pub all_metrics: Vec<PayloadMetric>,
}

/// A player or team with its metric pool, immutable for a comparison session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityProfile {
    pub id: EntityId,
    pub display_name: String,
    pub kind: EntityKind,
    pub position_group: Option<PositionGroup>,
    pub competition_name: Option<String>,
    pub has_percentiles: bool,
    pub template_metrics: Vec<MetricSample>,
    pub all_metrics: Vec<MetricSample>,
}

impl EntityProfile {
    /// An entity known by name only; shown in comparisons with no data.
    pub fn no_data(id: EntityId, display_name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind,
            position_group: None,
            competition_name: None,
            has_percentiles: false,
            template_metrics: Vec::new(),
            all_metrics: Vec::new(),
        }
    }

    /// Build a profile from a fetched payload.
    ///
    /// `hasPercentiles == false` yields an empty metric pool. Template metrics
    /// are merged into `all_metrics` so the pool is always a superset, and
    /// duplicate keys keep their first occurrence.
    pub fn from_payload(
        id: EntityId,
        display_name: Option<String>,
        kind: EntityKind,
        payload: PercentilePayload,
    ) -> Self {
        let name = display_name
            .or(payload.display_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        let mut profile = Self::no_data(id, name, kind);
        profile.competition_name = payload.competition_name.filter(|c| !c.trim().is_empty());
        if kind == EntityKind::Player {
            profile.position_group = payload
                .position_group
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| p.parse::<PositionGroup>().unwrap_or_else(|_| PositionGroup::from_position(p)));
        }

        if !payload.has_percentiles {
            return profile;
        }

        let template: Vec<MetricSample> = payload
            .template_metrics
            .into_iter()
            .filter_map(PayloadMetric::into_sample)
            .collect();
        let pool: Vec<MetricSample> = payload
            .all_metrics
            .into_iter()
            .filter_map(PayloadMetric::into_sample)
            .collect();

        profile.has_percentiles = true;
        profile.all_metrics = dedup_by_key(template.iter().cloned().chain(pool));
        profile.template_metrics = dedup_by_key(template);
        profile
    }

    pub fn with_position_group(mut self, group: PositionGroup) -> Self {
        self.position_group = Some(group);
        self
    }

    pub fn with_competition(mut self, competition: impl Into<String>) -> Self {
        self.competition_name = Some(competition.into());
        self
    }

    /// Replace the metric pool. Marks the entity as having percentile data.
    pub fn with_metrics(mut self, metrics: Vec<MetricSample>) -> Self {
        self.has_percentiles = true;
        self.all_metrics = dedup_by_key(self.template_metrics.iter().cloned().chain(metrics));
        self
    }

    /// Set the natural-template metrics; they are also added to the pool.
    pub fn with_template_metrics(mut self, metrics: Vec<MetricSample>) -> Self {
        self.has_percentiles = true;
        self.template_metrics = dedup_by_key(metrics);
        self.all_metrics = dedup_by_key(
            self.template_metrics
                .iter()
                .cloned()
                .chain(std::mem::take(&mut self.all_metrics)),
        );
        self
    }

    /// Look up a sample by key in the full pool.
    pub fn metric(&self, key: &str) -> Option<&MetricSample> {
        self.all_metrics.iter().find(|m| m.key == key)
    }

    /// True if the entity contributes anything to a comparison.
    pub fn has_data(&self) -> bool {
        self.has_percentiles && !self.all_metrics.is_empty()
    }
}

fn dedup_by_key(samples: impl IntoIterator<Item = MetricSample>) -> Vec<MetricSample> {
    let mut seen = HashSet::new();
    samples
        .into_iter()
        .filter(|m| seen.insert(m.key.clone()))
        .collect()
}
