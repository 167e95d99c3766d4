//! Metric samples and percentile modes.

use serde::{Deserialize, Serialize};

/// Which peer pool a percentile rank is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PercentileMode {
    /// Peers in the same competition and position group
    #[default]
    League,
    /// Peers across all competitions, same position group
    Global,
}

impl PercentileMode {
    pub fn label(&self) -> &'static str {
        match self {
            PercentileMode::League => "League percentiles",
            PercentileMode::Global => "Global percentiles",
        }
    }
}

impl std::fmt::Display for PercentileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PercentileMode::League => write!(f, "league"),
            PercentileMode::Global => write!(f, "global"),
        }
    }
}

impl std::str::FromStr for PercentileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "league" | "competition" => Ok(PercentileMode::League),
            "global" | "all" => Ok(PercentileMode::Global),
            other => Err(format!("unknown percentile mode: {}", other)),
        }
    }
}

/// A single named statistic for one player or team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Stable identifier, e.g. "Key passes per 90"
    pub key: String,

    /// Short display name; not used for identity
    pub label: String,

    /// Raw stat value
    pub value: f64,

    /// Rank 0-100 among same-competition peers
    pub league_percentile: Option<f64>,

    /// Rank 0-100 among peers across all competitions
    pub global_percentile: Option<f64>,
}

impl MetricSample {
    /// Build a sample, normalising percentiles into [0, 100].
    ///
    /// Non-finite percentiles are treated as absent; out-of-range ones are clamped.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        value: f64,
        league_percentile: Option<f64>,
        global_percentile: Option<f64>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value,
            league_percentile: normalize_percentile(league_percentile),
            global_percentile: normalize_percentile(global_percentile),
        }
    }

    /// True if at least one percentile rank is present.
    pub fn has_percentile(&self) -> bool {
        self.league_percentile.is_some() || self.global_percentile.is_some()
    }
}

fn normalize_percentile(p: Option<f64>) -> Option<f64> {
    p.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 100.0))
}

/// One radar axis: a metric key and the label it is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSpec {
    pub key: String,
    pub label: String,
}

impl AxisSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&PercentileMode::Global).unwrap();
        assert_eq!(json, "\"global\"");

        let parsed: PercentileMode = serde_json::from_str("\"league\"").unwrap();
        assert_eq!(parsed, PercentileMode::League);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("League".parse::<PercentileMode>(), Ok(PercentileMode::League));
        assert_eq!(" global ".parse::<PercentileMode>(), Ok(PercentileMode::Global));
        assert!("weekly".parse::<PercentileMode>().is_err());
    }

    #[test]
    fn test_mode_default_is_league() {
        assert_eq!(PercentileMode::default(), PercentileMode::League);
        assert_eq!(format!("{}", PercentileMode::Global), "global");
    }

    #[test]
    fn test_sample_clamps_percentiles() {
        let s = MetricSample::new("Fouls per 90", "Fouls", 1.2, Some(104.0), Some(-3.0));
        assert_eq!(s.league_percentile, Some(100.0));
        assert_eq!(s.global_percentile, Some(0.0));
    }

    #[test]
    fn test_sample_drops_non_finite_percentiles() {
        let s = MetricSample::new("xG per 90", "xG /90", 0.3, Some(f64::NAN), None);
        assert_eq!(s.league_percentile, None);
        assert!(!s.has_percentile());
    }

    #[test]
    fn test_sample_camel_case_wire_format() {
        let s = MetricSample::new("Passes per 90", "Passes /90", 41.5, Some(62.0), None);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["leaguePercentile"], 62.0);
        assert!(json["globalPercentile"].is_null());
    }
}
