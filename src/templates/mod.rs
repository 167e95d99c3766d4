//! Position template registry.
//!
//! Canonical, ordered metric lists per position group plus the fixed
//! all-round axis set used for squad aggregation. Keys match the data feed's
//! display-format metric names; labels are the short radar axis names.

use serde::Serialize;

use crate::models::{AxisSpec, PositionGroup};

type AxisDef = (&'static str, &'static str);

/// A static, ordered template for one position group.
#[derive(Debug)]
pub struct PositionTemplate {
    pub group: PositionGroup,
    defs: &'static [AxisDef],
}

impl PositionTemplate {
    pub fn axes(&self) -> Vec<AxisSpec> {
        to_axes(self.defs)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.defs.iter().any(|(k, _)| *k == key)
    }
}

const GOALKEEPER: &[AxisDef] = &[
    ("Accurate long passes, %", "Long Pass %"),
    ("Shots against per 90", "Shots Against"),
    ("Conceded goals per 90", "Goals Conceded"),
    ("Save rate, %", "Save %"),
    ("Aerial duels won, %", "Aerial Won %"),
];

const CENTRE_BACK: &[AxisDef] = &[
    ("Accurate passes, %", "Pass Acc %"),
    ("PAdj Interceptions", "PAdj Int"),
    ("Defensive duels won, %", "Tackle %"),
    ("Fouls per 90", "Fouls"),
    ("Aerial duels per 90", "Aerial Duels"),
    ("Aerial duels won, %", "Aerial Won %"),
    ("Long passes per 90", "Long Pass /90"),
    ("Accurate long passes, %", "Long Pass %"),
];

const WING_BACK: &[AxisDef] = &[
    ("Accurate passes, %", "Pass Acc %"),
    ("Key passes per 90", "Key Pass /90"),
    ("Crosses per 90", "Crosses /90"),
    ("Accurate crosses, %", "Cross Acc %"),
    ("Dribbles per 90", "Dribbles /90"),
    ("Successful dribbles, %", "Dribble %"),
    ("PAdj Interceptions", "PAdj Int"),
    ("Fouls per 90", "Fouls"),
    ("Aerial duels per 90", "Aerial Duels"),
    ("Aerial duels won, %", "Aerial Won %"),
];

const DEFENSIVE_MIDFIELD: &[AxisDef] = &[
    ("PAdj Interceptions", "PAdj Int"),
    ("Accurate passes, %", "Pass Acc %"),
    ("Passes per 90", "Passes /90"),
    ("Defensive duels per 90", "Def Duels /90"),
    ("Defensive duels won, %", "Def Duels %"),
    ("Fouls per 90", "Fouls"),
];

const CENTRAL_MIDFIELD: &[AxisDef] = &[
    ("Duels won, %", "Duels Won %"),
    ("PAdj Interceptions", "PAdj Int"),
    ("Accurate forward passes, %", "Fwd Pass %"),
    ("Key passes per 90", "Key Pass /90"),
    ("Long passes per 90", "Long Pass /90"),
    ("Passes to final third per 90", "Final 3rd /90"),
    ("Assists per 90", "Assists /90"),
];

const ATTACKING_MIDFIELD: &[AxisDef] = &[
    ("Goals per 90", "Goals /90"),
    ("Shots per 90", "Shots /90"),
    ("Touches in box per 90", "Box Touches"),
    ("Assists per 90", "Assists /90"),
    ("Key passes per 90", "Key Pass /90"),
    ("Passes to final third per 90", "Final 3rd /90"),
    ("Accurate passes, %", "Pass Acc %"),
    ("Dribbles per 90", "Dribbles /90"),
    ("Successful dribbles, %", "Dribble %"),
];

const FORWARD: &[AxisDef] = &[
    ("Goals per 90", "Goals /90"),
    ("Shots per 90", "Shots /90"),
    ("Shots on target, %", "On Target %"),
    ("Goal conversion, %", "Goal Conv %"),
    ("Touches in box per 90", "Box Touches"),
    ("Assists per 90", "Assists /90"),
    ("Key passes per 90", "Key Pass /90"),
    ("Accurate passes, %", "Pass Acc %"),
    ("Dribbles per 90", "Dribbles /90"),
    ("Successful dribbles, %", "Dribble %"),
];

/// The fixed 10-metric axis set for squad-level aggregation.
pub const ALL_ROUND: &[AxisDef] = &[
    ("Passes per 90", "Passes /90"),
    ("Accurate passes, %", "Pass Acc %"),
    ("Progressive passes per 90", "Prog Pass /90"),
    ("Crosses per 90", "Crosses /90"),
    ("Offensive duels won, %", "Off Duels %"),
    ("Defensive duels per 90", "Def Duels /90"),
    ("Aerial duels per 90", "Aerial /90"),
    ("Touches in box per 90", "Box Touches"),
    ("Fouls per 90", "Fouls"),
    ("Key passes per 90", "Key Pass /90"),
];

static TEMPLATES: [PositionTemplate; 7] = [
    PositionTemplate { group: PositionGroup::Goalkeeper, defs: GOALKEEPER },
    PositionTemplate { group: PositionGroup::CentreBack, defs: CENTRE_BACK },
    PositionTemplate { group: PositionGroup::WingBack, defs: WING_BACK },
    PositionTemplate { group: PositionGroup::DefensiveMidfield, defs: DEFENSIVE_MIDFIELD },
    PositionTemplate { group: PositionGroup::CentralMidfield, defs: CENTRAL_MIDFIELD },
    PositionTemplate { group: PositionGroup::AttackingMidfield, defs: ATTACKING_MIDFIELD },
    PositionTemplate { group: PositionGroup::Forward, defs: FORWARD },
];

/// Template for a position group.
pub fn template_for(group: PositionGroup) -> &'static PositionTemplate {
    let idx = match group {
        PositionGroup::Goalkeeper => 0,
        PositionGroup::CentreBack => 1,
        PositionGroup::WingBack => 2,
        PositionGroup::DefensiveMidfield => 3,
        PositionGroup::CentralMidfield => 4,
        PositionGroup::AttackingMidfield => 5,
        PositionGroup::Forward => 6,
    };
    &TEMPLATES[idx]
}

pub fn all_templates() -> &'static [PositionTemplate] {
    &TEMPLATES
}

/// The all-round axis set as owned axes.
pub fn all_round_axes() -> Vec<AxisSpec> {
    to_axes(ALL_ROUND)
}

fn to_axes(defs: &[AxisDef]) -> Vec<AxisSpec> {
    defs.iter().map(|(k, l)| AxisSpec::new(*k, *l)).collect()
}

/// Serializable catalogue entry for API/CLI listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub group: Option<PositionGroup>,
    pub label: String,
    pub axes: Vec<AxisSpec>,
}

/// All position templates followed by the all-round set.
pub fn catalogue() -> Vec<TemplateInfo> {
    let mut out: Vec<TemplateInfo> = all_templates()
        .iter()
        .map(|t| TemplateInfo {
            group: Some(t.group),
            label: format!("{} - {}", t.group.code(), t.group.label()),
            axes: t.axes(),
        })
        .collect();
    out.push(TemplateInfo {
        group: None,
        label: "All-Round".to_string(),
        axes: all_round_axes(),
    });
    out
}
