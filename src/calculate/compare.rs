use tracing::{debug, warn};

use super::{
    aggregate_with, build_overlay, build_union, raw_axis_maxima, resolve_axes_with, scale_raw,
    squad_profile, DefaultDetector, MIN_RADAR_AXES,
};
use crate::models::{
    AxisSpec, ComparedEntity, ComparisonReport, EntityId, EntityKind, EntityProfile,
    PercentileMode, PositionGroup, RadarChart, UnionRow,
};
use crate::templates::{all_round_axes, template_for};

/// Entities beyond this count are still compared but render poorly.
pub const MAX_COMPARED_ENTITIES: usize = 3;

/// The entities a user assembled for one comparison view.
#[derive(Debug, Clone)]
pub struct ComparisonSet {
    entities: Vec<EntityProfile>,
    mode: PercentileMode,
    template_override: Option<PositionGroup>,
    detector: DefaultDetector,
}

impl ComparisonSet {
    pub fn new(entities: Vec<EntityProfile>, mode: PercentileMode) -> Self {
        if entities.len() > MAX_COMPARED_ENTITIES {
            warn!(
                count = entities.len(),
                max = MAX_COMPARED_ENTITIES,
                "Comparing more entities than the radar is designed for"
            );
        }
        Self {
            entities,
            mode,
            template_override: None,
            detector: DefaultDetector::default(),
        }
    }

    /// Force a position template instead of the first entity's own group.
    pub fn with_template_override(mut self, group: Option<PositionGroup>) -> Self {
        self.template_override = group;
        self
    }

    pub fn with_detector(mut self, detector: DefaultDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Same entities under another percentile mode. Raw values are unaffected.
    pub fn with_mode(mut self, mode: PercentileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn entities(&self) -> &[EntityProfile] {
        &self.entities
    }

    pub fn mode(&self) -> PercentileMode {
        self.mode
    }

    /// Group whose position template drives the main radar.
    ///
    /// The override wins; otherwise the first entity with a known group.
    pub fn template_group(&self) -> Option<PositionGroup> {
        self.template_override
            .or_else(|| self.entities.iter().find_map(|e| e.position_group))
    }

    /// Template metrics of the first entity with data, for sets without a
    /// position group (team payloads carry their own template).
    fn natural_template(&self) -> Option<(EntityKind, Vec<AxisSpec>)> {
        self.entities
            .iter()
            .filter(|e| e.has_data())
            .find(|e| !e.template_metrics.is_empty())
            .map(|e| {
                let axes = e
                    .template_metrics
                    .iter()
                    .map(|m| AxisSpec::new(m.key.clone(), m.label.clone()))
                    .collect();
                (e.kind, axes)
            })
    }

    /// Title and base axes of the main radar.
    fn main_template(&self) -> (String, Vec<AxisSpec>) {
        if let Some(group) = self.template_group() {
            return (format!("{} Template", group.label()), template_for(group).axes());
        }
        match self.natural_template() {
            Some((EntityKind::Team, axes)) => ("Team Template".to_string(), axes),
            Some((EntityKind::Player, axes)) => ("Profile Template".to_string(), axes),
            None => ("All-Round".to_string(), all_round_axes()),
        }
    }

    pub fn template(&self) -> Vec<AxisSpec> {
        self.main_template().1
    }

    /// Radar over the main template, or `None` if it cannot be drawn.
    pub fn radar(&self) -> Option<RadarChart> {
        let (title, template) = self.main_template();
        self.radar_over(title, &template)
    }

    /// Radar over the fixed all-round axis set.
    pub fn all_round_radar(&self) -> Option<RadarChart> {
        self.radar_over("All-Round".to_string(), &all_round_axes())
    }

    fn radar_over(&self, title: String, template: &[AxisSpec]) -> Option<RadarChart> {
        if self.entities.len() < 2 {
            debug!(entities = self.entities.len(), "Radar needs at least two entities");
            return None;
        }

        let resolution = resolve_axes_with(template, &self.entities, self.mode, &self.detector);
        if resolution.axes.len() < MIN_RADAR_AXES {
            debug!(axes = resolution.axes.len(), title = %title, "Too few axes for a radar");
            return None;
        }

        let axes = resolution.axes;
        let series = build_overlay(&axes, &self.entities, self.mode);
        let raw_axis_max = raw_axis_maxima(&series, axes.len());
        let raw_scaled_values = series.iter().map(|s| scale_raw(s, &raw_axis_max)).collect();

        Some(RadarChart {
            title,
            mode: self.mode,
            axes,
            series,
            raw_axis_max,
            raw_scaled_values,
            supplemented_axes: resolution.supplemented,
        })
    }

    pub fn table(&self) -> Vec<UnionRow> {
        build_union(&self.entities, self.mode)
    }

    /// Everything the comparison view renders.
    pub fn report(&self) -> ComparisonReport {
        let template_group = self.template_group();
        let radar = self.radar();
        // Only position-group comparisons get a second, all-round radar.
        let all_round_radar = match template_group {
            Some(_) => self.all_round_radar(),
            None => None,
        };

        ComparisonReport {
            mode: self.mode,
            template_group,
            entities: self.entities.iter().map(compared_entity).collect(),
            radar,
            all_round_radar,
            table: self.table(),
            squads: Vec::new(),
        }
    }
}

fn compared_entity(e: &EntityProfile) -> ComparedEntity {
    ComparedEntity {
        id: e.id.clone(),
        display_name: e.display_name.clone(),
        position_group: e.position_group,
        competition_name: e.competition_name.clone(),
        has_data: e.has_data(),
    }
}

/// A team represented by its hydrated player profiles.
#[derive(Debug, Clone)]
pub struct Squad {
    pub id: EntityId,
    pub name: String,
    pub players: Vec<EntityProfile>,
}

/// Compare teams through their squads' all-round averages.
///
/// Each squad is aggregated, turned into a team profile and compared like
/// any other entity set. The per-squad aggregates are attached to the report.
pub fn compare_squads(
    squads: &[Squad],
    mode: PercentileMode,
    detector: &DefaultDetector,
) -> ComparisonReport {
    let aggregates: Vec<_> = squads
        .iter()
        .map(|s| aggregate_with(&s.players, mode, detector))
        .collect();

    for (squad, agg) in squads.iter().zip(&aggregates) {
        if agg.is_insufficient() {
            warn!(team = %squad.id, "No profiled players in squad");
        }
    }

    let profiles = squads
        .iter()
        .zip(&aggregates)
        .map(|(s, agg)| squad_profile(agg, s.id.clone(), s.name.clone()))
        .collect();

    let mut report = ComparisonSet::new(profiles, mode)
        .with_detector(*detector)
        .report();
    report.squads = aggregates;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{empty_player, player, sample, sample2};
    use pretty_assertions::assert_eq;

    fn forward(id: &str, metrics: Vec<crate::models::MetricSample>) -> EntityProfile {
        player(id, metrics).with_position_group(PositionGroup::Forward)
    }

    fn full_forward(id: &str, base: f64) -> EntityProfile {
        let keys = template_for(PositionGroup::Forward).axes();
        let metrics = keys
            .iter()
            .enumerate()
            .map(|(i, a)| sample2(&a.key, base + i as f64, 40.0 + i as f64, 30.0 + i as f64))
            .collect();
        forward(id, metrics)
    }

    #[test]
    fn test_template_from_first_entity_with_group() {
        let set = ComparisonSet::new(
            vec![
                empty_player("1"),
                player("2", vec![]).with_position_group(PositionGroup::CentreBack),
            ],
            PercentileMode::League,
        );
        assert_eq!(set.template_group(), Some(PositionGroup::CentreBack));
        assert_eq!(set.template().len(), template_for(PositionGroup::CentreBack).len());
    }

    #[test]
    fn test_template_override_wins() {
        let set = ComparisonSet::new(vec![full_forward("1", 1.0), full_forward("2", 2.0)], PercentileMode::League)
            .with_template_override(Some(PositionGroup::Goalkeeper));
        assert_eq!(set.template_group(), Some(PositionGroup::Goalkeeper));
        assert_eq!(set.radar().unwrap().title, "Goalkeeper Template");
    }

    #[test]
    fn test_radar_for_two_forwards() {
        let set = ComparisonSet::new(vec![full_forward("1", 1.0), full_forward("2", 2.0)], PercentileMode::League);
        let radar = set.radar().unwrap();

        assert_eq!(radar.axes.len(), 10);
        assert_eq!(radar.series.len(), 2);
        assert_eq!(radar.supplemented_axes, 0);
        assert_eq!(radar.raw_scaled_values.len(), 2);
        assert_eq!(radar.raw_axis_max.len(), 10);
        assert_eq!(radar.series[0].percentile_values[0], 40.0);
    }

    #[test]
    fn test_missing_player_keeps_other_series() {
        let set = ComparisonSet::new(
            vec![full_forward("1", 1.0), empty_player("2"), full_forward("3", 2.0)],
            PercentileMode::League,
        );
        let radar = set.radar().unwrap();

        assert_eq!(radar.series.len(), 3);
        assert!(radar.series[1].percentile_values.iter().all(|p| *p == 0.0));
        assert!(radar.series[1].raw_display_values.iter().all(|v| *v == 0.0));
        assert_eq!(radar.series[0].percentile_values[2], 42.0);
        assert_eq!(radar.series[2].raw_display_values[2], 4.0);
    }

    #[test]
    fn test_single_entity_has_no_radar() {
        let set = ComparisonSet::new(vec![full_forward("1", 1.0)], PercentileMode::League);
        assert!(set.radar().is_none());
        assert!(set.all_round_radar().is_none());
        assert_eq!(set.table().len(), 10);
    }

    #[test]
    fn test_uncovered_template_axes_still_render() {
        let set = ComparisonSet::new(
            vec![
                forward("1", vec![sample("Goals per 90", 0.0, 50.0)]),
                forward("2", vec![sample("Goals per 90", 0.0, 50.0)]),
            ],
            PercentileMode::League,
        );
        // Template axes are kept even when uncovered, so the main radar exists.
        assert!(set.radar().is_some());

        let thin = ComparisonSet::new(
            vec![empty_player("1"), empty_player("2")],
            PercentileMode::League,
        );
        // Without a group the all-round axes are used.
        assert_eq!(thin.radar().unwrap().axes.len(), 10);
    }

    #[test]
    fn test_mode_switch_changes_only_percentiles() {
        let league = ComparisonSet::new(vec![full_forward("1", 1.0), full_forward("2", 2.0)], PercentileMode::League);
        let global = league.clone().with_mode(PercentileMode::Global);

        let l = league.radar().unwrap();
        let g = global.radar().unwrap();

        assert_eq!(g.mode, PercentileMode::Global);
        assert_eq!(l.axes, g.axes);
        assert_eq!(g.series[0].percentile_values[0], 30.0);
        for (ls, gs) in l.series.iter().zip(&g.series) {
            assert_eq!(ls.raw_display_values, gs.raw_display_values);
            assert_ne!(ls.percentile_values, gs.percentile_values);
        }
        assert_eq!(l.raw_scaled_values, g.raw_scaled_values);
    }

    #[test]
    fn test_supplemented_axes_reported() {
        let a = forward(
            "1",
            vec![
                sample("Goals per 90", 0.4, 70.0),
                sample("xG per 90", 0.5, 95.0),
                sample("Progressive runs per 90", 2.0, 60.0),
            ],
        );
        let b = forward("2", vec![sample("Shots per 90", 2.0, 40.0)]);
        let radar = ComparisonSet::new(vec![a, b], PercentileMode::League)
            .radar()
            .unwrap();

        assert_eq!(radar.supplemented_axes, 1);
        assert_eq!(radar.axes.len(), 11);
        assert_eq!(radar.axes[10].key, "xG per 90");
        assert_eq!(radar.series[0].percentile_values[10], 95.0);
        assert_eq!(radar.series[1].percentile_values[10], 0.0);
    }

    #[test]
    fn test_report_for_players_has_both_radars() {
        let report = ComparisonSet::new(vec![full_forward("1", 1.0), full_forward("2", 2.0)], PercentileMode::League)
            .report();

        assert_eq!(report.template_group, Some(PositionGroup::Forward));
        assert!(report.radar.is_some());
        assert!(report.all_round_radar.is_some());
        assert_eq!(report.entities.len(), 2);
        assert!(report.entities.iter().all(|e| e.has_data));
        assert!(report.squads.is_empty());
    }

    #[test]
    fn test_report_for_teams_skips_all_round_duplicate() {
        let team = |id: &str, v: f64| {
            EntityProfile::no_data(EntityId::from(id), id, EntityKind::Team).with_metrics(vec![
                sample("Passes per 90", v, 60.0),
                sample("Crosses per 90", v, 50.0),
                sample("Fouls per 90", v, 40.0),
            ])
        };
        let report = ComparisonSet::new(vec![team("a", 10.0), team("b", 12.0)], PercentileMode::League).report();

        assert_eq!(report.template_group, None);
        assert_eq!(report.radar.as_ref().unwrap().title, "All-Round");
        assert!(report.all_round_radar.is_none());
        assert_eq!(report.table.len(), 3);
    }

    #[test]
    fn test_team_payload_radar_uses_its_own_template() {
        let team = |id: &str, pct: f64| {
            EntityProfile::no_data(EntityId::from(id), id, EntityKind::Team).with_template_metrics(vec![
                sample("Goals per 90", 1.8, pct),
                sample("xG per 90", 1.6, pct),
                sample("PPDA", 9.5, pct),
                sample("Possession, %", 54.0, pct),
            ])
        };
        let set = ComparisonSet::new(vec![team("a", 70.0), team("b", 40.0)], PercentileMode::League);

        let radar = set.radar().unwrap();
        assert_eq!(radar.title, "Team Template");
        let keys: Vec<&str> = radar.axes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["Goals per 90", "xG per 90", "PPDA", "Possession, %"]);
        assert_eq!(radar.series[0].percentile_values, vec![70.0; 4]);
        assert_eq!(radar.series[1].percentile_values, vec![40.0; 4]);
        assert!(set.report().all_round_radar.is_none());
    }

    #[test]
    fn test_natural_template_skips_entities_without_data() {
        let with_template = EntityProfile::no_data(EntityId::from("b"), "b", EntityKind::Team)
            .with_template_metrics(vec![
                sample("PPDA", 9.5, 60.0),
                sample("Possession, %", 54.0, 60.0),
                sample("xG per 90", 1.6, 60.0),
            ]);
        let empty = EntityProfile::no_data(EntityId::from("a"), "a", EntityKind::Team);
        let set = ComparisonSet::new(vec![empty, with_template], PercentileMode::League);

        let keys: Vec<String> = set.template().into_iter().map(|a| a.key).collect();
        assert_eq!(keys, vec!["PPDA", "Possession, %", "xG per 90"]);
    }

    #[test]
    fn test_compare_squads() {
        let pass = "Accurate passes, %";
        let home = Squad {
            id: EntityId::from("home"),
            name: "Home".into(),
            players: vec![
                player("1", vec![sample(pass, 83.0, 70.0), sample("Passes per 90", 40.0, 60.0)]),
                player("2", vec![sample(pass, 79.0, 55.0), sample("Crosses per 90", 2.0, 65.0)]),
                player("3", vec![sample(pass, 91.0, 88.0)]),
                player("4", vec![sample(pass, 0.0, 50.0)]),
            ],
        };
        let away = Squad {
            id: EntityId::from("away"),
            name: "Away".into(),
            players: vec![player("9", vec![sample(pass, 75.0, 40.0)]), empty_player("10")],
        };

        let report = compare_squads(&[home, away], PercentileMode::League, &DefaultDetector::default());

        assert_eq!(report.squads.len(), 2);
        assert_eq!(report.squads[0].contributing_player_count, 4);
        assert_eq!(report.squads[1].contributing_player_count, 1);
        assert_eq!(report.entities[0].display_name, "Home");
        assert!(report.all_round_radar.is_none());

        let radar = report.radar.unwrap();
        assert_eq!(radar.axes.len(), 10);
        assert_eq!(radar.series[0].percentile_values[1], 71.0);
        assert_eq!(radar.series[1].percentile_values[1], 40.0);
        assert_eq!(radar.series[1].percentile_values[0], 0.0);

        let crosses = report.table.iter().find(|r| r.key == "Crosses per 90").unwrap();
        assert!(crosses.cells[1].is_absent());
    }
}
