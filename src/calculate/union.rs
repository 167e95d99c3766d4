use std::collections::HashSet;

use super::resolve;
use crate::models::{EntityProfile, MetricCell, PercentileMode, UnionRow};

/// One row per metric key reported by any entity, in first-seen order.
///
/// Entities lacking a key get [`MetricCell::Absent`], never a zero. Every
/// cell holding the row's highest percentile is flagged best.
pub fn build_union(entities: &[EntityProfile], mode: PercentileMode) -> Vec<UnionRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for entity in entities {
        for m in &entity.all_metrics {
            if !seen.insert(m.key.as_str()) {
                continue;
            }
            let mut cells: Vec<MetricCell> = entities
                .iter()
                .map(|e| match e.metric(&m.key) {
                    Some(s) => MetricCell::Present {
                        value: s.value,
                        percentile: resolve(s, mode),
                        best: false,
                    },
                    None => MetricCell::Absent,
                })
                .collect();
            mark_best(&mut cells);
            rows.push(UnionRow {
                key: m.key.clone(),
                label: m.label.clone(),
                cells,
            });
        }
    }

    rows
}

fn mark_best(cells: &mut [MetricCell]) {
    let Some(max) = cells
        .iter()
        .filter_map(MetricCell::percentile)
        .reduce(f64::max)
    else {
        return;
    };

    for cell in cells.iter_mut() {
        if let MetricCell::Present {
            percentile: Some(p),
            best,
            ..
        } = cell
        {
            *best = *p == max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{empty_player, player, sample, sample2};
    use crate::models::MetricSample;
    use pretty_assertions::assert_eq;

    fn row<'a>(rows: &'a [UnionRow], key: &str) -> &'a UnionRow {
        rows.iter().find(|r| r.key == key).unwrap()
    }

    #[test]
    fn test_union_of_overlapping_key_sets() {
        let a = player("a", vec![sample("X", 1.0, 10.0), sample("Y", 2.0, 20.0), sample("Z", 3.0, 30.0)]);
        let b = player("b", vec![sample("Y", 4.0, 40.0), sample("Z", 5.0, 50.0), sample("W", 6.0, 60.0)]);

        let rows = build_union(&[a, b], PercentileMode::League);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();

        assert_eq!(keys, vec!["X", "Y", "Z", "W"]);
        assert!(row(&rows, "X").cells[1].is_absent());
        assert!(row(&rows, "W").cells[0].is_absent());
        assert_eq!(row(&rows, "Y").cells[0].value(), Some(2.0));
        assert_eq!(row(&rows, "Y").cells[1].value(), Some(4.0));
    }

    #[test]
    fn test_absent_is_not_zero() {
        let a = player("a", vec![sample("X", 0.0, 0.0)]);
        let b = empty_player("b");

        let rows = build_union(&[a, b], PercentileMode::League);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0].value(), Some(0.0));
        assert!(rows[0].cells[1].is_absent());
    }

    #[test]
    fn test_ties_are_all_best() {
        let a = player("a", vec![sample("X", 1.0, 80.0)]);
        let b = player("b", vec![sample("X", 2.0, 80.0)]);
        let c = player("c", vec![sample("X", 3.0, 75.0)]);

        let rows = build_union(&[a, b, c], PercentileMode::League);
        let flags: Vec<bool> = rows[0].cells.iter().map(MetricCell::is_best).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_best_follows_mode() {
        let a = player("a", vec![sample2("X", 1.0, 90.0, 20.0)]);
        let b = player("b", vec![sample2("X", 1.0, 30.0, 70.0)]);
        let entities = [a, b];

        let league = build_union(&entities, PercentileMode::League);
        let global = build_union(&entities, PercentileMode::Global);
        assert!(league[0].cells[0].is_best());
        assert!(global[0].cells[1].is_best());
    }

    #[test]
    fn test_unranked_cells_are_never_best() {
        let a = player("a", vec![MetricSample::new("X", "X", 5.0, None, None)]);
        let b = player("b", vec![MetricSample::new("X", "X", 9.0, None, None)]);

        let rows = build_union(&[a, b], PercentileMode::League);
        assert!(rows[0].cells.iter().all(|c| !c.is_best()));
        assert_eq!(rows[0].cells[1].value(), Some(9.0));
    }

    #[test]
    fn test_no_data_entities_produce_no_rows() {
        let rows = build_union(&[empty_player("a"), empty_player("b")], PercentileMode::League);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_label_from_first_reporter() {
        let a = player("a", vec![MetricSample::new("X", "First", 1.0, Some(10.0), None)]);
        let b = player("b", vec![MetricSample::new("X", "Second", 1.0, Some(10.0), None)]);
        let rows = build_union(&[a, b], PercentileMode::League);
        assert_eq!(rows[0].label, "First");
    }
}
