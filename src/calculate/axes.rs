use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{resolve, DefaultDetector, MIN_RADAR_AXES};
use crate::models::{AxisSpec, EntityProfile, PercentileMode};

/// Outcome of axis resolution for one radar.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisResolution {
    /// Template axes in template order, then supplemented axes in rank order
    pub axes: Vec<AxisSpec>,

    /// Template axes at least one entity has real data for
    pub covered: usize,

    /// Axes appended from the entities' metric pools
    pub supplemented: usize,
}

/// Resolve the radar axes for a template and a set of entities.
pub fn resolve_axes(
    template: &[AxisSpec],
    entities: &[EntityProfile],
    mode: PercentileMode,
) -> Vec<AxisSpec> {
    resolve_axes_with(template, entities, mode, &DefaultDetector::default()).axes
}

/// Resolve the radar axes using an explicit real-data detector.
///
/// The template is kept as-is when at least [`MIN_RADAR_AXES`] of its axes are
/// covered by real data. Otherwise just enough axes are appended to bring the
/// covered count up to the minimum, drawn from metrics outside the template
/// ranked by the best percentile any entity holds for them. Ties keep the
/// order in which the metrics were first seen. Uncovered template axes are
/// never dropped.
pub fn resolve_axes_with(
    template: &[AxisSpec],
    entities: &[EntityProfile],
    mode: PercentileMode,
    detector: &DefaultDetector,
) -> AxisResolution {
    let covered = template
        .iter()
        .filter(|axis| {
            entities
                .iter()
                .filter_map(|e| e.metric(&axis.key))
                .any(|m| detector.is_real(m, mode))
        })
        .count();

    let mut axes = template.to_vec();
    if covered >= MIN_RADAR_AXES {
        return AxisResolution {
            axes,
            covered,
            supplemented: 0,
        };
    }

    let needed = MIN_RADAR_AXES - covered;
    let extra: Vec<AxisSpec> = rank_candidates(template, entities, mode)
        .into_iter()
        .take(needed)
        .collect();

    debug!(
        template_len = template.len(),
        covered,
        needed,
        appended = extra.len(),
        "Supplementing radar axes"
    );

    let supplemented = extra.len();
    axes.extend(extra);
    AxisResolution {
        axes,
        covered,
        supplemented,
    }
}

struct Candidate {
    axis: AxisSpec,
    best: Option<f64>,
}

/// Metrics outside the template, best percentile first.
fn rank_candidates(
    template: &[AxisSpec],
    entities: &[EntityProfile],
    mode: PercentileMode,
) -> Vec<AxisSpec> {
    let template_keys: HashSet<&str> = template.iter().map(|a| a.key.as_str()).collect();
    let mut pool: Vec<Candidate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entity in entities {
        for m in &entity.all_metrics {
            if template_keys.contains(m.key.as_str()) {
                continue;
            }
            let pct = resolve(m, mode);
            match index.get(m.key.as_str()) {
                Some(&i) => pool[i].best = higher(pool[i].best, pct),
                None => {
                    index.insert(m.key.as_str(), pool.len());
                    pool.push(Candidate {
                        axis: AxisSpec::new(&m.key, &m.label),
                        best: pct,
                    });
                }
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    pool.sort_by(|a, b| rank_order(a.best, b.best));
    pool.into_iter().map(|c| c.axis).collect()
}

fn higher(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Descending by percentile; unranked metrics go last.
fn rank_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
