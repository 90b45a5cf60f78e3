//! Incremental auto-schedule.
//!
//! Propagates a single feature move downstream through the dependency
//! graph. Runs on every drag frame, so it stays deliberately cheap:
//! calendar-day arithmetic, no rule lookups, each node processed once.
//! The rule-aware pass is `recalculate_schedule`.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::shift_days;
use crate::models::{Dependency, DependencyKind, Feature, FeatureUpdate};

use super::forward_adjacency;

/// Applies `new_start`/`new_end` to the moved feature and pushes the change
/// through every downstream edge, preserving each target's calendar-day
/// duration.
///
/// Returns the updates in BFS order, the moved feature first. An unknown
/// `moved_id` produces no updates; edges naming unknown features are
/// skipped. Cycles terminate because each node is expanded at most once.
pub fn auto_schedule(
    moved_id: &str,
    new_start: NaiveDate,
    new_end: NaiveDate,
    features: &[Feature],
    dependencies: &[Dependency],
) -> Vec<FeatureUpdate> {
    let mut dates: HashMap<&str, (NaiveDate, NaiveDate)> = features
        .iter()
        .map(|f| (f.id.as_str(), (f.start, f.end)))
        .collect();

    if !dates.contains_key(moved_id) {
        return Vec::new();
    }
    dates.insert(moved_id, (new_start, new_end));

    let mut updates = vec![FeatureUpdate::new(moved_id, new_start, new_end)];
    let forward = forward_adjacency(dependencies);

    let mut queue: VecDeque<&str> = VecDeque::from([moved_id]);
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        let Some(&(source_start, source_end)) = dates.get(current) else {
            continue;
        };
        let Some(edges) = forward.get(current) else {
            continue;
        };

        for dep in edges {
            let target = dep.target_id.as_str();
            let Some(&(target_start, target_end)) = dates.get(target) else {
                continue;
            };
            let duration = (target_end - target_start).num_days();

            let (proposed_start, proposed_end) = match dep.kind {
                DependencyKind::FinishToStart => {
                    (source_end, shift_days(source_end, duration))
                }
                DependencyKind::StartToStart => {
                    (source_start, shift_days(source_start, duration))
                }
                DependencyKind::FinishToFinish => {
                    (shift_days(source_end, -duration), source_end)
                }
                DependencyKind::StartToFinish => {
                    (shift_days(source_start, -duration), source_start)
                }
            };

            if (proposed_start, proposed_end) != (target_start, target_end) {
                debug!(
                    source = current,
                    target,
                    kind = ?dep.kind,
                    %proposed_start,
                    %proposed_end,
                    "propagating move"
                );
                dates.insert(target, (proposed_start, proposed_end));
                updates.push(FeatureUpdate::new(target, proposed_start, proposed_end));
                queue.push_back(target);
            }
        }
    }

    updates
}
