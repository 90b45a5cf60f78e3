//! Full schedule recalculation.
//!
//! Re-derives every feature's dates from its predecessors, honoring the
//! enabled rules: slack and lag buffers, holidays and blackouts, date
//! constraints, and weekday alignment. Durations are preserved in working
//! days, so a feature spanning five working days still spans five after
//! being pushed across a holiday.
//!
//! # Ordering
//! Features are processed in topological order (Kahn's algorithm seeded
//! with the roots in input order) so every predecessor is final before its
//! dependents are computed; this is what makes the pass idempotent. Members
//! of cycles never reach the front of the queue and are appended afterward
//! in input order, still recomputed from whatever predecessor dates are
//! current.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::WorkCalendar;
use crate::models::{Dependency, DependencyKind, Feature, FeatureUpdate, Rule};
use crate::registry::RuleSet;

use super::{forward_adjacency, reverse_adjacency};

/// Recomputes every feature's dates from its predecessors under the
/// enabled rules.
///
/// Returns updates in processing order; only features whose start actually
/// moved are reported. Features under any enabled constraint rule are left
/// untouched. Running the pass twice yields no updates the second time.
pub fn recalculate_schedule(
    features: &[Feature],
    dependencies: &[Dependency],
    rules: &[Rule],
) -> Vec<FeatureUpdate> {
    let ruleset = RuleSet::new(rules);
    let calendar = ruleset.calendar();

    let mut dates: HashMap<&str, (NaiveDate, NaiveDate)> = features
        .iter()
        .map(|f| (f.id.as_str(), (f.start, f.end)))
        .collect();

    let reverse = reverse_adjacency(dependencies);
    let order = topological_order(features, dependencies);
    let mut updates = Vec::new();

    for id in order {
        if ruleset.constraint(id).is_some() {
            debug!(feature = id, "constrained, dates pinned");
            continue;
        }
        let Some(incoming) = reverse.get(id) else {
            continue;
        };
        let &(current_start, current_end) = match dates.get(id) {
            Some(d) => d,
            None => continue,
        };
        let duration = calendar.working_days_between(current_start, current_end);

        let mut candidate: Option<NaiveDate> = None;
        for dep in incoming {
            let Some(&(source_start, source_end)) = dates.get(dep.source_id.as_str()) else {
                continue;
            };
            let slack = ruleset.total_slack_days(dep.kind, &dep.source_id, &dep.target_id);

            let mut start = match dep.kind {
                DependencyKind::FinishToStart => calendar.add_working_days(source_end, slack),
                DependencyKind::StartToStart => calendar.add_working_days(source_start, slack),
                DependencyKind::FinishToFinish => calendar
                    .subtract_working_days(calendar.add_working_days(source_end, slack), duration),
                DependencyKind::StartToFinish => calendar.subtract_working_days(
                    calendar.add_working_days(source_start, slack),
                    duration,
                ),
            };

            let lag = ruleset.lag_days(&dep.source_id, &dep.target_id);
            if lag != 0 {
                start = calendar.add_working_days(start, lag);
            }

            // Most restrictive predecessor wins.
            candidate = Some(candidate.map_or(start, |best| best.max(start)));
        }

        let Some(mut new_start) = candidate else {
            continue;
        };
        if let Some(weekday) = ruleset.alignment_weekday(id) {
            new_start = WorkCalendar::align_to_weekday(new_start, weekday);
        }

        if new_start != current_start {
            let new_end = calendar.add_working_days(new_start, duration);
            debug!(feature = id, %new_start, %new_end, "rescheduled from predecessors");
            dates.insert(id, (new_start, new_end));
            updates.push(FeatureUpdate::new(id, new_start, new_end));
        }
    }

    updates
}

/// Topological order over the features.
///
/// Kahn's algorithm: roots (no incoming edges) first in input order, then
/// each feature once all its predecessors are placed. Features caught in
/// cycles are appended at the end in input order. Edges naming unknown
/// features contribute nothing.
fn topological_order<'a>(
    features: &'a [Feature],
    dependencies: &'a [Dependency],
) -> Vec<&'a str> {
    let known: HashSet<&str> = features.iter().map(|f| f.id.as_str()).collect();
    let forward = forward_adjacency(dependencies);

    let mut indegree: HashMap<&str, usize> = features.iter().map(|f| (f.id.as_str(), 0)).collect();
    for f in features {
        if let Some(edges) = forward.get(f.id.as_str()) {
            for dep in edges {
                if let Some(count) = indegree.get_mut(dep.target_id.as_str()) {
                    *count += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<&str> = features
        .iter()
        .map(|f| f.id.as_str())
        .filter(|id| indegree[id] == 0)
        .collect();
    let mut order: Vec<&str> = Vec::with_capacity(features.len());
    let mut placed: HashSet<&str> = HashSet::new();

    while let Some(id) = queue.pop_front() {
        if !placed.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(edges) = forward.get(id) {
            for dep in edges {
                let target = dep.target_id.as_str();
                if !known.contains(target) {
                    continue;
                }
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        queue.push_back(target);
                    }
                }
            }
        }
    }

    // Cycle members never drained; append them in input order.
    for f in features {
        if !placed.contains(f.id.as_str()) {
            order.push(f.id.as_str());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintMode, Rule};

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn feature(id: &str, start: NaiveDate, end: NaiveDate) -> Feature {
        Feature::new(id).with_name(id).with_dates(start, end)
    }

    fn fs(id: &str, source: &str, target: &str) -> Dependency {
        Dependency::new(id, source, target, DependencyKind::FinishToStart)
    }

    fn fs_chain() -> (Vec<Feature>, Vec<Dependency>) {
        (
            vec![
                feature("A", make_date(2025, 1, 1), make_date(2025, 1, 5)),
                feature("B", make_date(2025, 1, 10), make_date(2025, 1, 12)),
                feature("C", make_date(2025, 1, 20), make_date(2025, 1, 25)),
            ],
            vec![fs("d1", "A", "B"), fs("d2", "B", "C")],
        )
    }

    #[test]
    fn test_fs_chain_no_rules() {
        let (features, deps) = fs_chain();
        let updates = recalculate_schedule(&features, &deps, &[]);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], FeatureUpdate::new("B", make_date(2025, 1, 5), make_date(2025, 1, 7)));
        assert_eq!(updates[1], FeatureUpdate::new("C", make_date(2025, 1, 7), make_date(2025, 1, 12)));
    }

    #[test]
    fn test_recalculation_idempotent() {
        let (mut features, deps) = fs_chain();
        let first = recalculate_schedule(&features, &deps, &[]);
        for update in &first {
            let f = features.iter_mut().find(|f| f.id == update.id).unwrap();
            f.start = update.start;
            f.end = update.end;
        }
        let second = recalculate_schedule(&features, &deps, &[]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_diamond_converges_in_one_pass() {
        // A → B, A → C, B → D, C → D. A true topological order computes B
        // and C before D, so one pass settles D.
        let mut features = vec![
            feature("A", make_date(2025, 1, 1), make_date(2025, 1, 3)),
            // D listed before B so input order alone would get D wrong.
            feature("D", make_date(2025, 1, 1), make_date(2025, 1, 2)),
            feature("B", make_date(2025, 1, 1), make_date(2025, 1, 9)),
            feature("C", make_date(2025, 1, 1), make_date(2025, 1, 4)),
        ];
        let deps = vec![
            fs("d1", "A", "B"),
            fs("d2", "A", "C"),
            fs("d3", "B", "D"),
            fs("d4", "C", "D"),
        ];
        let updates = recalculate_schedule(&features, &deps, &[]);
        for update in &updates {
            let f = features.iter_mut().find(|f| f.id == update.id).unwrap();
            f.start = update.start;
            f.end = update.end;
        }
        // B lands on [Jan 3, Jan 11]; D must start at B's end, the later parent.
        let d = features.iter().find(|f| f.id == "D").unwrap();
        assert_eq!(d.start, make_date(2025, 1, 11));
        assert!(recalculate_schedule(&features, &deps, &[]).is_empty());
    }

    #[test]
    fn test_weekend_holiday_pushes_successor() {
        // Predecessor ends on Saturday; the anchor skip lands the successor
        // on Monday, and two working days later is Wednesday.
        let features = vec![
            feature("A", make_date(2025, 1, 4), make_date(2025, 1, 4)),
            feature("B", make_date(2025, 1, 13), make_date(2025, 1, 15)),
        ];
        let deps = vec![fs("d1", "A", "B")];
        let rules = vec![Rule::weekday_holiday("h1", vec![0, 6])];

        let updates = recalculate_schedule(&features, &deps, &rules);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].start, make_date(2025, 1, 6)); // Monday
        assert_eq!(updates[0].end, make_date(2025, 1, 8)); // Wednesday
    }

    #[test]
    fn test_weekend_holiday_working_anchor_stays() {
        // Predecessor ends on a working Friday: the successor starts that
        // same Friday and its two working days land it on Tuesday.
        let features = vec![
            feature("A", make_date(2025, 1, 3), make_date(2025, 1, 3)),
            feature("B", make_date(2025, 1, 13), make_date(2025, 1, 15)),
        ];
        let deps = vec![fs("d1", "A", "B")];
        let rules = vec![Rule::weekday_holiday("h1", vec![0, 6])];

        let updates = recalculate_schedule(&features, &deps, &rules);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].start, make_date(2025, 1, 3));
        assert_eq!(updates[0].end, make_date(2025, 1, 7));
    }

    #[test]
    fn test_no_produced_date_is_non_working() {
        let features = vec![
            feature("A", make_date(2025, 1, 2), make_date(2025, 1, 4)),
            feature("B", make_date(2025, 1, 10), make_date(2025, 1, 15)),
            feature("C", make_date(2025, 1, 20), make_date(2025, 1, 22)),
        ];
        let deps = vec![fs("d1", "A", "B"), fs("d2", "B", "C")];
        let rules = vec![Rule::weekday_holiday("h1", vec![0, 6])];
        let calendar = WorkCalendar::from_rules(&rules);

        for update in recalculate_schedule(&features, &deps, &rules) {
            assert!(!calendar.is_non_working(update.start), "{update:?}");
        }
    }

    #[test]
    fn test_slack_buffer() {
        let features = vec![
            feature("A", make_date(2025, 1, 5), make_date(2025, 1, 10)),
            feature("B", make_date(2025, 1, 10), make_date(2025, 1, 13)),
        ];
        let deps = vec![fs("d1", "A", "B")];
        let rules = vec![Rule::slack("s1", 2)];

        let updates = recalculate_schedule(&features, &deps, &rules);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].start, make_date(2025, 1, 12));
    }

    #[test]
    fn test_lag_lead_and_delay() {
        let features = vec![
            feature("A", make_date(2025, 1, 5), make_date(2025, 1, 10)),
            feature("B", make_date(2025, 1, 20), make_date(2025, 1, 23)),
        ];
        let deps = vec![fs("d1", "A", "B")];

        let delayed = recalculate_schedule(&features, &deps, &[Rule::lag("l1", "A", "B", 3)]);
        assert_eq!(delayed[0].start, make_date(2025, 1, 13));

        let overlapped = recalculate_schedule(&features, &deps, &[Rule::lag("l1", "A", "B", -2)]);
        assert_eq!(overlapped[0].start, make_date(2025, 1, 8));
    }

    #[test]
    fn test_ff_and_sf_derive_start_from_duration() {
        let features = vec![
            feature("A", make_date(2025, 3, 10), make_date(2025, 3, 14)),
            feature("B", make_date(2025, 3, 1), make_date(2025, 3, 4)),
        ];

        let ff = vec![Dependency::new("d1", "A", "B", DependencyKind::FinishToFinish)];
        let updates = recalculate_schedule(&features, &ff, &[]);
        // end pinned to A's end, start derived by subtracting the 3-day duration
        assert_eq!(updates[0].start, make_date(2025, 3, 11));
        assert_eq!(updates[0].end, make_date(2025, 3, 14));

        let sf = vec![Dependency::new("d1", "A", "B", DependencyKind::StartToFinish)];
        let updates = recalculate_schedule(&features, &sf, &[]);
        assert_eq!(updates[0].start, make_date(2025, 3, 7));
        assert_eq!(updates[0].end, make_date(2025, 3, 10));
    }

    #[test]
    fn test_most_restrictive_predecessor_wins() {
        let features = vec![
            feature("A", make_date(2025, 1, 1), make_date(2025, 1, 5)),
            feature("B", make_date(2025, 1, 1), make_date(2025, 1, 9)),
            feature("C", make_date(2025, 1, 1), make_date(2025, 1, 3)),
        ];
        let deps = vec![fs("d1", "A", "C"), fs("d2", "B", "C")];

        let updates = recalculate_schedule(&features, &deps, &[]);
        let c = updates.iter().find(|u| u.id == "C").unwrap();
        assert_eq!(c.start, make_date(2025, 1, 9)); // B ends later than A
    }

    #[test]
    fn test_constraint_pins_feature() {
        let features = vec![
            feature("A", make_date(2025, 1, 1), make_date(2025, 1, 5)),
            feature("B", make_date(2025, 1, 2), make_date(2025, 1, 4)),
        ];
        let deps = vec![fs("d1", "A", "B")];

        for mode in [
            ConstraintMode::FixedStart,
            ConstraintMode::FixedEnd,
            ConstraintMode::FixedBoth,
        ] {
            let rules = vec![Rule::fixed("c1", mode, vec!["B".into()])];
            let updates = recalculate_schedule(&features, &deps, &rules);
            assert!(
                updates.iter().all(|u| u.id != "B"),
                "{mode:?} should pin B"
            );
        }
    }

    #[test]
    fn test_alignment_snaps_forward() {
        let features = vec![
            feature("A", make_date(2025, 1, 1), make_date(2025, 1, 3)), // ends Fri
            feature("B", make_date(2025, 1, 20), make_date(2025, 1, 22)),
        ];
        let deps = vec![fs("d1", "A", "B")];
        // B must begin on a Monday (weekday 1).
        let rules = vec![Rule::alignment("a1", 1, vec!["B".into()])];

        let updates = recalculate_schedule(&features, &deps, &rules);
        assert_eq!(updates[0].start, make_date(2025, 1, 6)); // Mon after Fri Jan 3
        assert_eq!(updates[0].end, make_date(2025, 1, 8));
    }

    #[test]
    fn test_duration_preserved_in_working_days() {
        // B spans 5 working days; pushed across a weekend it still does.
        let features = vec![
            feature("A", make_date(2025, 1, 6), make_date(2025, 1, 9)), // Mon-Thu
            feature("B", make_date(2025, 1, 6), make_date(2025, 1, 13)), // 5 working days
        ];
        let deps = vec![fs("d1", "A", "B")];
        let rules = vec![Rule::weekday_holiday("h1", vec![0, 6])];
        let calendar = WorkCalendar::from_rules(&rules);

        let updates = recalculate_schedule(&features, &deps, &rules);
        let b = &updates[0];
        assert_eq!(b.start, make_date(2025, 1, 9));
        assert_eq!(calendar.working_days_between(b.start, b.end), 5);
    }

    #[test]
    fn test_cycle_tolerated() {
        let features = vec![
            feature("A", make_date(2025, 1, 1), make_date(2025, 1, 3)),
            feature("B", make_date(2025, 1, 3), make_date(2025, 1, 5)),
        ];
        let deps = vec![fs("d1", "A", "B"), fs("d2", "B", "A")];
        // Terminates; both members recomputed once, in input order.
        let _ = recalculate_schedule(&features, &deps, &[]);
    }

    #[test]
    fn test_missing_source_edge_ignored() {
        let features = vec![feature("B", make_date(2025, 1, 2), make_date(2025, 1, 4))];
        let deps = vec![fs("d1", "ghost", "B")];
        let updates = recalculate_schedule(&features, &deps, &[]);
        assert!(updates.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(recalculate_schedule(&[], &[], &[]).is_empty());
    }
}
