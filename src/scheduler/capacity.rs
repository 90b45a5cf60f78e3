//! Advisory capacity check.
//!
//! For each enabled capacity rule, groups features by the configured
//! resource key (owner or group) and computes the peak number of features
//! in flight at once with an event sweep: `+1` at each start, `-1` at each
//! end, sorted by date, running maximum. End dates are exclusive, so a
//! feature ending the day another starts does not overlap it.
//!
//! The check only reports; it never reschedules.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{CapacityGroupBy, Feature, Rule, RuleKind};
use crate::registry::RuleSet;

/// A resource whose concurrent load exceeds a capacity rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityWarning {
    /// Resource key (an owner id or a group id).
    pub resource: String,
    /// Which feature field the rule grouped by.
    pub grouping: CapacityGroupBy,
    /// Configured maximum.
    pub max_concurrent: u32,
    /// Observed peak concurrency.
    pub peak: u32,
    /// Names of the features assigned to the resource, in input order.
    pub feature_names: Vec<String>,
}

/// Checks every enabled capacity rule against the features.
///
/// Warnings are emitted per (rule, resource) whose sweep peak exceeds the
/// configured maximum, resources in first-seen input order.
pub fn check_capacity(features: &[Feature], rules: &[Rule]) -> Vec<CapacityWarning> {
    let ruleset = RuleSet::new(rules);
    let mut warnings = Vec::new();

    for rule in ruleset.capacity_rules() {
        let RuleKind::Capacity {
            max_concurrent,
            group_by,
        } = rule.kind
        else {
            continue;
        };

        let mut resource_order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&Feature>> = HashMap::new();
        for f in features {
            let key = match group_by {
                CapacityGroupBy::Owner => f.owner_id.as_deref(),
                CapacityGroupBy::Group => f.group_id.as_deref(),
            };
            let Some(key) = key else { continue };
            let members = groups.entry(key).or_default();
            if members.is_empty() {
                resource_order.push(key);
            }
            members.push(f);
        }

        for resource in resource_order {
            let members = &groups[resource];
            let peak = peak_concurrency(members);
            if peak > max_concurrent {
                debug!(
                    resource,
                    peak,
                    max_concurrent,
                    rule = rule.id.as_str(),
                    "capacity exceeded"
                );
                warnings.push(CapacityWarning {
                    resource: resource.to_string(),
                    grouping: group_by,
                    max_concurrent,
                    peak,
                    feature_names: members.iter().map(|f| f.name.clone()).collect(),
                });
            }
        }
    }

    warnings
}

/// Sweep over start/end events. Ends sort before starts on the same day so
/// back-to-back features never count as concurrent.
fn peak_concurrency(members: &[&Feature]) -> u32 {
    let mut events: Vec<(chrono::NaiveDate, i32)> = Vec::with_capacity(members.len() * 2);
    for f in members {
        events.push((f.start, 1));
        events.push((f.end, -1));
    }
    events.sort_unstable_by_key(|&(date, delta)| (date, delta));

    let mut running = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        running += delta;
        peak = peak.max(running);
    }
    peak.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn owned(id: &str, owner: &str, start: NaiveDate, end: NaiveDate) -> Feature {
        Feature::new(id)
            .with_name(id)
            .with_owner(owner)
            .with_dates(start, end)
    }

    #[test]
    fn test_overlap_exceeds_capacity() {
        let features = vec![
            owned("F1", "u1", make_date(2025, 1, 1), make_date(2025, 1, 10)),
            owned("F2", "u1", make_date(2025, 1, 5), make_date(2025, 1, 15)),
        ];
        let rules = vec![Rule::capacity("cap", 1, CapacityGroupBy::Owner)];

        let warnings = check_capacity(&features, &rules);
        assert_eq!(warnings.len(), 1);
        let w = &warnings[0];
        assert_eq!(w.resource, "u1");
        assert_eq!(w.grouping, CapacityGroupBy::Owner);
        assert_eq!(w.max_concurrent, 1);
        assert_eq!(w.peak, 2);
        assert_eq!(w.feature_names, vec!["F1", "F2"]);
    }

    #[test]
    fn test_back_to_back_does_not_overlap() {
        let features = vec![
            owned("F1", "u1", make_date(2025, 1, 1), make_date(2025, 1, 10)),
            owned("F2", "u1", make_date(2025, 1, 10), make_date(2025, 1, 20)),
        ];
        let rules = vec![Rule::capacity("cap", 1, CapacityGroupBy::Owner)];
        assert!(check_capacity(&features, &rules).is_empty());
    }

    #[test]
    fn test_peak_at_limit_is_fine() {
        let features = vec![
            owned("F1", "u1", make_date(2025, 1, 1), make_date(2025, 1, 10)),
            owned("F2", "u1", make_date(2025, 1, 5), make_date(2025, 1, 15)),
        ];
        let rules = vec![Rule::capacity("cap", 2, CapacityGroupBy::Owner)];
        assert!(check_capacity(&features, &rules).is_empty());
    }

    #[test]
    fn test_group_by_group() {
        let features = vec![
            Feature::new("F1")
                .with_name("F1")
                .with_group("platform")
                .with_dates(make_date(2025, 1, 1), make_date(2025, 1, 10)),
            Feature::new("F2")
                .with_name("F2")
                .with_group("platform")
                .with_dates(make_date(2025, 1, 3), make_date(2025, 1, 5)),
            // No group: outside every group.
            Feature::new("F3")
                .with_name("F3")
                .with_dates(make_date(2025, 1, 3), make_date(2025, 1, 5)),
        ];
        let rules = vec![Rule::capacity("cap", 1, CapacityGroupBy::Group)];

        let warnings = check_capacity(&features, &rules);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].resource, "platform");
        assert_eq!(warnings[0].feature_names, vec!["F1", "F2"]);
    }

    #[test]
    fn test_disabled_rule_checks_nothing() {
        let features = vec![
            owned("F1", "u1", make_date(2025, 1, 1), make_date(2025, 1, 10)),
            owned("F2", "u1", make_date(2025, 1, 5), make_date(2025, 1, 15)),
        ];
        let rules = vec![Rule::capacity("cap", 1, CapacityGroupBy::Owner).disabled()];
        assert!(check_capacity(&features, &rules).is_empty());
    }

    #[test]
    fn test_three_way_peak() {
        let features = vec![
            owned("F1", "u1", make_date(2025, 1, 1), make_date(2025, 1, 31)),
            owned("F2", "u1", make_date(2025, 1, 10), make_date(2025, 1, 20)),
            owned("F3", "u1", make_date(2025, 1, 15), make_date(2025, 1, 18)),
        ];
        let rules = vec![Rule::capacity("cap", 2, CapacityGroupBy::Owner)];
        let warnings = check_capacity(&features, &rules);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].peak, 3);
    }
}
