//! Rule registry.
//!
//! Filters the host's rules to the enabled ones and answers the targeted
//! queries the scheduler needs: slack per edge, lag per edge, constraint
//! and alignment per feature, and duration validation.
//!
//! # Matching
//! - Slack rules without a scope apply to every edge; scoped rules must
//!   admit the edge on every scope they carry.
//! - Lag, constraint, and alignment queries return the *first* matching
//!   enabled rule, in input order.
//! - An empty feature allow-list on constraint, duration, and alignment
//!   rules means "all features".

use crate::calendar::WorkCalendar;
use crate::models::{ConstraintMode, DependencyKind, Feature, Rule, RuleKind};

/// A read-only view over the host's rules, pre-filtered to enabled ones.
///
/// Cheap to construct per operation; holds no state across calls.
#[derive(Debug, Clone)]
pub struct RuleSet<'a> {
    all: &'a [Rule],
    enabled: Vec<&'a Rule>,
}

/// Result of checking a feature against the enabled duration rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationCheck {
    /// Whether every applicable rule admits the feature's duration.
    pub valid: bool,
    /// Minimum of the violated rule, if any.
    pub min_days: Option<i64>,
    /// Maximum of the violated rule, if any.
    pub max_days: Option<i64>,
    /// Human-readable description of the first violation.
    pub message: Option<String>,
}

impl DurationCheck {
    fn valid() -> Self {
        Self {
            valid: true,
            min_days: None,
            max_days: None,
            message: None,
        }
    }
}

impl<'a> RuleSet<'a> {
    /// Builds a view over the enabled rules in `rules`, preserving order.
    pub fn new(rules: &'a [Rule]) -> Self {
        Self {
            all: rules,
            enabled: rules.iter().filter(|r| r.enabled).collect(),
        }
    }

    /// Builds the working-day calendar from the same rules.
    pub fn calendar(&self) -> WorkCalendar {
        WorkCalendar::from_rules(self.all)
    }

    /// Sum of buffer days from every enabled slack rule admitting the edge.
    pub fn total_slack_days(
        &self,
        kind: DependencyKind,
        source_id: &str,
        target_id: &str,
    ) -> i64 {
        self.enabled
            .iter()
            .filter_map(|rule| match &rule.kind {
                RuleKind::Slack {
                    days,
                    dependency_kinds,
                    between,
                } => {
                    let kind_ok = dependency_kinds
                        .as_ref()
                        .map_or(true, |kinds| kinds.contains(&kind));
                    let pair_ok = between.as_ref().map_or(true, |pairs| {
                        pairs.iter().any(|p| p.matches(source_id, target_id))
                    });
                    (kind_ok && pair_ok).then_some(*days)
                }
                _ => None,
            })
            .sum()
    }

    /// Signed working-day offset from the first enabled lag rule for the
    /// edge; zero when none matches.
    pub fn lag_days(&self, source_id: &str, target_id: &str) -> i64 {
        self.enabled
            .iter()
            .find_map(|rule| match &rule.kind {
                RuleKind::Lag {
                    source_id: s,
                    target_id: t,
                    days,
                } if s == source_id && t == target_id => Some(*days),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Mode of the first enabled constraint rule covering the feature.
    pub fn constraint(&self, feature_id: &str) -> Option<ConstraintMode> {
        self.enabled.iter().find_map(|rule| match &rule.kind {
            RuleKind::Constraint { mode, feature_ids }
                if applies_to(feature_ids, feature_id) =>
            {
                Some(*mode)
            }
            _ => None,
        })
    }

    /// Target weekday (0=Sunday … 6=Saturday) from the first enabled
    /// alignment rule covering the feature.
    pub fn alignment_weekday(&self, feature_id: &str) -> Option<u8> {
        self.enabled.iter().find_map(|rule| match &rule.kind {
            RuleKind::Alignment {
                weekday,
                feature_ids,
            } if applies_to(feature_ids, feature_id) => Some(*weekday),
            _ => None,
        })
    }

    /// Checks the feature's calendar-day duration against every applicable
    /// duration rule. The first violation wins.
    pub fn validate_duration(&self, feature: &Feature) -> DurationCheck {
        let actual = feature.duration_days();
        for rule in &self.enabled {
            let RuleKind::Duration {
                min_days,
                max_days,
                feature_ids,
            } = &rule.kind
            else {
                continue;
            };
            if !applies_to(feature_ids, &feature.id) {
                continue;
            }
            if let Some(min) = min_days {
                if actual < *min {
                    return DurationCheck {
                        valid: false,
                        min_days: *min_days,
                        max_days: *max_days,
                        message: Some(format!(
                            "'{}' lasts {actual} days, below the minimum of {min}",
                            feature.name
                        )),
                    };
                }
            }
            if let Some(max) = max_days {
                if actual > *max {
                    return DurationCheck {
                        valid: false,
                        min_days: *min_days,
                        max_days: *max_days,
                        message: Some(format!(
                            "'{}' lasts {actual} days, above the maximum of {max}",
                            feature.name
                        )),
                    };
                }
            }
        }
        DurationCheck::valid()
    }

    /// Enabled capacity rules, in input order.
    pub fn capacity_rules(&self) -> impl Iterator<Item = &'a Rule> + '_ {
        self.enabled.iter().copied().filter(|rule| {
            matches!(rule.kind, RuleKind::Capacity { .. })
        })
    }
}

/// An empty allow-list admits every feature.
fn applies_to(feature_ids: &[String], feature_id: &str) -> bool {
    feature_ids.is_empty() || feature_ids.iter().any(|id| id == feature_id)
}
