//! Scheduling rules.
//!
//! Rules are the host-configurable policies the full recalculation and the
//! advisory checks consult: time off (holidays, blackouts), buffers (slack,
//! lag), locks (constraints), limits (duration), weekday alignment, and
//! resource capacity.
//!
//! Each rule is a tagged variant carrying its own payload; the rule registry
//! pattern-matches on the tag. The enum doubles as the persisted config blob:
//! the host stores rules as `(id, type, name, config, enabled)` rows and the
//! serde representation of [`RuleKind`] is that config.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DependencyKind;

/// A scheduling rule with identity and an enabled flag.
///
/// Disabled rules are retained by the host but invisible to every engine
/// query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the rule participates in scheduling.
    pub enabled: bool,
    /// The rule payload.
    pub kind: RuleKind,
}

/// The rule payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleKind {
    /// Recurring or explicit non-working days.
    Holiday(HolidaySpec),

    /// Inclusive date range blocking all scheduling.
    Blackout { start: NaiveDate, end: NaiveDate },

    /// Buffer working days inserted between dependent features.
    ///
    /// Either scope absent means the rule applies to every edge; both
    /// present means both must admit the edge.
    Slack {
        days: i64,
        dependency_kinds: Option<Vec<DependencyKind>>,
        between: Option<Vec<EdgeSelector>>,
    },

    /// Signed working-day offset for one specific edge.
    /// Positive delays the target, negative overlaps it with the source.
    Lag {
        source_id: String,
        target_id: String,
        days: i64,
    },

    /// Locks feature dates against recalculation.
    /// Empty `feature_ids` applies to all features.
    Constraint {
        mode: ConstraintMode,
        feature_ids: Vec<String>,
    },

    /// Bounds on feature duration in days. Advisory.
    Duration {
        min_days: Option<i64>,
        max_days: Option<i64>,
        feature_ids: Vec<String>,
    },

    /// Weekday on which features must begin (0=Sunday … 6=Saturday).
    Alignment { weekday: u8, feature_ids: Vec<String> },

    /// Maximum concurrent features per resource. Advisory.
    Capacity {
        max_concurrent: u32,
        group_by: CapacityGroupBy,
    },
}

/// How a holiday rule selects non-working days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HolidaySpec {
    /// Weekday indices, 0=Sunday … 6=Saturday.
    Weekdays(Vec<u8>),
    /// Explicit calendar dates.
    Dates(Vec<NaiveDate>),
    /// A recurring (month, day) pair, every year.
    Annual { month: u32, day: u32 },
}

/// Which edge of a feature a constraint rule locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintMode {
    /// The start date may not move.
    FixedStart,
    /// The end date may not move.
    FixedEnd,
    /// Neither date may move.
    FixedBoth,
}

/// Resource key capacity rules group features by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityGroupBy {
    /// Group by `Feature::owner_id`.
    Owner,
    /// Group by `Feature::group_id`.
    Group,
}

/// One (source, target) pair admitted by a scoped slack rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSelector {
    pub source_id: String,
    pub target_id: String,
}

impl EdgeSelector {
    /// Creates an edge selector.
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Whether this selector admits the given edge.
    #[inline]
    pub fn matches(&self, source_id: &str, target_id: &str) -> bool {
        self.source_id == source_id && self.target_id == target_id
    }
}

impl Rule {
    /// Creates an enabled rule with the given payload.
    pub fn new(id: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            enabled: true,
            kind,
        }
    }

    /// Sets the rule name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Disables the rule.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Creates a weekday holiday rule. Saturday/Sunday is
    /// `Rule::weekday_holiday(id, vec![0, 6])`.
    pub fn weekday_holiday(id: impl Into<String>, weekdays: Vec<u8>) -> Self {
        Self::new(id, RuleKind::Holiday(HolidaySpec::Weekdays(weekdays)))
    }

    /// Creates an explicit-dates holiday rule.
    pub fn holiday_dates(id: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self::new(id, RuleKind::Holiday(HolidaySpec::Dates(dates)))
    }

    /// Creates a recurring annual holiday rule.
    pub fn annual_holiday(id: impl Into<String>, month: u32, day: u32) -> Self {
        Self::new(id, RuleKind::Holiday(HolidaySpec::Annual { month, day }))
    }

    /// Creates a blackout rule over an inclusive date range.
    pub fn blackout(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(id, RuleKind::Blackout { start, end })
    }

    /// Creates an unscoped slack rule applying to every edge.
    pub fn slack(id: impl Into<String>, days: i64) -> Self {
        Self::new(
            id,
            RuleKind::Slack {
                days,
                dependency_kinds: None,
                between: None,
            },
        )
    }

    /// Creates a lag rule for one edge.
    pub fn lag(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        days: i64,
    ) -> Self {
        Self::new(
            id,
            RuleKind::Lag {
                source_id: source_id.into(),
                target_id: target_id.into(),
                days,
            },
        )
    }

    /// Creates a constraint rule for the listed features
    /// (empty list = all features).
    pub fn fixed(id: impl Into<String>, mode: ConstraintMode, feature_ids: Vec<String>) -> Self {
        Self::new(id, RuleKind::Constraint { mode, feature_ids })
    }

    /// Creates a duration-limit rule.
    pub fn duration_limit(
        id: impl Into<String>,
        min_days: Option<i64>,
        max_days: Option<i64>,
        feature_ids: Vec<String>,
    ) -> Self {
        Self::new(
            id,
            RuleKind::Duration {
                min_days,
                max_days,
                feature_ids,
            },
        )
    }

    /// Creates a weekday alignment rule.
    pub fn alignment(id: impl Into<String>, weekday: u8, feature_ids: Vec<String>) -> Self {
        Self::new(id, RuleKind::Alignment {
            weekday,
            feature_ids,
        })
    }

    /// Creates a capacity rule.
    pub fn capacity(id: impl Into<String>, max_concurrent: u32, group_by: CapacityGroupBy) -> Self {
        Self::new(
            id,
            RuleKind::Capacity {
                max_concurrent,
                group_by,
            },
        )
    }
}
