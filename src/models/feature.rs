//! Feature model.
//!
//! A feature is the unit the engine schedules: a named bar on the roadmap
//! timeline with day-resolution start and end dates. Features reference a
//! status and optionally an owner and a group; the capacity check uses the
//! latter two as resource keys.
//!
//! # Time Representation
//! Dates are `chrono::NaiveDate`: whole days, no timezone. The end date is
//! exclusive, so `end - start` is the duration in calendar days and a
//! zero-duration feature has `start == end`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A schedulable feature on the roadmap.
///
/// Invariant: `end >= start`. The engine never mutates caller-owned
/// features; date changes are reported as [`FeatureUpdate`] records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Unique feature identifier (opaque, compared by equality only).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// First day of work (inclusive).
    pub start: NaiveDate,
    /// Day after the last day of work (exclusive).
    pub end: NaiveDate,
    /// Workflow status reference.
    pub status_id: String,
    /// Owning user, if assigned. Capacity rules may group by this.
    pub owner_id: Option<String>,
    /// Containing group, if any. Capacity rules may group by this.
    pub group_id: Option<String>,
    /// Domain-specific key-value metadata.
    pub attributes: HashMap<String, String>,
}

impl Feature {
    /// Creates a feature with the given ID. Dates default to the epoch
    /// placeholder (1970-01-01); use [`Feature::with_dates`] to set them.
    pub fn new(id: impl Into<String>) -> Self {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
        Self {
            id: id.into(),
            name: String::new(),
            start: epoch,
            end: epoch,
            status_id: String::new(),
            owner_id: None,
            group_id: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the feature name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the start and end dates.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Sets the status reference.
    pub fn with_status(mut self, status_id: impl Into<String>) -> Self {
        self.status_id = status_id.into();
        self
    }

    /// Sets the owning user.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Sets the containing group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Duration in calendar days (`end - start`).
    #[inline]
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// A date change produced by the scheduler and applied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUpdate {
    /// Feature whose dates changed.
    pub id: String,
    /// New start date.
    pub start: NaiveDate,
    /// New end date.
    pub end: NaiveDate,
}

impl FeatureUpdate {
    /// Creates an update record.
    pub fn new(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }
}
