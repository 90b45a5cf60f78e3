//! Working-day calendar arithmetic.
//!
//! Classifies dates as working or non-working against the enabled holiday
//! and blackout rules, and shifts dates by working-day counts. Every
//! rule-aware date computation in the engine goes through this module.
//!
//! # Anchoring
//! `add_working_days` and `subtract_working_days` first skip over any
//! non-working days at the starting date, so a count of zero still lands on
//! the nearest working day in the direction of travel. With no time-off
//! rules enabled both degenerate to plain calendar-day arithmetic.
//!
//! # Precedence
//! A date is non-working if it matches *any* enabled holiday spec or falls
//! inside *any* enabled blackout range (inclusive on both ends).

use chrono::{Datelike, NaiveDate};

use crate::models::{HolidaySpec, Rule, RuleKind};

/// Upper bound on consecutive days scanned in one operation. A calendar
/// that blocks every day (e.g. all seven weekdays) saturates here instead
/// of looping.
const MAX_SCAN_DAYS: u32 = 36_525;

/// Working-day classifier and arithmetic built from enabled time-off rules.
#[derive(Debug, Clone, Default)]
pub struct WorkCalendar {
    /// Non-working weekdays, indexed by days-from-Sunday (0..=6).
    weekday_holidays: [bool; 7],
    /// Explicit non-working dates, sorted.
    date_holidays: Vec<NaiveDate>,
    /// Recurring (month, day) holidays.
    annual_holidays: Vec<(u32, u32)>,
    /// Inclusive blackout ranges.
    blackouts: Vec<(NaiveDate, NaiveDate)>,
}

impl WorkCalendar {
    /// Creates a calendar with no time off; every day is a working day.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Builds a calendar from the enabled `Holiday` and `Blackout` rules.
    /// Other rule kinds and disabled rules are ignored.
    pub fn from_rules(rules: &[Rule]) -> Self {
        let mut cal = Self::default();
        for rule in rules.iter().filter(|r| r.enabled) {
            match &rule.kind {
                RuleKind::Holiday(spec) => match spec {
                    HolidaySpec::Weekdays(days) => {
                        for &day in days {
                            if let Some(slot) = cal.weekday_holidays.get_mut(day as usize) {
                                *slot = true;
                            }
                        }
                    }
                    HolidaySpec::Dates(dates) => cal.date_holidays.extend(dates.iter().copied()),
                    HolidaySpec::Annual { month, day } => {
                        cal.annual_holidays.push((*month, *day));
                    }
                },
                RuleKind::Blackout { start, end } => cal.blackouts.push((*start, *end)),
                _ => {}
            }
        }
        cal.date_holidays.sort_unstable();
        cal
    }

    /// Whether any time off is configured at all.
    pub fn has_time_off(&self) -> bool {
        self.weekday_holidays.iter().any(|&b| b)
            || !self.date_holidays.is_empty()
            || !self.annual_holidays.is_empty()
            || !self.blackouts.is_empty()
    }

    /// Whether the date is blocked by any enabled holiday or blackout.
    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        if self.weekday_holidays[date.weekday().num_days_from_sunday() as usize] {
            return true;
        }
        if self.date_holidays.binary_search(&date).is_ok() {
            return true;
        }
        if self
            .annual_holidays
            .iter()
            .any(|&(m, d)| date.month() == m && date.day() == d)
        {
            return true;
        }
        self.blackouts
            .iter()
            .any(|&(start, end)| date >= start && date <= end)
    }

    /// The first working day at or after `date`.
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        let mut scanned = 0;
        while self.is_non_working(current) && scanned < MAX_SCAN_DAYS {
            current = day_after(current);
            scanned += 1;
        }
        current
    }

    /// The first working day at or before `date`.
    pub fn previous_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        let mut scanned = 0;
        while self.is_non_working(current) && scanned < MAX_SCAN_DAYS {
            current = day_before(current);
            scanned += 1;
        }
        current
    }

    /// Advances `from` by `days` working days.
    ///
    /// Skips non-working days at the anchor first, then steps forward one
    /// day at a time, decrementing the count on each working day. A count
    /// of zero returns the (possibly advanced) anchor. Negative counts
    /// delegate to [`WorkCalendar::subtract_working_days`].
    pub fn add_working_days(&self, from: NaiveDate, days: i64) -> NaiveDate {
        if days < 0 {
            return self.subtract_working_days(from, -days);
        }
        if !self.has_time_off() {
            return shift_days(from, days);
        }

        let mut current = self.next_working_day(from);
        let mut remaining = days;
        let mut scanned = 0;
        while remaining > 0 && scanned < MAX_SCAN_DAYS {
            current = day_after(current);
            scanned += 1;
            if !self.is_non_working(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Moves `from` back by `days` working days. Symmetric to
    /// [`WorkCalendar::add_working_days`].
    pub fn subtract_working_days(&self, from: NaiveDate, days: i64) -> NaiveDate {
        if days < 0 {
            return self.add_working_days(from, -days);
        }
        if !self.has_time_off() {
            return shift_days(from, -days);
        }

        let mut current = self.previous_working_day(from);
        let mut remaining = days;
        let mut scanned = 0;
        while remaining > 0 && scanned < MAX_SCAN_DAYS {
            current = day_before(current);
            scanned += 1;
            if !self.is_non_working(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Counts working days in the half-open range `[a, b)`.
    /// Zero when `b <= a`; calendar-day difference with no time off.
    pub fn working_days_between(&self, a: NaiveDate, b: NaiveDate) -> i64 {
        if b <= a {
            return 0;
        }
        if !self.has_time_off() {
            return (b - a).num_days();
        }

        let mut count = 0;
        let mut current = a;
        let mut scanned = 0;
        while current < b && scanned < MAX_SCAN_DAYS {
            if !self.is_non_working(current) {
                count += 1;
            }
            current = day_after(current);
            scanned += 1;
        }
        count
    }

    /// Snaps `date` forward to the next occurrence of `weekday`
    /// (0=Sunday … 6=Saturday). Identity when already on it, or when the
    /// index is out of range.
    pub fn align_to_weekday(date: NaiveDate, weekday: u8) -> NaiveDate {
        if weekday > 6 {
            return date;
        }
        let current = date.weekday().num_days_from_sunday() as i64;
        let ahead = (weekday as i64 - current).rem_euclid(7);
        shift_days(date, ahead)
    }
}

/// Calendar-day shift, saturating at the `NaiveDate` range bounds.
pub(crate) fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(chrono::TimeDelta::days(days))
        .unwrap_or(if days >= 0 {
            NaiveDate::MAX
        } else {
            NaiveDate::MIN
        })
}

fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}

fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}
