//! Dependency propagation.
//!
//! Two public passes plus an advisory check:
//!
//! - [`auto_schedule`] — incremental downstream propagation after a single
//!   feature moves. Calendar-day arithmetic, no rules; built for fast drag
//!   response.
//! - [`recalculate_schedule`] — full rule-aware recalculation of every
//!   feature from its predecessors, in topological order with working-day
//!   arithmetic.
//! - [`check_capacity`] — sweep-based concurrency check per capacity rule.
//!   Reports, never reschedules.
//!
//! The calendar/working-day split between the two passes is deliberate and
//! externally observable: drags preserve the exact pixel duration of
//! downstream bars, while recalculation preserves working-day durations
//! across holidays.
//!
//! All passes are total: unknown ids are skipped, cycles are terminated by
//! visit-once marks, empty inputs produce empty outputs.

mod auto;
mod capacity;
mod recalc;

pub use auto::auto_schedule;
pub use capacity::{check_capacity, CapacityWarning};
pub use recalc::recalculate_schedule;

use std::collections::HashMap;

use crate::models::Dependency;

/// Forward adjacency: source id → outgoing edges. Self-edges are dropped.
pub(crate) fn forward_adjacency(dependencies: &[Dependency]) -> HashMap<&str, Vec<&Dependency>> {
    let mut map: HashMap<&str, Vec<&Dependency>> = HashMap::new();
    for dep in dependencies {
        if dep.source_id == dep.target_id {
            continue;
        }
        map.entry(dep.source_id.as_str()).or_default().push(dep);
    }
    map
}

/// Reverse adjacency: target id → incoming edges. Self-edges are dropped.
pub(crate) fn reverse_adjacency(dependencies: &[Dependency]) -> HashMap<&str, Vec<&Dependency>> {
    let mut map: HashMap<&str, Vec<&Dependency>> = HashMap::new();
    for dep in dependencies {
        if dep.source_id == dep.target_id {
            continue;
        }
        map.entry(dep.target_id.as_str()).or_default().push(dep);
    }
    map
}
