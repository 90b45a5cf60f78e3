//! Schedule propagation engine for roadmap timelines.
//!
//! Computes feature dates from typed dependencies (FS, SS, FF, SF) under a
//! set of host-configured scheduling rules, and routes the dependency
//! arrows between rendered bars. The surrounding application — views,
//! persistence, drag handling, change review — feeds the engine plain
//! values and applies the updates it returns.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Feature`, `Dependency`, `Rule`,
//!   `FeaturePosition`, `FeatureUpdate`
//! - **`calendar`**: Working-day classification and arithmetic over
//!   holiday and blackout rules
//! - **`registry`**: Enabled-rule queries — slack, lag, constraints,
//!   alignment, duration limits
//! - **`scheduler`**: Propagation — incremental `auto_schedule`, full
//!   `recalculate_schedule`, advisory `check_capacity`
//! - **`routing`**: Orthogonal arrow paths between feature bars with
//!   obstacle avoidance
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, cycles)
//!
//! # Architecture
//!
//! Every operation is a pure function: it borrows caller-owned values,
//! performs no I/O, holds no state across calls, and returns plain values.
//! Outputs are deterministic for a given input order, so callers may run
//! disjoint invocations in parallel freely.

pub mod calendar;
pub mod models;
pub mod registry;
pub mod routing;
pub mod scheduler;
pub mod validation;
