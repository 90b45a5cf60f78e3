//! Roadmap scheduling domain models.
//!
//! Core data types for the propagation engine: features with day-resolution
//! dates, typed dependencies between them, the scheduling rules the host
//! configures, and the pixel rectangles the arrow router consumes.
//!
//! All types are plain caller-owned values. The engine borrows them
//! read-only and reports changes as [`FeatureUpdate`] records.

mod dependency;
mod feature;
mod position;
mod rule;

pub use dependency::{Dependency, DependencyKind};
pub use feature::{Feature, FeatureUpdate};
pub use position::FeaturePosition;
pub use rule::{CapacityGroupBy, ConstraintMode, EdgeSelector, HolidaySpec, Rule, RuleKind};
