//! Dependency model.
//!
//! A dependency is a typed edge between two features. The four kinds follow
//! the standard project-scheduling taxonomy: Finish-to-Start, Start-to-Start,
//! Finish-to-Finish, and Start-to-Finish.
//!
//! # Semantics
//! For an edge source → target (buffers applied by the full recalculation):
//!
//! | Kind | Constraint on target |
//! |------|----------------------|
//! | FS | start ≥ source end |
//! | SS | start ≥ source start |
//! | FF | end ≥ source end (start derived by subtracting duration) |
//! | SF | end ≥ source start (start derived by subtracting duration) |

use serde::{Deserialize, Serialize};

/// The four dependency kinds.
///
/// Serialized with the conventional short codes (`"FS"`, `"SS"`, `"FF"`,
/// `"SF"`) so rule and dependency blobs stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// Target starts after the source finishes.
    #[serde(rename = "FS")]
    FinishToStart,
    /// Target starts with the source.
    #[serde(rename = "SS")]
    StartToStart,
    /// Target finishes with the source.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Target finishes when the source starts.
    #[serde(rename = "SF")]
    StartToFinish,
}

/// A typed edge between two features.
///
/// Invariant: `source_id != target_id`. The engine tolerates violations
/// (such edges are skipped); `validation::validate_input` reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    /// Unique dependency identifier.
    pub id: String,
    /// Feature this edge leaves.
    pub source_id: String,
    /// Feature this edge constrains.
    pub target_id: String,
    /// Dependency kind.
    pub kind: DependencyKind,
    /// Display color for the rendered arrow, if any.
    pub color: Option<String>,
}

impl Dependency {
    /// Creates a dependency edge.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
            color: None,
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_builder() {
        let d = Dependency::new("d1", "A", "B", DependencyKind::FinishToStart)
            .with_color("#6366f1");
        assert_eq!(d.source_id, "A");
        assert_eq!(d.target_id, "B");
        assert_eq!(d.kind, DependencyKind::FinishToStart);
        assert_eq!(d.color.as_deref(), Some("#6366f1"));
    }

    #[test]
    fn test_kind_short_codes() {
        assert_eq!(
            serde_json::to_string(&DependencyKind::FinishToStart).unwrap(),
            "\"FS\""
        );
        assert_eq!(
            serde_json::to_string(&DependencyKind::StartToFinish).unwrap(),
            "\"SF\""
        );
        let kind: DependencyKind = serde_json::from_str("\"FF\"").unwrap();
        assert_eq!(kind, DependencyKind::FinishToFinish);
    }
}
