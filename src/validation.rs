//! Input validation for roadmap data.
//!
//! Checks structural integrity of features and dependencies before the
//! host hands them to the engine. Detects:
//! - Duplicate IDs
//! - Inverted date ranges
//! - Dependencies naming unknown features
//! - Self-dependencies
//! - Cycles in the dependency graph
//!
//! Advisory: the engine itself tolerates all of these (bad edges are
//! skipped, cycles are broken by visit-once marks), but the host usually
//! wants to surface them to the user.

use std::collections::{HashMap, HashSet};

use crate::models::{Dependency, Feature};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A feature ends before it starts.
    InvalidDateRange,
    /// A dependency references a feature that doesn't exist.
    UnknownFeature,
    /// A dependency's source and target are the same feature.
    SelfDependency,
    /// The dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates features and dependencies.
///
/// Checks:
/// 1. No duplicate feature IDs
/// 2. No duplicate dependency IDs
/// 3. Every feature has `end >= start`
/// 4. Every dependency references existing features
/// 5. No dependency points at its own source
/// 6. No cycles in the dependency graph
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(features: &[Feature], dependencies: &[Dependency]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut feature_ids = HashSet::new();
    for f in features {
        if !feature_ids.insert(f.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate feature ID: {}", f.id),
            ));
        }
        if f.end < f.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDateRange,
                format!("Feature '{}' ends before it starts", f.id),
            ));
        }
    }

    let mut dependency_ids = HashSet::new();
    for dep in dependencies {
        if !dependency_ids.insert(dep.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate dependency ID: {}", dep.id),
            ));
        }
        for endpoint in [&dep.source_id, &dep.target_id] {
            if !feature_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownFeature,
                    format!(
                        "Dependency '{}' references unknown feature '{endpoint}'",
                        dep.id
                    ),
                ));
            }
        }
        if dep.source_id == dep.target_id {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfDependency,
                format!("Dependency '{}' points at its own source", dep.id),
            ));
        }
    }

    if let Some(cycle_err) = detect_cycles(dependencies) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// A back-edge (reaching a node currently on the recursion stack) means a
/// cycle exists. Self-edges are reported separately and skipped here.
fn detect_cycles(dependencies: &[Dependency]) -> Option<ValidationError> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut all_ids: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for dep in dependencies {
        if dep.source_id == dep.target_id {
            continue;
        }
        adj.entry(dep.source_id.as_str())
            .or_default()
            .push(dep.target_id.as_str());
        for id in [dep.source_id.as_str(), dep.target_id.as_str()] {
            if seen.insert(id) {
                all_ids.push(id);
            }
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in &all_ids {
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving feature '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyKind;
    use chrono::NaiveDate;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn feature(id: &str) -> Feature {
        Feature::new(id)
            .with_name(id)
            .with_dates(make_date(2025, 1, 1), make_date(2025, 1, 5))
    }

    fn fs(id: &str, source: &str, target: &str) -> Dependency {
        Dependency::new(id, source, target, DependencyKind::FinishToStart)
    }

    #[test]
    fn test_valid_input() {
        let features = vec![feature("A"), feature("B"), feature("C")];
        let deps = vec![fs("d1", "A", "B"), fs("d2", "B", "C")];
        assert!(validate_input(&features, &deps).is_ok());
    }

    #[test]
    fn test_duplicate_feature_id() {
        let features = vec![feature("A"), feature("A")];
        let errors = validate_input(&features, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_duplicate_dependency_id() {
        let features = vec![feature("A"), feature("B"), feature("C")];
        let deps = vec![fs("d1", "A", "B"), fs("d1", "B", "C")];
        let errors = validate_input(&features, &deps).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("d1")));
    }

    #[test]
    fn test_inverted_date_range() {
        let bad = Feature::new("A").with_dates(make_date(2025, 1, 5), make_date(2025, 1, 1));
        let errors = validate_input(&[bad], &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDateRange));
    }

    #[test]
    fn test_unknown_feature_reference() {
        let features = vec![feature("A")];
        let deps = vec![fs("d1", "A", "GHOST")];
        let errors = validate_input(&features, &deps).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownFeature
                && e.message.contains("GHOST")));
    }

    #[test]
    fn test_self_dependency() {
        let features = vec![feature("A")];
        let deps = vec![fs("d1", "A", "A")];
        let errors = validate_input(&features, &deps).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::SelfDependency));
    }

    #[test]
    fn test_cycle_detected() {
        let features = vec![feature("A"), feature("B"), feature("C")];
        let deps = vec![fs("d1", "A", "B"), fs("d2", "B", "C"), fs("d3", "C", "A")];
        let errors = validate_input(&features, &deps).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_chain_is_not_a_cycle() {
        let features = vec![feature("A"), feature("B"), feature("C")];
        let deps = vec![fs("d1", "A", "B"), fs("d2", "B", "C")];
        assert!(validate_input(&features, &deps).is_ok());
    }

    #[test]
    fn test_multiple_errors_reported() {
        let features = vec![feature("A"), feature("A")];
        let deps = vec![fs("d1", "A", "GHOST")];
        let errors = validate_input(&features, &deps).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
