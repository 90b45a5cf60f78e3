//! Orthogonal dependency arrow routing.
//!
//! Turns a dependency plus the rendered bar rectangles into an SVG
//! poly-line path from a pixel on the source bar to a pixel on the target
//! bar, dodging the other bars. Routing is local, not globally optimal:
//! the topology is chosen from the endpoint layout, then each free segment
//! is slid in 20 px steps until it clears every obstacle (or the probe
//! budget runs out).
//!
//! # Attachment
//! Both endpoints sit at the vertical center of their bar. The horizontal
//! edges follow the dependency kind:
//!
//! | Kind | Source | Target | Enters from |
//! |------|--------|--------|-------------|
//! | FS | right | left | left |
//! | SS | left | left | left |
//! | FF | right | right | right |
//! | SF | left | right | right |

use std::collections::HashMap;

use crate::models::{Dependency, DependencyKind, FeaturePosition};

use super::geometry::ObstacleBox;

/// Stub length out of a bar before the first turn (px).
const PADDING: f64 = 12.0;
/// Obstacle inflation on each side (px).
const OBSTACLE_MARGIN: f64 = 4.0;
/// Distance between candidate lanes when dodging (px).
const LANE_STEP: f64 = 20.0;
/// Probe budget per lane search.
const MAX_LANE_PROBES: u32 = 20;
/// Bars whose centers are this close share a row and get a straight line.
const SAME_ROW_EPSILON: f64 = 5.0;

/// Computes the SVG path (`"M x y L x y …"`) for one dependency arrow.
///
/// Returns `None` when either endpoint has no rendered position. For
/// identical inputs the output is identical.
pub fn compute_dependency_path(
    dep: &Dependency,
    positions: &HashMap<String, FeaturePosition>,
) -> Option<String> {
    let source = positions.get(&dep.source_id)?;
    let target = positions.get(&dep.target_id)?;

    let (sx, tx, enters_left) = match dep.kind {
        DependencyKind::FinishToStart => (source.right(), target.left, true),
        DependencyKind::StartToStart => (source.left, target.left, true),
        DependencyKind::FinishToFinish => (source.right(), target.right(), false),
        DependencyKind::StartToFinish => (source.left, target.right(), false),
    };
    let sy = source.center_y();
    let ty = target.center_y();

    let obstacles: Vec<ObstacleBox> = positions
        .iter()
        .filter(|(id, _)| **id != dep.source_id && **id != dep.target_id)
        .map(|(_, pos)| ObstacleBox::from_position(pos, OBSTACLE_MARGIN))
        .collect();

    let points = if (ty - sy).abs() < SAME_ROW_EPSILON {
        vec![(sx, sy), (tx, ty)]
    } else if enters_left {
        route_into_left(sx, sy, tx, ty, &obstacles)
    } else {
        route_into_right(sx, sy, tx, ty, &obstacles)
    };

    Some(to_path(&points))
}

/// Target entered from its left edge (FS, SS).
fn route_into_left(
    sx: f64,
    sy: f64,
    tx: f64,
    ty: f64,
    obstacles: &[ObstacleBox],
) -> Vec<(f64, f64)> {
    let dx = tx - sx;
    let dy = ty - sy;

    if dx > 2.0 * PADDING {
        // Room for a single elbow: right, down/up, right.
        let turn_x = find_safe_vertical_x(sx + PADDING, 1.0, sy.min(ty), sy.max(ty), obstacles);
        vec![(sx, sy), (turn_x, sy), (turn_x, ty), (tx, ty)]
    } else {
        // Target is behind or too close: S-route through a clear lane.
        let x1 = sx + PADDING;
        let x2 = tx - PADDING;
        let direction = if dy < 0.0 { -1.0 } else { 1.0 };
        let mid_y = find_safe_horizontal_y(
            (sy + ty) / 2.0,
            direction,
            x1.min(x2),
            x1.max(x2),
            obstacles,
        );
        vec![
            (sx, sy),
            (x1, sy),
            (x1, mid_y),
            (x2, mid_y),
            (x2, ty),
            (tx, ty),
        ]
    }
}

/// Target entered from its right edge (FF, SF).
fn route_into_right(
    sx: f64,
    sy: f64,
    tx: f64,
    ty: f64,
    obstacles: &[ObstacleBox],
) -> Vec<(f64, f64)> {
    let dx = tx - sx;
    let dy = ty - sy;

    if dx > 0.0 {
        // Swing past the target's right edge and come back in.
        let exit_x = find_safe_vertical_x(tx + PADDING, 1.0, sy.min(ty), sy.max(ty), obstacles);
        vec![(sx, sy), (exit_x, sy), (exit_x, ty), (tx, ty)]
    } else {
        // Wrap around the right side of both bars through a clear lane.
        let x1 = sx + PADDING;
        let x2 = tx + PADDING;
        let direction = if dy < 0.0 { -1.0 } else { 1.0 };
        let mid_y = find_safe_horizontal_y(
            (sy + ty) / 2.0,
            direction,
            x1.min(x2),
            x1.max(x2),
            obstacles,
        );
        vec![
            (sx, sy),
            (x1, sy),
            (x1, mid_y),
            (x2, mid_y),
            (x2, ty),
            (tx, ty),
        ]
    }
}

/// Slides a horizontal lane from `base_y` in `direction` (`±1.0`) until the
/// segment `[min_x, max_x]` clears every obstacle. Falls back to `base_y`
/// when the probe budget is exhausted.
fn find_safe_horizontal_y(
    base_y: f64,
    direction: f64,
    min_x: f64,
    max_x: f64,
    obstacles: &[ObstacleBox],
) -> f64 {
    for probe in 0..MAX_LANE_PROBES {
        let y = base_y + direction * LANE_STEP * f64::from(probe);
        if !obstacles
            .iter()
            .any(|o| o.blocks_horizontal(y, min_x, max_x))
        {
            return y;
        }
    }
    base_y
}

/// Vertical counterpart of [`find_safe_horizontal_y`].
fn find_safe_vertical_x(
    base_x: f64,
    direction: f64,
    min_y: f64,
    max_y: f64,
    obstacles: &[ObstacleBox],
) -> f64 {
    for probe in 0..MAX_LANE_PROBES {
        let x = base_x + direction * LANE_STEP * f64::from(probe);
        if !obstacles.iter().any(|o| o.blocks_vertical(x, min_y, max_y)) {
            return x;
        }
    }
    base_x
}

/// Formats waypoints as an SVG path, collapsing consecutive duplicates.
fn to_path(points: &[(f64, f64)]) -> String {
    let mut path = String::new();
    let mut previous: Option<(f64, f64)> = None;
    for &(x, y) in points {
        if previous == Some((x, y)) {
            continue;
        }
        if previous.is_none() {
            path.push_str(&format!("M {x} {y}"));
        } else {
            path.push_str(&format!(" L {x} {y}"));
        }
        previous = Some((x, y));
    }
    path
}
