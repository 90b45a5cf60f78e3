//! Dependency arrow routing.
//!
//! Computes orthogonal SVG paths between rendered feature bars with local
//! obstacle avoidance. Any renderer that lays out bars as rectangles can
//! consume the paths directly.

mod geometry;
mod router;

pub use geometry::ObstacleBox;
pub use router::compute_dependency_path;
