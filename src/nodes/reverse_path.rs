use crate::sim::Point;

use super::reverse;

/// Runs a path backwards: the last point comes first and every point is
/// turned around with [`reverse::build`].
///
/// Arc lengths, forces and friction origins are carried as they are, so
/// the arcs decrease along the result and reversing twice gives back the
/// original path.
pub fn build(path: &[Point]) -> Vec<Point> {
    path.iter().rev().map(reverse::build).collect()
}
