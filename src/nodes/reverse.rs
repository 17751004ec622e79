use crate::sim::Point;

/// Turns the train around in place: direction and lateral flip, the
/// normal and every scalar stay as they were.
pub fn build(anchor: &Point) -> Point {
    Point {
        direction: -anchor.direction,
        lateral: -anchor.lateral,
        ..*anchor
    }
}
