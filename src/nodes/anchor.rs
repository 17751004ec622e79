use crate::sim::{Float3, Frame, Point};

/// Seeds a track: the only builder without an incoming point.
///
/// Angles are radians, composed as in [`Frame::from_euler`]. Arc
/// accumulators, friction origin and roll speed start at zero; everything
/// else is stored as given.
#[allow(clippy::too_many_arguments)]
pub fn build(
    position: Float3,
    pitch: f32,
    yaw: f32,
    roll: f32,
    velocity: f32,
    energy: f32,
    heart_offset: f32,
    friction: f32,
    resistance: f32,
) -> Point {
    let frame = Frame::from_euler(pitch, yaw, roll);
    Point {
        heart_position: position,
        direction: frame.direction,
        normal: frame.normal,
        lateral: frame.lateral,
        velocity,
        energy,
        normal_force: 1.0,
        lateral_force: 0.0,
        heart_arc: 0.0,
        spine_arc: 0.0,
        heart_advance: 0.0,
        friction_origin: 0.0,
        roll_speed: 0.0,
        heart_offset,
        friction,
        resistance,
    }
}
