//! Point-mass energy model shared by every stepping builder.

use std::f32::consts::PI;

use super::math::Float3;

/// Standard gravity, m/s².
pub const G: f32 = 9.80665;
/// Single-precision machine epsilon; threshold for "no change" tests.
pub const EPSILON: f32 = 1.192_093e-7;

/// Fraction of the heart offset at which the train's center of mass rides.
pub const CENTER_OFFSET_RATIO: f32 = 0.9;

pub const DEFAULT_VELOCITY: f32 = 10.0;
pub const DEFAULT_HEART_OFFSET: f32 = 1.1;
pub const DEFAULT_FRICTION: f32 = 0.021;
pub const DEFAULT_RESISTANCE: f32 = 2e-5;

/// Wraps an angle into `[-PI, PI]`.
pub fn wrap_angle(rad: f32) -> f32 {
    if (-PI..=PI).contains(&rad) {
        rad
    } else {
        (rad + 3.0 * PI) % (2.0 * PI) - PI
    }
}

/// Height of the center of mass for a heart-line sample.
pub fn center_y(heart_position: Float3, normal: Float3, heart_offset: f32) -> f32 {
    (heart_position + normal * (CENTER_OFFSET_RATIO * heart_offset)).y
}

/// Velocity after one step, from the change in kinetic energy.
///
/// Works on deltas rather than absolute energies so that large heights do
/// not swamp the per-step change. `delta_y` is the change in center-of-mass
/// height, `delta_distance` the spine advance the friction acts over, and
/// `dt` the step duration the drag acts over. Drag removes `v³·resistance·dt`.
pub fn update_velocity(
    prev_velocity: f32,
    delta_y: f32,
    delta_distance: f32,
    friction: f32,
    resistance: f32,
    dt: f32,
) -> f32 {
    let potential_gain = G * delta_y + G * friction * delta_distance;
    let drag_loss = prev_velocity * prev_velocity * prev_velocity * resistance * dt;
    let v_squared = prev_velocity * prev_velocity - 2.0 * potential_gain - 2.0 * drag_loss;
    v_squared.max(0.0).sqrt()
}

/// Total mechanical energy per unit mass: kinetic + gravitational + the work
/// already spent against friction since `friction_distance` started counting.
pub fn total_energy(velocity: f32, center_y: f32, friction_distance: f32, friction: f32) -> f32 {
    0.5 * velocity * velocity + G * center_y + G * friction_distance * friction
}
