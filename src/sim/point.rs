use super::frame::Frame;
use super::math::Float3;
use super::physics;

/// One arc-length sample of a track section.
///
/// Besides geometry and kinematics each point carries the curve values that
/// were in effect when it was produced (`roll_speed`, `heart_offset`,
/// `friction`, `resistance`), so a sequence can be replayed or continued
/// without re-sampling the source curves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point {
    pub heart_position: Float3,
    pub direction: Float3,
    pub normal: Float3,
    pub lateral: Float3,
    pub velocity: f32,
    pub energy: f32,
    pub normal_force: f32,
    pub lateral_force: f32,
    pub heart_arc: f32,
    pub spine_arc: f32,
    /// Distance covered by the step that produced this point.
    pub heart_advance: f32,
    /// Spine arc at which friction losses last started accumulating.
    pub friction_origin: f32,
    pub roll_speed: f32,
    pub heart_offset: f32,
    pub friction: f32,
    pub resistance: f32,
}

impl Point {
    /// Level track at (0, 3, 0) heading -Z at 10 m/s, heart offset 1.1 m,
    /// no friction or drag.
    pub const DEFAULT: Self = Self {
        heart_position: Float3::new(0.0, 3.0, 0.0),
        direction: Float3::BACK,
        normal: Float3::DOWN,
        lateral: Float3::RIGHT,
        velocity: 10.0,
        energy: 0.5 * 10.0 * 10.0 + physics::G * (3.0 - physics::CENTER_OFFSET_RATIO * 1.1),
        normal_force: 1.0,
        lateral_force: 0.0,
        heart_arc: 0.0,
        spine_arc: 0.0,
        heart_advance: 0.0,
        friction_origin: 0.0,
        roll_speed: 0.0,
        heart_offset: 1.1,
        friction: 0.0,
        resistance: 0.0,
    };

    /// Resting point with 1 g normal force and energy derived from height.
    pub fn create(
        heart_position: Float3,
        direction: Float3,
        roll: f32,
        velocity: f32,
        heart_offset: f32,
        friction: f32,
        resistance: f32,
    ) -> Self {
        let frame = Frame::from_direction_and_roll(direction, roll);
        let center = physics::center_y(heart_position, frame.normal, heart_offset);
        Self {
            heart_position,
            direction: frame.direction,
            normal: frame.normal,
            lateral: frame.lateral,
            velocity,
            energy: physics::total_energy(velocity, center, 0.0, friction),
            heart_offset,
            friction,
            resistance,
            ..Self::DEFAULT
        }
    }

    pub fn frame(&self) -> Frame {
        Frame::new(self.direction, self.normal, self.lateral)
    }

    pub fn roll(&self) -> f32 {
        self.frame().roll()
    }

    pub fn spine_position(&self, offset: f32) -> Float3 {
        self.heart_position + self.normal * offset
    }

    /// Center-of-mass height using this point's own heart offset.
    pub fn center_y(&self) -> f32 {
        physics::center_y(self.heart_position, self.normal, self.heart_offset)
    }

    /// Overrides the velocity; `reset_friction` restarts the friction
    /// accumulator at the current spine arc (a driven section adds energy).
    pub fn with_velocity(&self, velocity: f32, reset_friction: bool) -> Self {
        Self {
            velocity,
            friction_origin: if reset_friction {
                self.spine_arc
            } else {
                self.friction_origin
            },
            ..*self
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::frame::tests::assert_orthonormal;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn default_point_is_level_at_three_meters() {
        let p = Point::DEFAULT;
        assert_relative_eq!(p.heart_position.y, 3.0, epsilon = TOLERANCE);
        assert_relative_eq!(p.velocity, 10.0, epsilon = TOLERANCE);
        assert_relative_eq!(p.heart_offset, 1.1, epsilon = TOLERANCE);
        assert_relative_eq!(p.roll(), 0.0, epsilon = TOLERANCE);
        assert_orthonormal(p.frame());
    }

    #[test]
    fn default_energy_matches_energy_model() {
        let p = Point::DEFAULT;
        let expected = physics::total_energy(p.velocity, p.center_y(), 0.0, 0.0);
        assert_relative_eq!(p.energy, expected, epsilon = 1e-4);
    }

    #[test]
    fn create_applies_bank_and_keeps_physics() {
        let p = Point::create(Float3::new(0.0, 5.0, 0.0), Float3::BACK, 0.3, 15.0, 1.0, 0.02, 1e-5);
        assert_relative_eq!(p.roll(), 0.3, epsilon = TOLERANCE);
        assert_relative_eq!(p.velocity, 15.0);
        assert_relative_eq!(p.heart_offset, 1.0);
        assert_relative_eq!(p.friction, 0.02);
        assert_relative_eq!(p.heart_arc, 0.0);
        assert_relative_eq!(p.normal_force, 1.0);
    }

    #[test]
    fn with_velocity_resets_friction_origin_on_request() {
        let p = Point {
            spine_arc: 42.0,
            friction_origin: 5.0,
            ..Point::DEFAULT
        };
        let kept = p.with_velocity(20.0, false);
        assert_relative_eq!(kept.friction_origin, 5.0);
        assert_relative_eq!(kept.velocity, 20.0);

        let reset = p.with_velocity(20.0, true);
        assert_relative_eq!(reset.friction_origin, 42.0);
    }

    #[test]
    fn spine_position_offsets_along_normal() {
        let spine = Point::DEFAULT.spine_position(1.1);
        assert_relative_eq!(spine.y, 3.0 - 1.1, epsilon = TOLERANCE);
    }
}
