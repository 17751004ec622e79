use super::curvature::Curvature;
use super::frame::Frame;
use super::math::Float3;
use super::physics::{EPSILON, G};

/// Rider-felt forces in g: `normal` pushes into the seat (1.0 at rest on
/// level track), `lateral` pushes sideways.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Forces {
    pub normal: f32,
    pub lateral: f32,
}

impl Forces {
    pub const ONE_G: Self = Self::new(1.0, 0.0);

    pub const fn new(normal: f32, lateral: f32) -> Self {
        Self { normal, lateral }
    }

    /// Forces over one step of `heart_advance` metres at `velocity`, with the
    /// step's turn given by `curvature` and `hz` steps per second.
    pub fn compute(
        curvature: Curvature,
        frame: Frame,
        velocity: f32,
        heart_advance: f32,
        hz: f32,
    ) -> Self {
        let felt = Self::felt_vector(curvature, frame, velocity, heart_advance, hz);
        Self::new(-felt.dot(frame.normal), -felt.dot(frame.lateral))
    }

    /// World-space acceleration felt by the rider, in g; gravity alone is `UP`.
    pub fn felt_vector(
        curvature: Curvature,
        frame: Frame,
        velocity: f32,
        heart_advance: f32,
        hz: f32,
    ) -> Float3 {
        if curvature.total_angle.abs() < EPSILON {
            return Float3::UP;
        }

        let (sin_roll, cos_roll) = frame.roll().sin_cos();
        let scaled_yaw = curvature.yaw_scale * curvature.delta_yaw;
        let normal_angle = -curvature.delta_pitch * cos_roll - scaled_yaw * sin_roll;
        let lateral_angle = curvature.delta_pitch * sin_roll - scaled_yaw * cos_roll;

        Float3::UP
            + frame.lateral * (velocity * hz * lateral_angle / G)
            + frame.normal * (heart_advance * hz * hz * normal_angle / G)
    }
}

impl Default for Forces {
    fn default() -> Self {
        Self::ONE_G
    }
}
