use super::frame::Frame;
use super::math::{Float3, Quaternion};

/// Direction produced by a single step's rotation, without rebuilding the
/// whole frame.
///
/// Builders that only need the new tangent mid-step (to advance the heart
/// line before re-deriving normal and lateral) use this instead of a full
/// [`Frame`] transform. The rotation is kept so the full frame can still be
/// recovered with [`FrameChange::apply`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameChange {
    pub direction: Float3,
    rotation: Quaternion,
}

impl FrameChange {
    /// Pitch first, then yaw about world up applied to the pitched direction.
    ///
    /// Same composition as [`Frame::with_pitch`] followed by [`Frame::with_yaw`].
    pub fn from_angles(prev: Frame, delta_pitch: f32, delta_yaw: f32) -> Self {
        let up = if prev.normal.y >= 0.0 {
            Float3::UP
        } else {
            Float3::DOWN
        };
        let pitch_axis = up.cross(prev.direction).normalize();
        let pitch = Quaternion::from_axis_angle(pitch_axis, delta_pitch);
        let yaw = Quaternion::from_axis_angle(Float3::UP, delta_yaw);

        let pitched = pitch.mul_vec(prev.direction).normalize();
        Self {
            direction: yaw.mul_vec(pitched).normalize(),
            rotation: yaw * pitch,
        }
    }

    pub fn from_axis(prev: Frame, axis: Float3, angle: f32) -> Self {
        let rotation = Quaternion::from_axis_angle(axis, angle);
        Self {
            direction: rotation.mul_vec(prev.direction).normalize(),
            rotation,
        }
    }

    /// Full frame after the change, squared up.
    pub fn apply(self, prev: Frame) -> Frame {
        let lateral = self.rotation.mul_vec(prev.lateral).normalize();
        let normal = self.direction.cross(lateral).normalize();
        Frame::new(self.direction, normal, lateral).reorthonormalize()
    }
}
