use super::frame::Frame;
use super::physics::{wrap_angle, EPSILON};

/// Angular change between two consecutive frames, split into pitch and yaw.
///
/// `yaw_scale` is `cos(pitch)` of the current frame: a yaw change near the
/// vertical sweeps less arc than the same change on level track.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Curvature {
    pub delta_pitch: f32,
    pub delta_yaw: f32,
    pub yaw_scale: f32,
    pub total_angle: f32,
}

impl Curvature {
    pub const ZERO: Self = Self {
        delta_pitch: 0.0,
        delta_yaw: 0.0,
        yaw_scale: 1.0,
        total_angle: 0.0,
    };

    /// Curvature of a simulated step; direction changes below machine
    /// epsilon count as straight track.
    pub fn from_frames(curr: Frame, prev: Frame) -> Self {
        if (curr.direction - prev.direction).magnitude() < EPSILON {
            return Self {
                yaw_scale: curr.pitch().abs().cos(),
                ..Self::ZERO
            };
        }
        Self::between(curr, prev)
    }

    /// Curvature between two frames taken from an existing path, without the
    /// straight-track shortcut.
    pub fn between(curr: Frame, prev: Frame) -> Self {
        let pitch = curr.pitch();
        let delta_pitch = wrap_angle(pitch - prev.pitch());
        let delta_yaw = wrap_angle(curr.yaw() - prev.yaw());
        let yaw_scale = pitch.abs().cos();
        let total_angle =
            (yaw_scale * yaw_scale * delta_yaw * delta_yaw + delta_pitch * delta_pitch).sqrt();
        Self {
            delta_pitch,
            delta_yaw,
            yaw_scale,
            total_angle,
        }
    }
}

impl Default for Curvature {
    fn default() -> Self {
        Self::ZERO
    }
}
