use super::math::{Float3, Quaternion};

/// Orthonormal track frame.
///
/// `direction` is the tangent of travel, `lateral` points to the rider's
/// right and `normal = direction x lateral`. On level, unbanked track the
/// normal points down (towards the rails from the heart line).
///
/// Every transform returns a fresh frame; none mutates in place.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub direction: Float3,
    pub normal: Float3,
    pub lateral: Float3,
}

impl Frame {
    pub const DEFAULT: Self = Self::new(Float3::BACK, Float3::DOWN, Float3::RIGHT);

    pub const fn new(direction: Float3, normal: Float3, lateral: Float3) -> Self {
        Self {
            direction,
            normal,
            lateral,
        }
    }

    /// Frame facing `direction` (normalized here) with `roll` radians of bank.
    ///
    /// Zero roll means the lateral is horizontal.
    pub fn from_direction_and_roll(direction: Float3, roll: f32) -> Self {
        let direction = direction.normalize();
        let yaw = (-direction.x).atan2(-direction.z);
        let flat_lateral = Quaternion::from_axis_angle(Float3::UP, yaw).mul_vec(Float3::RIGHT);
        let lateral = Quaternion::from_axis_angle(direction, -roll)
            .mul_vec(flat_lateral)
            .normalize();
        let normal = direction.cross(lateral).normalize();
        Self::new(direction, normal, lateral)
    }

    /// Frame from absolute angles in radians.
    ///
    /// Pitch is applied about world right first, then yaw about world up to the
    /// pitched axes, then roll about the resulting direction.
    pub fn from_euler(pitch: f32, yaw: f32, roll: f32) -> Self {
        let pitch_q = Quaternion::from_axis_angle(Float3::RIGHT, pitch);
        let yaw_q = Quaternion::from_axis_angle(Float3::UP, yaw);

        let direction = yaw_q.mul_vec(pitch_q.mul_vec(Float3::BACK));
        let flat_lateral = yaw_q.mul_vec(pitch_q.mul_vec(Float3::RIGHT));
        let lateral = Quaternion::from_axis_angle(direction, -roll)
            .mul_vec(flat_lateral)
            .normalize();
        let normal = direction.cross(lateral).normalize();
        Self::new(direction, normal, lateral)
    }

    /// Gram-Schmidt cleanup: keeps the direction, squares up the lateral and
    /// rebuilds the normal from the two.
    pub fn reorthonormalize(self) -> Self {
        let direction = self.direction.normalize();
        let lateral = (self.lateral - direction * direction.dot(self.lateral)).normalize();
        let normal = direction.cross(lateral).normalize();
        Self::new(direction, normal, lateral)
    }

    /// Bank angle in radians, zero when the lateral is level.
    pub fn roll(self) -> f32 {
        self.lateral.y.atan2(-self.normal.y)
    }

    pub fn pitch(self) -> f32 {
        let d = self.direction;
        d.y.atan2((d.x * d.x + d.z * d.z).sqrt())
    }

    pub fn yaw(self) -> f32 {
        (-self.direction.x).atan2(-self.direction.z)
    }

    /// Rigid rotation of all three axes about `axis` by `angle` radians.
    pub fn rotate_around(self, axis: Float3, angle: f32) -> Self {
        let q = Quaternion::from_axis_angle(axis, angle);
        Self::new(
            q.mul_vec(self.direction).normalize(),
            q.mul_vec(self.normal).normalize(),
            q.mul_vec(self.lateral).normalize(),
        )
    }

    /// Banks the frame about its own direction.
    pub fn with_roll(self, delta_roll: f32) -> Self {
        let lateral = Quaternion::from_axis_angle(self.direction, -delta_roll)
            .mul_vec(self.lateral)
            .normalize();
        let normal = self.direction.cross(lateral).normalize();
        Self::new(self.direction, normal, lateral)
    }

    /// Pitches about the horizontal axis perpendicular to the direction.
    ///
    /// The axis follows the frame's up/down sense so inverted track pitches
    /// the same way relative to the rider.
    pub fn with_pitch(self, delta_pitch: f32) -> Self {
        let up = if self.normal.y >= 0.0 {
            Float3::UP
        } else {
            Float3::DOWN
        };
        let axis = up.cross(self.direction).normalize();
        self.turned_by(Quaternion::from_axis_angle(axis, delta_pitch))
    }

    /// Yaws about world up.
    pub fn with_yaw(self, delta_yaw: f32) -> Self {
        self.turned_by(Quaternion::from_axis_angle(Float3::UP, delta_yaw))
    }

    /// Heart-line point offset along the normal (the spine when `offset` is
    /// the heart offset).
    pub fn spine_position(&self, heart_position: Float3, offset: f32) -> Float3 {
        heart_position + self.normal * offset
    }

    fn turned_by(self, q: Quaternion) -> Self {
        let direction = q.mul_vec(self.direction).normalize();
        let lateral = q.mul_vec(self.lateral).normalize();
        let normal = direction.cross(lateral).normalize();
        Self::new(direction, normal, lateral).reorthonormalize()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}
