/// Curve values sampled for a single integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub heart_offset: f32,
    pub friction: f32,
    pub resistance: f32,
    /// Roll applied during this step, radians.
    pub delta_roll: f32,
    /// Sampled roll rate stamped onto the produced point.
    pub roll_speed: f32,
    /// Velocity was overridden for this step; skip the energy update.
    pub fixed_velocity: bool,
}

impl StepParams {
    pub const fn new(heart_offset: f32, friction: f32, resistance: f32) -> Self {
        Self {
            heart_offset,
            friction,
            resistance,
            delta_roll: 0.0,
            roll_speed: 0.0,
            fixed_velocity: false,
        }
    }

    pub const fn with_roll(self, roll_speed: f32, delta_roll: f32) -> Self {
        Self {
            roll_speed,
            delta_roll,
            ..self
        }
    }

    pub const fn with_fixed_velocity(self, fixed_velocity: bool) -> Self {
        Self {
            fixed_velocity,
            ..self
        }
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self::new(super::physics::DEFAULT_HEART_OFFSET, 0.0, 0.0)
    }
}
