//! Segment builders.
//!
//! Each builder is a pure function from an anchor point (plus parameters and
//! curves) to a new point sequence. Stepping builders emit one sample per
//! `1 / hz` seconds of travel using the process-wide [`StepConfig`].
//!
//! [`StepConfig`]: crate::sim::StepConfig

mod force_vector;
mod guide;
mod step;

pub mod anchor;
pub mod bridge;
pub mod copy_path;
pub mod curved;
pub mod force;
pub mod reverse;
pub mod reverse_path;

use serde::{Deserialize, Serialize};

use crate::sim::{Keyframe, Point};

pub use force_vector::path_forces;

/// How a force section's duration is measured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    /// Seconds of simulated travel.
    Time,
    /// Metres of spine arc.
    Distance,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IterationConfig {
    pub duration: f32,
    pub duration_type: DurationType,
}

impl IterationConfig {
    pub const fn new(duration: f32, duration_type: DurationType) -> Self {
        Self {
            duration,
            duration_type,
        }
    }
}

/// Keyframed curves shared by the stepping builders.
///
/// `fixed_velocity` doubles as the switch: `Some` holds the section's
/// velocity to the curve (an empty curve keeps the incoming velocity),
/// `None` lets the energy model drive it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionCurves {
    pub roll_speed: Vec<Keyframe>,
    pub fixed_velocity: Option<Vec<Keyframe>>,
    pub heart_offset: Vec<Keyframe>,
    pub friction: Vec<Keyframe>,
    pub resistance: Vec<Keyframe>,
}

/// Physics values used where a section's curves are empty.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PhysicsDefaults {
    pub heart_offset: f32,
    pub friction: f32,
    pub resistance: f32,
}

impl PhysicsDefaults {
    pub const fn new(heart_offset: f32, friction: f32, resistance: f32) -> Self {
        Self {
            heart_offset,
            friction,
            resistance,
        }
    }
}

impl From<&Point> for PhysicsDefaults {
    fn from(anchor: &Point) -> Self {
        Self::new(anchor.heart_offset, anchor.friction, anchor.resistance)
    }
}
