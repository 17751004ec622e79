//! Numeric core shared by every builder: vectors and rotations, track
//! frames, the per-sample point record, keyframe curves and the point-mass
//! energy model.

mod config;
mod curvature;
mod forces;
mod frame;
mod frame_change;
mod keyframe;
mod math;
mod point;
mod step_params;

pub mod physics;

pub use config::StepConfig;
pub use curvature::Curvature;
pub use forces::Forces;
pub use frame::Frame;
pub use frame_change::FrameChange;
pub use keyframe::{evaluate, evaluate_segment, CurveSampler, InterpolationType, Keyframe};
pub use math::{Float3, Matrix3, Quaternion};
pub use physics::{update_velocity, wrap_angle, EPSILON, G};
pub use point::Point;
pub use step_params::StepParams;

#[cfg(test)]
pub(crate) use frame::tests::assert_orthonormal;
