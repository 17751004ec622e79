//! kextrack - Force Vector Design track builders for roller coaster geometry.
//!
//! # Architecture
//!
//! Layered modules with inward-only dependencies:
//!
//! - **sim**: Math and physics primitives (Float3, Frame, Point, Keyframe, StepConfig)
//! - **nodes**: One builder per section kind, each a pure function of its inputs
//! - **track**: `NodeKind` dispatch over the builders
//! - **golden**: Editor reference data, replay and comparison
//!
//! # Usage
//!
//! ```ignore
//! use kextrack::sim::Float3;
//! use kextrack::track::{NodeInputs, NodeKind};
//!
//! let anchor = NodeKind::anchor_at(Float3::new(0.0, 3.0, 0.0)).evaluate(&NodeInputs::default())?;
//! ```

mod error;

pub mod golden;
pub mod nodes;
pub mod sim;
pub mod track;

pub use error::{Error, Result};
pub use sim::{Float3, Frame, Keyframe, Point, Quaternion, StepConfig};
pub use track::{NodeInputs, NodeKind, NodeOutput};
