use crate::error::{Error, Result};
use crate::nodes::bridge::{self, BridgeParams};
use crate::nodes::copy_path::{self, CopyMode};
use crate::nodes::curved::{self, CurvedParams};
use crate::nodes::force::{self, ForceProfile};
use crate::nodes::{anchor, reverse, reverse_path, IterationConfig, PhysicsDefaults, SectionCurves};
use crate::sim::{physics, Float3, Point};

/// One track element, closed over the seven builder kinds.
///
/// Each variant owns only the parameters and curves its builder needs;
/// upstream points and paths arrive through [`NodeInputs`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Anchor {
        position: Float3,
        /// Radians.
        pitch: f32,
        yaw: f32,
        roll: f32,
        velocity: f32,
        energy: f32,
        heart_offset: f32,
        friction: f32,
        resistance: f32,
    },
    Curved {
        params: CurvedParams,
        curves: SectionCurves,
    },
    Force {
        config: IterationConfig,
        profile: ForceProfile,
        curves: SectionCurves,
    },
    Bridge {
        params: BridgeParams,
        curves: SectionCurves,
    },
    Reverse,
    ReversePath,
    CopyPath {
        mode: CopyMode,
    },
}

/// Upstream outputs a node reads. Missing entries only matter to kinds that
/// need them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeInputs<'a> {
    pub anchor: Option<&'a Point>,
    /// Bridge destination.
    pub target: Option<&'a Point>,
    pub path: Option<&'a [Point]>,
}

impl<'a> NodeInputs<'a> {
    pub fn anchor(anchor: &'a Point) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::default()
        }
    }

    pub fn path(path: &'a [Point]) -> Self {
        Self {
            path: Some(path),
            ..Self::default()
        }
    }

    pub fn with_target(self, target: &'a Point) -> Self {
        Self {
            target: Some(target),
            ..self
        }
    }

    pub fn with_path(self, path: &'a [Point]) -> Self {
        Self {
            path: Some(path),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    Anchor(Point),
    Path(Vec<Point>),
}

impl NodeOutput {
    /// Point a downstream node continues from: the anchor itself, or the
    /// last point of a path.
    pub fn end_anchor(&self) -> Option<&Point> {
        match self {
            NodeOutput::Anchor(point) => Some(point),
            NodeOutput::Path(points) => points.last(),
        }
    }

    pub fn as_path(&self) -> Option<&[Point]> {
        match self {
            NodeOutput::Anchor(_) => None,
            NodeOutput::Path(points) => Some(points),
        }
    }

    pub fn into_path(self) -> Option<Vec<Point>> {
        match self {
            NodeOutput::Anchor(_) => None,
            NodeOutput::Path(points) => Some(points),
        }
    }
}

impl NodeKind {
    /// Level anchor heading -Z with the editor's default physics.
    pub fn anchor_at(position: Float3) -> Self {
        let velocity = physics::DEFAULT_VELOCITY;
        let heart_offset = physics::DEFAULT_HEART_OFFSET;
        let friction = physics::DEFAULT_FRICTION;
        let center_y = physics::center_y(position, Float3::DOWN, heart_offset);
        NodeKind::Anchor {
            position,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            velocity,
            energy: physics::total_energy(velocity, center_y, 0.0, friction),
            heart_offset,
            friction,
            resistance: physics::DEFAULT_RESISTANCE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Anchor { .. } => "anchor",
            NodeKind::Curved { .. } => "curved",
            NodeKind::Force { .. } => "force",
            NodeKind::Bridge { .. } => "bridge",
            NodeKind::Reverse => "reverse",
            NodeKind::ReversePath => "reverse_path",
            NodeKind::CopyPath { .. } => "copy_path",
        }
    }

    /// Runs this node's builder on `inputs`.
    ///
    /// Stepping builders fall back to the incoming anchor's heart offset,
    /// friction and resistance wherever their curves are empty.
    pub fn evaluate(&self, inputs: &NodeInputs<'_>) -> Result<NodeOutput> {
        let output = match self {
            NodeKind::Anchor {
                position,
                pitch,
                yaw,
                roll,
                velocity,
                energy,
                heart_offset,
                friction,
                resistance,
            } => NodeOutput::Anchor(anchor::build(
                *position,
                *pitch,
                *yaw,
                *roll,
                *velocity,
                *energy,
                *heart_offset,
                *friction,
                *resistance,
            )),
            NodeKind::Curved { params, curves } => {
                let start = self.require(inputs.anchor, "anchor")?;
                NodeOutput::Path(curved::build(start, params, curves, start.into()))
            }
            NodeKind::Force {
                config,
                profile,
                curves,
            } => {
                let start = self.require(inputs.anchor, "anchor")?;
                NodeOutput::Path(force::build(start, config, profile, curves, start.into()))
            }
            NodeKind::Bridge { params, curves } => {
                let start = self.require(inputs.anchor, "anchor")?;
                let target = self.require(inputs.target, "target")?;
                NodeOutput::Path(bridge::build(start, target, params, curves, start.into()))
            }
            NodeKind::Reverse => {
                NodeOutput::Anchor(reverse::build(self.require(inputs.anchor, "anchor")?))
            }
            NodeKind::ReversePath => {
                NodeOutput::Path(reverse_path::build(self.require(inputs.path, "path")?))
            }
            NodeKind::CopyPath { mode } => {
                let start = self.require(inputs.anchor, "anchor")?;
                let source = self.require(inputs.path, "path")?;
                let defaults = PhysicsDefaults::from(start);
                NodeOutput::Path(copy_path::build(start, source, mode, defaults))
            }
        };
        tracing::trace!(kind = self.name(), "node evaluated");
        Ok(output)
    }

    fn require<'a, T: ?Sized>(&self, input: Option<&'a T>, name: &'static str) -> Result<&'a T> {
        input.ok_or(Error::MissingInput {
            kind: self.name(),
            input: name,
        })
    }
}
