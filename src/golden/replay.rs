use crate::error::{Error, Result};
use crate::nodes::bridge::BridgeParams;
use crate::nodes::copy_path::CopyMode;
use crate::nodes::curved::CurvedParams;
use crate::nodes::force::ForceProfile;
use crate::nodes::{DurationType, IterationConfig, SectionCurves};
use crate::sim::{Keyframe, Point};
use crate::track::{NodeInputs, NodeKind, NodeOutput};

use super::{compare, GoldKeyframe, GoldKeyframes, GoldPointData, GoldSection, Tolerance};

fn keys(frames: &[GoldKeyframe]) -> Vec<Keyframe> {
    frames.iter().map(Keyframe::from).collect()
}

fn keys_if(flag: bool, frames: &[GoldKeyframe]) -> Vec<Keyframe> {
    if flag {
        keys(frames)
    } else {
        Vec::new()
    }
}

fn points(records: &[GoldPointData]) -> Vec<Point> {
    records.iter().map(Point::from).collect()
}

impl GoldSection {
    /// Section curves as the editor applied them: a physics curve only
    /// counts when its override flag is set, otherwise the anchor's value
    /// carries through.
    pub fn curves(&self) -> SectionCurves {
        let overrides = self.inputs.property_overrides;
        let GoldKeyframes {
            roll_speed,
            fixed_velocity,
            heart,
            friction,
            resistance,
            ..
        } = &self.inputs.keyframes;
        SectionCurves {
            roll_speed: keys(roll_speed),
            fixed_velocity: overrides.fixed_velocity.then(|| keys(fixed_velocity)),
            heart_offset: keys_if(overrides.heart, heart),
            friction: keys_if(overrides.friction, friction),
            resistance: keys_if(overrides.resistance, resistance),
        }
    }

    /// The node this record was produced by.
    pub fn to_node(&self) -> Result<NodeKind> {
        let inputs = &self.inputs;
        let node = match self.node_type.as_str() {
            "CurvedSection" => {
                let c = inputs.curve_data.unwrap_or_default();
                NodeKind::Curved {
                    params: CurvedParams::new(c.radius, c.arc, c.axis, c.lead_in, c.lead_out),
                    curves: self.curves(),
                }
            }
            "ForceSection" => {
                let config = inputs.duration.map_or(
                    IterationConfig::new(0.0, DurationType::Time),
                    |d| IterationConfig::new(d.value, d.kind),
                );
                NodeKind::Force {
                    config,
                    profile: ForceProfile {
                        normal_force: keys(&inputs.keyframes.normal_force),
                        lateral_force: keys(&inputs.keyframes.lateral_force),
                    },
                    curves: self.curves(),
                }
            }
            "Bridge" | "BridgeSection" => NodeKind::Bridge {
                params: BridgeParams::new(inputs.in_weight, inputs.out_weight),
                curves: self.curves(),
            },
            "CopyPathSection" => NodeKind::CopyPath {
                mode: CopyMode::Resample {
                    start: inputs.start,
                    end: inputs.end,
                    curves: self.curves(),
                },
            },
            "ReversePath" | "ReversePathSection" => NodeKind::ReversePath,
            other => return Err(Error::UnsupportedSection(other.to_owned())),
        };
        Ok(node)
    }

    /// Runs the recorded inputs through the matching builder.
    pub fn replay(&self) -> Result<Vec<Point>> {
        let node = self.to_node()?;
        let anchor = self.inputs.anchor.as_ref().map(Point::from);
        let target = self.inputs.target_anchor.as_ref().map(Point::from);
        let source = points(&self.inputs.source_path);

        let inputs = NodeInputs {
            anchor: anchor.as_ref(),
            target: target.as_ref(),
            path: (!source.is_empty()).then_some(source.as_slice()),
        };
        let output = match node.evaluate(&inputs)? {
            NodeOutput::Path(points) => points,
            NodeOutput::Anchor(point) => vec![point],
        };
        tracing::debug!(
            node_id = self.node_id,
            kind = node.name(),
            points = output.len(),
            "golden section replayed"
        );
        Ok(output)
    }

    /// Replays the section and compares it with the recorded output.
    pub fn verify(&self, tolerance: Tolerance) -> Result<()> {
        let actual = self.replay()?;
        compare(&actual, &points(&self.outputs.points), tolerance)
    }
}
