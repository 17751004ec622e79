//! Reference track data exported by the editor, and replay against it.
//!
//! The JSON layout mirrors the editor's export: one record per section with
//! its authored inputs and the points the editor produced. Every field is
//! optional on input so older exports still load.

mod compare;
mod replay;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::nodes::DurationType;
use crate::sim::{Float3, InterpolationType, Keyframe, Point};

pub use compare::{compare, Tolerance};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldTrackData {
    pub metadata: GoldMetadata,
    pub graph: GoldGraph,
    pub sections: Vec<GoldSection>,
}

impl GoldTrackData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sections recorded for one node type, in export order.
    pub fn sections_of<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a GoldSection> {
        self.sections.iter().filter(move |s| s.node_type == node_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldMetadata {
    pub source_file: String,
    pub exported_at: String,
    pub kex_edit_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldGraph {
    pub root_node_id: u32,
    pub node_order: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldSection {
    pub node_id: u32,
    pub node_type: String,
    pub position: GoldVec2,
    pub inputs: GoldInputs,
    pub outputs: GoldOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldInputs {
    pub anchor: Option<GoldPointData>,
    pub duration: Option<GoldDuration>,
    pub property_overrides: GoldPropertyOverrides,
    pub steering: bool,
    pub curve_data: Option<GoldCurveData>,
    pub keyframes: GoldKeyframes,
    pub source_path: Vec<GoldPointData>,
    pub start: f32,
    pub end: f32,
    pub target_anchor: Option<GoldPointData>,
    pub out_weight: f32,
    pub in_weight: f32,
}

impl Default for GoldInputs {
    fn default() -> Self {
        Self {
            anchor: None,
            duration: None,
            property_overrides: GoldPropertyOverrides::default(),
            steering: false,
            curve_data: None,
            keyframes: GoldKeyframes::default(),
            source_path: Vec::new(),
            start: 0.0,
            end: -1.0,
            target_anchor: None,
            out_weight: 0.3,
            in_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldDuration {
    #[serde(rename = "type")]
    pub kind: DurationType,
    pub value: f32,
}

/// Which section curves replace the anchor's values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldPropertyOverrides {
    #[serde(alias = "driven")]
    pub fixed_velocity: bool,
    pub heart: bool,
    pub friction: bool,
    pub resistance: bool,
}

/// Curve shape of a curved section. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldCurveData {
    pub radius: f32,
    pub arc: f32,
    pub axis: f32,
    pub lead_in: f32,
    pub lead_out: f32,
}

impl Default for GoldCurveData {
    fn default() -> Self {
        Self {
            radius: 10.0,
            arc: 90.0,
            axis: 0.0,
            lead_in: 0.0,
            lead_out: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldKeyframes {
    pub roll_speed: Vec<GoldKeyframe>,
    pub normal_force: Vec<GoldKeyframe>,
    pub lateral_force: Vec<GoldKeyframe>,
    pub pitch_speed: Vec<GoldKeyframe>,
    pub yaw_speed: Vec<GoldKeyframe>,
    #[serde(alias = "drivenVelocity")]
    pub fixed_velocity: Vec<GoldKeyframe>,
    pub heart: Vec<GoldKeyframe>,
    pub friction: Vec<GoldKeyframe>,
    pub resistance: Vec<GoldKeyframe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldKeyframe {
    pub id: u32,
    pub time: f32,
    pub value: f32,
    pub in_interpolation: InterpolationType,
    pub out_interpolation: InterpolationType,
    pub handle_type: String,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
}

impl Default for GoldKeyframe {
    fn default() -> Self {
        let key = Keyframe::simple(0.0, 0.0);
        Self {
            id: 0,
            time: key.position,
            value: key.value,
            in_interpolation: key.in_interpolation,
            out_interpolation: key.out_interpolation,
            handle_type: "Aligned".to_owned(),
            in_tangent: key.in_tangent,
            out_tangent: key.out_tangent,
            in_weight: key.in_weight,
            out_weight: key.out_weight,
        }
    }
}

impl From<&GoldKeyframe> for Keyframe {
    fn from(k: &GoldKeyframe) -> Self {
        Keyframe {
            position: k.time,
            value: k.value,
            in_interpolation: k.in_interpolation,
            out_interpolation: k.out_interpolation,
            in_tangent: k.in_tangent,
            out_tangent: k.out_tangent,
            in_weight: k.in_weight,
            out_weight: k.out_weight,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldOutputs {
    pub point_count: usize,
    pub total_length: f32,
    pub points: Vec<GoldPointData>,
}

impl GoldOutputs {
    pub fn from_points(points: &[Point]) -> Self {
        Self {
            point_count: points.len(),
            total_length: points.last().map_or(0.0, |p| p.heart_arc),
            points: points.iter().map(GoldPointData::from).collect(),
        }
    }
}

/// One recorded point. Fields after `facing` are derived diagnostics and
/// are never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldPointData {
    pub heart_position: GoldVec3,
    pub direction: GoldVec3,
    pub lateral: GoldVec3,
    pub normal: GoldVec3,
    pub roll: f32,
    pub velocity: f32,
    pub energy: f32,
    pub normal_force: f32,
    pub lateral_force: f32,
    pub heart_advance: f32,
    pub spine_advance: f32,
    pub angle_from_last: f32,
    pub pitch_from_last: f32,
    pub yaw_from_last: f32,
    pub roll_speed: f32,
    pub heart_arc: f32,
    pub spine_arc: f32,
    pub friction_origin: f32,
    pub heart_offset: f32,
    pub friction: f32,
    pub resistance: f32,
    pub facing: i32,

    pub effective_friction_distance: f32,
    pub kinetic_energy: f32,
    #[serde(rename = "gravitationalPE")]
    pub gravitational_pe: f32,
    #[serde(rename = "frictionPE")]
    pub friction_pe: f32,
    pub center_y: f32,
}

impl Default for GoldPointData {
    fn default() -> Self {
        Self::from(&Point {
            heart_position: Float3::ZERO,
            energy: 0.0,
            velocity: 0.0,
            normal_force: 0.0,
            ..Point::DEFAULT
        })
    }
}

impl From<&Point> for GoldPointData {
    fn from(p: &Point) -> Self {
        let friction_distance = p.spine_arc - p.friction_origin;
        let center_y = p.center_y();
        Self {
            heart_position: p.heart_position.into(),
            direction: p.direction.into(),
            lateral: p.lateral.into(),
            normal: p.normal.into(),
            roll: p.roll(),
            velocity: p.velocity,
            energy: p.energy,
            normal_force: p.normal_force,
            lateral_force: p.lateral_force,
            heart_advance: p.heart_advance,
            spine_advance: 0.0,
            angle_from_last: 0.0,
            pitch_from_last: 0.0,
            yaw_from_last: 0.0,
            roll_speed: p.roll_speed,
            heart_arc: p.heart_arc,
            spine_arc: p.spine_arc,
            friction_origin: p.friction_origin,
            heart_offset: p.heart_offset,
            friction: p.friction,
            resistance: p.resistance,
            facing: 1,
            effective_friction_distance: friction_distance,
            kinetic_energy: 0.5 * p.velocity * p.velocity,
            gravitational_pe: crate::sim::G * center_y,
            friction_pe: crate::sim::G * p.friction * friction_distance,
            center_y,
        }
    }
}

impl From<&GoldPointData> for Point {
    fn from(p: &GoldPointData) -> Self {
        Point {
            heart_position: p.heart_position.into(),
            direction: p.direction.into(),
            normal: p.normal.into(),
            lateral: p.lateral.into(),
            velocity: p.velocity,
            energy: p.energy,
            normal_force: p.normal_force,
            lateral_force: p.lateral_force,
            heart_arc: p.heart_arc,
            spine_arc: p.spine_arc,
            heart_advance: p.heart_advance,
            friction_origin: p.friction_origin,
            roll_speed: p.roll_speed,
            heart_offset: p.heart_offset,
            friction: p.friction,
            resistance: p.resistance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Float3> for GoldVec3 {
    fn from(v: Float3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<GoldVec3> for Float3 {
    fn from(v: GoldVec3) -> Self {
        Float3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldVec2 {
    pub x: f32,
    pub y: f32,
}
