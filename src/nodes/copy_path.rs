use crate::sim::{Float3, Frame, Matrix3, Point, StepConfig};

use super::guide::{self, Guide, GuidePose, Pacing};
use super::step::{self, CurveSet};
use super::{PhysicsDefaults, SectionCurves};

const KIND: &str = "copy_path";

/// How a source path is re-emitted from the new anchor.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyMode {
    /// Every source point moved rigidly so the first lands on the anchor.
    /// Length and per-point physics are kept; arcs are rebased onto the
    /// anchor's.
    Rigid,
    /// The source window `[start, end]` (seconds of source samples; a
    /// negative `end` means the source's end) re-walked at the train's own
    /// simulated velocity, with forces and velocity recomputed.
    Resample {
        start: f32,
        end: f32,
        curves: SectionCurves,
    },
}

/// Copies `source` so that it continues from `anchor`.
pub fn build(
    anchor: &Point,
    source: &[Point],
    mode: &CopyMode,
    defaults: PhysicsDefaults,
) -> Vec<Point> {
    build_with(anchor, source, mode, defaults, StepConfig::global())
}

pub(crate) fn build_with(
    anchor: &Point,
    source: &[Point],
    mode: &CopyMode,
    defaults: PhysicsDefaults,
    cfg: &StepConfig,
) -> Vec<Point> {
    match mode {
        CopyMode::Rigid => rigid(anchor, source),
        CopyMode::Resample { start, end, curves } => {
            resample(anchor, source, *start, *end, curves, defaults, cfg)
        }
    }
}

/// Rotation and translation taking `from`'s pose onto `to`'s.
struct Placement {
    rotation: Matrix3,
    translation: Float3,
}

impl Placement {
    fn between(from: &Point, to: &Point) -> Self {
        let from_basis = Matrix3::from_columns(from.lateral, from.normal, from.direction);
        let to_basis = Matrix3::from_columns(to.lateral, to.normal, to.direction);
        let rotation = to_basis.mul_mat(&from_basis.transpose());
        let translation = to.heart_position - rotation.mul_vec(from.heart_position);
        Self {
            rotation,
            translation,
        }
    }

    fn position(&self, p: Float3) -> Float3 {
        self.rotation.mul_vec(p) + self.translation
    }

    fn vector(&self, v: Float3) -> Float3 {
        self.rotation.mul_vec(v).normalize()
    }
}

fn rigid(anchor: &Point, source: &[Point]) -> Vec<Point> {
    let Some(first) = source.first() else {
        tracing::debug!("copy source is empty");
        return Vec::new();
    };
    let placement = Placement::between(first, anchor);
    let points = source
        .iter()
        .map(|p| {
            step::with_energy(Point {
                heart_position: placement.position(p.heart_position),
                direction: placement.vector(p.direction),
                normal: placement.vector(p.normal),
                lateral: placement.vector(p.lateral),
                heart_arc: anchor.heart_arc + (p.heart_arc - first.heart_arc),
                spine_arc: anchor.spine_arc + (p.spine_arc - first.spine_arc),
                friction_origin: anchor.spine_arc + (p.friction_origin - first.spine_arc),
                ..*p
            })
        })
        .collect();
    step::finish(KIND, points)
}

fn resample(
    anchor: &Point,
    source: &[Point],
    start: f32,
    end: f32,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
    cfg: &StepConfig,
) -> Vec<Point> {
    let mut points = vec![*anchor];
    if source.len() < 2 {
        tracing::debug!(len = source.len(), "copy source too short to resample");
        return points;
    }

    let last = source.len() - 1;
    let start_index = if start <= 0.0 {
        0
    } else {
        ((start * cfg.hz).round() as usize).min(last)
    };
    let end_index = if end < 0.0 {
        last
    } else {
        ((end * cfg.hz).round() as usize).clamp(start_index, last)
    };
    if end_index <= start_index {
        tracing::debug!(start, end, "empty copy window");
        return points;
    }

    let placement = Placement::between(&source[start_index], anchor);
    let poses = source[start_index..=end_index]
        .iter()
        .map(|p| GuidePose {
            position: placement.position(p.heart_position),
            frame: Frame::new(
                placement.vector(p.direction),
                placement.vector(p.normal),
                placement.vector(p.lateral),
            ),
            distance: p.spine_arc,
        })
        .collect();
    let Some(mut guide) = Guide::new(poses) else {
        return points;
    };

    let curves = CurveSet::new(curves, defaults);
    let walked = guide::walk(anchor, &mut guide, Pacing::Recorded, &curves, cfg, &mut points);
    if let Err(reason) = walked {
        step::log_stop(KIND, reason, &points);
    }
    step::finish(KIND, points)
}
