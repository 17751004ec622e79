//! Walking a train along a precomputed path at its own simulated speed.

use crate::sim::{physics, Float3, Frame, Point, StepConfig};

use super::step::{self, CurveSet, StopReason};

/// One tabulated pose of a guide path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GuidePose {
    pub position: Float3,
    pub frame: Frame,
    /// Cumulative distance along the guide.
    pub distance: f32,
}

impl GuidePose {
    fn lerp(&self, to: &GuidePose, t: f32) -> (Float3, Frame) {
        let frame = Frame::new(
            self.frame.direction.lerp(to.frame.direction, t).normalize(),
            self.frame.normal.lerp(to.frame.normal, t).normalize(),
            self.frame.lateral.lerp(to.frame.lateral, t).normalize(),
        )
        .reorthonormalize();
        (self.position.lerp(to.position, t), frame)
    }
}

/// Tabulated path with a forward-only lookup cursor.
#[derive(Debug, Clone)]
pub(crate) struct Guide {
    poses: Vec<GuidePose>,
    cursor: usize,
}

impl Guide {
    /// `None` for fewer than two poses.
    pub fn new(poses: Vec<GuidePose>) -> Option<Self> {
        (poses.len() >= 2).then_some(Self { poses, cursor: 0 })
    }

    pub fn start(&self) -> f32 {
        self.poses[0].distance
    }

    pub fn end(&self) -> f32 {
        self.last().distance
    }

    fn last(&self) -> &GuidePose {
        &self.poses[self.poses.len() - 1]
    }

    /// Interpolated pose at `distance`, or `None` at or past the end.
    pub fn pose_at(&mut self, distance: f32) -> Option<(Float3, Frame)> {
        if distance >= self.end() {
            return None;
        }
        let last = self.poses.len() - 1;
        while self.cursor + 1 < last && self.poses[self.cursor + 1].distance < distance {
            self.cursor += 1;
        }
        let (a, b) = (&self.poses[self.cursor], &self.poses[self.cursor + 1]);
        let span = b.distance - a.distance;
        let t = if span > physics::EPSILON {
            ((distance - a.distance) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(a.lerp(b, t))
    }

    /// Index of the segment found by the last lookup.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn end_pose(&self) -> (Float3, Frame) {
        let last = self.last();
        (last.position, last.frame)
    }
}

/// How a walk keys its curves and treats a slow train on a downhill.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Pacing {
    /// Curves keyed by elapsed steps. A slow train advances at the minimum
    /// velocity but keeps its own state.
    Elapsed,
    /// Curves keyed by the guide sample under the train, as the guide was
    /// recorded at one sample per step. A slow train is lifted to the
    /// minimum velocity.
    Recorded,
}

/// Moves from `anchor` along `guide`, one `velocity / hz` step at a time,
/// until the guide's end. Every sample carries the anchor's roll speed.
pub(crate) fn walk(
    anchor: &Point,
    guide: &mut Guide,
    pacing: Pacing,
    curves: &CurveSet<'_>,
    cfg: &StepConfig,
    points: &mut Vec<Point>,
) -> Result<(), StopReason> {
    let mut state = *anchor;
    let mut distance = guide.start();
    let end = guide.end();

    for index in 0..cfg.max_iterations {
        if distance >= end {
            return Ok(());
        }
        let sample = match pacing {
            Pacing::Elapsed => index,
            Pacing::Recorded => guide.cursor(),
        };
        let t = sample as f32 / cfg.hz;
        let velocity_override = curves.velocity_override(t, state.velocity);
        let (prev, advance) = match pacing {
            Pacing::Elapsed => step::gate_advance(state, velocity_override, cfg)?,
            Pacing::Recorded => {
                let prev = step::gate(state, velocity_override, cfg)?;
                (prev, prev.velocity)
            }
        };

        let target = distance + advance / cfg.hz;
        let (position, frame) = match guide.pose_at(target) {
            Some(pose) => {
                distance = target;
                pose
            }
            None => {
                distance = end;
                guide.end_pose()
            }
        };

        let params = curves.params(t).with_roll(anchor.roll_speed, 0.0);
        let curr = step::follow(&prev, position, frame, &params, cfg);
        step::check_limits(&curr, cfg)?;
        points.push(curr);
        state = curr;
    }
    Err(StopReason::IterationLimit)
}
