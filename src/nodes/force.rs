use crate::sim::{
    physics, CurveSampler, Float3, Frame, Keyframe, Point, Quaternion, StepConfig, StepParams,
};

use super::step::{self, CurveSet, StopReason};
use super::{DurationType, IterationConfig, PhysicsDefaults, SectionCurves};

const KIND: &str = "force";

/// Largest turn, in radians, a single step may take.
const MAX_ANGLE_RATE: f32 = 0.5;

/// Target rider forces in g. Empty curves hold 1 g normal and no lateral.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceProfile {
    pub normal_force: Vec<Keyframe>,
    pub lateral_force: Vec<Keyframe>,
}

/// Integrates a section whose shape follows from the forces the rider
/// should feel.
///
/// In [`DurationType::Time`] the section emits up to `floor(hz * duration)`
/// points and curves are keyed by elapsed time. In
/// [`DurationType::Distance`] it steps until the spine arc has grown by
/// `duration` and curves are keyed by the distance the next step reaches.
pub fn build(
    anchor: &Point,
    config: &IterationConfig,
    profile: &ForceProfile,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
) -> Vec<Point> {
    build_with(anchor, config, profile, curves, defaults, StepConfig::global())
}

pub(crate) fn build_with(
    anchor: &Point,
    config: &IterationConfig,
    profile: &ForceProfile,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
    cfg: &StepConfig,
) -> Vec<Point> {
    let mut points = vec![*anchor];
    let targets = Targets {
        normal: CurveSampler::new(&profile.normal_force, 1.0),
        lateral: CurveSampler::new(&profile.lateral_force, 0.0),
    };
    let curves = CurveSet::new(curves, defaults);

    let outcome = match config.duration_type {
        DurationType::Time => run_time(config.duration, &targets, &curves, cfg, &mut points),
        DurationType::Distance => {
            run_distance(config.duration, &targets, &curves, cfg, &mut points)
        }
    };
    if let Err(reason) = outcome {
        step::log_stop(KIND, reason, &points);
    }
    step::finish(KIND, points)
}

struct Targets<'a> {
    normal: CurveSampler<'a>,
    lateral: CurveSampler<'a>,
}

fn run_time(
    duration: f32,
    targets: &Targets<'_>,
    curves: &CurveSet<'_>,
    cfg: &StepConfig,
    points: &mut Vec<Point>,
) -> Result<(), StopReason> {
    let point_count = (cfg.hz * duration).floor().max(0.0) as usize;
    let Some(mut state) = points.last().copied() else {
        return Ok(());
    };

    for i in 1..point_count.min(cfg.max_iterations) {
        let t = i as f32 / cfg.hz;
        let prev = step::gate(state, curves.velocity_override(t, state.velocity), cfg)?;

        let roll_speed = curves.roll_speed.sample(t);
        let params = curves.params(t).with_roll(roll_speed, roll_speed / cfg.hz);
        let curr = advance(&prev, targets.normal.sample(t), targets.lateral.sample(t), &params, cfg);

        step::check_limits(&curr, cfg)?;
        points.push(curr);
        state = curr;
    }
    if point_count > cfg.max_iterations {
        return Err(StopReason::IterationLimit);
    }
    Ok(())
}

fn run_distance(
    duration: f32,
    targets: &Targets<'_>,
    curves: &CurveSet<'_>,
    cfg: &StepConfig,
    points: &mut Vec<Point>,
) -> Result<(), StopReason> {
    let Some(mut state) = points.last().copied() else {
        return Ok(());
    };
    let start_arc = state.spine_arc;
    let end_arc = start_arc + duration;

    for _ in 0..cfg.max_iterations {
        if state.spine_arc >= end_arc {
            return Ok(());
        }
        let d = state.spine_arc - start_arc + state.velocity / cfg.hz;
        let prev = step::gate(state, curves.velocity_override(d, state.velocity), cfg)?;

        // Roll speed here is per metre of track.
        let roll_speed = curves.roll_speed.sample(d);
        let params = curves
            .params(d)
            .with_roll(roll_speed, roll_speed * (prev.velocity / cfg.hz));
        let curr = advance(&prev, targets.normal.sample(d), targets.lateral.sample(d), &params, cfg);

        step::check_limits(&curr, cfg)?;
        points.push(curr);
        state = curr;
    }
    Err(StopReason::IterationLimit)
}

/// One integration step towards the target forces.
fn advance(
    prev: &Point,
    normal_force: f32,
    lateral_force: f32,
    params: &StepParams,
    cfg: &StepConfig,
) -> Point {
    let turned = step_by_forces(prev, normal_force, lateral_force, cfg);
    let heart_position = step::advance_heart(
        prev,
        turned.direction,
        turned.normal,
        params.heart_offset,
        cfg.hz,
    );
    let frame = turned.with_roll(params.delta_roll);
    step::integrate(prev, heart_position, frame, params, cfg)
}

/// Turns the frame so the rider feels the requested forces.
///
/// The felt force minus gravity is the centripetal acceleration `a`; a step
/// of length `v / hz` at curvature `a / v²` turns by `a / v / hz` radians.
/// Velocities are clamped to the minimum to keep the angles finite.
fn step_by_forces(prev: &Point, normal_force: f32, lateral_force: f32, cfg: &StepConfig) -> Frame {
    let frame = prev.frame();
    let felt = frame.normal * -normal_force + frame.lateral * -lateral_force + Float3::DOWN;
    let normal_accel = -felt.dot(frame.normal) * physics::G;
    let lateral_accel = -felt.dot(frame.lateral) * physics::G;

    let estimated_velocity = if prev.heart_advance.abs() < physics::EPSILON {
        prev.velocity
    } else {
        prev.heart_advance * cfg.hz
    };
    let estimated_velocity = estimated_velocity.abs().max(cfg.min_velocity);
    let velocity = prev.velocity.abs().max(cfg.min_velocity);

    let normal_angle =
        (normal_accel / estimated_velocity / cfg.hz).clamp(-MAX_ANGLE_RATE, MAX_ANGLE_RATE);
    let lateral_angle =
        (-lateral_accel / velocity / cfg.hz).clamp(-MAX_ANGLE_RATE, MAX_ANGLE_RATE);

    let pitch = Quaternion::from_axis_angle(frame.lateral, normal_angle);
    let yaw = Quaternion::from_axis_angle(frame.normal, lateral_angle);

    let direction = (pitch * yaw).mul_vec(frame.direction).normalize();
    let lateral = yaw.mul_vec(frame.lateral).normalize();
    let normal = direction.cross(lateral).normalize();
    Frame::new(direction, normal, lateral).reorthonormalize()
}
