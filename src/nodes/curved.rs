use crate::sim::{physics, Frame, FrameChange, Point, StepConfig, StepParams};

use super::step::{self, CurveSet, StopReason};
use super::{PhysicsDefaults, SectionCurves};

const KIND: &str = "curved";

/// Converts a lead's angle into the distance its smoothstep ramp covers.
const LEAD_RAMP_FACTOR: f32 = 1.997;

/// Shape of a circular turn. Angles are in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurvedParams {
    pub radius: f32,
    /// Total turn.
    pub arc: f32,
    /// Tilt of the turn axis: 0 turns flat about the normal, 90 pulls up
    /// about the lateral.
    pub axis: f32,
    /// Angle over which the turn rate ramps up.
    pub lead_in: f32,
    /// Angle over which the turn rate ramps back down.
    pub lead_out: f32,
}

impl CurvedParams {
    pub const fn new(radius: f32, arc: f32, axis: f32, lead_in: f32, lead_out: f32) -> Self {
        Self {
            radius,
            arc,
            axis,
            lead_in,
            lead_out,
        }
    }
}

/// Builds a circular arc from `anchor`.
///
/// Each step turns by `velocity / radius / hz` (converted to degrees) about
/// the tilted axis, dampened by smoothstep over the lead-in and lead-out.
/// The roll-speed curve is keyed by swept angle, all other curves by time.
/// A zero radius or arc yields just the anchor.
pub fn build(
    anchor: &Point,
    params: &CurvedParams,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
) -> Vec<Point> {
    build_with(anchor, params, curves, defaults, StepConfig::global())
}

pub(crate) fn build_with(
    anchor: &Point,
    params: &CurvedParams,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
    cfg: &StepConfig,
) -> Vec<Point> {
    let mut points = vec![*anchor];
    if params.radius <= physics::EPSILON || params.arc <= physics::EPSILON {
        tracing::debug!(
            radius = params.radius,
            arc = params.arc,
            "degenerate curved section"
        );
        return points;
    }

    let curves = CurveSet::new(curves, defaults);
    if let Err(reason) = run(anchor, params, &curves, cfg, &mut points) {
        step::log_stop(KIND, reason, &points);
    }
    step::finish(KIND, points)
}

struct LeadOut {
    start_heart_arc: f32,
    angle: f32,
}

fn run(
    anchor: &Point,
    params: &CurvedParams,
    curves: &CurveSet<'_>,
    cfg: &StepConfig,
    points: &mut Vec<Point>,
) -> Result<(), StopReason> {
    let mut state = *anchor;
    let mut angle = 0.0;
    let lead_out_start = params.arc - params.lead_out;
    let mut lead_out: Option<LeadOut> = None;

    for index in 0..cfg.max_iterations {
        if angle >= params.arc - physics::EPSILON {
            return Ok(());
        }
        let t = index as f32 / cfg.hz;
        let prev = step::gate(state, curves.velocity_override(t, state.velocity), cfg)?;

        let full_rate = (prev.velocity / params.radius / cfg.hz).to_degrees();
        let mut delta_angle = full_rate;

        if params.lead_in > 0.0 {
            let travelled = prev.heart_arc - anchor.heart_arc;
            let ramp = LEAD_RAMP_FACTOR / cfg.hz * prev.velocity / full_rate * params.lead_in;
            let progress = travelled / ramp;
            if progress <= 1.0 {
                delta_angle *= smoothstep(progress);
            }
        }

        if lead_out.is_none() && angle > lead_out_start {
            lead_out = Some(LeadOut {
                start_heart_arc: prev.heart_arc,
                angle: params.arc - angle,
            });
        }
        if let Some(ramp_down) = lead_out.as_ref().filter(|_| params.lead_out > 0.0) {
            let travelled = prev.heart_arc - ramp_down.start_heart_arc;
            // Measured against the rate left after the lead-in ramp.
            let ramp = LEAD_RAMP_FACTOR / cfg.hz * prev.velocity / delta_angle * ramp_down.angle;
            let remaining = 1.0 - travelled / ramp;
            if remaining < 0.0 {
                return Ok(());
            }
            delta_angle *= smoothstep(remaining);
        }

        angle += delta_angle;
        let roll_speed = curves.roll_speed.sample(angle);
        let step_params = curves
            .params(t)
            .with_roll(roll_speed, roll_speed / cfg.hz);

        let curr = advance(&prev, params.axis, delta_angle, &step_params, cfg);
        step::check_limits(&curr, cfg)?;
        points.push(curr);
        state = curr;
    }
    Err(StopReason::IterationLimit)
}

/// One step of `delta_angle` degrees about the axis tilted `axis` degrees
/// from the normal.
fn advance(
    prev: &Point,
    axis: f32,
    delta_angle: f32,
    params: &StepParams,
    cfg: &StepConfig,
) -> Point {
    let axis = axis.to_radians();
    let turn_axis = prev.normal * -axis.cos() + prev.lateral * axis.sin();
    let change = FrameChange::from_axis(prev.frame(), turn_axis, delta_angle.to_radians());

    // The turn may drag the bank along; re-level and restore the previous roll.
    let banked = Frame::from_direction_and_roll(change.direction, prev.roll());
    let heart_position = step::advance_heart(
        prev,
        banked.direction,
        banked.normal,
        params.heart_offset,
        cfg.hz,
    );
    let frame = banked.with_roll(params.delta_roll);
    step::integrate(prev, heart_position, frame, params, cfg)
}

fn smoothstep(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{assert_orthonormal, Keyframe};
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-3;

    fn fixed(velocity: f32) -> SectionCurves {
        SectionCurves {
            fixed_velocity: Some(vec![Keyframe::constant(0.0, velocity)]),
            ..SectionCurves::default()
        }
    }

    fn defaults() -> PhysicsDefaults {
        PhysicsDefaults::new(1.1, 0.0, 0.0)
    }

    #[test]
    fn zero_arc_returns_only_the_anchor() {
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(20.0, 0.0, 0.0, 0.0, 0.0);
        let result = build_with(&anchor, &params, &fixed(10.0), defaults(), &StepConfig::DEFAULT);
        assert_eq!(result, vec![anchor]);
    }

    #[test]
    fn zero_radius_returns_only_the_anchor() {
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(0.0, 90.0, 0.0, 0.0, 0.0);
        let result = build_with(&anchor, &params, &fixed(10.0), defaults(), &StepConfig::DEFAULT);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn flat_quarter_turn_ends_perpendicular() {
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(20.0, 90.0, 0.0, 0.0, 0.0);
        let result = build_with(&anchor, &params, &fixed(10.0), defaults(), &StepConfig::DEFAULT);

        let last = result.last().unwrap();
        assert!(last.direction.dot(anchor.direction).abs() < 0.02);
        assert_relative_eq!(last.heart_position.y, anchor.heart_position.y, epsilon = TOLERANCE);
        // Quarter circle of radius 20 on the heart line.
        let expected = std::f32::consts::FRAC_PI_2 * 20.0;
        assert!((last.heart_arc - expected).abs() < 0.2, "arc {}", last.heart_arc);
        for p in &result {
            assert_orthonormal(p.frame());
        }
    }

    #[test]
    fn vertical_turn_pulls_into_the_seat() {
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(15.0, 30.0, 90.0, 0.0, 0.0);
        let result = build_with(&anchor, &params, &fixed(12.0), defaults(), &StepConfig::DEFAULT);

        let mid = &result[result.len() / 2];
        assert!(mid.heart_position.y > anchor.heart_position.y);
        assert!(mid.normal_force > 1.5, "normal force {}", mid.normal_force);
    }

    #[test]
    fn lead_in_and_out_soften_the_ends() {
        let anchor = Point::DEFAULT;
        let sharp = CurvedParams::new(20.0, 60.0, 0.0, 0.0, 0.0);
        let eased = CurvedParams::new(20.0, 60.0, 0.0, 15.0, 15.0);
        let cfg = StepConfig::DEFAULT;
        let sharp = build_with(&anchor, &sharp, &fixed(10.0), defaults(), &cfg);
        let eased = build_with(&anchor, &eased, &fixed(10.0), defaults(), &cfg);

        assert!(eased[1].lateral_force.abs() < sharp[1].lateral_force.abs());
        assert!(eased.len() > sharp.len());
    }

    #[test]
    fn overlapping_leads_ramp_out_from_the_eased_rate() {
        // The lead-out starts while the lead-in is still easing the rate.
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(20.0, 30.0, 0.0, 20.0, 20.0);
        let result = build_with(&anchor, &params, &fixed(10.0), defaults(), &StepConfig::DEFAULT);

        assert_eq!(result.len(), 244);
        let last = result.last().unwrap();
        assert_relative_eq!(last.direction.x, -0.49248, epsilon = 1e-4);
        assert_relative_eq!(last.direction.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(last.direction.z, -0.87032, epsilon = 1e-4);
        assert_relative_eq!(last.heart_arc, 24.3, epsilon = 1e-3);
    }

    #[test]
    fn arcs_never_decrease() {
        let anchor = Point::DEFAULT;
        let params = CurvedParams::new(10.0, 120.0, 45.0, 10.0, 10.0);
        let curves = SectionCurves {
            roll_speed: vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(120.0, 0.5)],
            ..SectionCurves::default()
        };
        let result = build_with(&anchor, &params, &curves, defaults(), &StepConfig::DEFAULT);
        assert!(result.len() > 10);
        for pair in result.windows(2) {
            assert!(pair[1].heart_arc >= pair[0].heart_arc);
            assert!(pair[1].spine_arc >= pair[0].spine_arc);
        }
    }
}
