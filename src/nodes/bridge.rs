use crate::sim::{physics, Float3, Frame, Point, StepConfig};

use super::guide::{self, Guide, GuidePose, Pacing};
use super::step::{self, CurveSet};
use super::{PhysicsDefaults, SectionCurves};

const KIND: &str = "bridge";

/// Handle lengths of the transition, as fractions of the straight-line
/// distance between the anchors. Clamped to `[0.001, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BridgeParams {
    pub in_weight: f32,
    pub out_weight: f32,
}

impl BridgeParams {
    pub const fn new(in_weight: f32, out_weight: f32) -> Self {
        Self {
            in_weight,
            out_weight,
        }
    }
}

/// Joins `anchor` to `target` with a cubic Bezier.
///
/// The outgoing handle leaves along the anchor's direction scaled by
/// `out_weight`, the incoming one arrives along the target's direction
/// scaled by `in_weight`; roll eases between the two with smoothstep. The
/// curve is tabulated and then walked at the train's own velocity, so the
/// point count follows from the curve length. Coincident anchors yield just
/// the anchor.
pub fn build(
    anchor: &Point,
    target: &Point,
    params: &BridgeParams,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
) -> Vec<Point> {
    build_with(anchor, target, params, curves, defaults, StepConfig::global())
}

pub(crate) fn build_with(
    anchor: &Point,
    target: &Point,
    params: &BridgeParams,
    curves: &SectionCurves,
    defaults: PhysicsDefaults,
    cfg: &StepConfig,
) -> Vec<Point> {
    let mut points = vec![*anchor];

    let length = (target.heart_position - anchor.heart_position).magnitude();
    if length < physics::EPSILON {
        tracing::debug!("bridge anchors coincide");
        return points;
    }

    let out_weight = params.out_weight.clamp(1e-3, 1.0);
    let in_weight = params.in_weight.clamp(1e-3, 1.0);
    let Some(mut guide) = Guide::new(tabulate(anchor, target, length, out_weight, in_weight))
    else {
        return points;
    };

    let curves = CurveSet::new(curves, defaults);
    let walked = guide::walk(anchor, &mut guide, Pacing::Elapsed, &curves, cfg, &mut points);
    if let Err(reason) = walked {
        step::log_stop(KIND, reason, &points);
    }
    step::finish(KIND, points)
}

fn tabulate(
    source: &Point,
    target: &Point,
    length: f32,
    out_weight: f32,
    in_weight: f32,
) -> Vec<GuidePose> {
    let samples = (length * 2.0).max(10.0) as usize;

    let control = [
        source.heart_position,
        source.heart_position + source.direction * (length * out_weight),
        target.heart_position - target.direction * (length * in_weight),
        target.heart_position,
    ];
    let source_roll = source.roll();
    let roll_change = physics::wrap_angle(target.roll() - source_roll);

    let mut poses: Vec<GuidePose> = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        let position = bezier(control, t);
        let direction = bezier_tangent(control, t);
        let roll = source_roll + roll_change * smoothstep(t);
        let distance = poses
            .last()
            .map_or(0.0, |p| p.distance + (position - p.position).magnitude());
        poses.push(GuidePose {
            position,
            frame: Frame::from_direction_and_roll(direction, roll),
            distance,
        });
    }
    poses
}

fn bezier([p0, p1, p2, p3]: [Float3; 4], t: f32) -> Float3 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

fn bezier_tangent([p0, p1, p2, p3]: [Float3; 4], t: f32) -> Float3 {
    let u = 1.0 - t;
    (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t)
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{assert_orthonormal, Keyframe};
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;

    fn target_at(position: Float3, roll: f32) -> Point {
        Point::create(position, Float3::BACK, roll, 10.0, 1.1, 0.0, 0.0)
    }

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
    fn coincident_anchors_return_only_the_anchor() {
        let anchor = Point::DEFAULT;
        let result = build_with(
            &anchor,
            &anchor,
            &BridgeParams::new(0.3, 0.3),
            &fixed(10.0),
            defaults(),
            &StepConfig::DEFAULT,
        );
        assert_eq!(result, vec![anchor]);
    }

    #[test]
    fn bridge_lands_on_the_target_pose() {
        let anchor = Point::DEFAULT;
        let target = target_at(Float3::new(4.0, 5.0, -20.0), 0.3);
        let result = build_with(
            &anchor,
            &target,
            &BridgeParams::new(0.33, 0.33),
            &fixed(10.0),
            defaults(),
            &StepConfig::DEFAULT,
        );

        assert_eq!(result[0], anchor);
        let last = result.last().unwrap();
        assert_relative_eq!(last.heart_position.x, 4.0, epsilon = TOLERANCE);
        assert_relative_eq!(last.heart_position.y, 5.0, epsilon = TOLERANCE);
        assert_relative_eq!(last.heart_position.z, -20.0, epsilon = TOLERANCE);
        assert_relative_eq!(last.direction.dot(target.direction), 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(last.roll(), 0.3, epsilon = 1e-3);
        for p in &result {
            assert_orthonormal(p.frame());
        }
    }

    #[test]
    fn point_count_follows_curve_length() {
        let anchor = Point::DEFAULT;
        let near = target_at(Float3::new(0.0, 3.0, -10.0), 0.0);
        let far = target_at(Float3::new(0.0, 3.0, -40.0), 0.0);
        let cfg = StepConfig::DEFAULT;
        let params = BridgeParams::new(0.3, 0.3);
        let short = build_with(&anchor, &near, &params, &fixed(10.0), defaults(), &cfg);
        let long = build_with(&anchor, &far, &params, &fixed(10.0), defaults(), &cfg);
        // 0.1 m per step at 10 m/s and 100 Hz.
        assert!((short.len() as i32 - 101).abs() <= 1, "{}", short.len());
        assert!((long.len() as i32 - 401).abs() <= 1, "{}", long.len());
    }

    #[test]
    fn free_running_bridge_conserves_energy() {
        let anchor = step::with_energy(Point::DEFAULT);
        let target = target_at(Float3::new(0.0, 5.0, -20.0), 0.0);
        let result = build_with(
            &anchor,
            &target,
            &BridgeParams::new(0.3, 0.3),
            &SectionCurves::default(),
            defaults(),
            &StepConfig::DEFAULT,
        );
        let last = result.last().unwrap();
        let expected = (100.0 - 2.0 * physics::G * 2.0).sqrt();
        assert_relative_eq!(last.velocity, expected, epsilon = 1e-2);
        assert_relative_eq!(last.energy, anchor.energy, epsilon = 1e-2);
    }

    #[test]
    fn slow_train_on_a_downhill_creeps_without_resetting_friction() {
        let frame = Frame::DEFAULT.with_pitch(-0.3);
        let anchor = Point {
            direction: frame.direction,
            normal: frame.normal,
            lateral: frame.lateral,
            velocity: 0.01,
            spine_arc: 12.0,
            friction_origin: 2.0,
            ..Point::DEFAULT
        };
        let target = Point::create(
            Float3::new(0.0, -2.0, -20.0),
            Float3::BACK,
            0.0,
            10.0,
            1.1,
            0.0,
            0.0,
        );
        let cfg = StepConfig::DEFAULT;
        let result = build_with(
            &anchor,
            &target,
            &BridgeParams::new(0.3, 0.3),
            &SectionCurves::default(),
            defaults(),
            &cfg,
        );

        assert!(result.len() > 1);
        let first = &result[1];
        assert_relative_eq!(first.friction_origin, 2.0);
        assert_relative_eq!(first.heart_advance, cfg.min_velocity / cfg.hz, epsilon = 1e-4);
        assert!(first.velocity < cfg.min_velocity);
    }

    #[test]
    fn weights_are_clamped() {
        let anchor = Point::DEFAULT;
        let target = target_at(Float3::new(3.0, 3.0, -12.0), 0.0);
        let cfg = StepConfig::DEFAULT;
        let zero = build_with(
            &anchor,
            &target,
            &BridgeParams::new(0.0, 0.0),
            &fixed(10.0),
            defaults(),
            &cfg,
        );
        let floor = build_with(
            &anchor,
            &target,
            &BridgeParams::new(1e-3, 1e-3),
            &fixed(10.0),
            defaults(),
            &cfg,
        );
        assert_eq!(zero, floor);
    }
}
