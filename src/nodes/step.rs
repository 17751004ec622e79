//! Pieces shared by the stepping builders: curve sampling, the velocity
//! gate, stop guards and the per-step kinematics.

use crate::sim::{
    physics, Curvature, CurveSampler, Float3, Forces, Frame, Point, StepConfig, StepParams,
};

use super::force_vector::path_forces;
use super::{PhysicsDefaults, SectionCurves};

/// Why a stepping loop ended before reaching its target length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StopReason {
    /// Below the minimum velocity while not heading downhill.
    Stalled,
    /// The fixed-velocity curve dropped below the minimum velocity.
    FixedVelocityTooLow,
    Overspeed,
    ForceLimit,
    IterationLimit,
}

/// Samplers over one section's [`SectionCurves`].
pub(crate) struct CurveSet<'a> {
    pub roll_speed: CurveSampler<'a>,
    fixed_velocity: Option<CurveSampler<'a>>,
    heart_offset: CurveSampler<'a>,
    friction: CurveSampler<'a>,
    resistance: CurveSampler<'a>,
}

impl<'a> CurveSet<'a> {
    pub fn new(curves: &'a SectionCurves, defaults: PhysicsDefaults) -> Self {
        Self {
            roll_speed: CurveSampler::new(&curves.roll_speed, 0.0),
            fixed_velocity: curves
                .fixed_velocity
                .as_deref()
                .map(|keys| CurveSampler::new(keys, 0.0)),
            heart_offset: CurveSampler::new(&curves.heart_offset, defaults.heart_offset),
            friction: CurveSampler::new(&curves.friction, defaults.friction),
            resistance: CurveSampler::new(&curves.resistance, defaults.resistance),
        }
    }

    /// Fixed velocity at `t`, or `None` when the energy model drives the
    /// section. An empty fixed-velocity curve holds `current`.
    pub fn velocity_override(&self, t: f32, current: f32) -> Option<f32> {
        self.fixed_velocity
            .as_ref()
            .map(|curve| curve.sample_or(t, current))
    }

    pub fn params(&self, t: f32) -> StepParams {
        StepParams::new(
            self.heart_offset.sample(t),
            self.friction.sample(t),
            self.resistance.sample(t),
        )
        .with_fixed_velocity(self.fixed_velocity.is_some())
    }
}

/// Applies the velocity rules that run before every step.
///
/// A fixed velocity replaces the current one and restarts friction
/// accounting. Otherwise a train below the minimum is nudged back up to it
/// on a downhill and stalls anywhere else.
pub(crate) fn gate(
    prev: Point,
    velocity_override: Option<f32>,
    cfg: &StepConfig,
) -> Result<Point, StopReason> {
    match velocity_override {
        Some(velocity) if velocity < cfg.min_velocity => Err(StopReason::FixedVelocityTooLow),
        Some(velocity) => Ok(prev.with_velocity(velocity, true)),
        None if prev.velocity >= cfg.min_velocity => Ok(prev),
        None if prev.frame().pitch() < 0.0 => Ok(prev.with_velocity(cfg.min_velocity, true)),
        None => Err(StopReason::Stalled),
    }
}

/// [`gate`] for a train that only needs a speed to advance with.
///
/// A slow train on a downhill keeps its own velocity and friction origin
/// and advances at the minimum. Returns the gated point and the advance
/// velocity.
pub(crate) fn gate_advance(
    prev: Point,
    velocity_override: Option<f32>,
    cfg: &StepConfig,
) -> Result<(Point, f32), StopReason> {
    match velocity_override {
        None if prev.velocity < cfg.min_velocity && prev.frame().pitch() < 0.0 => {
            Ok((prev, cfg.min_velocity))
        }
        _ => gate(prev, velocity_override, cfg).map(|p| (p, p.velocity)),
    }
}

/// Rejects a freshly computed sample that breaks the velocity or force
/// ceilings.
pub(crate) fn check_limits(curr: &Point, cfg: &StepConfig) -> Result<(), StopReason> {
    if curr.velocity > cfg.max_velocity {
        return Err(StopReason::Overspeed);
    }
    let force = (curr.normal_force * curr.normal_force + curr.lateral_force * curr.lateral_force)
        .sqrt();
    if force > cfg.max_force {
        return Err(StopReason::ForceLimit);
    }
    Ok(())
}

pub(crate) fn log_stop(kind: &'static str, reason: StopReason, points: &[Point]) {
    let last = points.last();
    tracing::debug!(
        kind,
        ?reason,
        points = points.len(),
        velocity = last.map(|p| p.velocity),
        "section stopped early"
    );
}

pub(crate) fn finish(kind: &'static str, points: Vec<Point>) -> Vec<Point> {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        tracing::debug!(
            kind,
            points = points.len(),
            spine_length = last.spine_arc - first.spine_arc,
            "section built"
        );
    }
    points
}

/// Recomputes the stored total energy from the point's own state.
pub(crate) fn with_energy(point: Point) -> Point {
    Point {
        energy: physics::total_energy(
            point.velocity,
            point.center_y(),
            point.spine_arc - point.friction_origin,
            point.friction,
        ),
        ..point
    }
}

/// Heart-line position after one step.
///
/// The heart moves along the trapezoid of the old and new directions over
/// `velocity / hz`, then pivots so the spine (not the heart) stays
/// continuous when the normal swings.
pub(crate) fn advance_heart(
    prev: &Point,
    direction: Float3,
    normal: Float3,
    heart_offset: f32,
    hz: f32,
) -> Float3 {
    let half_step = prev.velocity / (2.0 * hz);
    let pivot = prev.spine_position(heart_offset) - (prev.heart_position + normal * heart_offset);
    prev.heart_position + direction * half_step + prev.direction * half_step + pivot
}

/// Completes a simulated step: arcs, energy-derived velocity and forces
/// from the frame-to-frame curvature.
pub(crate) fn integrate(
    prev: &Point,
    heart_position: Float3,
    frame: Frame,
    params: &StepParams,
    cfg: &StepConfig,
) -> Point {
    let offset = params.heart_offset;
    let spine_advance =
        (frame.spine_position(heart_position, offset) - prev.spine_position(offset)).magnitude();
    let heart_advance = (heart_position - prev.heart_position).magnitude();

    let velocity = if params.fixed_velocity {
        prev.velocity
    } else {
        let delta_y = physics::center_y(heart_position, frame.normal, offset)
            - physics::center_y(prev.heart_position, prev.normal, offset);
        physics::update_velocity(
            prev.velocity,
            delta_y,
            spine_advance,
            params.friction,
            params.resistance,
            cfg.dt(),
        )
    };

    let curvature = Curvature::from_frames(frame, prev.frame());
    let forces = Forces::compute(curvature, frame, velocity, heart_advance, cfg.hz);
    emit(prev, heart_position, frame, velocity, forces, heart_advance, spine_advance, params)
}

/// Completes a step onto a pose taken from an existing path; the previous
/// spine uses the previous point's own heart offset.
pub(crate) fn follow(
    prev: &Point,
    heart_position: Float3,
    frame: Frame,
    params: &StepParams,
    cfg: &StepConfig,
) -> Point {
    let spine_advance = (frame.spine_position(heart_position, params.heart_offset)
        - prev.spine_position(prev.heart_offset))
    .magnitude();
    let heart_advance = (heart_position - prev.heart_position).magnitude();

    let velocity = if params.fixed_velocity {
        prev.velocity
    } else {
        let delta_y =
            physics::center_y(heart_position, frame.normal, params.heart_offset) - prev.center_y();
        physics::update_velocity(
            prev.velocity,
            delta_y,
            spine_advance,
            params.friction,
            params.resistance,
            cfg.dt(),
        )
    };

    let forces = path_forces(prev, frame, heart_advance, velocity, cfg.hz);
    emit(prev, heart_position, frame, velocity, forces, heart_advance, spine_advance, params)
}

#[allow(clippy::too_many_arguments)]
fn emit(
    prev: &Point,
    heart_position: Float3,
    frame: Frame,
    velocity: f32,
    forces: Forces,
    heart_advance: f32,
    spine_advance: f32,
    params: &StepParams,
) -> Point {
    with_energy(Point {
        heart_position,
        direction: frame.direction,
        normal: frame.normal,
        lateral: frame.lateral,
        velocity,
        energy: 0.0,
        normal_force: forces.normal,
        lateral_force: forces.lateral,
        heart_arc: prev.heart_arc + heart_advance,
        spine_arc: prev.spine_arc + spine_advance,
        heart_advance,
        friction_origin: prev.friction_origin,
        roll_speed: params.roll_speed,
        heart_offset: params.heart_offset,
        friction: params.friction,
        resistance: params.resistance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Keyframe;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    fn slow(velocity: f32, pitch: f32) -> Point {
        let frame = Point::DEFAULT.frame().with_pitch(pitch);
        Point {
            direction: frame.direction,
            normal: frame.normal,
            lateral: frame.lateral,
            velocity,
            spine_arc: 12.0,
            ..Point::DEFAULT
        }
    }

    #[test]
    fn gate_passes_moving_train_untouched() {
        let p = Point::DEFAULT;
        assert_eq!(gate(p, None, &StepConfig::DEFAULT), Ok(p));
    }

    #[test]
    fn gate_lifts_slow_train_on_downhill() {
        let p = slow(0.01, -0.2);
        let gated = gate(p, None, &StepConfig::DEFAULT).unwrap();
        assert_relative_eq!(gated.velocity, StepConfig::DEFAULT.min_velocity);
        assert_relative_eq!(gated.friction_origin, 12.0);
    }

    #[test]
    fn advance_gate_keeps_slow_train_state_on_downhill() {
        let p = Point {
            friction_origin: 4.0,
            ..slow(0.01, -0.2)
        };
        let (gated, advance) = gate_advance(p, None, &StepConfig::DEFAULT).unwrap();
        assert_eq!(gated, p);
        assert_relative_eq!(advance, StepConfig::DEFAULT.min_velocity);

        let (driven, advance) = gate_advance(p, Some(5.0), &StepConfig::DEFAULT).unwrap();
        assert_relative_eq!(driven.velocity, 5.0);
        assert_relative_eq!(driven.friction_origin, 12.0);
        assert_relative_eq!(advance, 5.0);
        assert_eq!(
            gate_advance(slow(0.01, 0.2), None, &StepConfig::DEFAULT),
            Err(StopReason::Stalled)
        );
    }

    #[test]
    fn gate_stalls_slow_train_on_uphill() {
        let p = slow(0.01, 0.2);
        assert_eq!(gate(p, None, &StepConfig::DEFAULT), Err(StopReason::Stalled));
    }

    #[test]
    fn gate_applies_fixed_velocity_and_resets_friction() {
        let p = slow(30.0, 0.0);
        let gated = gate(p, Some(5.0), &StepConfig::DEFAULT).unwrap();
        assert_relative_eq!(gated.velocity, 5.0);
        assert_relative_eq!(gated.friction_origin, 12.0);
        assert_eq!(
            gate(p, Some(0.01), &StepConfig::DEFAULT),
            Err(StopReason::FixedVelocityTooLow)
        );
    }

    #[test]
    fn limits_reject_overspeed_and_excess_force() {
        let cfg = StepConfig::DEFAULT;
        let fast = Point {
            velocity: 151.0,
            ..Point::DEFAULT
        };
        assert_eq!(check_limits(&fast, &cfg), Err(StopReason::Overspeed));
        let crushing = Point {
            normal_force: 8.0,
            lateral_force: 7.0,
            ..Point::DEFAULT
        };
        assert_eq!(check_limits(&crushing, &cfg), Err(StopReason::ForceLimit));
        assert_eq!(check_limits(&Point::DEFAULT, &cfg), Ok(()));
    }

    #[test]
    fn empty_fixed_velocity_curve_holds_current_velocity() {
        let curves = SectionCurves {
            fixed_velocity: Some(Vec::new()),
            ..SectionCurves::default()
        };
        let set = CurveSet::new(&curves, PhysicsDefaults::new(1.1, 0.0, 0.0));
        assert_eq!(set.velocity_override(0.5, 17.0), Some(17.0));
        assert!(set.params(0.5).fixed_velocity);
    }

    #[test]
    fn params_fall_back_to_defaults() {
        let curves = SectionCurves {
            friction: vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(1.0, 0.1)],
            ..SectionCurves::default()
        };
        let set = CurveSet::new(&curves, PhysicsDefaults::new(1.3, 0.5, 0.002));
        let params = set.params(0.5);
        assert_relative_eq!(params.heart_offset, 1.3);
        assert_relative_eq!(params.friction, 0.05, epsilon = TOLERANCE);
        assert_relative_eq!(params.resistance, 0.002);
        assert!(!params.fixed_velocity);
        assert_eq!(set.velocity_override(0.5, 10.0), None);
    }

    #[test]
    fn straight_step_advances_by_velocity_over_hz() {
        let prev = Point::DEFAULT;
        let cfg = StepConfig::DEFAULT;
        let frame = prev.frame();
        let heart = advance_heart(&prev, frame.direction, frame.normal, 1.1, cfg.hz);
        let next = integrate(&prev, heart, frame, &StepParams::default(), &cfg);
        assert_relative_eq!(next.heart_advance, 0.1, epsilon = TOLERANCE);
        assert_relative_eq!(next.spine_arc, 0.1, epsilon = TOLERANCE);
        assert_relative_eq!(next.velocity, 10.0, epsilon = TOLERANCE);
        assert_relative_eq!(next.normal_force, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn integrated_energy_is_conserved_without_losses() {
        let prev = with_energy(Point::DEFAULT);
        let cfg = StepConfig::DEFAULT;
        let frame = prev.frame().with_pitch(-0.05);
        let heart = advance_heart(&prev, frame.direction, frame.normal, 1.1, cfg.hz);
        let next = integrate(&prev, heart, frame, &StepParams::default(), &cfg);
        assert!(next.velocity > prev.velocity);
        assert_relative_eq!(next.energy, prev.energy, epsilon = 1e-2);
    }
}
