use std::cell::Cell;

use serde::{Deserialize, Serialize};

/// Interpolation used on one side of a keyframe.
///
/// Ordered by smoothness: a segment uses the smoother of its start's
/// outgoing and its end's incoming kind.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum InterpolationType {
    Constant,
    Linear,
    #[default]
    Bezier,
}

/// One control point of a scalar curve.
///
/// `position` is whatever the owning builder keys the curve by: elapsed
/// time, travelled distance or swept angle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Keyframe {
    pub position: f32,
    pub value: f32,
    pub in_interpolation: InterpolationType,
    pub out_interpolation: InterpolationType,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
}

impl Keyframe {
    /// Flat-tangent Bezier key with the usual one-third handle weights.
    pub const fn simple(position: f32, value: f32) -> Self {
        Self::with_interpolation(position, value, InterpolationType::Bezier)
    }

    pub const fn linear(position: f32, value: f32) -> Self {
        Self::with_interpolation(position, value, InterpolationType::Linear)
    }

    pub const fn constant(position: f32, value: f32) -> Self {
        Self::with_interpolation(position, value, InterpolationType::Constant)
    }

    const fn with_interpolation(position: f32, value: f32, kind: InterpolationType) -> Self {
        Self {
            position,
            value,
            in_interpolation: kind,
            out_interpolation: kind,
            in_tangent: 0.0,
            out_tangent: 0.0,
            in_weight: 1.0 / 3.0,
            out_weight: 1.0 / 3.0,
        }
    }
}

/// Samples a curve at `t`, clamping to the end values outside the keyed
/// range. An empty curve yields `default_value`.
pub fn evaluate(keyframes: &[Keyframe], t: f32, default_value: f32) -> f32 {
    let (first, last) = match (keyframes.first(), keyframes.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return default_value,
    };
    if t <= first.position {
        return first.value;
    }
    let i = keyframes
        .partition_point(|k| k.position <= t)
        .saturating_sub(1);
    match keyframes.get(i + 1) {
        Some(end) => evaluate_segment(&keyframes[i], end, t),
        None => last.value,
    }
}

/// Value between two adjacent keys at `t`, `start.position <= t < end.position`.
pub fn evaluate_segment(start: &Keyframe, end: &Keyframe, t: f32) -> f32 {
    if start.out_interpolation == InterpolationType::Constant {
        return start.value;
    }
    match start.out_interpolation.max(end.in_interpolation) {
        InterpolationType::Constant => start.value,
        InterpolationType::Linear => {
            let u = (t - start.position) / (end.position - start.position);
            start.value + (end.value - start.value) * u
        }
        InterpolationType::Bezier => bezier_value(start, end, t),
    }
}

/// 2-D cubic through the two keys and their weighted tangent handles.
///
/// The curve parameter for `t` is found by Newton iteration on the
/// x (position) polynomial, then the y polynomial is evaluated there.
fn bezier_value(start: &Keyframe, end: &Keyframe, t: f32) -> f32 {
    let span = end.position - start.position;
    let xs = [
        start.position,
        start.position + span * start.out_weight,
        end.position - span * end.in_weight,
        end.position,
    ];
    let ys = [
        start.value,
        start.value + start.out_tangent * span * start.out_weight,
        end.value - end.in_tangent * span * end.in_weight,
        end.value,
    ];

    let mut u = (t - start.position) / span;
    for _ in 0..8 {
        let error = cubic(xs, u) - t;
        if error.abs() < 1e-6 {
            break;
        }
        let slope = cubic_slope(xs, u);
        if slope.abs() < 1e-9 {
            break;
        }
        u = (u - error / slope).clamp(0.0, 1.0);
    }
    cubic(ys, u)
}

fn cubic([p0, p1, p2, p3]: [f32; 4], u: f32) -> f32 {
    let v = 1.0 - u;
    let v2 = v * v;
    let u2 = u * u;
    v2 * v * p0 + 3.0 * v2 * u * p1 + 3.0 * v * u2 * p2 + u2 * u * p3
}

fn cubic_slope([p0, p1, p2, p3]: [f32; 4], u: f32) -> f32 {
    let v = 1.0 - u;
    let v2 = v * v;
    let u2 = u * u;
    -3.0 * v2 * p0 + 3.0 * v2 * p1 - 6.0 * v * u * p1 + 6.0 * v * u * p2 - 3.0 * u2 * p2
        + 3.0 * u2 * p3
}

/// Sequential reader over one curve.
///
/// Builders query once per emitted point with (almost always) increasing
/// positions; the sampler remembers the last segment so those queries skip
/// the binary search. Results are identical to [`evaluate`].
#[derive(Debug, Clone)]
pub struct CurveSampler<'a> {
    keyframes: &'a [Keyframe],
    default_value: f32,
    cursor: Cell<usize>,
}

impl<'a> CurveSampler<'a> {
    pub fn new(keyframes: &'a [Keyframe], default_value: f32) -> Self {
        Self {
            keyframes,
            default_value,
            cursor: Cell::new(0),
        }
    }

    pub fn sample(&self, t: f32) -> f32 {
        self.sample_or(t, self.default_value)
    }

    /// Like [`CurveSampler::sample`] with a per-call fallback for empty curves,
    /// for curves whose default tracks the evolving state.
    pub fn sample_or(&self, t: f32, default_value: f32) -> f32 {
        let keys = self.keyframes;
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return default_value,
        };
        if t <= first.position {
            return first.value;
        }
        if t >= last.position {
            return last.value;
        }

        let mut i = self.cursor.get();
        if i + 1 >= keys.len() || keys[i].position > t {
            i = keys.partition_point(|k| k.position <= t).saturating_sub(1);
        }
        while i + 1 < keys.len() && keys[i + 1].position <= t {
            i += 1;
        }
        let Some(end) = keys.get(i + 1) else {
            return last.value;
        };
        self.cursor.set(i);
        evaluate_segment(&keys[i], end, t)
    }
}
