use crate::error::{Error, Result};
use crate::sim::Point;

/// Absolute tolerance for point-field comparison.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerance(pub f32);

impl Default for Tolerance {
    fn default() -> Self {
        Self(1e-4)
    }
}

fn fields(p: &Point) -> [(&'static str, f32); 24] {
    [
        ("heart_position.x", p.heart_position.x),
        ("heart_position.y", p.heart_position.y),
        ("heart_position.z", p.heart_position.z),
        ("direction.x", p.direction.x),
        ("direction.y", p.direction.y),
        ("direction.z", p.direction.z),
        ("normal.x", p.normal.x),
        ("normal.y", p.normal.y),
        ("normal.z", p.normal.z),
        ("lateral.x", p.lateral.x),
        ("lateral.y", p.lateral.y),
        ("lateral.z", p.lateral.z),
        ("velocity", p.velocity),
        ("energy", p.energy),
        ("normal_force", p.normal_force),
        ("lateral_force", p.lateral_force),
        ("heart_arc", p.heart_arc),
        ("spine_arc", p.spine_arc),
        ("heart_advance", p.heart_advance),
        ("friction_origin", p.friction_origin),
        ("roll_speed", p.roll_speed),
        ("heart_offset", p.heart_offset),
        ("friction", p.friction),
        ("resistance", p.resistance),
    ]
}

/// Checks `actual` against `expected` point by point.
///
/// Lengths must match exactly. Fields are compared in declaration order and
/// the first one off by more than `tolerance` is reported.
pub fn compare(actual: &[Point], expected: &[Point], tolerance: Tolerance) -> Result<()> {
    if actual.len() != expected.len() {
        return Err(Error::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        for ((field, actual), (_, expected)) in fields(a).into_iter().zip(fields(e)) {
            let within = (actual - expected).abs() <= tolerance.0;
            if !within {
                tracing::debug!(index, field, expected, actual, "golden mismatch");
                return Err(Error::FieldMismatch {
                    index,
                    field,
                    expected,
                    actual,
                    tolerance: tolerance.0,
                });
            }
        }
    }
    Ok(())
}
