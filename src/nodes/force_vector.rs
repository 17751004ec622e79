use crate::sim::{Curvature, Forces, Frame, Point};

/// Forces felt when a path-following builder moves from `prev` onto
/// `curr`, a pose read off an existing path.
///
/// Unlike the simulated builders the curvature is always taken from the
/// pitch/yaw change, even for direction changes below machine epsilon.
pub fn path_forces(
    prev: &Point,
    curr: Frame,
    heart_advance: f32,
    velocity: f32,
    hz: f32,
) -> Forces {
    let curvature = Curvature::between(curr, prev.frame());
    Forces::compute(curvature, curr, velocity, heart_advance, hz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::G;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;

    #[test]
    fn straight_path_feels_gravity_only() {
        let prev = Point::DEFAULT;
        let forces = path_forces(&prev, prev.frame(), 0.1, 10.0, 100.0);
        assert_relative_eq!(forces.normal, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(forces.lateral, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn dip_into_pull_up_raises_normal_force() {
        let prev = Point::DEFAULT;
        let curr = prev.frame().with_pitch(0.01);
        let forces = path_forces(&prev, curr, 0.1, 10.0, 100.0);
        assert_relative_eq!(forces.normal, 1.0 + 10.0 / G, epsilon = 2e-2);
    }
}
