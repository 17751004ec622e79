use approx::assert_relative_eq;
use kextrack::nodes::bridge::{self, BridgeParams};
use kextrack::nodes::copy_path::{self, CopyMode};
use kextrack::nodes::curved::{self, CurvedParams};
use kextrack::nodes::force::{self, ForceProfile};
use kextrack::nodes::{anchor, reverse_path, DurationType, IterationConfig, SectionCurves};
use kextrack::sim::{physics, Float3, Keyframe, Point};
use kextrack::{Error, StepConfig};

const TOLERANCE: f32 = 1e-4;

fn start() -> Point {
    anchor::build(
        Float3::new(0.0, 10.0, 0.0),
        0.0,
        0.0,
        0.0,
        12.0,
        0.5 * 12.0 * 12.0 + physics::G * (10.0 - 0.9 * 1.1),
        1.1,
        0.0,
        0.0,
    )
}

fn assert_frame_orthonormal(p: &Point) {
    assert_relative_eq!(p.direction.magnitude(), 1.0, epsilon = 1e-3);
    assert_relative_eq!(p.normal.magnitude(), 1.0, epsilon = 1e-3);
    assert_relative_eq!(p.lateral.magnitude(), 1.0, epsilon = 1e-3);
    assert!(p.direction.dot(p.normal).abs() < 1e-3);
    assert!(p.direction.dot(p.lateral).abs() < 1e-3);
    assert!(p.normal.dot(p.lateral).abs() < 1e-3);
}

/// Anchor, turn, force section and a bridge back towards level track.
fn chained_track() -> Vec<Vec<Point>> {
    let first = start();
    let turn = curved::build(
        &first,
        &CurvedParams::new(20.0, 90.0, 0.0, 10.0, 10.0),
        &SectionCurves::default(),
        (&first).into(),
    );
    let turn_end = *turn.last().unwrap();

    let hill = force::build(
        &turn_end,
        &IterationConfig::new(1.5, DurationType::Time),
        &ForceProfile {
            normal_force: vec![
                Keyframe::simple(0.0, 1.0),
                Keyframe::simple(0.75, 0.5),
                Keyframe::simple(1.5, 1.0),
            ],
            lateral_force: Vec::new(),
        },
        &SectionCurves::default(),
        (&turn_end).into(),
    );
    let hill_end = *hill.last().unwrap();

    let target = Point::create(
        hill_end.heart_position + hill_end.direction * 30.0 + Float3::new(0.0, -2.0, 0.0),
        hill_end.direction,
        0.0,
        hill_end.velocity,
        1.1,
        0.0,
        0.0,
    );
    let join = bridge::build(
        &hill_end,
        &target,
        &BridgeParams::new(0.3, 0.3),
        &SectionCurves::default(),
        (&hill_end).into(),
    );
    vec![turn, hill, join]
}

#[test]
fn sections_continue_from_their_anchor() {
    let sections = chained_track();
    let mut previous_end = start();
    for section in &sections {
        assert!(section.len() > 1);
        assert_eq!(section[0], previous_end);
        previous_end = *section.last().unwrap();
    }
}

#[test]
fn arcs_and_frames_stay_valid_across_sections() {
    let track: Vec<Point> = chained_track().into_iter().flatten().collect();
    for pair in track.windows(2) {
        assert!(pair[1].heart_arc >= pair[0].heart_arc);
        assert!(pair[1].spine_arc >= pair[0].spine_arc);
    }
    for p in &track {
        assert_frame_orthonormal(p);
        assert!(p.velocity > 0.0);
        assert!(p.normal_force.is_finite() && p.lateral_force.is_finite());
    }
}

#[test]
fn zero_arc_turn_returns_the_anchor_unchanged() {
    let first = start();
    let result = curved::build(
        &first,
        &CurvedParams::new(20.0, 0.0, 0.0, 0.0, 0.0),
        &SectionCurves::default(),
        (&first).into(),
    );
    assert_eq!(result, vec![first]);
    assert_eq!(result[0].heart_arc, first.heart_arc);
    assert_eq!(result[0].spine_arc, first.spine_arc);
}

#[test]
fn reversed_turn_mirrors_the_original() {
    let turn = chained_track().remove(0);
    let reversed = reverse_path::build(&turn);

    assert_eq!(reversed.len(), turn.len());
    for (back, fwd) in reversed.iter().zip(turn.iter().rev()) {
        assert_eq!(back.heart_position, fwd.heart_position);
        assert_eq!(back.direction, -fwd.direction);
        assert_eq!(back.lateral, -fwd.lateral);
        assert_eq!(back.normal, fwd.normal);
        assert_eq!(back.heart_arc, fwd.heart_arc);
        assert_eq!(back.velocity, fwd.velocity);
    }
    assert_eq!(reverse_path::build(&reversed), turn);
}

#[test]
fn rigid_copy_repeats_a_section_further_down_the_track() {
    let sections = chained_track();
    let turn = &sections[0];
    let hill_end = *sections[1].last().unwrap();

    let copy = copy_path::build(&hill_end, turn, &CopyMode::Rigid, (&hill_end).into());
    assert_eq!(copy.len(), turn.len());
    assert_relative_eq!(
        (copy[0].heart_position - hill_end.heart_position).magnitude(),
        0.0,
        epsilon = TOLERANCE
    );
    let original_length = turn.last().unwrap().heart_arc - turn[0].heart_arc;
    let copied_length = copy.last().unwrap().heart_arc - copy[0].heart_arc;
    assert_relative_eq!(copied_length, original_length, epsilon = TOLERANCE);
    for p in &copy {
        assert_frame_orthonormal(p);
    }
}

#[test]
fn conflicting_step_configuration_is_rejected() {
    let active = *StepConfig::global();
    active.install().unwrap();

    let faster = StepConfig {
        hz: active.hz * 2.0,
        ..active
    };
    assert!(matches!(faster.install(), Err(Error::ConfigConflict)));
    assert_eq!(*StepConfig::global(), active);
}
