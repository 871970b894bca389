mod common;

use approx::assert_relative_eq;
use common::{service, KernelDir, MOON_EARTH_BSP};
use spicery::{AberrationCorrection, ErrorMode, SpiceryError};

fn none() -> AberrationCorrection {
    AberrationCorrection::default()
}

#[test]
fn uncovered_position_query_raises_or_returns_zero() {
    let mut s = service();

    // neither body has any position coverage
    let err = s
        .target_position("55", "66", "J2000", none(), 0.0)
        .unwrap_err();
    assert!(matches!(err, SpiceryError::NoCoverage(_)));

    s.set_error_mode(ErrorMode::Fallback);
    let (pos, lt) = s.target_position("55", "66", "J2000", none(), 0.0).unwrap();
    assert_relative_eq!(pos.norm(), 0.0);
    assert_relative_eq!(lt, 0.0);
}

#[test]
fn unresolvable_names_fall_back_to_sentinel_ids() {
    let mut s = service();

    assert!(matches!(
        s.naif_id("NOT_A_BODY"),
        Err(SpiceryError::KernelComputation { .. })
    ));
    assert!(matches!(
        s.frame_id("NOT_A_FRAME"),
        Err(SpiceryError::KernelComputation { .. })
    ));

    s.set_error_mode(ErrorMode::Fallback);
    assert_eq!(s.naif_id("NOT_A_BODY").unwrap(), 0);
    assert_eq!(s.frame_id("NOT_A_FRAME").unwrap(), 0);
}

#[test]
fn failed_transforms_fall_back_to_identity() {
    let mut s = service();

    assert!(s
        .frame_transformation_matrix("NOT_A_FRAME", "J2000", 0.0)
        .is_err());

    s.set_error_mode(ErrorMode::Fallback);
    let m = s
        .frame_transformation_matrix("NOT_A_FRAME", "J2000", 0.0)
        .unwrap();
    assert_relative_eq!(
        (m - nalgebra::Matrix3::identity()).norm(),
        0.0,
        epsilon = 1e-12
    );
    let m6 = s
        .state_transform_matrix("NOT_A_FRAME", "J2000", 0.0)
        .unwrap();
    assert_relative_eq!(
        (m6 - nalgebra::Matrix6::identity()).norm(),
        0.0,
        epsilon = 1e-12
    );
}

#[test]
fn failed_state_query_falls_back_to_a_zero_state() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();
    s.set_error_mode(ErrorMode::Fallback);

    let state = s
        .target_state("MOON", "EARTH", "J2000", none(), 250.0)
        .unwrap();
    assert_relative_eq!(state.position.norm(), 0.0);
    assert_relative_eq!(state.velocity.norm(), 0.0);
    assert_relative_eq!(state.light_time, 0.0);
}

#[test]
fn estimation_without_data_falls_back_to_zero() {
    let mut s = service();
    s.set_error_mode(ErrorMode::Fallback);
    let (pos, lt) = s
        .estimated_position("777", "888", "J2000", none(), 0.0)
        .unwrap();
    assert_relative_eq!(pos.norm(), 0.0);
    assert_relative_eq!(lt, 0.0);
}

#[test]
fn predicates_fall_back_to_false_and_values_to_empty() {
    let mut s = service();
    s.set_error_mode(ErrorMode::Fallback);

    assert!(!s
        .is_target_in_field_of_view(
            "55",
            "66",
            "J2000",
            "77",
            spicery::aberration::FieldOfViewMethod::Ellipsoid,
            none(),
            0.0,
        )
        .unwrap());
    assert!(s.body_values("55", "RADII", 3).unwrap().is_empty());
    assert_relative_eq!(s.body_value_scalar("55", "GM").unwrap(), 0.0);
}

#[test]
fn invalid_arguments_always_propagate() {
    let mut s = service();
    s.set_error_mode(ErrorMode::Fallback);

    assert!(matches!(
        s.target_position("", "66", "J2000", none(), 0.0),
        Err(SpiceryError::InvalidArgument(_))
    ));
    assert!(matches!(
        s.terminator_ellipse(
            "55",
            "66",
            "J2000",
            "SUN",
            spicery::aberration::TerminatorType::Umbral,
            none(),
            0.0,
            0,
        ),
        Err(SpiceryError::InvalidArgument(_))
    ));
}

#[test]
fn error_mode_round_trips() {
    let mut s = service();
    assert_eq!(s.error_mode(), ErrorMode::Raise);
    s.set_error_mode(ErrorMode::Fallback);
    assert_eq!(s.error_mode(), ErrorMode::Fallback);
}
