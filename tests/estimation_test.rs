mod common;

use approx::assert_relative_eq;
use common::{service, KernelDir, MOON_EARTH_BSP};
use spicery::constants::SPEED_OF_LIGHT_KM_S;
use spicery::{AberrationCorrection, SpiceryError};

fn none() -> AberrationCorrection {
    AberrationCorrection::default()
}

#[test]
fn estimate_clamps_to_the_first_boundary_before_coverage() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // Moon covered on [100, 200]: at t=50 the estimate is the exact
    // position at t=100, i.e. (1000 - 500, 0, 0)
    let (pos, lt) = s
        .estimated_position("MOON", "EARTH", "J2000", none(), 50.0)
        .unwrap();
    assert_relative_eq!(pos.x, 500.0);
    assert_relative_eq!(pos.y, 0.0);
    assert_relative_eq!(lt, 500.0 / SPEED_OF_LIGHT_KM_S);
}

#[test]
fn estimate_clamps_to_the_last_boundary_after_coverage() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // exact position at t=200 is (2000 - 500, 0, 0)
    let (pos, _) = s
        .estimated_position("MOON", "EARTH", "J2000", none(), 250.0)
        .unwrap();
    assert_relative_eq!(pos.x, 1500.0);
}

#[test]
fn estimate_interpolates_between_boundaries() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // t=150 sits halfway between the boundaries 100 and 200, so the
    // estimate is the 0.5/0.5 blend of the exact boundary positions
    let (pos, lt) = s
        .estimated_position("MOON", "EARTH", "J2000", none(), 150.0)
        .unwrap();
    assert_relative_eq!(pos.x, 0.5 * 500.0 + 0.5 * 1500.0);
    assert_relative_eq!(
        lt,
        0.5 * 500.0 / SPEED_OF_LIGHT_KM_S + 0.5 * 1500.0 / SPEED_OF_LIGHT_KM_S
    );
}

#[test]
fn interpolation_blends_across_real_gaps() {
    let dir = KernelDir::new();
    let path = dir.write(
        "gappy.bsp",
        "body 555 PROBE 100 200 0 0 0 0 0 0\n\
         body 555 PROBE 300 400 800 0 0 0 0 0\n\
         body 399 EARTH 0 1000000 500 0 0 0 0 0\n",
    );
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // boundaries bracket t=250 as (200, 300); the probe jumps between its
    // two arcs, so the blend is visibly not an exact state
    let (pos, lt) = s
        .estimated_position("PROBE", "EARTH", "J2000", none(), 250.0)
        .unwrap();
    assert_relative_eq!(pos.x, 0.5 * (-500.0) + 0.5 * 300.0);
    // light time interpolates too, rather than being recomputed from the
    // blended position
    assert_relative_eq!(
        lt,
        0.5 * 500.0 / SPEED_OF_LIGHT_KM_S + 0.5 * 300.0 / SPEED_OF_LIGHT_KM_S
    );
}

#[test]
fn target_position_estimates_the_uncovered_side() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // target uncovered at 250, observer covered: estimation path
    let (pos, _) = s
        .target_position("MOON", "EARTH", "J2000", none(), 250.0)
        .unwrap();
    assert_relative_eq!(pos.x, 1500.0);
}

#[test]
fn estimated_queries_stay_antisymmetric() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // exactly one side covered at 250, so both calls go through the
    // estimator with swapped roles; the sign flip must keep the
    // "target minus observer" convention
    let (ab, lt_ab) = s
        .target_position("MOON", "EARTH", "J2000", none(), 250.0)
        .unwrap();
    let (ba, lt_ba) = s
        .target_position("EARTH", "MOON", "J2000", none(), 250.0)
        .unwrap();
    assert_relative_eq!((ab + ba).norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(lt_ab, lt_ba);
}

#[test]
fn estimation_without_any_data_is_no_coverage() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    let err = s
        .estimated_position("777", "EARTH", "J2000", none(), 150.0)
        .unwrap_err();
    assert!(matches!(err, SpiceryError::NoCoverage(_)));
}

#[test]
fn barycenter_estimates_to_the_origin() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    s.load_kernel(&path).unwrap();

    let (pos, lt) = s
        .estimated_position("SSB", "EARTH", "J2000", none(), 150.0)
        .unwrap();
    assert_relative_eq!(pos.norm(), 0.0);
    assert_relative_eq!(lt, 0.0);
}

#[test]
fn transform_estimate_clamps_and_blends() {
    let dir = KernelDir::new();
    let path = dir.write(
        "attitude.bc",
        "frame -41000 PROBE_FRAME 0 100 0.01\n\
         frame -41000 PROBE_FRAME 200 300 0.02\n",
    );
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // before all coverage: exact transform at the first boundary
    let before = s
        .estimated_transform_matrix("PROBE_FRAME", "J2000", -50.0)
        .unwrap();
    let first = s
        .frame_transformation_matrix("PROBE_FRAME", "J2000", 0.0)
        .unwrap();
    assert_relative_eq!((before - first).norm(), 0.0, epsilon = 1e-12);

    // inside the gap: component-wise blend of the bracketing transforms
    let blended = s
        .estimated_transform_matrix("PROBE_FRAME", "J2000", 150.0)
        .unwrap();
    let lo = s
        .frame_transformation_matrix("PROBE_FRAME", "J2000", 100.0)
        .unwrap();
    let hi = s
        .frame_transformation_matrix("PROBE_FRAME", "J2000", 200.0)
        .unwrap();
    let expected = lo * 0.5 + hi * 0.5;
    assert_relative_eq!((blended - expected).norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn transform_estimate_without_data_is_no_coverage() {
    let dir = KernelDir::new();
    let path = dir.write("attitude.bc", "frame -41000 PROBE_FRAME 0 100 0.01\n");
    let mut s = service();
    s.load_kernel(&path).unwrap();

    // the frame resolves (an arc declares it) but a different frame id has
    // no orientation coverage at all
    let err = s
        .estimated_transform_matrix("J2000", "PROBE_FRAME", 50.0)
        .unwrap_err();
    assert!(matches!(err, SpiceryError::NoCoverage(_)));
}
