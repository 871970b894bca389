mod common;

use common::{service, KernelDir, MOON_EARTH_BSP};
use spicery::{ErrorMode, SpiceryError};

#[test]
fn loading_the_same_path_twice_is_idempotent() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    let baseline = s.loaded_kernels().len();

    let first = s.load_kernel(&path).unwrap();
    let second = s.load_kernel(&path).unwrap();
    assert_eq!(first, second);
    // one record for one canonical path
    assert_eq!(s.loaded_kernels().len(), baseline + 1);

    // refcount 2: the first unload keeps the kernel listed
    s.unload_kernel(first).unwrap();
    assert_eq!(s.loaded_kernels().len(), baseline + 1);
    s.unload_kernel(first).unwrap();
    assert_eq!(s.loaded_kernels().len(), baseline);
}

#[test]
fn distinct_files_get_distinct_monotonic_handles() {
    let dir = KernelDir::new();
    let a = dir.write("a.bsp", "body 1 A 0 10 0 0 0 0 0 0\n");
    let b = dir.write("b.bsp", "body 2 B 0 10 0 0 0 0 0 0\n");
    let mut s = service();

    let ha = s.load_kernel(&a).unwrap();
    let hb = s.load_kernel(&b).unwrap();
    assert_ne!(ha, hb);
    assert!(hb.get() > ha.get());
    assert!(ha.get() > 0);
}

#[test]
fn loaded_kernels_tracks_live_records_only() {
    let dir = KernelDir::new();
    let a = dir.write("a.bsp", "body 1 A 0 10 0 0 0 0 0 0\n");
    let b = dir.write("b.bsp", "body 2 B 0 10 0 0 0 0 0 0\n");
    let mut s = service();
    let baseline = s.loaded_kernels().len();

    s.load_kernel(&a).unwrap();
    let hb = s.load_kernel(&b).unwrap();
    assert_eq!(s.loaded_kernels().len(), baseline + 2);

    s.unload_kernel(hb).unwrap();
    let kernels = s.loaded_kernels();
    assert_eq!(kernels.len(), baseline + 1);
    assert!(kernels.iter().any(|p| p.as_str().ends_with("a.bsp")));
    assert!(!kernels.iter().any(|p| p.as_str().ends_with("b.bsp")));
}

#[test]
fn unload_by_path_mirrors_unload_by_handle() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();
    let baseline = s.loaded_kernels().len();

    s.load_kernel(&path).unwrap();
    s.load_kernel(&path).unwrap();
    s.unload_kernel_by_path(&path).unwrap();
    assert_eq!(s.loaded_kernels().len(), baseline + 1);
    s.unload_kernel_by_path(&path).unwrap();
    assert_eq!(s.loaded_kernels().len(), baseline);
}

#[test]
fn unloading_an_unknown_path_raises_or_noops() {
    let dir = KernelDir::new();
    let path = dir.write("never_loaded.bsp", "body 1 A 0 10 0 0 0 0 0 0\n");
    let mut s = service();

    let err = s.unload_kernel_by_path(&path).unwrap_err();
    assert!(matches!(err, SpiceryError::InvalidHandle(_)));

    s.set_error_mode(ErrorMode::Fallback);
    assert!(s.unload_kernel_by_path(&path).is_ok());
}

#[test]
fn a_fully_unloaded_handle_is_a_noop_afterwards() {
    let dir = KernelDir::new();
    let path = dir.write("mission.bsp", MOON_EARTH_BSP);
    let mut s = service();

    let handle = s.load_kernel(&path).unwrap();
    s.unload_kernel(handle).unwrap();
    // the handle was assigned once, so a second unload is a silent no-op
    assert!(s.unload_kernel(handle).is_ok());
}

#[test]
fn load_rejects_directories() {
    let dir = KernelDir::new();
    let sub = dir.write("placeholder.txt", "x");
    let parent = sub.parent().unwrap();
    let mut s = service();
    let err = s.load_kernel(parent).unwrap_err();
    assert!(matches!(err, SpiceryError::InvalidArgument(_)));
}
