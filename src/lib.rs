//! # Spicery: kernel lifecycle, coverage indexing, and ephemeris queries
//!
//! This crate answers the question *"where is body A relative to body B, in
//! frame F, at time T"* on top of a library of loaded astrodynamics data
//! files (kernels), even when exact data coverage does not extend to T.
//!
//! The service is split into four cooperating pieces:
//!
//! 1. **Kernel registry** ([`registry`]) — reference-counted bookkeeping of
//!    loaded kernel files, keyed by canonical path.
//! 2. **Coverage indexer** ([`coverage`]) — per-id time-interval tables
//!    built by scanning each kernel as it is loaded.
//! 3. **Query engine** ([`spicery::Spicery`]) — position, state, and
//!    frame-transform queries with full/partial/no-coverage dispatch.
//! 4. **Estimator** ([`estimate`]) — constant extrapolation at coverage
//!    edges and linear interpolation across coverage gaps.
//!
//! The low-level kernel parser and exact-computation primitives live behind
//! the [`backend::SpiceBackend`] trait; [`backend::synthetic::SyntheticSpice`]
//! is a self-contained in-memory implementation used by the test suite and
//! usable as a lightweight stand-in when no real toolkit is linked in.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use spicery::backend::synthetic::SyntheticSpice;
//! use spicery::{AberrationCorrection, Spicery};
//!
//! let mut service = Spicery::new(Box::new(SyntheticSpice::new())).unwrap();
//! let handle = service.load_kernel("data/mission.bsp").unwrap();
//!
//! let abcorr: AberrationCorrection = "LT+S".parse().unwrap();
//! let (pos, light_time) = service
//!     .target_position("MOON", "EARTH", "J2000", abcorr, 1.0e8)
//!     .unwrap();
//! # let _ = (handle, pos, light_time);
//! ```

pub mod aberration;
pub mod backend;
pub mod constants;
pub mod coverage;
pub mod estimate;
mod leapseconds;
pub mod query;
pub mod registry;
pub mod spicery;
pub mod spicery_errors;

pub use crate::aberration::AberrationCorrection;
pub use crate::registry::KernelHandle;
pub use crate::spicery::{ErrorMode, Spicery};
pub use crate::spicery_errors::SpiceryError;
