//! Seam to the low-level numerical toolkit.
//!
//! The kernel-file parser and the exact-computation primitives are not part
//! of this crate; they are consumed through the [`SpiceBackend`] trait, one
//! method per primitive. Implementations over a real toolkit are expected
//! to centralize the toolkit's failed-flag/reset dance in each method and
//! surface the outcome as a `Result`, so no global error state ever leaks
//! past this boundary.
//!
//! [`synthetic::SyntheticSpice`] is a self-contained implementation over a
//! small text-kernel format, good enough for tests and demos.

pub mod synthetic;

use camino::Utf8Path;
use nalgebra::{Matrix3, Matrix6, Vector3};
use thiserror::Error;

use crate::aberration::{AberrationCorrection, FieldOfViewMethod, TerminatorType};
use crate::constants::{EphemerisTime, LightTime, NaifId};
use crate::query::{FieldOfViewResult, SurfaceInterceptResult, TerminatorEllipseResult};

/// Failure reported by a backend primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The primitive ran and reported a failure (parse error, insufficient
    /// data, unresolvable name, ...). Carries the toolkit's message.
    #[error("{0}")]
    Failed(String),

    /// The backend does not implement this primitive at all.
    #[error("primitive '{0}' is not supported by this backend")]
    Unsupported(&'static str),
}

impl BackendError {
    pub fn failed(msg: impl Into<String>) -> Self {
        BackendError::Failed(msg.into())
    }
}

/// One method per primitive of the underlying toolkit.
///
/// Times are ephemeris seconds past J2000 (TDB), positions km, velocities
/// km/s, matrices row-major 3×3 / 6×6 frame transforms.
pub trait SpiceBackend {
    /// Ingest a kernel file. The caller guarantees the path exists; the
    /// working directory is already the file's parent so that relative
    /// references inside meta-kernels resolve.
    fn load_kernel(&mut self, path: &Utf8Path) -> Result<(), BackendError>;

    /// Release a previously ingested kernel file.
    fn unload_kernel(&mut self, path: &Utf8Path) -> Result<(), BackendError>;

    /// Body ids and their coverage windows supplied by one position-type
    /// kernel file.
    fn position_coverage(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)>, BackendError>;

    /// Frame ids and their coverage windows supplied by one orientation-type
    /// kernel file.
    fn orientation_coverage(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)>, BackendError>;

    /// Exact target position relative to an observer, plus light time.
    fn position(
        &self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        correction: AberrationCorrection,
        observer: &str,
    ) -> Result<(Vector3<f64>, LightTime), BackendError>;

    /// Exact target state (position and velocity) plus light time.
    fn state(
        &self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        correction: AberrationCorrection,
        observer: &str,
    ) -> Result<(Vector3<f64>, Vector3<f64>, LightTime), BackendError>;

    /// 3×3 rotation taking vectors from `from` to `to` at `et`.
    fn position_transform(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, BackendError>;

    /// 3×3 rotation taking vectors from `from` at `et_from` to `to` at
    /// `et_to`.
    fn position_transform_between(
        &self,
        from: &str,
        to: &str,
        et_from: EphemerisTime,
        et_to: EphemerisTime,
    ) -> Result<Matrix3<f64>, BackendError>;

    /// 6×6 state transformation between two frames at `et`.
    fn state_transform(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix6<f64>, BackendError>;

    /// Ray/surface intercept; `Ok(None)` when the ray misses the body.
    #[allow(clippy::too_many_arguments)]
    fn surface_intercept(
        &self,
        target: &str,
        observer: &str,
        fov_frame: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
        direction: Vector3<f64>,
    ) -> Result<Option<SurfaceInterceptResult>, BackendError>;

    /// Whether `target` is inside the field of view of `instrument`.
    #[allow(clippy::too_many_arguments)]
    fn target_in_field_of_view(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        instrument: &str,
        method: FieldOfViewMethod,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<bool, BackendError>;

    /// Field-of-view geometry of an instrument.
    fn field_of_view(&self, instrument: NaifId) -> Result<FieldOfViewResult, BackendError>;

    /// Terminator ellipse of `target` as lit by `light_source`.
    #[allow(clippy::too_many_arguments)]
    fn terminator_ellipse(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        light_source: &str,
        terminator: TerminatorType,
        correction: AberrationCorrection,
        et: EphemerisTime,
        point_count: usize,
    ) -> Result<TerminatorEllipseResult, BackendError>;

    /// Resolve a body name to its id; `Ok(None)` when unknown.
    fn body_id(&self, name: &str) -> Result<Option<NaifId>, BackendError>;

    /// Resolve a frame name to its id; `Ok(None)` when unknown.
    fn frame_id(&self, name: &str) -> Result<Option<NaifId>, BackendError>;

    /// All known (id, name) pairs, either toolkit built-ins or those
    /// contributed by loaded kernels.
    fn body_ids_and_names(&self, built_in: bool) -> Result<Vec<(NaifId, String)>, BackendError>;

    /// Numeric constants attached to a body (radii, GM, ...), at most
    /// `room` values.
    fn body_constant(
        &self,
        body: &str,
        item: &str,
        room: usize,
    ) -> Result<Vec<f64>, BackendError>;

    /// Whether a numeric constant is attached to a body.
    fn has_constant(&self, body: NaifId, item: &str) -> bool;

    /// Parse a calendar date string into ephemeris seconds past J2000.
    fn ephemeris_time_from_date(&self, date: &str) -> Result<EphemerisTime, BackendError>;

    /// Format an ephemeris time as a calendar date string.
    fn date_from_ephemeris_time(
        &self,
        et: EphemerisTime,
        format: &str,
    ) -> Result<String, BackendError>;

    /// Convert spacecraft clock ticks to ephemeris time.
    fn spacecraft_clock_to_et(
        &self,
        craft: NaifId,
        ticks: f64,
    ) -> Result<EphemerisTime, BackendError>;
}
