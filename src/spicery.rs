//! # Spicery: the ephemeris and frame-transformation service façade
//!
//! This module defines the [`Spicery`] struct, the central façade that wires
//! together:
//!
//! 1. **Kernel registry** ([`crate::registry`]) — canonical-path dedup,
//!    reference counting, monotonic handles.
//! 2. **Coverage indexer** ([`crate::coverage`]) — SPK (body) and CK (frame)
//!    interval tables populated as kernels are loaded.
//! 3. **Query engine** — position, state, and frame-transform queries with
//!    full/partial/no-coverage dispatch.
//! 4. **Estimator** ([`crate::estimate`]) — boundary extrapolation and
//!    linear interpolation when exact coverage runs out.
//!
//! The numerical toolkit sits behind [`SpiceBackend`]; the service owns one
//! boxed instance for its whole lifetime and funnels every primitive call
//! through it.
//!
//! ## Ownership and lifecycle
//!
//! A `Spicery` is an explicitly constructed value owned by the caller (no
//! hidden global). Construction bootstraps the embedded leap-second kernel
//! so time correlation works out of the box; dropping the service unloads
//! every kernel still registered.
//!
//! ## Error modes
//!
//! Every query returns `Result`. In [`ErrorMode::Raise`] (the default) all
//! failures propagate. In [`ErrorMode::Fallback`] the recoverable kinds are
//! downgraded to safe defaults — zero vectors, identity matrices, `false`
//! predicates, no-op unloads — and the error never reaches the caller.
//! Argument-validation failures always propagate; they indicate a caller
//! bug, not missing data.
//!
//! ## Threading
//!
//! All operations are synchronous and the type provides no internal
//! locking; the intended discipline is a single owning thread (typically a
//! simulation loop). Kernel loading briefly changes the process working
//! directory so that relative references inside meta-kernels resolve, which
//! makes concurrent loads unsafe regardless of external locking unless that
//! global mutation is itself guarded.

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::{Matrix3, Matrix6, Vector3};

use crate::aberration::{AberrationCorrection, FieldOfViewMethod, TerminatorType};
use crate::backend::{BackendError, SpiceBackend};
use crate::constants::{EphemerisTime, LightTime, NaifId, SOLAR_SYSTEM_BARYCENTER};
use crate::coverage::CoverageTable;
use crate::leapseconds;
use crate::query::{
    FieldOfViewResult, SurfaceInterceptResult, TargetState, TerminatorEllipseResult,
};
use crate::registry::{KernelHandle, KernelRegistry, Release};
use crate::spicery_errors::SpiceryError;

/// Governs what happens to recoverable query failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Propagate every failure to the caller.
    #[default]
    Raise,
    /// Downgrade recoverable failures to documented defaults.
    Fallback,
}

/// The ephemeris and frame-transformation service.
///
/// See the [module documentation](crate::spicery) for an overview.
pub struct Spicery {
    pub(crate) backend: Box<dyn SpiceBackend>,
    registry: KernelRegistry,
    pub(crate) spk: CoverageTable,
    pub(crate) ck: CoverageTable,
    error_mode: ErrorMode,
}

impl Spicery {
    /// Construct the service over a backend and bootstrap the embedded
    /// leap-second kernel.
    pub fn new(backend: Box<dyn SpiceBackend>) -> Result<Self, SpiceryError> {
        let mut service = Spicery {
            backend,
            registry: KernelRegistry::new(),
            spk: CoverageTable::new(),
            ck: CoverageTable::new(),
            error_mode: ErrorMode::Raise,
        };
        service.load_builtin_leapseconds()?;
        Ok(service)
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn set_error_mode(&mut self, mode: ErrorMode) {
        self.error_mode = mode;
    }

    /// Apply the fallback policy: in [`ErrorMode::Fallback`] a recoverable
    /// error becomes `Ok(default)`, everything else passes through.
    pub(crate) fn absorb<T>(
        &self,
        res: Result<T, SpiceryError>,
        default: T,
    ) -> Result<T, SpiceryError> {
        match res {
            Err(e) if self.error_mode == ErrorMode::Fallback && e.is_recoverable() => {
                tracing::debug!(error = %e, "failure absorbed by fallback mode");
                Ok(default)
            }
            other => other,
        }
    }

    // ---------------------------------------------------------------------
    // Kernel registry
    // ---------------------------------------------------------------------

    /// Load a kernel file and return its handle.
    ///
    /// Loading the same canonical path again is idempotent: the existing
    /// handle comes back and the reference count increases. A `.bsp` file
    /// additionally feeds the position coverage table and a `.bc` file the
    /// orientation table (extensions matched case-insensitively); other
    /// extensions contribute no coverage.
    ///
    /// Errors
    /// ----------
    /// * [`SpiceryError::InvalidArgument`] — the path does not name an
    ///   existing regular file, or its parent directory does not exist.
    /// * [`SpiceryError::KernelLoad`] — the backend rejected the file. In
    ///   fallback mode the rejection is absorbed and the file is registered
    ///   anyway, mirroring the reset-and-continue behavior of the original
    ///   toolkit wrapper.
    pub fn load_kernel(&mut self, path: impl AsRef<Utf8Path>) -> Result<KernelHandle, SpiceryError> {
        let path = path.as_ref();
        if path.as_str().is_empty() {
            return Err(SpiceryError::InvalidArgument(
                "kernel path must not be empty".to_string(),
            ));
        }
        if !path.is_file() {
            return Err(SpiceryError::InvalidArgument(format!(
                "kernel file '{path}' does not exist"
            )));
        }
        if !path.parent().is_some_and(|p| p.as_std_path().is_dir()) {
            return Err(SpiceryError::InvalidArgument(format!(
                "parent directory of kernel file '{path}' does not exist"
            )));
        }

        let canonical = canonicalize(path)?;
        if let Some(handle) = self.registry.acquire(&canonical) {
            return Ok(handle);
        }

        // Meta-kernels reference their sub-kernels relative to their own
        // directory, so the load itself runs with the working directory
        // moved there and restored afterwards. The working directory is
        // process-global state, hence the lock around the whole window.
        static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        let loaded = {
            let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            let previous_dir = std::env::current_dir()?;
            if let Some(parent) = canonical.parent() {
                std::env::set_current_dir(parent.as_std_path())?;
            }
            tracing::info!(path = %canonical, "loading kernel");
            let loaded = self.backend.load_kernel(&canonical);
            std::env::set_current_dir(previous_dir)?;
            loaded
        };

        if let Err(source) = loaded {
            let err = SpiceryError::KernelLoad {
                context: format!("loading kernel '{canonical}'"),
                source,
            };
            // fallback mode registers the kernel regardless
            self.absorb(Err(err), ())?;
        }

        match canonical.extension().map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("bc") => {
                let indexed = self.index_orientation_coverage(&canonical);
                self.absorb(indexed, ())?;
            }
            Some("bsp") => {
                let indexed = self.index_position_coverage(&canonical);
                self.absorb(indexed, ())?;
            }
            _ => {}
        }

        Ok(self.registry.insert(canonical))
    }

    /// Unload by handle.
    ///
    /// A handle that was never assigned raises
    /// [`SpiceryError::InvalidHandle`]; a stale handle whose kernel is
    /// already fully unloaded is a no-op. Coverage tables keep the
    /// intervals the kernel contributed (see [`crate::coverage`]).
    pub fn unload_kernel(&mut self, handle: KernelHandle) -> Result<(), SpiceryError> {
        if !self.registry.was_assigned(handle) {
            let err = SpiceryError::InvalidHandle(format!(
                "handle {} was never assigned",
                handle.get()
            ));
            return self.absorb(Err(err), ());
        }
        match self.registry.release_by_handle(handle) {
            Release::Unloaded(path) => self.backend_unload(&path),
            Release::Retained(_) | Release::Unknown => Ok(()),
        }
    }

    /// Unload by path. Raises [`SpiceryError::InvalidHandle`] when the path
    /// does not correspond to a loaded kernel (a no-op in fallback mode).
    pub fn unload_kernel_by_path(
        &mut self,
        path: impl AsRef<Utf8Path>,
    ) -> Result<(), SpiceryError> {
        let path = path.as_ref();
        if path.as_str().is_empty() {
            return Err(SpiceryError::InvalidArgument(
                "kernel path must not be empty".to_string(),
            ));
        }
        // the file may already be gone from disk (the leap-second bootstrap
        // deletes its temp file); fall back to the literal path then
        let lookup = canonicalize(path).unwrap_or_else(|_| path.to_owned());
        match self.registry.release_by_path(&lookup) {
            Release::Unloaded(stored) => self.backend_unload(&stored),
            Release::Retained(_) => Ok(()),
            Release::Unknown => {
                let err = SpiceryError::InvalidHandle(format!(
                    "'{path}' did not correspond to a loaded kernel"
                ));
                self.absorb(Err(err), ())
            }
        }
    }

    fn backend_unload(&mut self, path: &Utf8Path) -> Result<(), SpiceryError> {
        tracing::info!(path = %path, "unloading kernel");
        if let Err(e) = self.backend.unload_kernel(path) {
            tracing::warn!(path = %path, error = %e, "backend failed to unload kernel");
        }
        Ok(())
    }

    /// Paths of all currently loaded kernels, in registry iteration order.
    pub fn loaded_kernels(&self) -> Vec<Utf8PathBuf> {
        self.registry.paths()
    }

    fn load_builtin_leapseconds(&mut self) -> Result<KernelHandle, SpiceryError> {
        let file = std::env::temp_dir().join(leapseconds::unique_lsk_filename());
        std::fs::write(&file, leapseconds::NAIF0012_LSK)?;
        let path = Utf8PathBuf::from_path_buf(file.clone())
            .map_err(|p| SpiceryError::NonUtf8Path(p.display().to_string()))?;
        let handle = self.load_kernel(&path);
        let _ = std::fs::remove_file(&file);
        handle
    }

    fn index_position_coverage(&mut self, path: &Utf8Path) -> Result<(), SpiceryError> {
        let entries = self.backend.position_coverage(path).map_err(|source| {
            SpiceryError::KernelLoad {
                context: format!("scanning position coverage of '{path}'"),
                source,
            }
        })?;
        for (id, windows) in entries {
            for (start, end) in windows {
                self.spk.insert_window(id, start, end);
            }
        }
        Ok(())
    }

    fn index_orientation_coverage(&mut self, path: &Utf8Path) -> Result<(), SpiceryError> {
        let entries = self.backend.orientation_coverage(path).map_err(|source| {
            SpiceryError::KernelLoad {
                context: format!("scanning orientation coverage of '{path}'"),
                source,
            }
        })?;
        for (id, windows) in entries {
            for (start, end) in windows {
                self.ck.insert_window(id, start, end);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Name and id resolution
    // ---------------------------------------------------------------------

    /// Resolve a body name to its NAIF id, never falling back.
    pub(crate) fn resolved_body_id(&self, body: &str) -> Result<NaifId, SpiceryError> {
        non_empty(body, "body")?;
        match self.backend.body_id(body) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(SpiceryError::KernelComputation {
                context: format!("could not find NAIF id of body '{body}'"),
                source: BackendError::failed("name not found"),
            }),
            Err(source) => Err(SpiceryError::KernelComputation {
                context: format!("resolving body '{body}'"),
                source,
            }),
        }
    }

    pub(crate) fn resolved_frame_id(&self, frame: &str) -> Result<NaifId, SpiceryError> {
        non_empty(frame, "frame")?;
        match self.backend.frame_id(frame) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(SpiceryError::KernelComputation {
                context: format!("could not find NAIF id of frame '{frame}'"),
                source: BackendError::failed("name not found"),
            }),
            Err(source) => Err(SpiceryError::KernelComputation {
                context: format!("resolving frame '{frame}'"),
                source,
            }),
        }
    }

    /// NAIF id of a body. In fallback mode an unresolvable name yields the
    /// documented sentinel 0.
    pub fn naif_id(&self, body: &str) -> Result<NaifId, SpiceryError> {
        let res = self.resolved_body_id(body);
        self.absorb(res, 0)
    }

    pub fn has_naif_id(&self, body: &str) -> Result<bool, SpiceryError> {
        non_empty(body, "body")?;
        Ok(self.backend.body_id(body).map(|id| id.is_some()).unwrap_or(false))
    }

    /// NAIF id of a frame; id 0 is the documented "unknown frame" sentinel
    /// in fallback mode.
    pub fn frame_id(&self, frame: &str) -> Result<NaifId, SpiceryError> {
        let res = self.resolved_frame_id(frame);
        self.absorb(res, 0)
    }

    pub fn has_frame_id(&self, frame: &str) -> Result<bool, SpiceryError> {
        non_empty(frame, "frame")?;
        Ok(self.backend.frame_id(frame).map(|id| id.is_some()).unwrap_or(false))
    }

    /// All known (id, name) pairs, built-in or kernel-contributed.
    pub fn bodies(&self, built_in: bool) -> Result<Vec<(NaifId, String)>, SpiceryError> {
        let res = self
            .backend
            .body_ids_and_names(built_in)
            .map_err(|source| SpiceryError::KernelComputation {
                context: "listing bodies and frames".to_string(),
                source,
            });
        self.absorb(res, Vec::new())
    }

    // ---------------------------------------------------------------------
    // Coverage queries
    // ---------------------------------------------------------------------

    /// Whether position data covers `target` at `et`.
    ///
    /// The solar-system barycenter always reports covered, it needs no
    /// data. The interval test is strict on both bounds, so a time exactly
    /// equal to a window endpoint reports *not* covered.
    pub fn has_spk_coverage(&self, target: &str, et: EphemerisTime) -> Result<bool, SpiceryError> {
        let id = self.resolved_body_id(target)?;
        if id == SOLAR_SYSTEM_BARYCENTER {
            return Ok(true);
        }
        Ok(self.spk.has_coverage(id, et))
    }

    /// All recorded position coverage windows for `target`.
    pub fn spk_coverage(
        &self,
        target: &str,
    ) -> Result<Vec<(EphemerisTime, EphemerisTime)>, SpiceryError> {
        let id = self.resolved_body_id(target)?;
        Ok(self.spk.windows(id))
    }

    /// Whether orientation data covers `frame` at `et` (strict bounds, like
    /// [`has_spk_coverage`](Spicery::has_spk_coverage)).
    pub fn has_ck_coverage(&self, frame: &str, et: EphemerisTime) -> Result<bool, SpiceryError> {
        let id = self.resolved_frame_id(frame)?;
        Ok(self.ck.has_coverage(id, et))
    }

    /// All recorded orientation coverage windows for `target`.
    ///
    /// The lookup is keyed by the body id; when that finds nothing the
    /// conventional CK id (body id × 1000) is tried as well.
    pub fn ck_coverage(
        &self,
        target: &str,
    ) -> Result<Vec<(EphemerisTime, EphemerisTime)>, SpiceryError> {
        let id = self.resolved_body_id(target)?;
        let windows = self.ck.windows(id);
        if windows.is_empty() {
            return Ok(self.ck.windows(id * 1000));
        }
        Ok(windows)
    }

    // ---------------------------------------------------------------------
    // Query engine
    // ---------------------------------------------------------------------

    /// Position of `target` relative to `observer` in `frame` at `et`, plus
    /// the one-way light time.
    ///
    /// Dispatch depends on position coverage at `et`:
    /// * both sides covered — exact computation through the backend;
    /// * exactly one side covered — the uncovered side is estimated against
    ///   the covered one (see [`crate::estimate`]), negating the result
    ///   when the roles had to swap so the "target minus observer"
    ///   direction is preserved;
    /// * neither covered — [`SpiceryError::NoCoverage`], or a zero vector
    ///   in fallback mode.
    pub fn target_position(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<(Vector3<f64>, LightTime), SpiceryError> {
        non_empty(target, "target")?;
        non_empty(observer, "observer")?;
        non_empty(frame, "frame")?;
        let res = self.target_position_impl(target, observer, frame, correction, et);
        self.absorb(res, (Vector3::zeros(), 0.0))
    }

    fn target_position_impl(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<(Vector3<f64>, LightTime), SpiceryError> {
        let target_covered = self.has_spk_coverage(target, et)?;
        let observer_covered = self.has_spk_coverage(observer, et)?;

        match (target_covered, observer_covered) {
            (false, false) => Err(SpiceryError::NoCoverage(format!(
                "neither target '{target}' nor observer '{observer}' has position \
                 coverage at {et}"
            ))),
            (true, true) => self
                .backend
                .position(target, et, frame, correction, observer)
                .map_err(|source| SpiceryError::KernelComputation {
                    context: format!(
                        "position of '{target}' from '{observer}' in '{frame}' at {et}"
                    ),
                    source,
                }),
            (true, false) => {
                // the observer is the uncovered side: estimate it against
                // the target, then flip the sign back
                let (pos, light_time) =
                    self.estimated_position_impl(observer, target, frame, correction, et)?;
                Ok((-pos, light_time))
            }
            (false, true) => {
                self.estimated_position_impl(target, observer, frame, correction, et)
            }
        }
    }

    /// Position and velocity of `target` relative to `observer`.
    ///
    /// Exact computation only — there is no estimation fallback for
    /// velocities. Fallback mode degrades failures to an all-zero state.
    pub fn target_state(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<TargetState, SpiceryError> {
        non_empty(target, "target")?;
        non_empty(observer, "observer")?;
        non_empty(frame, "frame")?;
        let res = self
            .backend
            .state(target, et, frame, correction, observer)
            .map(|(position, velocity, light_time)| TargetState {
                position,
                velocity,
                light_time,
            })
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!(
                    "state of '{target}' from '{observer}' in '{frame}' at {et}"
                ),
                source,
            });
        self.absorb(
            res,
            TargetState {
                position: Vector3::zeros(),
                velocity: Vector3::zeros(),
                light_time: 0.0,
            },
        )
    }

    /// Rotation from `from` to `to` at `et`; raises on primitive failure.
    pub fn frame_transformation_matrix(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, SpiceryError> {
        non_empty(from, "from frame")?;
        non_empty(to, "to frame")?;
        let res = self
            .backend
            .position_transform(from, to, et)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("transforming frame '{from}' to '{to}' at {et}"),
                source,
            });
        self.absorb(res, Matrix3::identity())
    }

    /// Rotation from `from` to `to` at `et`, estimating across orientation
    /// gaps.
    ///
    /// Unlike [`frame_transformation_matrix`](Spicery::frame_transformation_matrix)
    /// this silently falls back to the estimator's matrix interpolation
    /// when the exact primitive fails.
    pub fn position_transform_matrix(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, SpiceryError> {
        non_empty(from, "from frame")?;
        non_empty(to, "to frame")?;
        let res = match self.backend.position_transform(from, to, et) {
            Ok(matrix) => Ok(matrix),
            Err(_) => self.estimated_transform_matrix_impl(from, to, et),
        };
        self.absorb(res, Matrix3::identity())
    }

    /// Rotation taking vectors from `from` at `et_from` to `to` at `et_to`.
    pub fn position_transform_matrix_between(
        &self,
        from: &str,
        to: &str,
        et_from: EphemerisTime,
        et_to: EphemerisTime,
    ) -> Result<Matrix3<f64>, SpiceryError> {
        non_empty(from, "from frame")?;
        non_empty(to, "to frame")?;
        let res = self
            .backend
            .position_transform_between(from, to, et_from, et_to)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!(
                    "transforming frame '{from}' at {et_from} to '{to}' at {et_to}"
                ),
                source,
            });
        self.absorb(res, Matrix3::identity())
    }

    /// 6×6 state transformation between two frames at `et`.
    pub fn state_transform_matrix(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix6<f64>, SpiceryError> {
        non_empty(from, "from frame")?;
        non_empty(to, "to frame")?;
        let res = self
            .backend
            .state_transform(from, to, et)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("state transform from '{from}' to '{to}' at {et}"),
                source,
            });
        self.absorb(res, Matrix6::identity())
    }

    /// Intersection of a ray from `observer` with the surface of `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn surface_intercept(
        &self,
        target: &str,
        observer: &str,
        fov_frame: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
        direction: Vector3<f64>,
    ) -> Result<SurfaceInterceptResult, SpiceryError> {
        non_empty(target, "target")?;
        non_empty(observer, "observer")?;
        non_empty(fov_frame, "fov frame")?;
        non_empty(frame, "frame")?;
        if target == observer {
            return Err(SpiceryError::InvalidArgument(
                "target and observer must be different".to_string(),
            ));
        }
        if direction == Vector3::zeros() {
            return Err(SpiceryError::InvalidArgument(
                "direction vector must not be zero".to_string(),
            ));
        }
        let miss = SurfaceInterceptResult {
            surface_intercept: Vector3::zeros(),
            surface_vector: Vector3::zeros(),
            intercept_epoch: 0.0,
            intercept_found: false,
        };
        let res = self
            .backend
            .surface_intercept(target, observer, fov_frame, frame, correction, et, direction)
            .map(|found| found.unwrap_or(miss))
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!(
                    "surface intercept on '{target}' from '{observer}' in '{frame}' at {et}"
                ),
                source,
            });
        self.absorb(res, miss)
    }

    /// Whether `target` is inside the field of view of `instrument` as seen
    /// from `observer` at `et`.
    #[allow(clippy::too_many_arguments)]
    pub fn is_target_in_field_of_view(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        instrument: &str,
        method: FieldOfViewMethod,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<bool, SpiceryError> {
        non_empty(target, "target")?;
        non_empty(observer, "observer")?;
        non_empty(frame, "frame")?;
        non_empty(instrument, "instrument")?;
        if target == observer {
            return Err(SpiceryError::InvalidArgument(
                "target and observer must be different".to_string(),
            ));
        }
        let res = self
            .backend
            .target_in_field_of_view(target, observer, frame, instrument, method, correction, et)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!(
                    "checking whether '{target}' is in view of '{instrument}'"
                ),
                source,
            });
        self.absorb(res, false)
    }

    /// Field-of-view geometry of an instrument, by name.
    pub fn field_of_view(&self, instrument: &str) -> Result<FieldOfViewResult, SpiceryError> {
        non_empty(instrument, "instrument")?;
        let id = self.resolved_body_id(instrument)?;
        self.field_of_view_by_id(id)
    }

    /// Field-of-view geometry of an instrument, by id.
    pub fn field_of_view_by_id(
        &self,
        instrument: NaifId,
    ) -> Result<FieldOfViewResult, SpiceryError> {
        let res = self
            .backend
            .field_of_view(instrument)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("field of view of instrument {instrument}"),
                source,
            });
        self.absorb(
            res,
            FieldOfViewResult {
                shape: crate::query::FieldOfViewShape::Polygon,
                frame_name: String::new(),
                boresight_vector: Vector3::zeros(),
                bounds: Vec::new(),
            },
        )
    }

    /// Terminator ellipse of `target` lit by `light_source`.
    #[allow(clippy::too_many_arguments)]
    pub fn terminator_ellipse(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        light_source: &str,
        terminator: TerminatorType,
        correction: AberrationCorrection,
        et: EphemerisTime,
        point_count: usize,
    ) -> Result<TerminatorEllipseResult, SpiceryError> {
        non_empty(target, "target")?;
        non_empty(observer, "observer")?;
        non_empty(frame, "frame")?;
        non_empty(light_source, "light source")?;
        if point_count < 1 {
            return Err(SpiceryError::InvalidArgument(
                "terminator point count must be at least 1".to_string(),
            ));
        }
        let res = self
            .backend
            .terminator_ellipse(
                target,
                observer,
                frame,
                light_source,
                terminator,
                correction,
                et,
                point_count,
            )
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!(
                    "terminator ellipse of '{target}' from '{observer}' lit by \
                     '{light_source}' at {et}"
                ),
                source,
            });
        self.absorb(
            res,
            TerminatorEllipseResult {
                terminator_points: Vec::new(),
                target_ephemeris_time: 0.0,
                observer_position: Vector3::zeros(),
            },
        )
    }

    // ---------------------------------------------------------------------
    // Body constants and time conversions
    // ---------------------------------------------------------------------

    /// Whether a numeric constant `item` is attached to `body`.
    pub fn has_value(&self, body: &str, item: &str) -> Result<bool, SpiceryError> {
        non_empty(body, "body")?;
        non_empty(item, "item")?;
        let id = self.resolved_body_id(body)?;
        Ok(self.backend.has_constant(id, item))
    }

    /// Scalar constant attached to a body (e.g. `"GM"`).
    pub fn body_value_scalar(&self, body: &str, item: &str) -> Result<f64, SpiceryError> {
        let values = self.body_values(body, item, 1)?;
        Ok(values.first().copied().unwrap_or(0.0))
    }

    /// Three-component constant attached to a body (e.g. `"RADII"`).
    pub fn body_value_vec3(&self, body: &str, item: &str) -> Result<Vector3<f64>, SpiceryError> {
        let values = self.body_values(body, item, 3)?;
        if values.len() < 3 {
            return Ok(Vector3::zeros());
        }
        Ok(Vector3::new(values[0], values[1], values[2]))
    }

    /// Up to `room` values of a numeric constant attached to a body.
    pub fn body_values(
        &self,
        body: &str,
        item: &str,
        room: usize,
    ) -> Result<Vec<f64>, SpiceryError> {
        non_empty(body, "body")?;
        non_empty(item, "item")?;
        let res = self
            .backend
            .body_constant(body, item, room)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("getting value '{item}' for body '{body}'"),
                source,
            });
        self.absorb(res, Vec::new())
    }

    /// Parse a calendar date into ephemeris seconds past J2000.
    pub fn ephemeris_time_from_date(&self, date: &str) -> Result<EphemerisTime, SpiceryError> {
        non_empty(date, "date")?;
        let res = self
            .backend
            .ephemeris_time_from_date(date)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("converting date '{date}'"),
                source,
            });
        self.absorb(res, 0.0)
    }

    /// Format an ephemeris time as a calendar date.
    pub fn date_from_ephemeris_time(
        &self,
        et: EphemerisTime,
        format: &str,
    ) -> Result<String, SpiceryError> {
        let res = self
            .backend
            .date_from_ephemeris_time(et, format)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("converting ephemeris time {et} with format '{format}'"),
                source,
            });
        self.absorb(res, String::new())
    }

    /// Convert spacecraft clock ticks of `craft` to ephemeris time.
    pub fn spacecraft_clock_to_et(
        &self,
        craft: &str,
        ticks: f64,
    ) -> Result<EphemerisTime, SpiceryError> {
        non_empty(craft, "craft")?;
        let id = self.resolved_body_id(craft)?;
        let res = self
            .backend
            .spacecraft_clock_to_et(id, ticks)
            .map_err(|source| SpiceryError::KernelComputation {
                context: format!("converting spacecraft clock of '{craft}' at {ticks}"),
                source,
            });
        self.absorb(res, 0.0)
    }
}

impl Drop for Spicery {
    fn drop(&mut self) {
        for path in self.registry.paths() {
            if let Err(e) = self.backend.unload_kernel(&path) {
                tracing::debug!(path = %path, error = %e, "kernel unload on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for Spicery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spicery")
            .field("loaded_kernels", &self.registry.paths())
            .field("error_mode", &self.error_mode)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: &str, what: &str) -> Result<(), SpiceryError> {
    if value.is_empty() {
        return Err(SpiceryError::InvalidArgument(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}

fn canonicalize(path: &Utf8Path) -> Result<Utf8PathBuf, SpiceryError> {
    let canonical = std::fs::canonicalize(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|p| SpiceryError::NonUtf8Path(p.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::synthetic::SyntheticSpice;

    fn service() -> Spicery {
        Spicery::new(Box::new(SyntheticSpice::new())).unwrap()
    }

    #[test]
    fn load_rejects_missing_files() {
        let mut s = service();
        let err = s.load_kernel("/definitely/not/there.bsp").unwrap_err();
        assert!(matches!(err, SpiceryError::InvalidArgument(_)));
        // validation failures are never absorbed
        s.set_error_mode(ErrorMode::Fallback);
        let err = s.load_kernel("/definitely/not/there.bsp").unwrap_err();
        assert!(matches!(err, SpiceryError::InvalidArgument(_)));
    }

    #[test]
    fn empty_names_are_invalid_arguments() {
        let s = service();
        assert!(matches!(
            s.target_position("", "EARTH", "J2000", AberrationCorrection::default(), 0.0),
            Err(SpiceryError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.naif_id(""),
            Err(SpiceryError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.frame_transformation_matrix("J2000", "", 0.0),
            Err(SpiceryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn degenerate_geometry_inputs_are_rejected() {
        let s = service();
        let corr = AberrationCorrection::default();
        assert!(matches!(
            s.surface_intercept("MARS", "MARS", "F", "J2000", corr, 0.0, Vector3::x()),
            Err(SpiceryError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.surface_intercept("MARS", "EARTH", "F", "J2000", corr, 0.0, Vector3::zeros()),
            Err(SpiceryError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.terminator_ellipse(
                "MARS",
                "EARTH",
                "J2000",
                "SUN",
                TerminatorType::Umbral,
                corr,
                0.0,
                0
            ),
            Err(SpiceryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn leapseconds_bootstrap_registers_one_kernel() {
        let s = service();
        let kernels = s.loaded_kernels();
        assert_eq!(kernels.len(), 1);
        assert!(kernels[0].as_str().ends_with(".tls"));
        // and its temp file is gone again
        assert!(!kernels[0].as_std_path().exists());
    }

    #[test]
    fn barycenter_is_always_covered() {
        let s = service();
        assert!(s.has_spk_coverage("SSB", 0.0).unwrap());
        assert!(s.has_spk_coverage("SOLAR SYSTEM BARYCENTER", 1.0e9).unwrap());
    }

    #[test]
    fn unsupported_primitives_surface_as_computation_errors() {
        let s = service();
        let err = s
            .is_target_in_field_of_view(
                "MARS",
                "EARTH",
                "J2000",
                "0",
                FieldOfViewMethod::Ellipsoid,
                AberrationCorrection::default(),
                0.0,
            )
            .unwrap_err();
        assert!(matches!(err, SpiceryError::KernelComputation { .. }));
    }
}
