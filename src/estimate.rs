//! Graceful degradation when a query falls outside exact coverage.
//!
//! Two estimation procedures, both linear in time:
//!
//! * **Position** — when the query precedes (follows) all coverage for the
//!   target, the exact position at the first (last) boundary point is
//!   returned unchanged. Inside a gap, the exact positions at the two
//!   bracketing boundary points are computed and both position and light
//!   time are interpolated with weight `(et - before) / (after - before)`.
//! * **Transform matrix** — the same bracket/extrapolate/interpolate
//!   structure over the orientation table, blending the two bracketing 3×3
//!   transforms component-wise. A linear blend of rotation matrices is not
//!   itself a rotation; this is a deliberate short-gap approximation, not a
//!   slerp.

use nalgebra::{Matrix3, Vector3};

use crate::aberration::AberrationCorrection;
use crate::backend::BackendError;
use crate::constants::{EphemerisTime, LightTime, SOLAR_SYSTEM_BARYCENTER};
use crate::coverage::Bracket;
use crate::spicery::Spicery;
use crate::spicery_errors::SpiceryError;

impl Spicery {
    /// Estimate the position of `target` relative to `observer` at an epoch
    /// the target's position coverage does not reach.
    ///
    /// Errors
    /// ----------
    /// * [`SpiceryError::NoCoverage`] — no position data was ever indexed
    ///   for the target (zero vector in fallback mode).
    /// * [`SpiceryError::InvalidArgument`] — empty names or
    ///   `target == observer`.
    pub fn estimated_position(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<(Vector3<f64>, LightTime), SpiceryError> {
        let res = self.estimated_position_impl(target, observer, frame, correction, et);
        self.absorb(res, (Vector3::zeros(), 0.0))
    }

    pub(crate) fn estimated_position_impl(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        correction: AberrationCorrection,
        et: EphemerisTime,
    ) -> Result<(Vector3<f64>, LightTime), SpiceryError> {
        if target.is_empty() || observer.is_empty() || frame.is_empty() {
            return Err(SpiceryError::InvalidArgument(
                "target, observer and frame must not be empty".to_string(),
            ));
        }
        if target == observer {
            return Err(SpiceryError::InvalidArgument(
                "target and observer must be different".to_string(),
            ));
        }

        let target_id = self.resolved_body_id(target)?;
        if target_id == SOLAR_SYSTEM_BARYCENTER {
            // the barycenter needs no kernel data
            return Ok((Vector3::zeros(), 0.0));
        }

        let exact = |at: EphemerisTime| {
            self.backend
                .position(target, at, frame, correction, observer)
                .map_err(|source| self.estimate_error(target, observer, frame, source))
        };

        match self.spk.bracket(target_id, et)? {
            None => Err(SpiceryError::NoCoverage(format!(
                "no position data for '{target}' at any time"
            ))),
            Some(Bracket::Before(first)) => exact(first),
            Some(Bracket::After(last)) => exact(last),
            Some(Bracket::Between(earlier, later)) => {
                let (pos_earlier, lt_earlier) = exact(earlier)?;
                let (pos_later, lt_later) = exact(later)?;
                let t = (et - earlier) / (later - earlier);
                Ok((
                    pos_earlier * (1.0 - t) + pos_later * t,
                    lt_earlier * (1.0 - t) + lt_later * t,
                ))
            }
        }
    }

    /// Estimate the rotation from `from` to `to` at an epoch outside the
    /// orientation coverage of `from`.
    ///
    /// The blend is component-wise, so the result is generally *not* an
    /// orthonormal matrix; it is only meant to paper over short gaps.
    pub fn estimated_transform_matrix(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, SpiceryError> {
        let res = self.estimated_transform_matrix_impl(from, to, et);
        self.absorb(res, Matrix3::identity())
    }

    pub(crate) fn estimated_transform_matrix_impl(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, SpiceryError> {
        if from.is_empty() || to.is_empty() {
            return Err(SpiceryError::InvalidArgument(
                "frame names must not be empty".to_string(),
            ));
        }

        let frame_id = self.resolved_frame_id(from)?;

        let exact = |at: EphemerisTime| {
            self.backend
                .position_transform(from, to, at)
                .map_err(|source| SpiceryError::KernelComputation {
                    context: format!(
                        "estimating transform matrix from '{from}' to '{to}' at {at}"
                    ),
                    source,
                })
        };

        match self.ck.bracket(frame_id, et)? {
            None => Err(SpiceryError::NoCoverage(format!(
                "no orientation data for transform from '{from}' to '{to}' at any time"
            ))),
            Some(Bracket::Before(first)) => exact(first),
            Some(Bracket::After(last)) => exact(last),
            Some(Bracket::Between(earlier, later)) => {
                let earlier_transform = exact(earlier)?;
                let later_transform = exact(later)?;
                let t = (et - earlier) / (later - earlier);
                Ok(earlier_transform * (1.0 - t) + later_transform * t)
            }
        }
    }

    fn estimate_error(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        source: BackendError,
    ) -> SpiceryError {
        SpiceryError::KernelComputation {
            context: format!(
                "estimating position of '{target}' from '{observer}' in '{frame}'"
            ),
            source,
        }
    }
}
