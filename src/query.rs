//! Plain result aggregates returned by the query engine.

use nalgebra::Vector3;

use crate::constants::{EphemerisTime, LightTime};

/// Position and velocity of a target as seen from an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetState {
    /// Target position relative to the observer, km.
    pub position: Vector3<f64>,
    /// Target velocity relative to the observer, km/s.
    pub velocity: Vector3<f64>,
    /// One-way light time, s.
    pub light_time: LightTime,
}

/// Result of a ray/ellipsoid surface-intercept query.
///
/// The intercept may legitimately not exist (the ray misses the body);
/// `intercept_found` distinguishes that case from an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInterceptResult {
    /// Intercept point on the target surface, body-fixed frame, km.
    pub surface_intercept: Vector3<f64>,
    /// Observer-to-intercept vector, km.
    pub surface_vector: Vector3<f64>,
    /// Epoch associated with the intercept, s past J2000.
    pub intercept_epoch: EphemerisTime,
    /// Whether the ray actually hit the surface.
    pub intercept_found: bool,
}

/// Shape of an instrument's field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOfViewShape {
    Polygon,
    Rectangle,
    Circle,
    Ellipse,
}

/// Field-of-view geometry of an instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOfViewResult {
    pub shape: FieldOfViewShape,
    /// Frame in which the boresight and bounds are expressed.
    pub frame_name: String,
    pub boresight_vector: Vector3<f64>,
    /// Corner vectors delimiting the field of view.
    pub bounds: Vec<Vector3<f64>>,
}

/// Terminator ellipse of a body as lit by a light source.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminatorEllipseResult {
    /// Points along the terminator, km, in the requested frame.
    pub terminator_points: Vec<Vector3<f64>>,
    /// Light-time-corrected epoch at the target.
    pub target_ephemeris_time: EphemerisTime,
    /// Observer position relative to the target at that epoch, km.
    pub observer_position: Vector3<f64>,
}
