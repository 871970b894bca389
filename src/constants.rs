//! Shared type aliases and physical constants.

/// Ephemeris time: TDB seconds past the J2000 epoch, the query axis of the
/// whole crate.
pub type EphemerisTime = f64;

/// One-way light travel time between observer and target, in seconds.
pub type LightTime = f64;

/// NAIF-style integer identifier for a body or a frame.
pub type NaifId = i32;

/// The solar-system barycenter. It is the origin of every SPK segment chain
/// and needs no kernel data, so coverage checks treat it as always covered.
pub const SOLAR_SYSTEM_BARYCENTER: NaifId = 0;

/// Speed of light in km/s, used by the synthetic backend to derive light
/// times from ranges.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;
