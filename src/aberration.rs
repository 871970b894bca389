//! Aberration-correction value type.
//!
//! An aberration correction tells the exact-computation primitives how to
//! account for light travel time and stellar aberration between observer
//! and target. The underlying toolkit speaks in short codes (`"LT+S"`,
//! `"XCN"`, ...); this module gives those codes a typed representation with
//! an exact round trip between the nine canonical spellings and the
//! `(kind, direction)` pairs they denote.

use std::fmt;
use std::str::FromStr;

use crate::spicery_errors::SpiceryError;

/// The correction model applied to the geometric state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionKind {
    /// Geometric state, no correction.
    None,
    /// One-way light time ("planetary aberration").
    LightTime,
    /// Light time plus stellar aberration.
    LightTimeStellar,
    /// Converged Newtonian light time.
    ConvergedNewtonian,
    /// Converged Newtonian light time plus stellar aberration.
    ConvergedNewtonianStellar,
}

/// Whether the photon path is evaluated for reception at the observer or
/// transmission from the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionDirection {
    Reception,
    Transmission,
}

/// A parsed aberration correction.
///
/// Construct either directly from a kind/direction pair or by parsing one
/// of the nine canonical short codes:
///
/// ```rust
/// use spicery::aberration::{AberrationCorrection, CorrectionKind, CorrectionDirection};
///
/// let corr: AberrationCorrection = "XLT+S".parse().unwrap();
/// assert_eq!(corr.kind, CorrectionKind::LightTimeStellar);
/// assert_eq!(corr.direction, CorrectionDirection::Transmission);
/// assert_eq!(corr.as_str(), "XLT+S");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AberrationCorrection {
    pub kind: CorrectionKind,
    pub direction: CorrectionDirection,
}

impl AberrationCorrection {
    pub fn new(kind: CorrectionKind, direction: CorrectionDirection) -> Self {
        AberrationCorrection { kind, direction }
    }

    /// The canonical short code for this correction, as consumed by the
    /// underlying toolkit.
    pub fn as_str(&self) -> &'static str {
        use CorrectionDirection::*;
        use CorrectionKind::*;
        match (self.kind, self.direction) {
            (None, _) => "NONE",
            (LightTime, Reception) => "LT",
            (LightTime, Transmission) => "XLT",
            (LightTimeStellar, Reception) => "LT+S",
            (LightTimeStellar, Transmission) => "XLT+S",
            (ConvergedNewtonian, Reception) => "CN",
            (ConvergedNewtonian, Transmission) => "XCN",
            (ConvergedNewtonianStellar, Reception) => "CN+S",
            (ConvergedNewtonianStellar, Transmission) => "XCN+S",
        }
    }
}

impl Default for AberrationCorrection {
    /// Geometric state: no correction, reception direction.
    fn default() -> Self {
        AberrationCorrection::new(CorrectionKind::None, CorrectionDirection::Reception)
    }
}

impl FromStr for AberrationCorrection {
    type Err = SpiceryError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        use CorrectionDirection::*;
        use CorrectionKind::*;
        let (kind, direction) = match code {
            "NONE" => (None, Reception),
            "LT" => (LightTime, Reception),
            "LT+S" => (LightTimeStellar, Reception),
            "CN" => (ConvergedNewtonian, Reception),
            "CN+S" => (ConvergedNewtonianStellar, Reception),
            "XLT" => (LightTime, Transmission),
            "XLT+S" => (LightTimeStellar, Transmission),
            "XCN" => (ConvergedNewtonian, Transmission),
            "XCN+S" => (ConvergedNewtonianStellar, Transmission),
            _ => {
                return Err(SpiceryError::InvalidArgument(format!(
                    "'{code}' is not a recognized aberration correction"
                )))
            }
        };
        Ok(AberrationCorrection { kind, direction })
    }
}

impl fmt::Display for AberrationCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target-shape model used by field-of-view visibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOfViewMethod {
    Ellipsoid,
    Point,
}

impl FieldOfViewMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOfViewMethod::Ellipsoid => "ELLIPSOID",
            FieldOfViewMethod::Point => "POINT",
        }
    }
}

impl FromStr for FieldOfViewMethod {
    type Err = SpiceryError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        match method {
            "ELLIPSOID" => Ok(FieldOfViewMethod::Ellipsoid),
            "POINT" => Ok(FieldOfViewMethod::Point),
            _ => Err(SpiceryError::InvalidArgument(format!(
                "'{method}' is not a field-of-view method"
            ))),
        }
    }
}

/// Which shadow boundary a terminator-ellipse query traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorType {
    Umbral,
    Penumbral,
}

impl TerminatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminatorType::Umbral => "UMBRAL",
            TerminatorType::Penumbral => "PENUMBRAL",
        }
    }
}

impl FromStr for TerminatorType {
    type Err = SpiceryError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "UMBRAL" => Ok(TerminatorType::Umbral),
            "PENUMBRAL" => Ok(TerminatorType::Penumbral),
            _ => Err(SpiceryError::InvalidArgument(format!(
                "'{kind}' is not a terminator type"
            ))),
        }
    }
}
