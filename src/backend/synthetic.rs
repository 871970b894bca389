//! In-memory backend over a line-oriented text-kernel format.
//!
//! `SyntheticSpice` implements [`SpiceBackend`](crate::backend::SpiceBackend)
//! without any external toolkit. Kernel files are plain text, one
//! declaration per line, `#` starting a comment:
//!
//! ```text
//! # id  NAME   start  end     x0   y0   z0    vx  vy  vz
//! body  301    MOON   100 200 1e3  2e3  3e3   1.0 2.0 3.0
//!
//! # id      NAME        start end  spin (rad/s about +Z)
//! frame -41000 PROBE_FRAME 100 200  0.01
//!
//! # id  ITEM   values...
//! const 399 RADII 6378.14 6378.14 6356.75
//! ```
//!
//! Bodies move linearly from `(x0, y0, z0)` at `start`; frames rotate about
//! +Z. A body or frame answers exact queries only when the epoch falls
//! inside one of its declared windows (closed bounds), mirroring the
//! insufficient-data failures of a real toolkit. Body id 0 (the solar
//! system barycenter) sits at the origin and is always answerable. Light
//! time is range over the speed of light; aberration corrections select no
//! additional modelling here.
//!
//! Files with other extensions (e.g. the embedded leap-second kernel) load
//! as inert text kernels: accepted, tracked, contributing no coverage.
//! Geometry finders (surface intercept, field of view, terminator) are not
//! modelled and report [`BackendError::Unsupported`].

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use nalgebra::{Matrix3, Matrix6, Vector3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{i32 as nom_i32, space1},
    combinator::map,
    multi::many1,
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use crate::aberration::{AberrationCorrection, FieldOfViewMethod, TerminatorType};
use crate::backend::{BackendError, SpiceBackend};
use crate::constants::{
    EphemerisTime, LightTime, NaifId, SOLAR_SYSTEM_BARYCENTER, SPEED_OF_LIGHT_KM_S,
};
use crate::query::{FieldOfViewResult, SurfaceInterceptResult, TerminatorEllipseResult};

/// One linear motion arc of a body over a coverage window.
#[derive(Debug, Clone, PartialEq)]
struct BodyArc {
    id: NaifId,
    name: String,
    start: EphemerisTime,
    end: EphemerisTime,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

/// One uniform-spin arc of a frame over a coverage window.
#[derive(Debug, Clone, PartialEq)]
struct FrameArc {
    id: NaifId,
    name: String,
    start: EphemerisTime,
    end: EphemerisTime,
    spin: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Body(BodyArc),
    Frame(FrameArc),
    Const {
        id: NaifId,
        item: String,
        values: Vec<f64>,
    },
}

/// Parsed contents of one loaded kernel file.
#[derive(Debug, Default, Clone)]
struct ParsedKernel {
    bodies: Vec<BodyArc>,
    frames: Vec<FrameArc>,
    constants: Vec<(NaifId, String, Vec<f64>)>,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn field(input: &str) -> IResult<&str, f64> {
    preceded(space1, double)(input)
}

fn body_line(input: &str) -> IResult<&str, Line> {
    map(
        tuple((
            tag("body"),
            preceded(space1, nom_i32),
            preceded(space1, identifier),
            field,
            field,
            field,
            field,
            field,
            field,
            field,
            field,
        )),
        |(_, id, name, start, end, x, y, z, vx, vy, vz)| {
            Line::Body(BodyArc {
                id,
                name: name.to_string(),
                start,
                end,
                position: Vector3::new(x, y, z),
                velocity: Vector3::new(vx, vy, vz),
            })
        },
    )(input)
}

fn frame_line(input: &str) -> IResult<&str, Line> {
    map(
        tuple((
            tag("frame"),
            preceded(space1, nom_i32),
            preceded(space1, identifier),
            field,
            field,
            field,
        )),
        |(_, id, name, start, end, spin)| {
            Line::Frame(FrameArc {
                id,
                name: name.to_string(),
                start,
                end,
                spin,
            })
        },
    )(input)
}

fn const_line(input: &str) -> IResult<&str, Line> {
    map(
        tuple((
            tag("const"),
            preceded(space1, nom_i32),
            preceded(space1, identifier),
            many1(field),
        )),
        |(_, id, item, values)| Line::Const {
            id,
            item: item.to_string(),
            values,
        },
    )(input)
}

fn kernel_line(input: &str) -> IResult<&str, Line> {
    alt((body_line, frame_line, const_line))(input)
}

fn parse_kernel_text(text: &str) -> Result<ParsedKernel, BackendError> {
    let mut parsed = ParsedKernel::default();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        match kernel_line(line) {
            Ok((rest, decl)) if rest.trim().is_empty() => match decl {
                Line::Body(arc) => parsed.bodies.push(arc),
                Line::Frame(arc) => parsed.frames.push(arc),
                Line::Const { id, item, values } => parsed.constants.push((id, item, values)),
            },
            _ => {
                return Err(BackendError::failed(format!(
                    "malformed kernel declaration at line {}: '{line}'",
                    lineno + 1
                )))
            }
        }
    }
    Ok(parsed)
}

/// Group the windows declared by a set of arcs, keyed by id.
fn windows_by_id<'a, I>(arcs: I) -> Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)>
where
    I: Iterator<Item = (NaifId, EphemerisTime, EphemerisTime)> + 'a,
{
    let mut grouped: Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)> = Vec::new();
    for (id, start, end) in arcs {
        match grouped.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, windows)) => windows.push((start, end)),
            None => grouped.push((id, vec![(start, end)])),
        }
    }
    grouped
}

/// Rotation of `spin * (et - start)` about +Z, taking inertial vectors into
/// the rotating frame, together with its time derivative.
fn spin_orientation(arc: &FrameArc, et: EphemerisTime) -> (Matrix3<f64>, Matrix3<f64>) {
    let theta = arc.spin * (et - arc.start);
    let (s, c) = theta.sin_cos();
    let rotation = Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0);
    let derivative =
        arc.spin * Matrix3::new(-s, c, 0.0, -c, -s, 0.0, 0.0, 0.0, 0.0);
    (rotation, derivative)
}

/// Self-contained [`SpiceBackend`] used by the test suite.
#[derive(Debug, Default)]
pub struct SyntheticSpice {
    files: Vec<(Utf8PathBuf, ParsedKernel)>,
}

impl SyntheticSpice {
    pub fn new() -> Self {
        SyntheticSpice::default()
    }

    fn file(&self, path: &Utf8Path) -> Result<&ParsedKernel, BackendError> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, k)| k)
            .ok_or_else(|| BackendError::failed(format!("no kernel loaded from '{path}'")))
    }

    fn body_arcs(&self) -> impl Iterator<Item = &BodyArc> {
        self.files.iter().flat_map(|(_, k)| k.bodies.iter())
    }

    fn frame_arcs(&self) -> impl Iterator<Item = &FrameArc> {
        self.files.iter().flat_map(|(_, k)| k.frames.iter())
    }

    fn resolve_body(&self, name: &str) -> Option<NaifId> {
        if let Ok(id) = NaifId::from_str(name) {
            return Some(id);
        }
        if name == "SOLAR SYSTEM BARYCENTER" || name == "SSB" {
            return Some(SOLAR_SYSTEM_BARYCENTER);
        }
        self.body_arcs().find(|a| a.name == name).map(|a| a.id)
    }

    fn resolve_frame(&self, name: &str) -> Option<NaifId> {
        if name == "J2000" {
            return Some(1);
        }
        self.frame_arcs().find(|a| a.name == name).map(|a| a.id)
    }

    /// Inertial position and velocity of a body, valid only inside one of
    /// its declared windows (closed bounds).
    fn body_state(
        &self,
        name: &str,
        et: EphemerisTime,
    ) -> Result<(Vector3<f64>, Vector3<f64>), BackendError> {
        let id = self
            .resolve_body(name)
            .ok_or_else(|| BackendError::failed(format!("unknown body '{name}'")))?;
        if id == SOLAR_SYSTEM_BARYCENTER {
            return Ok((Vector3::zeros(), Vector3::zeros()));
        }
        let arc = self
            .body_arcs()
            .find(|a| a.id == id && a.start <= et && et <= a.end)
            .ok_or_else(|| {
                BackendError::failed(format!(
                    "insufficient ephemeris data for body '{name}' at et {et}"
                ))
            })?;
        let position = arc.position + arc.velocity * (et - arc.start);
        Ok((position, arc.velocity))
    }

    /// Orientation of a frame and its derivative, identity for J2000.
    fn orientation(
        &self,
        name: &str,
        et: EphemerisTime,
    ) -> Result<(Matrix3<f64>, Matrix3<f64>), BackendError> {
        if name == "J2000" {
            return Ok((Matrix3::identity(), Matrix3::zeros()));
        }
        let arc = self
            .frame_arcs()
            .find(|a| a.name == name && a.start <= et && et <= a.end)
            .ok_or_else(|| {
                BackendError::failed(format!(
                    "insufficient orientation data for frame '{name}' at et {et}"
                ))
            })?;
        Ok(spin_orientation(arc, et))
    }
}

impl SpiceBackend for SyntheticSpice {
    fn load_kernel(&mut self, path: &Utf8Path) -> Result<(), BackendError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BackendError::failed(format!("cannot read '{path}': {e}")))?;
        let ext = path.extension().unwrap_or("").to_ascii_lowercase();
        let parsed = match ext.as_str() {
            "bsp" | "bc" => parse_kernel_text(&text)?,
            // text kernels (leap seconds and friends) are accepted verbatim
            _ => ParsedKernel::default(),
        };
        self.files.push((path.to_owned(), parsed));
        Ok(())
    }

    fn unload_kernel(&mut self, path: &Utf8Path) -> Result<(), BackendError> {
        match self.files.iter().position(|(p, _)| p == path) {
            Some(idx) => {
                self.files.remove(idx);
                Ok(())
            }
            None => Err(BackendError::failed(format!(
                "no kernel loaded from '{path}'"
            ))),
        }
    }

    fn position_coverage(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)>, BackendError> {
        let kernel = self.file(path)?;
        Ok(windows_by_id(
            kernel.bodies.iter().map(|a| (a.id, a.start, a.end)),
        ))
    }

    fn orientation_coverage(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<(NaifId, Vec<(EphemerisTime, EphemerisTime)>)>, BackendError> {
        let kernel = self.file(path)?;
        Ok(windows_by_id(
            kernel.frames.iter().map(|a| (a.id, a.start, a.end)),
        ))
    }

    fn position(
        &self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        _correction: AberrationCorrection,
        observer: &str,
    ) -> Result<(Vector3<f64>, LightTime), BackendError> {
        let (pos, _, light_time) = self.state(target, et, frame, _correction, observer)?;
        Ok((pos, light_time))
    }

    fn state(
        &self,
        target: &str,
        et: EphemerisTime,
        frame: &str,
        _correction: AberrationCorrection,
        observer: &str,
    ) -> Result<(Vector3<f64>, Vector3<f64>, LightTime), BackendError> {
        let (target_pos, target_vel) = self.body_state(target, et)?;
        let (observer_pos, observer_vel) = self.body_state(observer, et)?;
        let rel_pos = target_pos - observer_pos;
        let rel_vel = target_vel - observer_vel;

        let (rotation, derivative) = self.orientation(frame, et)?;
        let position = rotation * rel_pos;
        let velocity = rotation * rel_vel + derivative * rel_pos;
        let light_time = rel_pos.norm() / SPEED_OF_LIGHT_KM_S;
        Ok((position, velocity, light_time))
    }

    fn position_transform(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix3<f64>, BackendError> {
        let (r_from, _) = self.orientation(from, et)?;
        let (r_to, _) = self.orientation(to, et)?;
        Ok(r_to * r_from.transpose())
    }

    fn position_transform_between(
        &self,
        from: &str,
        to: &str,
        et_from: EphemerisTime,
        et_to: EphemerisTime,
    ) -> Result<Matrix3<f64>, BackendError> {
        let (r_from, _) = self.orientation(from, et_from)?;
        let (r_to, _) = self.orientation(to, et_to)?;
        Ok(r_to * r_from.transpose())
    }

    fn state_transform(
        &self,
        from: &str,
        to: &str,
        et: EphemerisTime,
    ) -> Result<Matrix6<f64>, BackendError> {
        let (r_from, d_from) = self.orientation(from, et)?;
        let (r_to, d_to) = self.orientation(to, et)?;
        let rotation = r_to * r_from.transpose();
        let derivative = d_to * r_from.transpose() + r_to * d_from.transpose();

        let mut out = Matrix6::zeros();
        out.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        out.fixed_view_mut::<3, 3>(3, 0).copy_from(&derivative);
        out.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);
        Ok(out)
    }

    fn surface_intercept(
        &self,
        _target: &str,
        _observer: &str,
        _fov_frame: &str,
        _frame: &str,
        _correction: AberrationCorrection,
        _et: EphemerisTime,
        _direction: Vector3<f64>,
    ) -> Result<Option<SurfaceInterceptResult>, BackendError> {
        Err(BackendError::Unsupported("surface_intercept"))
    }

    fn target_in_field_of_view(
        &self,
        _target: &str,
        _observer: &str,
        _frame: &str,
        _instrument: &str,
        _method: FieldOfViewMethod,
        _correction: AberrationCorrection,
        _et: EphemerisTime,
    ) -> Result<bool, BackendError> {
        Err(BackendError::Unsupported("target_in_field_of_view"))
    }

    fn field_of_view(&self, _instrument: NaifId) -> Result<FieldOfViewResult, BackendError> {
        Err(BackendError::Unsupported("field_of_view"))
    }

    fn terminator_ellipse(
        &self,
        _target: &str,
        _observer: &str,
        _frame: &str,
        _light_source: &str,
        _terminator: TerminatorType,
        _correction: AberrationCorrection,
        _et: EphemerisTime,
        _point_count: usize,
    ) -> Result<TerminatorEllipseResult, BackendError> {
        Err(BackendError::Unsupported("terminator_ellipse"))
    }

    fn body_id(&self, name: &str) -> Result<Option<NaifId>, BackendError> {
        Ok(self.resolve_body(name))
    }

    fn frame_id(&self, name: &str) -> Result<Option<NaifId>, BackendError> {
        Ok(self.resolve_frame(name))
    }

    fn body_ids_and_names(&self, built_in: bool) -> Result<Vec<(NaifId, String)>, BackendError> {
        if built_in {
            return Ok(vec![
                (SOLAR_SYSTEM_BARYCENTER, "SOLAR SYSTEM BARYCENTER".to_string()),
                (1, "J2000".to_string()),
            ]);
        }
        let mut out: Vec<(NaifId, String)> = Vec::new();
        for (id, name) in self
            .body_arcs()
            .map(|a| (a.id, a.name.clone()))
            .chain(self.frame_arcs().map(|a| (a.id, a.name.clone())))
        {
            if !out.iter().any(|(known, _)| *known == id) {
                out.push((id, name));
            }
        }
        Ok(out)
    }

    fn body_constant(
        &self,
        body: &str,
        item: &str,
        room: usize,
    ) -> Result<Vec<f64>, BackendError> {
        let id = self
            .resolve_body(body)
            .ok_or_else(|| BackendError::failed(format!("unknown body '{body}'")))?;
        for (_, kernel) in &self.files {
            if let Some((_, _, values)) = kernel
                .constants
                .iter()
                .find(|(cid, citem, _)| *cid == id && citem == item)
            {
                return Ok(values.iter().copied().take(room).collect());
            }
        }
        Err(BackendError::failed(format!(
            "no constant '{item}' for body '{body}'"
        )))
    }

    fn has_constant(&self, body: NaifId, item: &str) -> bool {
        self.files.iter().any(|(_, kernel)| {
            kernel
                .constants
                .iter()
                .any(|(cid, citem, _)| *cid == body && citem == item)
        })
    }

    fn ephemeris_time_from_date(&self, date: &str) -> Result<EphemerisTime, BackendError> {
        let epoch = Epoch::from_str(date)
            .map_err(|e| BackendError::failed(format!("cannot parse date '{date}': {e}")))?;
        Ok(epoch.to_et_seconds())
    }

    fn date_from_ephemeris_time(
        &self,
        et: EphemerisTime,
        _format: &str,
    ) -> Result<String, BackendError> {
        // format pictures of the real toolkit are not modelled; emit ISO UTC
        let epoch = Epoch::from_et_seconds(et);
        Ok(format!("{epoch}"))
    }

    fn spacecraft_clock_to_et(
        &self,
        _craft: NaifId,
        _ticks: f64,
    ) -> Result<EphemerisTime, BackendError> {
        Err(BackendError::Unsupported("spacecraft_clock_to_et"))
    }
}
