//! Coverage bookkeeping for loaded kernels.
//!
//! Each loaded binary kernel supplies data for a set of integer ids (body
//! ids for position kernels, frame ids for orientation kernels) over one or
//! more time windows. The service keeps two independent [`CoverageTable`]s,
//! one per category, populated incrementally as kernels are loaded.
//!
//! Indexing is additive and not deduplicated: loading overlapping kernels
//! produces overlapping intervals, so a time counts as covered when it
//! falls inside *any* recorded interval. Tables are never pruned on unload;
//! intervals may outlive the kernel that produced them (see the crate-level
//! notes on stale coverage).

use std::collections::{BTreeSet, HashMap};

use ordered_float::NotNan;

use crate::constants::{EphemerisTime, NaifId};
use crate::spicery_errors::SpiceryError;

/// Position of a query time relative to an id's recorded boundary points.
///
/// Boundary points are the union of every interval's start and end for that
/// id, so `Between` brackets are always non-degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    /// The query precedes the first boundary point.
    Before(EphemerisTime),
    /// The query follows the last boundary point.
    After(EphemerisTime),
    /// The query sits between two consecutive boundary points.
    Between(EphemerisTime, EphemerisTime),
}

/// Interval index for one coverage category (position or orientation).
#[derive(Debug, Default, Clone)]
pub struct CoverageTable {
    /// Recorded windows per id, in load order, possibly overlapping.
    intervals: HashMap<NaifId, Vec<(EphemerisTime, EphemerisTime)>, ahash::RandomState>,
    /// Sorted union of every window endpoint per id, for bracket lookup.
    boundaries: HashMap<NaifId, BTreeSet<NotNan<f64>>, ahash::RandomState>,
}

impl CoverageTable {
    pub fn new() -> Self {
        CoverageTable::default()
    }

    /// Record one (start, end) window for `id` and index both endpoints.
    pub fn insert_window(&mut self, id: NaifId, start: EphemerisTime, end: EphemerisTime) {
        self.intervals.entry(id).or_default().push((start, end));
        let points = self.boundaries.entry(id).or_default();
        if let Ok(s) = NotNan::new(start) {
            points.insert(s);
        }
        if let Ok(e) = NotNan::new(end) {
            points.insert(e);
        }
    }

    /// Whether `et` falls strictly inside at least one recorded window for
    /// `id`.
    ///
    /// Both bounds are tested with strict inequality, so a time equal to a
    /// window endpoint classifies as *uncovered*. Callers that need a value
    /// exactly at an endpoint go through the estimator, which evaluates at
    /// the boundary itself.
    pub fn has_coverage(&self, id: NaifId, et: EphemerisTime) -> bool {
        match self.intervals.get(&id) {
            Some(windows) => windows.iter().any(|&(s, e)| s < et && et < e),
            None => false,
        }
    }

    /// All recorded windows for `id`, in insertion order.
    pub fn windows(&self, id: NaifId) -> Vec<(EphemerisTime, EphemerisTime)> {
        self.intervals.get(&id).cloned().unwrap_or_default()
    }

    /// Whether any window was ever recorded for `id`.
    pub fn knows(&self, id: NaifId) -> bool {
        self.boundaries.contains_key(&id)
    }

    /// Classify `et` against the boundary points recorded for `id`.
    ///
    /// Returns `None` when nothing was ever recorded for `id`. A query equal
    /// to an interior boundary point brackets as `Between(prev, point)`; one
    /// equal to the first (last) point classifies as `Before` (`Between`),
    /// matching lower-bound/upper-bound semantics on the sorted set.
    pub fn bracket(&self, id: NaifId, et: EphemerisTime) -> Result<Option<Bracket>, SpiceryError> {
        let et = NotNan::new(et).map_err(|_| {
            SpiceryError::InvalidArgument("query time must not be NaN".to_string())
        })?;

        let Some(points) = self.boundaries.get(&id) else {
            return Ok(None);
        };
        // boundaries entries are created together with interval entries, so
        // a present set is never empty
        let first = *points.first().expect("boundary set is never empty");
        let last = *points.last().expect("boundary set is never empty");

        if et <= first {
            return Ok(Some(Bracket::Before(first.into_inner())));
        }
        if et > last {
            return Ok(Some(Bracket::After(last.into_inner())));
        }

        let earlier = *points
            .range(..et)
            .next_back()
            .expect("et > first guarantees an earlier point");
        let later = *points
            .range(et..)
            .next()
            .expect("et <= last guarantees a later point");
        Ok(Some(Bracket::Between(
            earlier.into_inner(),
            later.into_inner(),
        )))
    }
}
