//! Reference-counted registry of loaded kernel files.
//!
//! One record exists per distinct canonical path. Loading an already-loaded
//! path bumps its reference count and hands back the existing handle;
//! unloading decrements, and only the final unload removes the record (and
//! lets the service tell the backend to actually release the file).
//!
//! Handles are monotonically assigned and never reused within a process
//! lifetime; handle 0 is unrepresentable.

use std::num::NonZeroU32;

use camino::{Utf8Path, Utf8PathBuf};

/// Opaque identifier of a loaded kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelHandle(NonZeroU32);

impl KernelHandle {
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct KernelRecord {
    pub(crate) path: Utf8PathBuf,
    pub(crate) handle: KernelHandle,
    pub(crate) ref_count: u32,
}

/// Outcome of a release operation on the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Release {
    /// Last reference dropped; the caller must unload `path` from the
    /// backend.
    Unloaded(Utf8PathBuf),
    /// Other references remain; nothing to unload.
    Retained(u32),
    /// No record matched the handle or path.
    Unknown,
}

#[derive(Debug, Default)]
pub(crate) struct KernelRegistry {
    records: Vec<KernelRecord>,
    last_assigned: u32,
}

impl KernelRegistry {
    pub(crate) fn new() -> Self {
        KernelRegistry::default()
    }

    /// If `path` is already registered, bump its refcount and return the
    /// existing handle.
    pub(crate) fn acquire(&mut self, path: &Utf8Path) -> Option<KernelHandle> {
        let record = self.records.iter_mut().find(|r| r.path == path)?;
        record.ref_count += 1;
        tracing::debug!(
            path = %record.path,
            ref_count = record.ref_count,
            "kernel already loaded, reference count increased"
        );
        Some(record.handle)
    }

    /// Register a freshly loaded path with refcount 1 under a new handle.
    pub(crate) fn insert(&mut self, path: Utf8PathBuf) -> KernelHandle {
        self.last_assigned = self
            .last_assigned
            .checked_add(1)
            .expect("kernel handle space exhausted");
        let handle = KernelHandle(NonZeroU32::new(self.last_assigned).expect("non-zero by construction"));
        self.records.push(KernelRecord {
            path,
            handle,
            ref_count: 1,
        });
        handle
    }

    pub(crate) fn release_by_handle(&mut self, handle: KernelHandle) -> Release {
        match self.records.iter().position(|r| r.handle == handle) {
            Some(idx) => self.release_at(idx),
            None => Release::Unknown,
        }
    }

    pub(crate) fn release_by_path(&mut self, path: &Utf8Path) -> Release {
        match self.records.iter().position(|r| r.path == path) {
            Some(idx) => self.release_at(idx),
            None => Release::Unknown,
        }
    }

    fn release_at(&mut self, idx: usize) -> Release {
        if self.records[idx].ref_count > 1 {
            self.records[idx].ref_count -= 1;
            tracing::debug!(
                path = %self.records[idx].path,
                ref_count = self.records[idx].ref_count,
                "reference count decreased"
            );
            Release::Retained(self.records[idx].ref_count)
        } else {
            let record = self.records.remove(idx);
            Release::Unloaded(record.path)
        }
    }

    /// Paths of all live records, in registry iteration order.
    pub(crate) fn paths(&self) -> Vec<Utf8PathBuf> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }

    /// Whether a handle was ever assigned (live or not, it is below the
    /// high-water mark).
    pub(crate) fn was_assigned(&self, handle: KernelHandle) -> bool {
        handle.get() <= self.last_assigned
    }
}
