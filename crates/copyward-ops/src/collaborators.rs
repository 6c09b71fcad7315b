//! Collaborator traits the coordinator drives.
//!
//! The coordinator never touches a disk or a document itself. A
//! [`FileAccess`] provider performs the physical operation and a
//! [`WorkingCopyRegistry`] hands out the in-memory [`WorkingCopy`]s that may
//! need reverting first.

use std::sync::Arc;

use copyward_core::{DeleteOptions, FileAccessError, FileStat, Resource, WorkingCopyError};
pub use futures::future::BoxFuture;

/// A provider that performs file operations for one or more schemes.
pub trait FileAccess: Send + Sync {
    /// Move `source` to `target`, replacing an existing target only if
    /// `overwrite` is set.
    fn move_file<'a>(
        &'a self,
        source: &'a Resource,
        target: &'a Resource,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<FileStat, FileAccessError>>;

    /// Copy `source` to `target`, replacing an existing target only if
    /// `overwrite` is set.
    fn copy_file<'a>(
        &'a self,
        source: &'a Resource,
        target: &'a Resource,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<FileStat, FileAccessError>>;

    /// Delete `resource`.
    fn delete<'a>(
        &'a self,
        resource: &'a Resource,
        options: DeleteOptions,
    ) -> BoxFuture<'a, Result<(), FileAccessError>>;

    /// Whether resources of `scheme` form a folder-like tree.
    fn has_hierarchical_paths(&self, scheme: &str) -> bool;

    /// Whether paths of `scheme` compare case-sensitively.
    fn is_path_case_sensitive(&self, _scheme: &str) -> bool {
        true
    }
}

/// How a working copy should revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertOptions {
    /// Only drop in-memory edits and the dirty flag; do not reload from disk.
    pub soft: bool,
}

impl RevertOptions {
    /// A soft revert.
    pub fn soft() -> Self {
        Self { soft: true }
    }
}

/// An in-memory document backed by a resource.
pub trait WorkingCopy: Send + Sync {
    /// The resource this working copy represents.
    fn resource(&self) -> &Resource;

    /// Whether the working copy has unsaved changes.
    fn is_dirty(&self) -> bool;

    /// Discard unsaved changes.
    fn revert(&self, options: RevertOptions) -> BoxFuture<'_, Result<(), WorkingCopyError>>;
}

/// Source of the working copies currently known to the editor.
pub trait WorkingCopyRegistry: Send + Sync {
    /// All working copies with unsaved changes.
    fn dirty_working_copies(&self) -> Vec<Arc<dyn WorkingCopy>>;
}
