//! File metadata returned by completed operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Kind of resource a [`FileStat`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Metadata for a resource after a move or copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// The resource the metadata belongs to.
    pub resource: Resource,
    /// What kind of resource it is.
    pub kind: StatKind,
    /// Size in bytes (0 for directories unless the provider reports one).
    pub size: u64,
    /// Last modification time, if the provider knows it.
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

impl FileStat {
    /// Stat for a regular file.
    pub fn file(resource: Resource, size: u64) -> Self {
        Self {
            resource,
            kind: StatKind::File,
            size,
            modified: None,
        }
    }

    /// Stat for a directory.
    pub fn directory(resource: Resource) -> Self {
        Self {
            resource,
            kind: StatKind::Directory,
            size: 0,
            modified: None,
        }
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }
}
