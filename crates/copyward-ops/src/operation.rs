//! Operation records, requests and outcomes.

use copyward_core::{DeleteOptions, FileStat, OperationKind, Resource};
use serde::Serialize;

/// Identity of one coordinated operation.
///
/// Every broadcast for the same invocation carries the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    correlation_id: u64,
    kind: OperationKind,
    source: Option<Resource>,
    target: Resource,
}

impl OperationRecord {
    pub(crate) fn new(
        correlation_id: u64,
        kind: OperationKind,
        source: Option<Resource>,
        target: Resource,
    ) -> Self {
        Self {
            correlation_id,
            kind,
            source,
            target,
        }
    }

    /// Per-coordinator, strictly increasing id.
    pub fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    /// The kind of operation.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The source resource (move and copy only).
    pub fn source(&self) -> Option<&Resource> {
        self.source.as_ref()
    }

    /// The target resource.
    pub fn target(&self) -> &Resource {
        &self.target
    }

    /// Resources whose dirty working copies must be reverted first.
    ///
    /// Copy leaves the source untouched on disk, so only the target counts.
    pub fn affected_resources(&self) -> Vec<&Resource> {
        match (self.kind, &self.source) {
            (OperationKind::Move, Some(source)) => vec![source, &self.target],
            _ => vec![&self.target],
        }
    }
}

/// A request handed to [`OperationCoordinator::run`](crate::OperationCoordinator::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Move a resource.
    Move {
        source: Resource,
        target: Resource,
        overwrite: bool,
    },
    /// Copy a resource.
    Copy {
        source: Resource,
        target: Resource,
        overwrite: bool,
    },
    /// Delete a resource.
    Delete {
        resource: Resource,
        options: DeleteOptions,
    },
}

impl OperationRequest {
    /// Create a move request.
    pub fn move_to(source: Resource, target: Resource, overwrite: bool) -> Self {
        Self::Move {
            source,
            target,
            overwrite,
        }
    }

    /// Create a copy request.
    pub fn copy_to(source: Resource, target: Resource, overwrite: bool) -> Self {
        Self::Copy {
            source,
            target,
            overwrite,
        }
    }

    /// Create a delete request.
    pub fn delete(resource: Resource, options: DeleteOptions) -> Self {
        Self::Delete { resource, options }
    }

    /// The kind of operation requested.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Move { .. } => OperationKind::Move,
            Self::Copy { .. } => OperationKind::Copy,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }
}

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// A move or copy finished; metadata of the target.
    Transferred(FileStat),
    /// A delete finished.
    Deleted,
}

impl OperationOutcome {
    /// Metadata of the target, if the operation produced one.
    pub fn stat(&self) -> Option<&FileStat> {
        match self {
            Self::Transferred(stat) => Some(stat),
            Self::Deleted => None,
        }
    }

    /// Take the target metadata, if any.
    pub fn into_stat(self) -> Option<FileStat> {
        match self {
            Self::Transferred(stat) => Some(stat),
            Self::Deleted => None,
        }
    }
}
