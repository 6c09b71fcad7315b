//! Errors returned by the coordinator.

use copyward_core::{FileAccessError, ListenerError, WorkingCopyError};
use thiserror::Error;

use crate::events::EventKind;

/// Result type for coordinated operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Errors that end a coordinated operation.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The file-access provider failed. The provider's error is kept as is.
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    /// A dirty working copy could not be reverted.
    #[error("Failed to prepare working copies: {0}")]
    Revert(#[source] WorkingCopyError),

    /// A listener failed (first error in subscription order).
    #[error("{event} listener failed: {source}")]
    Listener {
        event: EventKind,
        #[source]
        source: ListenerError,
    },

    /// Several listeners failed.
    #[error("{} {event} listeners failed", .errors.len())]
    Listeners {
        event: EventKind,
        errors: Vec<ListenerError>,
    },
}

impl CoordinatorError {
    /// The provider error, if this failure came from the provider.
    pub fn file_access(&self) -> Option<&FileAccessError> {
        match self {
            Self::FileAccess(err) => Some(err),
            _ => None,
        }
    }

    /// Check if the failure happened in a listener.
    pub fn is_listener_error(&self) -> bool {
        matches!(self, Self::Listener { .. } | Self::Listeners { .. })
    }
}
