//! copyward - working-copy aware file operations for editors.
//!
//! Re-exports the resource model from [`copyward_core`] and the coordinator
//! from [`copyward_ops`]. Most callers only need the [`prelude`].

pub use copyward_core as core;
pub use copyward_ops as ops;

pub use copyward_core::{
    ConfigError, CoordinatorConfig, DeleteOptions, FileAccessError, FileStat, ListenerError,
    ListenerErrorPolicy, OperationKind, Resource, StatKind, WorkingCopyError,
};
pub use copyward_ops::{
    CancellationToken, CoordinatorError, CoordinatorResult, FileAccess, OperationCoordinator,
    OperationOutcome, OperationRecord, OperationRequest, Subscription, WorkingCopy,
    WorkingCopyRegistry,
};

/// Types needed to wire up and drive a coordinator.
pub mod prelude {
    pub use copyward_core::{CoordinatorConfig, DeleteOptions, ListenerError, Resource};
    pub use copyward_ops::{
        BoxFuture, CancellationToken, CoordinatorError, FileAccess, OperationCoordinator,
        OperationRequest, RevertOptions, WorkingCopy, WorkingCopyRegistry,
    };
}
