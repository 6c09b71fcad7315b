//! Working-copy aware file operations.
//!
//! This crate coordinates move, copy and delete requests with the editor's
//! in-memory working copies. Before the disk is touched, listeners are told
//! what is about to happen and every dirty working copy at or under the
//! affected resources is soft-reverted. Afterwards, listeners hear whether
//! the operation ran or failed.
//!
//! # Example
//!
//! ```ignore
//! use copyward_ops::OperationCoordinator;
//!
//! let coordinator = OperationCoordinator::new(file_access, working_copies);
//!
//! let _backup = coordinator.on_will_run(|event| async move {
//!     backups.discard_under(event.record.target()).await;
//!     Ok(())
//! });
//!
//! coordinator
//!     .delete(Resource::file("/project/notes.md"), DeleteOptions::trash())
//!     .await?;
//! ```

mod collaborators;
mod coordinator;
mod emitter;
mod error;
mod events;
mod operation;
mod resolver;

pub use collaborators::{
    BoxFuture, FileAccess, RevertOptions, WorkingCopy, WorkingCopyRegistry,
};
pub use coordinator::OperationCoordinator;
pub use emitter::{Emitter, ListenerResult, Subscription};
pub use error::{CoordinatorError, CoordinatorResult};
pub use events::{DidFailEvent, DidRunEvent, EventKind, OperationEvent, WillRunEvent};
pub use operation::{OperationOutcome, OperationRecord, OperationRequest};
pub use resolver::DirtySetResolver;

pub use tokio_util::sync::CancellationToken;
