//! Core types for copyward.
//!
//! This crate provides the vocabulary shared by the coordinator and its
//! collaborators: scheme-qualified resources, file metadata, operation kinds,
//! error types and coordinator configuration.

mod config;
mod error;
mod operation;
mod resource;
mod stat;

pub use config::{CoordinatorConfig, CoordinatorConfigBuilder, ListenerErrorPolicy};
pub use error::{ConfigError, FileAccessError, ListenerError, ResourceError, WorkingCopyError};
pub use operation::{DeleteOptions, OperationKind};
pub use resource::{FILE_SCHEME, Resource};
pub use stat::{FileStat, StatKind};
