//! Error types shared by copyward collaborators.

use std::fmt;

use thiserror::Error;

use crate::resource::Resource;

/// Errors raised by a file-access provider.
#[derive(Debug, Error)]
pub enum FileAccessError {
    /// The resource does not exist.
    #[error("Resource not found: {resource}")]
    NotFound { resource: Resource },

    /// Permission denied for the resource.
    #[error("Permission denied: {resource}")]
    PermissionDenied { resource: Resource },

    /// The target exists and overwriting was not allowed.
    #[error("Resource already exists: {resource}")]
    AlreadyExists { resource: Resource },

    /// The provider does not support the requested operation.
    #[error("Operation not supported for scheme '{scheme}'")]
    Unsupported { scheme: String },

    /// Generic I/O error.
    #[error("I/O error at {resource}: {source}")]
    Io {
        resource: Resource,
        #[source]
        source: std::io::Error,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl FileAccessError {
    /// Create an error from an I/O error, classifying common kinds.
    pub fn io(resource: Resource, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { resource },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { resource },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { resource },
            _ => Self::Io { resource, source },
        }
    }

    /// Create an error with a free-form message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// A working copy failed to revert.
#[derive(Debug, Error)]
#[error("Failed to revert {resource}: {message}")]
pub struct WorkingCopyError {
    /// The working copy's resource.
    pub resource: Resource,
    /// A human-readable error message.
    pub message: String,
}

impl WorkingCopyError {
    /// Create a new revert error.
    pub fn new(resource: Resource, message: impl Into<String>) -> Self {
        Self {
            resource,
            message: message.into(),
        }
    }
}

/// An operation listener reported a failure.
#[derive(Debug, Clone, Error)]
pub struct ListenerError {
    /// Optional label identifying the listener.
    pub listener: Option<String>,
    /// A human-readable error message.
    pub message: String,
}

impl ListenerError {
    /// Create a new listener error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            listener: None,
            message: message.into(),
        }
    }

    /// Attach a listener label.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.listener {
            Some(listener) => write!(f, "[{listener}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Errors parsing a [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// A bare path that is not absolute.
    #[error("Resource path must be absolute: {input}")]
    NotAbsolute { input: String },

    /// A malformed scheme.
    #[error("Invalid resource scheme: {input}")]
    InvalidScheme { input: String },
}

/// Errors loading coordinator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}
