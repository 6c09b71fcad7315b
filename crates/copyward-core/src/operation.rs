//! Operation kinds and pass-through options.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of file operation being coordinated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    Move,
    Copy,
    Delete,
}

/// Options forwarded untouched to the provider's delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Move to the trash instead of deleting permanently.
    #[serde(default)]
    pub use_trash: bool,
    /// Delete directory contents recursively.
    #[serde(default)]
    pub recursive: bool,
}

impl DeleteOptions {
    /// Options for moving a resource to the trash.
    pub fn trash() -> Self {
        Self {
            use_trash: true,
            ..Default::default()
        }
    }

    /// Enable recursive deletion.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }
}
