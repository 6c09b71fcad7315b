//! Coordinator configuration types.

use std::num::NonZeroUsize;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConfigError;

/// What happens when operation listeners report errors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListenerErrorPolicy {
    /// Let every started listener finish, then fail with the first error
    /// in subscription order.
    #[default]
    FirstError,
    /// Let every started listener finish, then fail with all errors.
    Aggregate,
    /// Log listener errors and carry on.
    LogAndContinue,
}

/// Configuration for an operation coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// How listener errors affect the operation.
    #[builder(default)]
    #[serde(default)]
    pub listener_error_policy: ListenerErrorPolicy,

    /// Upper bound on reverts running at once (None = unbounded).
    #[builder(default)]
    #[serde(default)]
    pub max_concurrent_reverts: Option<NonZeroUsize>,

    /// Revert dirty working copies softly (skip reloading from disk).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub soft_revert: bool,
}

fn default_true() -> bool {
    true
}

impl CoordinatorConfig {
    /// Create a new coordinator config builder.
    pub fn builder() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder::default()
    }

    /// Parse a TOML configuration document.
    ///
    /// A revert limit of zero is rejected while parsing.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listener_error_policy: ListenerErrorPolicy::default(),
            max_concurrent_reverts: None,
            soft_revert: true,
        }
    }
}
