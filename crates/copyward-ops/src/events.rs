//! Events broadcast around a coordinated operation.
//!
//! Each invocation produces one [`WillRunEvent`] followed by exactly one of
//! [`DidRunEvent`] or [`DidFailEvent`], all carrying the same
//! [`OperationRecord`].

use copyward_core::FileStat;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::operation::OperationRecord;

/// The lifecycle stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WillRun,
    DidRun,
    DidFail,
}

impl EventKind {
    /// Get the event name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WillRun => "will_run",
            Self::DidRun => "did_run",
            Self::DidFail => "did_fail",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fired before dirty working copies are reverted and before the disk is
/// touched. Listeners may await their own work; they cannot veto.
#[derive(Debug, Clone, Serialize)]
pub struct WillRunEvent {
    /// The operation about to run.
    #[serde(flatten)]
    pub record: OperationRecord,
    /// Cancellation signal for listener-side work. The coordinator itself
    /// never acts on it.
    #[serde(skip)]
    pub cancel: CancellationToken,
}

/// Fired after the provider completed the operation.
#[derive(Debug, Clone, Serialize)]
pub struct DidRunEvent {
    /// The operation that ran.
    #[serde(flatten)]
    pub record: OperationRecord,
    /// Metadata of the target (move and copy only).
    pub stat: Option<FileStat>,
}

/// Fired when any stage of the operation failed.
#[derive(Debug, Clone, Serialize)]
pub struct DidFailEvent {
    /// The operation that failed.
    #[serde(flatten)]
    pub record: OperationRecord,
    /// The error that ended the operation.
    pub error: String,
}

/// Common accessors for operation events.
pub trait OperationEvent: Clone + Send + Sync + 'static {
    /// The lifecycle stage of this event type.
    const KIND: EventKind;

    /// The operation the event belongs to.
    fn record(&self) -> &OperationRecord;

    /// Shorthand for the record's correlation id.
    fn correlation_id(&self) -> u64 {
        self.record().correlation_id()
    }
}

impl OperationEvent for WillRunEvent {
    const KIND: EventKind = EventKind::WillRun;

    fn record(&self) -> &OperationRecord {
        &self.record
    }
}

impl OperationEvent for DidRunEvent {
    const KIND: EventKind = EventKind::DidRun;

    fn record(&self) -> &OperationRecord {
        &self.record
    }
}

impl OperationEvent for DidFailEvent {
    const KIND: EventKind = EventKind::DidFail;

    fn record(&self) -> &OperationRecord {
        &self.record
    }
}
