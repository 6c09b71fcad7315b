//! The operation coordinator.
//!
//! Every move, copy and delete runs through the same pipeline:
//!
//! 1. allocate a correlation id
//! 2. broadcast will-run and wait for every listener
//! 3. revert the affected dirty working copies and wait for all of them
//! 4. hand the physical operation to the [`FileAccess`] provider
//! 5. broadcast did-run on success, or did-fail and return the error
//!
//! No locking happens across operations. Callers that run overlapping
//! operations concurrently get no ordering between them.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use copyward_core::{
    CoordinatorConfig, DeleteOptions, FileAccessError, FileStat, ListenerError,
    ListenerErrorPolicy, OperationKind, Resource,
};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collaborators::{FileAccess, RevertOptions, WorkingCopy, WorkingCopyRegistry};
use crate::emitter::{Emitter, ListenerResult, Subscription};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::events::{DidFailEvent, DidRunEvent, EventKind, WillRunEvent};
use crate::operation::{OperationOutcome, OperationRecord, OperationRequest};
use crate::resolver::DirtySetResolver;

/// Coordinates file operations with dirty working copies and listeners.
///
/// The coordinator owns its listener registries; dropping it drops every
/// subscription with it.
pub struct OperationCoordinator {
    file_access: Arc<dyn FileAccess>,
    resolver: DirtySetResolver,
    config: CoordinatorConfig,
    last_correlation_id: AtomicU64,
    will_run: Emitter<WillRunEvent>,
    did_run: Emitter<DidRunEvent>,
    did_fail: Emitter<DidFailEvent>,
}

impl OperationCoordinator {
    /// Create a coordinator with default configuration.
    pub fn new(
        file_access: Arc<dyn FileAccess>,
        working_copies: Arc<dyn WorkingCopyRegistry>,
    ) -> Self {
        Self::with_config(file_access, working_copies, CoordinatorConfig::default())
    }

    /// Create a coordinator with the given configuration.
    pub fn with_config(
        file_access: Arc<dyn FileAccess>,
        working_copies: Arc<dyn WorkingCopyRegistry>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            resolver: DirtySetResolver::new(Arc::clone(&file_access), working_copies),
            file_access,
            config,
            last_correlation_id: AtomicU64::new(0),
            will_run: Emitter::new(),
            did_run: Emitter::new(),
            did_fail: Emitter::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Listen for operations about to run.
    ///
    /// The operation waits for the returned future before reverting working
    /// copies or touching the disk.
    pub fn on_will_run<F, Fut>(&self, listener: F) -> Subscription
    where
        F: Fn(WillRunEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.will_run.subscribe(listener)
    }

    /// Listen for operations that completed.
    pub fn on_did_run<F, Fut>(&self, listener: F) -> Subscription
    where
        F: Fn(DidRunEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.did_run.subscribe(listener)
    }

    /// Listen for operations that failed.
    pub fn on_did_fail<F, Fut>(&self, listener: F) -> Subscription
    where
        F: Fn(DidFailEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.did_fail.subscribe(listener)
    }

    /// Dirty working copies an operation on `resource` would revert.
    pub fn dirty(&self, resource: &Resource) -> Vec<Arc<dyn WorkingCopy>> {
        self.resolver.resolve(resource)
    }

    /// Move `source` to `target`.
    pub async fn move_to(
        &self,
        source: Resource,
        target: Resource,
        overwrite: bool,
    ) -> CoordinatorResult<FileStat> {
        self.move_or_copy(true, source, target, overwrite, CancellationToken::new())
            .await
    }

    /// Copy `source` to `target`.
    pub async fn copy_to(
        &self,
        source: Resource,
        target: Resource,
        overwrite: bool,
    ) -> CoordinatorResult<FileStat> {
        self.move_or_copy(false, source, target, overwrite, CancellationToken::new())
            .await
    }

    /// Delete `resource`.
    pub async fn delete(&self, resource: Resource, options: DeleteOptions) -> CoordinatorResult<()> {
        self.delete_with(resource, options, CancellationToken::new())
            .await
    }

    /// Run a request, forwarding `cancel` to will-run listeners.
    pub async fn run(
        &self,
        request: OperationRequest,
        cancel: CancellationToken,
    ) -> CoordinatorResult<OperationOutcome> {
        match request {
            OperationRequest::Move {
                source,
                target,
                overwrite,
            } => self
                .move_or_copy(true, source, target, overwrite, cancel)
                .await
                .map(OperationOutcome::Transferred),
            OperationRequest::Copy {
                source,
                target,
                overwrite,
            } => self
                .move_or_copy(false, source, target, overwrite, cancel)
                .await
                .map(OperationOutcome::Transferred),
            OperationRequest::Delete { resource, options } => self
                .delete_with(resource, options, cancel)
                .await
                .map(|()| OperationOutcome::Deleted),
        }
    }

    async fn move_or_copy(
        &self,
        is_move: bool,
        source: Resource,
        target: Resource,
        overwrite: bool,
        cancel: CancellationToken,
    ) -> CoordinatorResult<FileStat> {
        let kind = if is_move {
            OperationKind::Move
        } else {
            OperationKind::Copy
        };
        let record = OperationRecord::new(
            self.next_correlation_id(),
            kind,
            Some(source.clone()),
            target.clone(),
        );

        let mutation = async {
            if is_move {
                self.file_access.move_file(&source, &target, overwrite).await
            } else {
                self.file_access.copy_file(&source, &target, overwrite).await
            }
        };

        self.execute(record, cancel, mutation, |stat| Some(stat.clone()))
            .await
    }

    async fn delete_with(
        &self,
        resource: Resource,
        options: DeleteOptions,
        cancel: CancellationToken,
    ) -> CoordinatorResult<()> {
        let record = OperationRecord::new(
            self.next_correlation_id(),
            OperationKind::Delete,
            None,
            resource.clone(),
        );

        let mutation = async { self.file_access.delete(&resource, options).await };

        self.execute(record, cancel, mutation, |_| None).await
    }

    fn next_correlation_id(&self) -> u64 {
        self.last_correlation_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The shared pipeline. `mutation` is not polled until will-run and
    /// all reverts have finished.
    async fn execute<T, Fut>(
        &self,
        record: OperationRecord,
        cancel: CancellationToken,
        mutation: Fut,
        stat_of: impl FnOnce(&T) -> Option<FileStat>,
    ) -> CoordinatorResult<T>
    where
        Fut: Future<Output = Result<T, FileAccessError>>,
    {
        let source = record.source().map(ToString::to_string);
        debug!(
            target: "copyward",
            correlation_id = record.correlation_id(),
            kind = %record.kind(),
            source = source.as_deref(),
            resource = %record.target(),
            "Operation requested"
        );

        let result = match self.prepare(&record, cancel).await {
            Ok(()) => mutation.await.map_err(CoordinatorError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(value) => {
                let stat = stat_of(&value);
                self.finish(record, stat).await?;
                Ok(value)
            }
            Err(err) => {
                self.fail(record, &err).await;
                Err(err)
            }
        }
    }

    async fn prepare(
        &self,
        record: &OperationRecord,
        cancel: CancellationToken,
    ) -> CoordinatorResult<()> {
        let event = WillRunEvent {
            record: record.clone(),
            cancel,
        };
        let errors = self.will_run.fire(&event).await;
        self.settle(EventKind::WillRun, record, errors)?;

        self.revert_dirty(record).await
    }

    async fn revert_dirty(&self, record: &OperationRecord) -> CoordinatorResult<()> {
        let dirty = self.resolver.resolve_all(&record.affected_resources());
        if dirty.is_empty() {
            return Ok(());
        }

        debug!(
            target: "copyward",
            correlation_id = record.correlation_id(),
            count = dirty.len(),
            "Reverting dirty working copies"
        );

        let options = RevertOptions {
            soft: self.config.soft_revert,
        };
        let reverts: Vec<_> = dirty.iter().map(|copy| copy.revert(options)).collect();

        let results: Vec<_> = match self.config.max_concurrent_reverts {
            Some(limit) => {
                stream::iter(reverts)
                    .buffer_unordered(limit.get())
                    .collect()
                    .await
            }
            None => join_all(reverts).await,
        };

        results
            .into_iter()
            .collect::<Result<(), _>>()
            .map_err(CoordinatorError::Revert)
    }

    async fn finish(&self, record: OperationRecord, stat: Option<FileStat>) -> CoordinatorResult<()> {
        info!(
            target: "copyward",
            correlation_id = record.correlation_id(),
            kind = %record.kind(),
            resource = %record.target(),
            "Operation completed"
        );

        let event = DidRunEvent { record, stat };
        let errors = self.did_run.fire(&event).await;
        self.settle(EventKind::DidRun, &event.record, errors)
    }

    /// Broadcast did-fail. Listener errors here are logged only, so the
    /// caller always sees the error that ended the operation.
    async fn fail(&self, record: OperationRecord, error: &CoordinatorError) {
        warn!(
            target: "copyward",
            correlation_id = record.correlation_id(),
            kind = %record.kind(),
            resource = %record.target(),
            %error,
            "Operation failed"
        );

        let event = DidFailEvent {
            record,
            error: error.to_string(),
        };
        for listener_error in self.did_fail.fire(&event).await {
            warn!(
                target: "copyward",
                correlation_id = event.record.correlation_id(),
                error = %listener_error,
                "did_fail listener failed"
            );
        }
    }

    fn settle(
        &self,
        event: EventKind,
        record: &OperationRecord,
        errors: Vec<ListenerError>,
    ) -> CoordinatorResult<()> {
        if errors.is_empty() {
            return Ok(());
        }

        for error in &errors {
            warn!(
                target: "copyward",
                correlation_id = record.correlation_id(),
                event = %event,
                %error,
                "Listener failed"
            );
        }

        match self.config.listener_error_policy {
            ListenerErrorPolicy::FirstError => match errors.into_iter().next() {
                Some(source) => Err(CoordinatorError::Listener { event, source }),
                None => Ok(()),
            },
            ListenerErrorPolicy::Aggregate => Err(CoordinatorError::Listeners { event, errors }),
            ListenerErrorPolicy::LogAndContinue => Ok(()),
        }
    }
}

impl std::fmt::Debug for OperationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCoordinator")
            .field("config", &self.config)
            .field("last_correlation_id", &self.last_correlation_id)
            .field("will_run", &self.will_run)
            .field("did_run", &self.did_run)
            .field("did_fail", &self.did_fail)
            .finish_non_exhaustive()
    }
}
