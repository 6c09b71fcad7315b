//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use copyward_core::{
    CoordinatorConfig, DeleteOptions, FileAccessError, FileStat, Resource, StatKind,
    WorkingCopyError,
};
use copyward_ops::{
    BoxFuture, FileAccess, OperationCoordinator, RevertOptions, Subscription, WorkingCopy,
    WorkingCopyRegistry,
};

/// Ordered log of everything the doubles and listeners observed.
#[derive(Debug, Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<String>>>);

impl Timeline {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }

    pub fn starting_with(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// Tracks how many reverts run at the same time.
#[derive(Debug, Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// A file-access provider over an in-memory tree.
///
/// Only the `file` scheme is hierarchical unless configured otherwise.
pub struct MemoryFileAccess {
    entries: Mutex<BTreeMap<Resource, StatKind>>,
    hierarchical: Vec<String>,
    case_insensitive: Vec<String>,
    failure: Mutex<Option<FileAccessError>>,
    deletes: Mutex<Vec<DeleteOptions>>,
    timeline: Timeline,
}

impl MemoryFileAccess {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            hierarchical: vec!["file".to_string()],
            case_insensitive: Vec::new(),
            failure: Mutex::new(None),
            deletes: Mutex::new(Vec::new()),
            timeline: timeline.clone(),
        }
    }

    pub fn case_insensitive(mut self, scheme: &str) -> Self {
        self.case_insensitive.push(scheme.to_string());
        self
    }

    pub fn add_file(&self, uri: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(uri.parse().unwrap(), StatKind::File);
    }

    pub fn add_dir(&self, uri: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(uri.parse().unwrap(), StatKind::Directory);
    }

    pub fn exists(&self, uri: &str) -> bool {
        let resource: Resource = uri.parse().unwrap();
        self.entries.lock().unwrap().contains_key(&resource)
    }

    /// Make the next physical operation fail with `error`.
    pub fn fail_next(&self, error: FileAccessError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn delete_options(&self) -> Vec<DeleteOptions> {
        self.deletes.lock().unwrap().clone()
    }

    fn transfer(
        &self,
        source: &Resource,
        target: &Resource,
        overwrite: bool,
        remove_source: bool,
    ) -> Result<FileStat, FileAccessError> {
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }

        let mut entries = self.entries.lock().unwrap();
        let Some(kind) = entries.get(source).copied() else {
            return Err(FileAccessError::NotFound {
                resource: source.clone(),
            });
        };
        if entries.contains_key(target) {
            if !overwrite {
                return Err(FileAccessError::AlreadyExists {
                    resource: target.clone(),
                });
            }
            entries.retain(|r, _| !r.is_equal_or_descendant_of(target, false));
        }

        let subtree: Vec<(Resource, StatKind)> = entries
            .iter()
            .filter(|(r, _)| r.is_equal_or_descendant_of(source, false))
            .map(|(r, k)| (r.clone(), *k))
            .collect();
        for (resource, kind) in subtree {
            if remove_source {
                entries.remove(&resource);
            }
            let relative = &resource.path()[source.path().len()..];
            entries.insert(target.join(relative), kind);
        }

        Ok(match kind {
            StatKind::Directory => FileStat::directory(target.clone()),
            _ => FileStat::file(target.clone(), 0),
        })
    }
}

impl FileAccess for MemoryFileAccess {
    fn move_file<'a>(
        &'a self,
        source: &'a Resource,
        target: &'a Resource,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<FileStat, FileAccessError>> {
        Box::pin(async move {
            self.timeline
                .push(format!("move {} -> {}", source.path(), target.path()));
            self.transfer(source, target, overwrite, true)
        })
    }

    fn copy_file<'a>(
        &'a self,
        source: &'a Resource,
        target: &'a Resource,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<FileStat, FileAccessError>> {
        Box::pin(async move {
            self.timeline
                .push(format!("copy {} -> {}", source.path(), target.path()));
            self.transfer(source, target, overwrite, false)
        })
    }

    fn delete<'a>(
        &'a self,
        resource: &'a Resource,
        options: DeleteOptions,
    ) -> BoxFuture<'a, Result<(), FileAccessError>> {
        Box::pin(async move {
            self.timeline.push(format!("delete {}", resource.path()));
            self.deletes.lock().unwrap().push(options);

            if let Some(error) = self.failure.lock().unwrap().take() {
                return Err(error);
            }

            let mut entries = self.entries.lock().unwrap();
            if !entries.contains_key(resource) {
                return Err(FileAccessError::NotFound {
                    resource: resource.clone(),
                });
            }
            entries.retain(|r, _| !r.is_equal_or_descendant_of(resource, false));
            Ok(())
        })
    }

    fn has_hierarchical_paths(&self, scheme: &str) -> bool {
        self.hierarchical.iter().any(|s| s == scheme)
    }

    fn is_path_case_sensitive(&self, scheme: &str) -> bool {
        !self.case_insensitive.iter().any(|s| s == scheme)
    }
}

/// An in-memory working copy.
pub struct MemoryWorkingCopy {
    resource: Resource,
    dirty: AtomicBool,
    fail_revert: bool,
    delay: Option<Duration>,
    last_revert: Mutex<Option<RevertOptions>>,
    gauge: Arc<Gauge>,
    timeline: Timeline,
}

impl MemoryWorkingCopy {
    pub fn last_revert(&self) -> Option<RevertOptions> {
        *self.last_revert.lock().unwrap()
    }
}

impl WorkingCopy for MemoryWorkingCopy {
    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn revert(&self, options: RevertOptions) -> BoxFuture<'_, Result<(), WorkingCopyError>> {
        Box::pin(async move {
            self.gauge.enter();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.gauge.exit();

            if self.fail_revert {
                return Err(WorkingCopyError::new(self.resource.clone(), "disk full"));
            }

            self.dirty.store(false, Ordering::SeqCst);
            *self.last_revert.lock().unwrap() = Some(options);
            self.timeline.push(format!("revert {}", self.resource.path()));
            Ok(())
        })
    }
}

/// Registry of in-memory working copies.
pub struct MemoryWorkingCopies {
    copies: Mutex<Vec<Arc<MemoryWorkingCopy>>>,
    gauge: Arc<Gauge>,
    timeline: Timeline,
}

impl MemoryWorkingCopies {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            copies: Mutex::new(Vec::new()),
            gauge: Arc::new(Gauge::default()),
            timeline: timeline.clone(),
        }
    }

    fn insert(
        &self,
        uri: &str,
        dirty: bool,
        fail_revert: bool,
        delay: Option<Duration>,
    ) -> Arc<MemoryWorkingCopy> {
        let copy = Arc::new(MemoryWorkingCopy {
            resource: uri.parse().unwrap(),
            dirty: AtomicBool::new(dirty),
            fail_revert,
            delay,
            last_revert: Mutex::new(None),
            gauge: Arc::clone(&self.gauge),
            timeline: self.timeline.clone(),
        });
        self.copies.lock().unwrap().push(Arc::clone(&copy));
        copy
    }

    pub fn dirty(&self, uri: &str) -> Arc<MemoryWorkingCopy> {
        self.insert(uri, true, false, None)
    }

    pub fn clean(&self, uri: &str) -> Arc<MemoryWorkingCopy> {
        self.insert(uri, false, false, None)
    }

    pub fn slow(&self, uri: &str, delay: Duration) -> Arc<MemoryWorkingCopy> {
        self.insert(uri, true, false, Some(delay))
    }

    pub fn failing(&self, uri: &str) -> Arc<MemoryWorkingCopy> {
        self.insert(uri, true, true, None)
    }

    pub fn peak_concurrent_reverts(&self) -> usize {
        self.gauge.peak()
    }
}

impl WorkingCopyRegistry for MemoryWorkingCopies {
    fn dirty_working_copies(&self) -> Vec<Arc<dyn WorkingCopy>> {
        self.copies
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_dirty())
            .map(|c| Arc::clone(c) as Arc<dyn WorkingCopy>)
            .collect()
    }
}

/// A coordinator wired to in-memory collaborators.
pub struct Fixture {
    pub timeline: Timeline,
    pub files: Arc<MemoryFileAccess>,
    pub copies: Arc<MemoryWorkingCopies>,
    pub coordinator: OperationCoordinator,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let timeline = Timeline::default();
        Self::build(MemoryFileAccess::new(&timeline), timeline, config)
    }

    pub fn build(files: MemoryFileAccess, timeline: Timeline, config: CoordinatorConfig) -> Self {
        let files = Arc::new(files);
        let copies = Arc::new(MemoryWorkingCopies::new(&timeline));
        let coordinator = OperationCoordinator::with_config(
            Arc::clone(&files) as Arc<dyn FileAccess>,
            Arc::clone(&copies) as Arc<dyn WorkingCopyRegistry>,
            config,
        );
        Self {
            timeline,
            files,
            copies,
            coordinator,
        }
    }

    /// Log every broadcast to the timeline as `<event> <correlation id>`.
    pub fn record_events(&self) -> Vec<Subscription> {
        let will = self.timeline.clone();
        let did = self.timeline.clone();
        let fail = self.timeline.clone();
        vec![
            self.coordinator.on_will_run(move |event| {
                let timeline = will.clone();
                async move {
                    timeline.push(format!("will_run {}", event.record.correlation_id()));
                    Ok(())
                }
            }),
            self.coordinator.on_did_run(move |event| {
                let timeline = did.clone();
                async move {
                    timeline.push(format!("did_run {}", event.record.correlation_id()));
                    Ok(())
                }
            }),
            self.coordinator.on_did_fail(move |event| {
                let timeline = fail.clone();
                async move {
                    timeline.push(format!("did_fail {}", event.record.correlation_id()));
                    Ok(())
                }
            }),
        ]
    }
}
