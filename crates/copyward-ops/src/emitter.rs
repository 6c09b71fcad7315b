//! Subscription management and awaited broadcast.
//!
//! An [`Emitter`] owns the listeners for one event type. Broadcasting starts
//! every listener at once and waits for all of them (fan-out, fan-in) before
//! returning their errors in subscription order.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use copyward_core::ListenerError;
use futures::future::join_all;
use indexmap::IndexMap;

use crate::collaborators::BoxFuture;

/// Result returned by an operation listener.
pub type ListenerResult = Result<(), ListenerError>;

type Listener<E> = Arc<dyn Fn(E) -> BoxFuture<'static, ListenerResult> + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: IndexMap<u64, Listener<E>>,
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Listener registry for one event type.
pub struct Emitter<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: Clone + Send + 'static> Emitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: IndexMap::new(),
            })),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped or disposed.
    pub fn subscribe<F, Fut>(&self, listener: F) -> Subscription
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        let handler: Listener<E> =
            Arc::new(move |event: E| -> BoxFuture<'static, ListenerResult> {
                Box::pin(listener(event))
            });

        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(id, handler);
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                lock(&registry).listeners.shift_remove(&id);
            }
        })
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    /// Check if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener and wait for all of them.
    ///
    /// Listeners registered while a broadcast is in flight do not receive it.
    pub async fn fire(&self, event: &E) -> Vec<ListenerError> {
        let listeners: Vec<Listener<E>> = lock(&self.registry).listeners.values().cloned().collect();

        if listeners.is_empty() {
            return Vec::new();
        }

        join_all(listeners.iter().map(|listener| listener(event.clone())))
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}

impl<E: Clone + Send + 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &lock(&self.registry).listeners.len())
            .finish()
    }
}

/// Guard for a registered listener.
///
/// Dropping the guard unsubscribes. Use [`Subscription::detach`] to keep the
/// listener for the emitter's whole lifetime.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unsubscribe now.
    pub fn dispose(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }

    /// Keep the listener registered for as long as the emitter lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
