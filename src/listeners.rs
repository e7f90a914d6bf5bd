// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Listener registration shared by every observable component.
//!
//! Listeners are called synchronously, in registration order, on the
//! thread that fires the notification. The registry lock is released
//! before any listener runs, so a listener may unsubscribe itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Callback type stored by a registry
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered collection of listeners for values of type `T`
pub struct ListenerRegistry<T> {
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> ListenerRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener, returning its subscription handle
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Call every listener with `value`
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self.lock().iter().map(|(_, l)| l.clone()).collect();
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener<T>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
