//! Observable holder for an in-flight or completed search result.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::listeners::{Listeners, Subscription};
use crate::model::{LifecycleEvent, ResultId};

/// Wraps one search query's result set.
///
/// The search subsystem owns holders and drives their lifecycle; the panel
/// only reads [`is_searching`](Self::is_searching) and listens to
/// [`LifecycleEvent`]s.
pub struct ResultHolder {
    id: ResultId,
    label: String,
    searching: AtomicBool,
    lifecycle: Listeners<LifecycleEvent>,
}

impl ResultHolder {
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ResultId::next(),
            label: label.into(),
            searching: AtomicBool::new(false),
            lifecycle: Listeners::new(),
        })
    }

    pub fn id(&self) -> ResultId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::SeqCst)
    }

    /// Flip the searching state without notifying anyone.
    pub fn set_searching(&self, searching: bool) {
        self.searching.store(searching, Ordering::SeqCst);
    }

    /// Register one callback for all three lifecycle notifications.
    pub fn on_lifecycle<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.lifecycle.subscribe(callback)
    }

    pub fn emit(&self, event: LifecycleEvent) {
        tracing::trace!(result_id = %self.id, %event, "result lifecycle event");
        self.lifecycle.emit(&event);
    }

    /// Mark a fetch as started and announce it.
    pub fn begin_fetch(&self) {
        self.set_searching(true);
        self.emit(LifecycleEvent::Request);
    }

    /// Mark the outstanding fetch as merged and announce it.
    pub fn complete_fetch(&self) {
        self.set_searching(false);
        self.emit(LifecycleEvent::Sync);
    }

    /// Mark the outstanding fetch as failed and announce it.
    pub fn fail_fetch(&self) {
        self.set_searching(false);
        self.emit(LifecycleEvent::Error);
    }

    pub fn listener_count(&self) -> usize {
        self.lifecycle.len()
    }
}

impl fmt::Debug for ResultHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHolder")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("searching", &self.is_searching())
            .field("listeners", &self.lifecycle.len())
            .finish()
    }
}
