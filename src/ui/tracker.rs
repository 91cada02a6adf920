//! Keeps the panel's status flags in sync with the shared selection.
//!
//! The tracker listens to the selection context for result and metacard
//! changes and holds at most one lifecycle subscription, always on the
//! holder currently named by `current_result`. Lifecycle bursts go through a
//! [`TrailingThrottle`]; every recompute reads the live selection, so a late
//! execution can never paint state from a superseded holder.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use super::clock::Clock;
use super::status::{DisplayFlags, PresentationNode, reflect_status};
use super::throttle::TrailingThrottle;
use crate::model::{LifecycleEvent, ResultId};
use crate::selection::{SelectionContext, Subscription};

/// Where the tracker is in its binding lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not listening to the selection context.
    Unbound,
    /// Listening to the context, no result lifecycle subscription.
    Idle,
    /// Listening to the context and to this result's lifecycle.
    Watching(ResultId),
}

struct ResultBinding {
    result_id: ResultId,
    generation: u64,
    throttle: TrailingThrottle,
    // Held for its Drop: releasing the binding unsubscribes from the holder.
    _subscription: Subscription,
}

struct TrackerCore {
    this: Weak<Mutex<TrackerCore>>,
    context: Arc<SelectionContext>,
    clock: Arc<dyn Clock>,
    window: Duration,
    root: Box<dyn PresentationNode>,
    flags: DisplayFlags,
    recomputes: u64,
    bound: bool,
    generation: u64,
    binding: Option<ResultBinding>,
}

impl TrackerCore {
    fn state(&self) -> TrackerState {
        match (&self.binding, self.bound) {
            (_, false) => TrackerState::Unbound,
            (None, true) => TrackerState::Idle,
            (Some(binding), true) => TrackerState::Watching(binding.result_id),
        }
    }

    fn recompute(&mut self) -> DisplayFlags {
        let flags = reflect_status(&self.context, self.root.as_mut());
        if flags != self.flags {
            tracing::debug!(
                not_found = flags.not_found,
                is_searching = flags.is_searching,
                "metacard panel: status flags changed"
            );
        }
        self.flags = flags;
        self.recomputes += 1;
        flags
    }

    fn handle_result_change(&mut self) {
        if !self.bound {
            tracing::trace!("metacard panel: result change ignored while unbound");
            return;
        }
        self.recompute();
        self.rebind();
    }

    fn handle_metacard_change(&mut self) {
        if self.bound {
            self.recompute();
        }
    }

    /// Drop the current lifecycle subscription and subscribe to whatever
    /// holder is current now, even if it is the same one.
    fn rebind(&mut self) {
        if let Some(previous) = self.binding.take() {
            tracing::trace!(
                result_id = %previous.result_id,
                generation = previous.generation,
                discarded_pending = previous.throttle.is_pending(),
                "metacard panel: releasing result binding"
            );
        }
        self.generation += 1;

        let Some(result) = self.context.current_result() else {
            tracing::debug!(generation = self.generation, "metacard panel: no current result");
            return;
        };

        let generation = self.generation;
        let core = self.this.clone();
        let subscription = result.on_lifecycle(move |event| {
            if let Some(core) = core.upgrade() {
                core.lock().handle_lifecycle(generation, *event);
            }
        });

        tracing::debug!(
            result_id = %result.id(),
            generation,
            window_ms = self.window.as_millis() as u64,
            "metacard panel: bound to result lifecycle"
        );
        self.binding = Some(ResultBinding {
            result_id: result.id(),
            generation,
            throttle: TrailingThrottle::new(self.window),
            _subscription: subscription,
        });
    }

    fn handle_lifecycle(&mut self, generation: u64, event: LifecycleEvent) {
        let now = self.clock.now();
        match self.binding.as_mut() {
            Some(binding) if binding.generation == generation => {
                if binding.throttle.trigger(now) {
                    tracing::trace!(
                        result_id = %binding.result_id,
                        %event,
                        "metacard panel: throttle armed"
                    );
                }
            }
            _ => {
                tracing::trace!(generation, %event, "metacard panel: stale lifecycle event dropped");
            }
        }
    }

    fn poll(&mut self, now: Instant) -> bool {
        let due = self
            .binding
            .as_mut()
            .is_some_and(|binding| binding.throttle.poll(now));
        if due {
            self.recompute();
        }
        due
    }

    fn unbind(&mut self) {
        self.bound = false;
        self.binding = None;
    }
}

/// Owns the panel's subscriptions and its root presentation node.
pub struct SelectionTracker {
    core: Arc<Mutex<TrackerCore>>,
    context: Arc<SelectionContext>,
    context_subscriptions: Vec<Subscription>,
}

impl SelectionTracker {
    /// Create an unbound tracker. Call [`bind`](Self::bind) to start listening.
    pub fn new(
        context: Arc<SelectionContext>,
        clock: Arc<dyn Clock>,
        window: Duration,
        root: Box<dyn PresentationNode>,
    ) -> Self {
        let core = Arc::new_cyclic(|this| {
            Mutex::new(TrackerCore {
                this: this.clone(),
                context: Arc::clone(&context),
                clock,
                window,
                root,
                flags: DisplayFlags::default(),
                recomputes: 0,
                bound: false,
                generation: 0,
                binding: None,
            })
        });
        Self {
            core,
            context,
            context_subscriptions: Vec::new(),
        }
    }

    /// Subscribe to the selection context. Idempotent.
    pub fn bind(&mut self) {
        {
            let mut core = self.core.lock();
            if core.bound {
                return;
            }
            core.bound = true;
        }

        let weak = Arc::downgrade(&self.core);
        let on_result = self.context.on_result_changed(move |_| {
            if let Some(core) = weak.upgrade() {
                core.lock().handle_result_change();
            }
        });
        let weak = Arc::downgrade(&self.core);
        let on_metacard = self.context.on_metacard_changed(move |_| {
            if let Some(core) = weak.upgrade() {
                core.lock().handle_metacard_change();
            }
        });
        self.context_subscriptions = vec![on_result, on_metacard];
        tracing::debug!("metacard panel: tracker bound to selection context");
    }

    /// Drop every subscription and any pending throttled recompute.
    pub fn unbind(&mut self) {
        self.context_subscriptions.clear();
        let mut core = self.core.lock();
        if core.bound {
            core.unbind();
            tracing::debug!("metacard panel: tracker unbound");
        }
    }

    /// Recompute flags now and rebind to the current result's lifecycle.
    pub fn handle_result_change(&self) {
        self.core.lock().handle_result_change();
    }

    /// Recompute and apply flags from the live selection.
    pub fn recompute(&self) -> DisplayFlags {
        self.core.lock().recompute()
    }

    /// Run the throttled recompute if its window has closed by `now`.
    pub fn poll(&self, now: Instant) -> bool {
        self.core.lock().poll(now)
    }

    pub fn flags(&self) -> DisplayFlags {
        self.core.lock().flags
    }

    pub fn state(&self) -> TrackerState {
        self.core.lock().state()
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.core
            .lock()
            .binding
            .as_ref()
            .and_then(|binding| binding.throttle.deadline())
    }

    /// Total flag recomputations since creation.
    pub fn recompute_count(&self) -> u64 {
        self.core.lock().recomputes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.core.lock().root.has_class(class)
    }

    pub fn now(&self) -> Instant {
        self.core.lock().clock.now()
    }
}

impl Drop for SelectionTracker {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("SelectionTracker")
            .field("state", &core.state())
            .field("flags", &core.flags)
            .field("generation", &core.generation)
            .finish()
    }
}
