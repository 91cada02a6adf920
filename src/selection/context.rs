//! The application-wide "current selection" shared by every panel.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use super::listeners::{Listeners, Subscription};
use super::result::ResultHolder;
use crate::model::{Metacard, ResultId};

/// Fired when `current_result` is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultChanged {
    pub previous: Option<ResultId>,
    pub current: Option<ResultId>,
}

/// Fired when `current_metacard` is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetacardChanged {
    pub previous: Option<String>,
    pub current: Option<String>,
}

/// Point-in-time copy of the selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionSnapshot {
    pub current_result: Option<Arc<ResultHolder>>,
    pub current_metacard: Option<Metacard>,
}

#[derive(Default)]
struct SelectionState {
    current_result: Option<Arc<ResultHolder>>,
    current_metacard: Option<Metacard>,
}

/// Shared, mutable selection state with change notifications.
///
/// Setters only notify when the value actually changes: results compare by
/// holder identity, metacards by value. Notifications are dispatched after
/// the state lock is released, so listeners may read the context.
#[derive(Default)]
pub struct SelectionContext {
    state: RwLock<SelectionState>,
    result_changed: Listeners<ResultChanged>,
    metacard_changed: Listeners<MetacardChanged>,
}

impl SelectionContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current_result(&self) -> Option<Arc<ResultHolder>> {
        self.state.read().current_result.clone()
    }

    pub fn current_metacard(&self) -> Option<Metacard> {
        self.state.read().current_metacard.clone()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let state = self.state.read();
        SelectionSnapshot {
            current_result: state.current_result.clone(),
            current_metacard: state.current_metacard.clone(),
        }
    }

    /// Replace the current result. Returns whether a change was announced.
    pub fn set_current_result(&self, result: Option<Arc<ResultHolder>>) -> bool {
        let change = {
            let mut state = self.state.write();
            let unchanged = match (&state.current_result, &result) {
                (Some(old), Some(new)) => Arc::ptr_eq(old, new),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return false;
            }
            let change = ResultChanged {
                previous: state.current_result.as_ref().map(|r| r.id()),
                current: result.as_ref().map(|r| r.id()),
            };
            state.current_result = result;
            change
        };

        tracing::debug!(
            previous = ?change.previous,
            current = ?change.current,
            "selection: current result changed"
        );
        self.result_changed.emit(&change);
        true
    }

    /// Replace the current metacard. Returns whether a change was announced.
    pub fn set_current_metacard(&self, metacard: Option<Metacard>) -> bool {
        let change = {
            let mut state = self.state.write();
            if state.current_metacard == metacard {
                return false;
            }
            let change = MetacardChanged {
                previous: state.current_metacard.as_ref().map(|m| m.id.clone()),
                current: metacard.as_ref().map(|m| m.id.clone()),
            };
            state.current_metacard = metacard;
            change
        };

        tracing::debug!(
            previous = ?change.previous,
            current = ?change.current,
            "selection: current metacard changed"
        );
        self.metacard_changed.emit(&change);
        true
    }

    pub fn on_result_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ResultChanged) + Send + Sync + 'static,
    {
        self.result_changed.subscribe(callback)
    }

    pub fn on_metacard_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MetacardChanged) + Send + Sync + 'static,
    {
        self.metacard_changed.subscribe(callback)
    }

    /// Number of live subscriptions across both change channels.
    pub fn listener_count(&self) -> usize {
        self.result_changed.len() + self.metacard_changed.len()
    }
}

impl fmt::Debug for SelectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SelectionContext")
            .field("current_result", &state.current_result.as_ref().map(|r| r.id()))
            .field(
                "current_metacard",
                &state.current_metacard.as_ref().map(|m| m.id.as_str()),
            )
            .field("listeners", &self.listener_count())
            .finish()
    }
}
