//! Metacard detail panel for catalog search front ends.
//!
//! The panel watches a shared [`SelectionContext`](selection::SelectionContext)
//! and keeps two status flags on its root node: `not-found` when no metacard
//! is selected and `is-searching` while the current result is fetching.
//! Lifecycle bursts from an in-flight search are coalesced by a trailing
//! throttle so a live search does not repaint the panel on every merge.

pub mod config;
pub mod model;
pub mod replay;
pub mod selection;
pub mod ui;

pub use config::{ConfigError, PanelConfig};
pub use model::{LifecycleEvent, Metacard, ResultId};
pub use selection::{ResultHolder, SelectionContext, SelectionSnapshot, Subscription};
pub use ui::{DisplayFlags, MetacardView, PanelMsg, TrackerState};
