//! The metacard detail panel.
//!
//! `MetacardView` owns a [`SelectionTracker`] and a single
//! `details-tabular` region. The nested detail layout is created once, on
//! first show; every render resynchronizes the status flags.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::clock::{Clock, MonotonicClock};
use super::status::{ClassList, DisplayFlags, PresentationNode};
use super::tracker::{SelectionTracker, TrackerState};
use crate::config::PanelConfig;
use crate::selection::SelectionContext;

/// Construction options handed to the nested detail layout.
#[derive(Clone)]
pub struct LayoutOptions {
    pub selection_interface: Arc<SelectionContext>,
    pub config_name: String,
}

impl fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("config_name", &self.config_name)
            .finish_non_exhaustive()
    }
}

/// The nested component that renders a metacard's detail tabs.
pub trait DetailLayout: Send {
    fn config_name(&self) -> &str;

    fn on_show(&mut self) {}

    fn on_close(&mut self) {}
}

/// Builds the nested detail layout.
pub trait DetailLayoutFactory: Send {
    fn create(&self, options: LayoutOptions) -> Box<dyn DetailLayout>;
}

impl<F> DetailLayoutFactory for F
where
    F: Fn(LayoutOptions) -> Box<dyn DetailLayout> + Send,
{
    fn create(&self, options: LayoutOptions) -> Box<dyn DetailLayout> {
        self(options)
    }
}

/// A named slot that hosts at most one child layout.
pub struct Region {
    name: String,
    current: Option<Box<dyn DetailLayout>>,
    mounts: usize,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
            mounts: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mount `layout`, closing whatever was shown before.
    pub fn show(&mut self, mut layout: Box<dyn DetailLayout>) {
        if let Some(mut previous) = self.current.take() {
            previous.on_close();
        }
        layout.on_show();
        tracing::debug!(region = %self.name, config = layout.config_name(), "region: layout mounted");
        self.current = Some(layout);
        self.mounts += 1;
    }

    pub fn close(&mut self) {
        if let Some(mut layout) = self.current.take() {
            layout.on_close();
        }
    }

    pub fn current(&self) -> Option<&dyn DetailLayout> {
        self.current.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    pub fn mount_count(&self) -> usize {
        self.mounts
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name)
            .field("mounted", &self.current.as_ref().map(|l| l.config_name()))
            .field("mounts", &self.mounts)
            .finish()
    }
}

/// Messages the host event loop feeds the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMsg {
    /// First display: render and mount the detail layout.
    Show,
    /// Re-render.
    Render,
    /// Periodic tick; runs due throttled work.
    Tick,
    /// Release every subscription.
    Teardown,
}

pub struct MetacardView {
    context: Arc<SelectionContext>,
    config: PanelConfig,
    tracker: SelectionTracker,
    details_tabular: Region,
    layouts: Box<dyn DetailLayoutFactory>,
    shown: bool,
    renders: u64,
}

impl MetacardView {
    /// Build a panel on the wall clock with a plain class-list root node.
    pub fn new(
        context: Arc<SelectionContext>,
        config: PanelConfig,
        layouts: impl DetailLayoutFactory + 'static,
    ) -> Self {
        Self::with_parts(
            context,
            config,
            Arc::new(MonotonicClock),
            Box::new(ClassList::new()),
            Box::new(layouts),
        )
    }

    pub fn with_parts(
        context: Arc<SelectionContext>,
        config: PanelConfig,
        clock: Arc<dyn Clock>,
        root: Box<dyn PresentationNode>,
        layouts: Box<dyn DetailLayoutFactory>,
    ) -> Self {
        let mut tracker = SelectionTracker::new(
            Arc::clone(&context),
            clock,
            config.throttle_window(),
            root,
        );
        tracker.bind();
        let details_tabular = Region::new(config.region.clone());
        Self {
            context,
            config,
            tracker,
            details_tabular,
            layouts,
            shown: false,
            renders: 0,
        }
    }

    pub fn update(&mut self, msg: PanelMsg) -> bool {
        match msg {
            PanelMsg::Show => {
                self.show();
                true
            }
            PanelMsg::Render => {
                self.render();
                true
            }
            PanelMsg::Tick => self.tick(self.tracker.now()),
            PanelMsg::Teardown => {
                self.teardown();
                true
            }
        }
    }

    /// Render, then mount the detail layout if this is the first display.
    pub fn show(&mut self) {
        self.render();
        self.on_before_show();
    }

    pub fn render(&mut self) {
        self.renders += 1;
        self.tracker.handle_result_change();
    }

    /// Mount the detail layout. Only the first call per view has an effect.
    pub fn on_before_show(&mut self) {
        if self.shown {
            return;
        }
        self.shown = true;
        let layout = self.layouts.create(LayoutOptions {
            selection_interface: Arc::clone(&self.context),
            config_name: self.config.layout_config_name.clone(),
        });
        self.details_tabular.show(layout);
    }

    /// Run the throttled recompute if it is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.tracker.poll(now)
    }

    pub fn teardown(&mut self) {
        self.tracker.unbind();
        self.details_tabular.close();
    }

    pub fn flags(&self) -> DisplayFlags {
        self.tracker.flags()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.tracker.has_class(class)
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.tracker.pending_deadline()
    }

    pub fn recompute_count(&self) -> u64 {
        self.tracker.recompute_count()
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn details_tabular(&self) -> &Region {
        &self.details_tabular
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }
}

impl Drop for MetacardView {
    fn drop(&mut self) {
        self.details_tabular.close();
    }
}

impl fmt::Debug for MetacardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetacardView")
            .field("tracker", &self.tracker)
            .field("details_tabular", &self.details_tabular)
            .field("shown", &self.shown)
            .field("renders", &self.renders)
            .finish()
    }
}
