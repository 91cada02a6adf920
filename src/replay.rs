//! Scripted replays of selection and search activity against a panel.
//!
//! A scenario is a JSON list of steps applied to a fresh selection context
//! and a shown [`MetacardView`] on a manual clock. Time only moves on
//! `advance_ms`; throttled recomputes run at their exact deadlines. The
//! output is the timeline of status flag changes.
//!
//! ```json
//! { "steps": [
//!     { "op": "add_result", "name": "a", "searching": true },
//!     { "op": "select_result", "name": "a" },
//!     { "op": "complete_fetch", "name": "a" },
//!     { "op": "advance_ms", "ms": 100 }
//! ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::PanelConfig;
use crate::model::Metacard;
use crate::selection::{ResultHolder, SelectionContext};
use crate::ui::clock::{Clock, ManualClock};
use crate::ui::status::{ClassList, DisplayFlags};
use crate::ui::view::{DetailLayout, LayoutOptions, MetacardView};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Step {step}: unknown result '{name}'")]
    UnknownResult { step: usize, name: String },

    #[error("Step {step}: result '{name}' already exists")]
    DuplicateResult { step: usize, name: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddResult {
        name: String,
        #[serde(default)]
        searching: bool,
    },
    SelectResult {
        name: String,
    },
    ClearResult,
    SelectMetacard {
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
    ClearMetacard,
    BeginFetch {
        name: String,
    },
    CompleteFetch {
        name: String,
    },
    FailFetch {
        name: String,
    },
    AdvanceMs {
        ms: u64,
    },
    Render,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddResult { .. } => "add_result",
            Self::SelectResult { .. } => "select_result",
            Self::ClearResult => "clear_result",
            Self::SelectMetacard { .. } => "select_metacard",
            Self::ClearMetacard => "clear_metacard",
            Self::BeginFetch { .. } => "begin_fetch",
            Self::CompleteFetch { .. } => "complete_fetch",
            Self::FailFetch { .. } => "fail_fetch",
            Self::AdvanceMs { .. } => "advance_ms",
            Self::Render => "render",
        }
    }
}

/// One observed change of the panel's flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// 1-based step index; 0 is the initial show.
    pub step: usize,
    pub at_ms: u64,
    pub cause: String,
    pub flags: DisplayFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub scenario: Option<String>,
    pub steps: usize,
    pub elapsed_ms: u64,
    pub renders: u64,
    pub recomputes: u64,
    pub throttled_runs: u64,
    pub layout_mounts: usize,
    pub final_flags: DisplayFlags,
}

#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub timeline: Vec<TimelineEntry>,
    pub summary: ReplaySummary,
}

struct ReplayLayout {
    config_name: String,
}

impl DetailLayout for ReplayLayout {
    fn config_name(&self) -> &str {
        &self.config_name
    }
}

pub struct Replay {
    clock: Arc<ManualClock>,
    context: Arc<SelectionContext>,
    view: MetacardView,
    results: BTreeMap<String, Arc<ResultHolder>>,
    timeline: Vec<TimelineEntry>,
    last_flags: Option<DisplayFlags>,
    throttled_runs: u64,
    steps: usize,
}

impl Replay {
    /// Create a context and show a fresh panel on it.
    pub fn new(config: PanelConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let context = SelectionContext::new();
        let view_clock: Arc<dyn Clock> = clock.clone();
        let factory = |options: LayoutOptions| -> Box<dyn DetailLayout> {
            Box::new(ReplayLayout {
                config_name: options.config_name,
            })
        };
        let mut view = MetacardView::with_parts(
            Arc::clone(&context),
            config,
            view_clock,
            Box::new(ClassList::new()),
            Box::new(factory),
        );
        view.show();

        let mut replay = Self {
            clock,
            context,
            view,
            results: BTreeMap::new(),
            timeline: Vec::new(),
            last_flags: None,
            throttled_runs: 0,
            steps: 0,
        };
        replay.record(0, "show");
        replay
    }

    pub fn run(config: PanelConfig, scenario: &Scenario) -> Result<ReplayOutcome, ScenarioError> {
        let mut replay = Self::new(config);
        for (index, step) in scenario.steps.iter().enumerate() {
            replay.apply(index + 1, step)?;
        }
        Ok(replay.finish(scenario.name.clone()))
    }

    pub fn apply(&mut self, step_no: usize, step: &Step) -> Result<(), ScenarioError> {
        tracing::debug!(step = step_no, op = step.label(), "replay step");
        self.steps += 1;
        match step {
            Step::AddResult { name, searching } => {
                if self.results.contains_key(name) {
                    return Err(ScenarioError::DuplicateResult {
                        step: step_no,
                        name: name.clone(),
                    });
                }
                let holder = ResultHolder::new(name.clone());
                holder.set_searching(*searching);
                self.results.insert(name.clone(), holder);
            }
            Step::SelectResult { name } => {
                let holder = self.result(step_no, name)?;
                self.context.set_current_result(Some(holder));
            }
            Step::ClearResult => {
                self.context.set_current_result(None);
            }
            Step::SelectMetacard { id, title } => {
                let mut card = Metacard::new(id.clone());
                card.title = title.clone();
                self.context.set_current_metacard(Some(card));
            }
            Step::ClearMetacard => {
                self.context.set_current_metacard(None);
            }
            Step::BeginFetch { name } => self.result(step_no, name)?.begin_fetch(),
            Step::CompleteFetch { name } => self.result(step_no, name)?.complete_fetch(),
            Step::FailFetch { name } => self.result(step_no, name)?.fail_fetch(),
            Step::AdvanceMs { ms } => self.advance(step_no, Duration::from_millis(*ms)),
            Step::Render => self.view.render(),
        }
        self.record(step_no, step.label());
        Ok(())
    }

    fn result(&self, step: usize, name: &str) -> Result<Arc<ResultHolder>, ScenarioError> {
        self.results
            .get(name)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownResult {
                step,
                name: name.to_string(),
            })
    }

    /// Move the clock forward, stopping at every throttle deadline on the way.
    fn advance(&mut self, step_no: usize, by: Duration) {
        let target = self.clock.now() + by;
        loop {
            match self.view.pending_deadline() {
                Some(deadline) if deadline <= target => {
                    self.clock.advance_to(deadline);
                    if self.view.tick(deadline) {
                        self.throttled_runs += 1;
                        self.record(step_no, "throttle");
                    }
                }
                _ => break,
            }
        }
        self.clock.advance_to(target);
    }

    fn record(&mut self, step: usize, cause: &str) {
        let flags = self.view.flags();
        if self.last_flags == Some(flags) {
            return;
        }
        self.last_flags = Some(flags);
        self.timeline.push(TimelineEntry {
            step,
            at_ms: self.clock.elapsed().as_millis() as u64,
            cause: cause.to_string(),
            flags,
        });
    }

    pub fn view(&self) -> &MetacardView {
        &self.view
    }

    pub fn finish(self, scenario: Option<String>) -> ReplayOutcome {
        let summary = ReplaySummary {
            scenario,
            steps: self.steps,
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
            renders: self.view.render_count(),
            recomputes: self.view.recompute_count(),
            throttled_runs: self.throttled_runs,
            layout_mounts: self.view.details_tabular().mount_count(),
            final_flags: self.view.flags(),
        };
        ReplayOutcome {
            timeline: self.timeline,
            summary,
        }
    }
}
