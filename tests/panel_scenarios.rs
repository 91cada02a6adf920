//! End-to-end behavior of the metacard panel against a live selection
//! context, driven on a manual clock.

use std::sync::Arc;
use std::time::Duration;

use metacard_panel::ui::{
    ClassList, Clock, DetailLayout, IS_SEARCHING_CLASS, LayoutOptions, ManualClock, NOT_FOUND_CLASS,
};
use metacard_panel::{
    DisplayFlags, LifecycleEvent, Metacard, MetacardView, PanelConfig, ResultHolder,
    SelectionContext, TrackerState,
};

const WINDOW: Duration = Duration::from_millis(60);

struct TabsLayout {
    config_name: String,
}

impl DetailLayout for TabsLayout {
    fn config_name(&self) -> &str {
        &self.config_name
    }
}

fn shown_panel(ctx: &Arc<SelectionContext>) -> (MetacardView, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let view_clock: Arc<dyn Clock> = clock.clone();
    let factory = |options: LayoutOptions| -> Box<dyn DetailLayout> {
        Box::new(TabsLayout {
            config_name: options.config_name,
        })
    };
    let mut view = MetacardView::with_parts(
        Arc::clone(ctx),
        PanelConfig::default(),
        view_clock,
        Box::new(ClassList::new()),
        Box::new(factory),
    );
    view.show();
    (view, clock)
}

fn flags(not_found: bool, is_searching: bool) -> DisplayFlags {
    DisplayFlags {
        not_found,
        is_searching,
    }
}

#[test]
fn empty_selection_shows_not_found() {
    let ctx = SelectionContext::new();
    let (view, _clock) = shown_panel(&ctx);

    assert_eq!(view.flags(), flags(true, false));
    assert!(view.has_class(NOT_FOUND_CLASS));
    assert!(!view.has_class(IS_SEARCHING_CLASS));
    assert_eq!(view.tracker_state(), TrackerState::Idle);
}

#[test]
fn searching_result_settles_after_throttle_window() {
    let ctx = SelectionContext::new();
    let (mut view, clock) = shown_panel(&ctx);

    let holder = ResultHolder::new("harbor");
    holder.set_searching(true);
    ctx.set_current_metacard(Some(Metacard::new("x")));
    ctx.set_current_result(Some(Arc::clone(&holder)));
    assert_eq!(view.flags(), flags(false, true));

    holder.complete_fetch();
    assert_eq!(view.flags(), flags(false, true), "throttle has no leading edge");

    clock.advance(Duration::from_millis(30));
    assert!(!view.tick(clock.now()));
    assert_eq!(view.flags(), flags(false, true));

    clock.advance(Duration::from_millis(30));
    assert!(view.tick(clock.now()));
    assert_eq!(view.flags(), flags(false, false));
    assert!(!view.has_class(IS_SEARCHING_CLASS));
}

#[test]
fn lifecycle_burst_coalesces_into_one_recompute() {
    let ctx = SelectionContext::new();
    let (mut view, clock) = shown_panel(&ctx);
    let holder = ResultHolder::new("burst");
    ctx.set_current_result(Some(Arc::clone(&holder)));
    let baseline = view.recompute_count();

    for i in 0..25 {
        let event = LifecycleEvent::ALL[i % LifecycleEvent::ALL.len()];
        holder.emit(event);
        clock.advance(Duration::from_millis(2));
    }

    let mut fired = 0;
    for _ in 0..10 {
        clock.advance(Duration::from_millis(10));
        if view.tick(clock.now()) {
            fired += 1;
        }
    }
    assert_eq!(fired, 1);
    assert_eq!(view.recompute_count(), baseline + 1);
}

#[test]
fn swapped_out_result_no_longer_affects_flags() {
    let ctx = SelectionContext::new();
    let (mut view, clock) = shown_panel(&ctx);
    ctx.set_current_metacard(Some(Metacard::new("x")));

    let a = ResultHolder::new("a");
    let b = ResultHolder::new("b");
    b.set_searching(true);
    ctx.set_current_result(Some(Arc::clone(&a)));
    assert_eq!(view.flags(), flags(false, false));

    ctx.set_current_result(Some(Arc::clone(&b)));
    assert_eq!(view.flags(), flags(false, true), "b's state shows at swap time");
    assert_eq!(view.tracker_state(), TrackerState::Watching(b.id()));

    let before = view.recompute_count();
    a.begin_fetch();
    a.complete_fetch();
    assert_eq!(view.pending_deadline(), None);
    clock.advance(WINDOW * 2);
    assert!(!view.tick(clock.now()));
    assert_eq!(view.recompute_count(), before);

    b.complete_fetch();
    clock.advance(WINDOW);
    assert!(view.tick(clock.now()));
    assert_eq!(view.flags(), flags(false, false));
}

#[test]
fn pending_work_from_replaced_result_is_discarded() {
    let ctx = SelectionContext::new();
    let (mut view, clock) = shown_panel(&ctx);
    let a = ResultHolder::new("a");
    ctx.set_current_result(Some(Arc::clone(&a)));

    a.begin_fetch();
    clock.advance(Duration::from_millis(20));
    assert!(view.pending_deadline().is_some());

    let b = ResultHolder::new("b");
    ctx.set_current_result(Some(Arc::clone(&b)));
    assert_eq!(view.pending_deadline(), None);
    assert!(!view.flags().is_searching);

    // a is still searching, but it is no longer the current result.
    clock.advance(WINDOW);
    assert!(!view.tick(clock.now()));
    assert!(!view.flags().is_searching);
}

#[test]
fn clearing_metacard_is_reflected_without_throttle() {
    let ctx = SelectionContext::new();
    let (view, _clock) = shown_panel(&ctx);

    ctx.set_current_metacard(Some(Metacard::new("x")));
    assert!(!view.has_class(NOT_FOUND_CLASS));
    ctx.set_current_metacard(None);
    assert!(view.has_class(NOT_FOUND_CLASS));
    assert_eq!(view.pending_deadline(), None);
}

#[test]
fn many_swaps_leave_one_lifecycle_listener() {
    let ctx = SelectionContext::new();
    let (mut view, _clock) = shown_panel(&ctx);
    let holders: Vec<_> = (0..8).map(|i| ResultHolder::new(format!("r{i}"))).collect();

    for _ in 0..3 {
        for holder in &holders {
            ctx.set_current_result(Some(Arc::clone(holder)));
            view.render();
        }
    }

    let total: usize = holders.iter().map(|h| h.listener_count()).sum();
    assert_eq!(total, 1);
    assert_eq!(holders.last().unwrap().listener_count(), 1);
}

#[test]
fn detail_layout_mounted_once_with_shared_context() {
    let ctx = SelectionContext::new();
    let (mut view, _clock) = shown_panel(&ctx);
    view.render();
    view.render();
    view.show();

    let region = view.details_tabular();
    assert_eq!(region.mount_count(), 1);
    assert_eq!(region.name(), "details-tabular");
    assert_eq!(
        region.current().map(|layout| layout.config_name()),
        Some("goldenLayoutMetacard")
    );
}

#[test]
fn dropping_panel_detaches_from_context_and_result() {
    let ctx = SelectionContext::new();
    let holder = ResultHolder::new("r");
    ctx.set_current_result(Some(Arc::clone(&holder)));
    {
        let (_view, _clock) = shown_panel(&ctx);
        assert_eq!(ctx.listener_count(), 2);
        assert_eq!(holder.listener_count(), 1);
    }
    assert_eq!(ctx.listener_count(), 0);
    assert_eq!(holder.listener_count(), 0);
}
