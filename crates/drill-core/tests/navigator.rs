//! End-to-end navigator behavior against an in-memory address bar.

use std::time::Duration;

use drill_core::{
    AddressBar, FilterPatch, Filters, ManualClock, MemoryHistory, NavOutcome, Navigator,
    NavigatorConfig, ReconcileOutcome, ScopeLevel, ScopeRef, TimeRange, WriteMode,
};

type TestNavigator = Navigator<MemoryHistory, ManualClock>;

fn defaults() -> Filters {
    Filters::new("power")
}

fn mount_on(history: MemoryHistory, root: ScopeRef) -> (TestNavigator, ManualClock) {
    let clock = ManualClock::new();
    let nav = Navigator::with_clock(
        root,
        defaults(),
        history,
        &NavigatorConfig::default(),
        clock.clone(),
    );
    (nav, clock)
}

fn mount() -> (TestNavigator, ManualClock) {
    mount_on(
        MemoryHistory::new(""),
        ScopeRef::new(ScopeLevel::Root, "N", "Nation"),
    )
}

fn region(id: &str) -> ScopeRef {
    ScopeRef::new(ScopeLevel::Region, id, id)
}

fn sub(id: &str) -> ScopeRef {
    ScopeRef::new(ScopeLevel::SubRegion, id, id)
}

fn leaf(id: &str) -> ScopeRef {
    ScopeRef::new(ScopeLevel::Leaf, id, id)
}

fn ids(nav: &TestNavigator) -> Vec<String> {
    nav.stack().iter().map(|e| e.id.clone()).collect()
}

/// Deliver queued external-change notifications the way a host would.
fn pump(nav: &mut TestNavigator) -> Vec<ReconcileOutcome> {
    let count = nav.address_bar_mut().take_notifications();
    (0..count).map(|_| nav.reconcile()).collect()
}

#[test]
fn scenario_push_sync_jump_to_root() {
    let (mut nav, _) = mount_on(
        MemoryHistory::new(""),
        ScopeRef::new(ScopeLevel::Region, "R1", "North"),
    );

    assert_eq!(
        nav.push(ScopeRef::new(ScopeLevel::SubRegion, "S9", "South")),
        NavOutcome::Committed(WriteMode::Push)
    );
    assert_eq!(nav.sync_filters(&FilterPatch::metric("load")), NavOutcome::Scheduled);
    assert_eq!(nav.jump_to(0), NavOutcome::Committed(WriteMode::Push));

    assert_eq!(ids(&nav), vec!["R1"]);
    assert_eq!(nav.filters(), &Filters::new("load"));
    assert!(!nav.has_pending_sync());
    assert_eq!(nav.address_bar().query(), "metric=load&range=30d&view=map");
}

#[test]
fn shallow_push_truncates_deeper_entries() {
    let (mut nav, _) = mount();
    nav.push(region("R1"));
    nav.push(sub("S1"));
    nav.push(leaf("L1"));
    assert_eq!(nav.push(region("R2")), NavOutcome::Committed(WriteMode::Push));
    assert_eq!(ids(&nav), vec!["N", "R2"]);
}

#[test]
fn identical_push_writes_once() {
    let (mut nav, _) = mount();
    assert!(nav.push(sub("S9")).is_committed());
    assert_eq!(nav.push(sub("S9")), NavOutcome::Unchanged);
    assert_eq!(nav.address_bar().push_count(), 1);
}

#[test]
fn repeated_push_with_new_label_replaces() {
    let (mut nav, _) = mount();
    nav.push(region("R1"));
    let renamed = ScopeRef::new(ScopeLevel::Region, "R1", "North");
    assert_eq!(nav.push(renamed.clone()), NavOutcome::Committed(WriteMode::Replace));
    assert_eq!(nav.breadcrumbs(), vec!["Nation", "North"]);
    assert_eq!(nav.push(renamed), NavOutcome::Unchanged);

    let bar = nav.address_bar();
    assert_eq!((bar.push_count(), bar.replace_count()), (1, 1));
    assert!(bar.query().contains("North"));
}

#[test]
fn back_unwinds_one_level_with_push() {
    let (mut nav, _) = mount();
    assert_eq!(nav.back(), NavOutcome::Unchanged);

    nav.push(region("R1"));
    nav.push(sub("S1"));
    let before = nav.stack().clone();
    assert_eq!(nav.back(), NavOutcome::Committed(WriteMode::Push));
    assert_eq!(nav.depth(), 2);
    assert_eq!(nav.stack(), &before.truncated(1).unwrap());
    assert!(nav.can_go_back());
    assert_eq!(nav.address_bar().push_count(), 3);
}

#[test]
fn filter_burst_coalesces_into_one_replace() {
    let (mut nav, clock) = mount();
    nav.push(region("R1"));
    let pushes = nav.address_bar().push_count();

    for range in [TimeRange::Day, TimeRange::Week, TimeRange::Quarter] {
        assert_eq!(nav.sync_filters(&FilterPatch::range(range)), NavOutcome::Scheduled);
        clock.advance(Duration::from_millis(100));
        assert_eq!(nav.poll(), NavOutcome::Scheduled);
    }
    clock.advance(Duration::from_millis(150));
    assert_eq!(nav.poll(), NavOutcome::Committed(WriteMode::Replace));

    let bar = nav.address_bar();
    assert_eq!(bar.replace_count(), 1);
    assert_eq!(bar.push_count(), pushes);
    assert!(bar.query().contains("range=90d"));
    assert!(nav.stack().iter().all(|e| e.filters.range == TimeRange::Quarter));
}

#[test]
fn push_during_pending_sync_carries_latest_filters() {
    let (mut nav, clock) = mount();
    nav.sync_filters(&FilterPatch::metric("load"));
    nav.push(region("R1"));
    assert!(!nav.has_pending_sync());
    assert!(nav.address_bar().query().contains("metric=load"));

    clock.advance(Duration::from_secs(1));
    assert_eq!(nav.poll(), NavOutcome::Unchanged);
    assert_eq!(nav.address_bar().replace_count(), 0);
}

#[test]
fn browser_back_and_forward_are_adopted() {
    let (mut nav, _) = mount();
    nav.push(region("R1"));
    nav.push(sub("S1"));

    assert!(nav.address_bar_mut().back());
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);
    assert_eq!(ids(&nav), vec!["N", "R1"]);

    assert!(nav.address_bar_mut().back());
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);
    assert_eq!(ids(&nav), vec!["N"]);

    assert!(nav.address_bar_mut().forward());
    assert!(nav.address_bar_mut().forward());
    assert_eq!(
        pump(&mut nav),
        vec![ReconcileOutcome::Adopted, ReconcileOutcome::SelfCaused]
    );
    assert_eq!(ids(&nav), vec!["N", "R1", "S1"]);

    assert_eq!(nav.address_bar().write_count(), 2);
}

#[test]
fn own_write_echo_is_ignored() {
    let history = MemoryHistory::new("").with_write_notifications(true);
    let (mut nav, _) = mount_on(history, ScopeRef::new(ScopeLevel::Root, "N", "Nation"));
    nav.push(region("R1"));
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::SelfCaused]);
    assert_eq!(ids(&nav), vec!["N", "R1"]);
    assert_eq!(nav.address_bar().write_count(), 1);
}

#[test]
fn empty_metric_survives_echo_and_reload() {
    let config = NavigatorConfig::default().with_debounce_ms(0);
    let history = MemoryHistory::new("").with_write_notifications(true);
    let root = ScopeRef::new(ScopeLevel::Root, "N", "Nation");
    let mut nav = Navigator::with_clock(
        root.clone(),
        defaults(),
        history,
        &config,
        ManualClock::new(),
    );

    assert_eq!(
        nav.sync_filters(&FilterPatch::metric("")),
        NavOutcome::Committed(WriteMode::Replace)
    );
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::SelfCaused]);
    assert_eq!(nav.filters().metric, "");
    assert_eq!(nav.address_bar().query(), "metric=&range=30d&view=map");

    let bar = nav.address_bar().clone();
    let reloaded = Navigator::with_clock(root, defaults(), bar, &config, ManualClock::new());
    assert_eq!(reloaded.filters().metric, "");
}

#[test]
fn typed_url_matching_pending_state_then_browser_back() {
    let (mut nav, clock) = mount();
    nav.push(region("R1"));
    nav.push(sub("S1"));
    nav.address_bar_mut().back();
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);

    nav.sync_filters(&FilterPatch::metric("load"));
    let held = nav.signature();
    nav.address_bar_mut().navigate(held.as_str());
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::AlreadyCurrent]);
    clock.advance(Duration::from_millis(250));
    assert_eq!(nav.poll(), NavOutcome::Reflected);

    assert!(nav.address_bar_mut().back());
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);
    assert_eq!(ids(&nav), vec!["N", "R1"]);
    assert_eq!(nav.filters().metric, "power");
}

#[test]
fn external_navigation_cancels_pending_sync() {
    let (mut nav, clock) = mount();
    nav.push(region("R1"));
    nav.sync_filters(&FilterPatch::metric("load"));

    nav.address_bar_mut().back();
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);
    assert!(!nav.has_pending_sync());
    assert_eq!(nav.filters(), &defaults());

    clock.advance(Duration::from_secs(1));
    assert_eq!(nav.poll(), NavOutcome::Unchanged);
    assert_eq!(nav.address_bar().query(), "");
}

#[test]
fn typed_url_with_garbage_resets_to_root() {
    let (mut nav, _) = mount();
    nav.push(region("R1"));
    nav.address_bar_mut().navigate("drill=%5B%5B&metric=load&range=forever");
    assert_eq!(pump(&mut nav), vec![ReconcileOutcome::Adopted]);
    assert_eq!(ids(&nav), vec!["N"]);
    assert_eq!(nav.filters().metric, "load");
    assert_eq!(nav.filters().range, TimeRange::Month);
}

#[test]
fn shared_link_reproduces_view() {
    let (mut nav, clock) = mount();
    nav.push(ScopeRef::new(ScopeLevel::Region, "R1", "North"));
    nav.push(ScopeRef::new(ScopeLevel::SubRegion, "S9", "South & East"));
    nav.sync_filters(&FilterPatch::overlay(Some("roads".to_string())));
    clock.advance(Duration::from_millis(250));
    nav.poll();
    let link = nav.address_bar().query();

    let (other, _) = mount_on(
        MemoryHistory::new(&link),
        ScopeRef::new(ScopeLevel::Root, "N", "Nation"),
    );
    assert_eq!(other.stack(), nav.stack());
    assert_eq!(other.breadcrumbs(), nav.breadcrumbs());
    assert_eq!(other.filters(), nav.filters());
    assert_eq!(other.address_bar().write_count(), 0);
}

#[test]
fn foreign_query_keys_survive_navigation() {
    let (mut nav, _) = mount_on(
        MemoryHistory::new("tab=kpi"),
        ScopeRef::new(ScopeLevel::Root, "N", "Nation"),
    );
    nav.push(region("R1"));
    assert!(nav.address_bar().query().ends_with("&tab=kpi"));
    nav.back();
    assert_eq!(nav.address_bar().query(), "tab=kpi");
}

#[test]
fn teardown_releases_only_its_listener() {
    let mut history = MemoryHistory::new("");
    let probe = history.subscribe();
    let (mut nav, _) = mount_on(history, ScopeRef::new(ScopeLevel::Root, "N", "Nation"));
    assert_eq!(nav.address_bar().listener_count(), 2);
    nav.teardown();
    assert_eq!(nav.address_bar().listener_count(), 1);
    nav.address_bar_mut().unsubscribe(probe);
    assert_eq!(nav.address_bar().listener_count(), 0);
}
