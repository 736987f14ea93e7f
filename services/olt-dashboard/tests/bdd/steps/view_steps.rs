//! BDD step definitions for list views and refreshes

use std::sync::Arc;

use cucumber::{given, then, when};
use serde_json::{json, Value};

use olt_dashboard::config::Config;
use olt_dashboard::fetcher::RemoteFetcher;
use olt_dashboard::io::HttpClient;
use olt_dashboard::poller::refresh_view;
use olt_dashboard::query::CategoryFilter;
use olt_dashboard::state::new_state_handle;
use olt_dashboard::view::{LoadOutcome, ViewSnapshot};

use crate::world::{DashboardWorld, BASE_URL};

pub fn onus_payload(count: usize) -> Value {
    let onus: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "unique_external_id": format!("ext-{}", i),
                "sn": format!("SN{:03}", i),
                "name": format!("Customer {}", i),
                "olt_name": if i % 2 == 0 { "Centro" } else { "Norte" },
                "zone_name": "Zone 1",
                "onu_type_name": "HG8546M",
                "board": 2,
                "port": i % 8,
            })
        })
        .collect();
    json!({ "status": true, "onus": onus })
}

pub fn fetcher(world: &mut DashboardWorld) -> RemoteFetcher {
    RemoteFetcher::new(BASE_URL, world.http() as Arc<dyn HttpClient>)
}

async fn snapshot(world: &DashboardWorld, view: &str) -> ViewSnapshot {
    let state = world.state.as_ref().expect("state not loaded");
    let state = state.read().await;
    state
        .view(view)
        .unwrap_or_else(|| panic!("no view named '{}'", view))
        .snapshot()
}

#[given(expr = "the backend serves {int} active ONUs")]
async fn backend_serves_onus(world: &mut DashboardWorld, count: usize) {
    world
        .http()
        .serve("/onus/details", 200, onus_payload(count).to_string())
        .await;
}

#[given("the backend serves ONUs without names first")]
async fn backend_serves_unnamed_first(world: &mut DashboardWorld) {
    let payload = json!({
        "onus": [
            {"sn": "SN-A"},
            {"sn": "SN-B", "name": "  "},
            {"sn": "SN-C", "name": "Named customer"},
        ]
    });
    world
        .http()
        .serve("/onus/details", 200, payload.to_string())
        .await;
}

#[given("the dashboard state is loaded from the backend")]
async fn state_loaded(world: &mut DashboardWorld) {
    let state = world
        .state
        .get_or_insert_with(|| new_state_handle(&Config::default()))
        .clone();
    let fetcher = fetcher(world);
    let outcome = refresh_view(&fetcher, &state, "active_onus", false)
        .await
        .expect("view exists");
    assert!(
        matches!(outcome, LoadOutcome::Loaded(_)),
        "initial load failed: {:?}",
        outcome
    );
}

#[given(expr = "a forced refresh of {string} fails with message {string}")]
async fn forced_refresh_fails(world: &mut DashboardWorld, path: String, message: String) {
    let body = json!({"status": false, "message": message}).to_string();
    world
        .http()
        .serve(&format!("{}?force=true", path), 200, body)
        .await;
}

#[given("the backend stops answering")]
async fn backend_stops(world: &mut DashboardWorld) {
    world.http().responses.write().await.clear();
}

#[when(expr = "page {int} of view {string} is requested")]
async fn page_requested(world: &mut DashboardWorld, page: usize, view: String) {
    let state = world.state.as_ref().expect("state not loaded");
    let mut state = state.write().await;
    state.view_mut(&view).expect("unknown view").set_page(page);
}

#[when(expr = "view {string} is searched for {string}")]
async fn view_searched(world: &mut DashboardWorld, view: String, term: String) {
    let state = world.state.as_ref().expect("state not loaded");
    let mut state = state.write().await;
    state.view_mut(&view).expect("unknown view").set_search_term(&term);
}

#[when(expr = "view {string} is filtered to category {string}")]
async fn view_filtered(world: &mut DashboardWorld, view: String, category: String) {
    let state = world.state.as_ref().expect("state not loaded");
    let mut state = state.write().await;
    state
        .view_mut(&view)
        .expect("unknown view")
        .set_category(CategoryFilter::parse(&category));
}

#[when(expr = "view {string} is force refreshed")]
async fn view_force_refreshed(world: &mut DashboardWorld, view: String) {
    let state = world.state.clone().expect("state not loaded");
    let fetcher = fetcher(world);
    world.last_outcome = Some(
        refresh_view(&fetcher, &state, &view, true)
            .await
            .expect("view exists"),
    );
}

#[when(expr = "a slow load of view {string} is overtaken by a newer load of {int} ONUs")]
async fn slow_load_overtaken(world: &mut DashboardWorld, view: String, count: usize) {
    let state = world.state.as_ref().expect("state not loaded");
    let mut state = state.write().await;
    let view = state.view_mut(&view).expect("unknown view");

    let slow = view.begin_load(false);
    let newer = view.begin_load(true);
    view.complete(newer, Ok(onus_payload(count)), 2000);
    world.last_outcome = Some(view.complete(slow, Ok(onus_payload(37)), 3000));
}

#[then(expr = "view {string} should have {int} pages")]
async fn view_pages(world: &mut DashboardWorld, view: String, pages: usize) {
    assert_eq!(snapshot(world, &view).await.window.total_pages, pages);
}

#[then(expr = "view {string} should be on page {int}")]
async fn view_on_page(world: &mut DashboardWorld, view: String, page: usize) {
    let snapshot = snapshot(world, &view).await;
    assert_eq!(snapshot.query.page, page);
    assert_eq!(snapshot.window.page, page);
}

#[then(expr = "the window of view {string} should hold {int} records")]
async fn window_holds(world: &mut DashboardWorld, view: String, count: usize) {
    assert_eq!(snapshot(world, &view).await.window.items.len(), count);
}

#[then(expr = "view {string} should show {int} matching records")]
async fn view_matching(world: &mut DashboardWorld, view: String, count: usize) {
    assert_eq!(snapshot(world, &view).await.window.total_items, count);
}

#[then(expr = "the first record in view {string} should be named {string}")]
async fn first_record_named(world: &mut DashboardWorld, view: String, name: String) {
    let snapshot = snapshot(world, &view).await;
    assert_eq!(snapshot.window.items[0]["name"], name.as_str());
}

#[then(expr = "the refresh should have failed with {string}")]
fn refresh_failed_with(world: &mut DashboardWorld, message: String) {
    assert_eq!(world.last_outcome, Some(LoadOutcome::Failed(message)));
}

#[then("the slow load should be dropped as stale")]
fn slow_load_stale(world: &mut DashboardWorld) {
    assert_eq!(world.last_outcome, Some(LoadOutcome::Stale));
}

#[then(expr = "view {string} should still hold {int} records")]
async fn view_still_holds(world: &mut DashboardWorld, view: String, count: usize) {
    let state = world.state.as_ref().expect("state not loaded");
    let state = state.read().await;
    assert_eq!(state.view(&view).expect("unknown view").record_count(), count);
}

#[then(expr = "view {string} should show the warning {string}")]
async fn view_warning(world: &mut DashboardWorld, view: String, message: String) {
    assert_eq!(snapshot(world, &view).await.error, Some(message));
}
