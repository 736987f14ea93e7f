//! BDD step definitions for the dashboard feature

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use cucumber::{then, when};
use tower::ServiceExt;

use olt_dashboard::dashboard::build_router;

use crate::steps::view_steps::fetcher;
use crate::world::DashboardWorld;

#[when(expr = "{string} is requested from the dashboard")]
async fn request_path(world: &mut DashboardWorld, uri: String) {
    let state = world.state.clone().expect("state not set");
    let fetcher = Arc::new(fetcher(world));
    let app = build_router(state, fetcher);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the dashboard should answer with status {int}")]
fn response_status(world: &mut DashboardWorld, status: u16) {
    assert_eq!(world.response_status, Some(status));
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut DashboardWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}
