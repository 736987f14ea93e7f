//! BDD step definitions for building and running the service

use std::sync::Arc;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use olt_dashboard::config::{Config, DashboardConfig, TrafficConfig};
use olt_dashboard::io::HttpClient;
use olt_dashboard::OltDashboardBuilder;

use crate::world::{DashboardWorld, BASE_URL};

fn test_config(base_url: &str) -> Config {
    let mut config = Config {
        dashboard: DashboardConfig {
            enabled: false,
            ..DashboardConfig::default()
        },
        traffic: TrafficConfig {
            enabled: false,
            ..TrafficConfig::default()
        },
        ..Config::default()
    };
    config.backend.base_url = base_url.to_string();
    config
}

fn builder(world: &mut DashboardWorld, base_url: &str) -> OltDashboardBuilder {
    OltDashboardBuilder::new(test_config(base_url))
        .with_http_client(world.http() as Arc<dyn HttpClient>)
}

#[given("an empty backend")]
fn empty_backend(world: &mut DashboardWorld) {
    world.http();
}

#[when("the dashboard is built")]
fn dashboard_built(world: &mut DashboardWorld) {
    world.lifecycle_build_succeeded = Some(builder(world, BASE_URL).build().is_ok());
}

#[when(expr = "the dashboard is built with backend URL {string}")]
fn dashboard_built_with_url(world: &mut DashboardWorld, base_url: String) {
    world.lifecycle_build_succeeded = Some(builder(world, &base_url).build().is_ok());
}

#[when("the dashboard is built and started with a cancelled token")]
async fn dashboard_started_cancelled(world: &mut DashboardWorld) {
    let cancel = CancellationToken::new();
    cancel.cancel();

    match builder(world, BASE_URL).with_cancellation_token(cancel).build() {
        Ok(dashboard) => {
            world.lifecycle_build_succeeded = Some(true);
            world.lifecycle_start_succeeded = Some(dashboard.start().await.is_ok());
        }
        Err(_) => {
            world.lifecycle_build_succeeded = Some(false);
            world.lifecycle_start_succeeded = Some(false);
        }
    }
}

#[then("the build should succeed")]
fn build_should_succeed(world: &mut DashboardWorld) {
    assert_eq!(world.lifecycle_build_succeeded, Some(true));
}

#[then("the build should fail")]
fn build_should_fail(world: &mut DashboardWorld) {
    assert_eq!(world.lifecycle_build_succeeded, Some(false));
}

#[then("the lifecycle should complete successfully")]
fn lifecycle_should_complete(world: &mut DashboardWorld) {
    assert_eq!(world.lifecycle_build_succeeded, Some(true));
    assert_eq!(world.lifecycle_start_succeeded, Some(true));
}

#[then(expr = "the backend should have received a request for {string}")]
async fn backend_received(world: &mut DashboardWorld, path: String) {
    let url = format!("{}{}", BASE_URL, path);
    let requests = world.http().requests.read().await.clone();
    assert!(
        requests.contains(&url),
        "Expected a request to {}, got {:?}",
        url,
        requests
    );
}
