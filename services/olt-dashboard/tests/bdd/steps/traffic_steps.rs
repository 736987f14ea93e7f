//! BDD step definitions for the traffic window

use cucumber::{given, then, when};

use olt_dashboard::traffic::{parse_event, simulated_sample, SampleOrigin, TrafficWindow};

use crate::world::DashboardWorld;

fn window(world: &mut DashboardWorld) -> &mut TrafficWindow {
    world.traffic.as_mut().expect("traffic window not set")
}

#[given(expr = "an empty traffic window of {int} samples")]
fn empty_window(world: &mut DashboardWorld, capacity: usize) {
    world.traffic = Some(TrafficWindow::new(capacity));
}

#[when(expr = "the live event {string} arrives")]
fn live_event(world: &mut DashboardWorld, line: String) {
    let sample = parse_event(&line, 1000).expect("event should parse");
    window(world).push(sample);
}

#[when(expr = "{int} simulated samples are produced")]
fn simulated_samples(world: &mut DashboardWorld, count: u64) {
    for i in 0..count {
        window(world).push(simulated_sample(i));
    }
}

#[then("the latest sample should be live")]
fn latest_is_live(world: &mut DashboardWorld) {
    let latest = window(world).latest().expect("no samples");
    assert_eq!(latest.origin, SampleOrigin::Live);
}

#[then(expr = "the latest average should be {float}")]
fn latest_average(world: &mut DashboardWorld, expected: f64) {
    let latest = window(world).latest().expect("no samples");
    assert!(
        (latest.average_gbps - expected).abs() < 1e-9,
        "expected average {}, got {}",
        expected,
        latest.average_gbps
    );
}

#[then(expr = "the traffic window should hold {int} samples")]
fn window_holds(world: &mut DashboardWorld, count: usize) {
    assert_eq!(window(world).len(), count);
}

#[then("every sample should be simulated")]
fn all_simulated(world: &mut DashboardWorld) {
    assert!(window(world)
        .samples()
        .all(|s| s.origin == SampleOrigin::Simulated));
}
