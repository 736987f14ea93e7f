//! BDD step definitions for response normalization

use cucumber::{given, then, when};

use olt_dashboard::normalize::normalize;
use olt_dashboard::records::Record;

use crate::world::DashboardWorld;

#[given(expr = "the backend payload {string}")]
fn backend_payload(world: &mut DashboardWorld, payload: String) {
    world.payload = Some(serde_json::from_str(&payload).expect("invalid payload in feature"));
}

#[when("the payload is normalized as active ONUs")]
fn normalize_active_onus(world: &mut DashboardWorld) {
    let payload = world.payload.as_ref().expect("payload not set");
    world.normalized = normalize(payload);
}

#[then(expr = "there should be {int} normalized record(s)")]
fn normalized_count(world: &mut DashboardWorld, expected: usize) {
    assert_eq!(world.normalized.len(), expected);
}

#[then(expr = "normalized record {int} should have key {string}")]
fn normalized_key(world: &mut DashboardWorld, position: usize, expected: String) {
    let record = &world.normalized[position - 1];
    assert_eq!(record.key(), expected);
}

#[then(expr = "normalized record {int} should have field {string} equal to {string}")]
fn normalized_field(world: &mut DashboardWorld, position: usize, field: String, expected: String) {
    let record = &world.normalized[position - 1];
    assert_eq!(
        record.field(&field),
        Some(expected.as_str()),
        "field '{}' of record {}",
        field,
        position
    );
}
