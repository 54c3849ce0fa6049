//! Contract Test: Absence Is Not Failure
//!
//! Constraints verified:
//! - A remote "not found" on read drops the object from state, no error
//! - Deleting something already gone succeeds
//! - Every other remote failure surfaces as a fatal diagnostic
//! - "Not found" text on create or update is a failure, not absence
//! - Provider error text reaches the diagnostic unchanged
//!
//! If this test fails, "not found" detection has been scattered or lost.

mod common;

use common::*;
use zonesync_core::error::{Classification, Error, classify};
use zonesync_core::reconcile::{
    FailoverResource, RecordResource, Resource, Severity, ZoneResource,
};

#[test]
fn provider_phrasings_classify_as_absence() {
    for message in [
        "Record not found.",
        "Missing domain-name",
        "no zones returned",
        "The record you are trying to delete was not found.",
    ] {
        assert_eq!(
            classify(&Error::remote("cloudns", message)),
            Classification::Absence,
            "{:?} should be absence",
            message
        );
    }

    assert_eq!(
        classify(&Error::remote("cloudns", "Invalid authentication, incorrect auth-id or auth-password.")),
        Classification::Fatal
    );
    assert_eq!(classify(&Error::validation("not found")), Classification::Fatal);
}

#[tokio::test]
async fn read_of_vanished_record_clears_identity() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = a_record("example.com", "www", "192.0.2.1");
    RecordResource.create(&driver, &mut data).await.unwrap();
    let id = data.id().unwrap().to_string();

    api.drop_record("example.com", &id);
    RecordResource.read(&driver, &mut data).await.unwrap();

    assert!(!data.is_tracked());
}

#[tokio::test]
async fn read_of_vanished_zone_clears_identity() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = master_zone("gone.example").with_id("gone.example");
    ZoneResource.read(&driver, &mut data).await.unwrap();

    assert!(!data.is_tracked());
    assert_eq!(api.calls("read_zone"), 1);
    // no NS lookup once the zone is known to be absent
    assert_eq!(api.calls("list_records"), 0);
}

#[tokio::test]
async fn read_of_vanished_failover_clears_identity() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = ping_failover("example.com", "42").with_id("42");
    FailoverResource.read(&driver, &mut data).await.unwrap();

    assert!(!data.is_tracked());
}

#[tokio::test]
async fn delete_of_missing_record_succeeds() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = a_record("example.com", "www", "192.0.2.1").with_id("999");
    RecordResource.delete(&driver, &mut data).await.unwrap();

    assert_eq!(api.calls("delete_record"), 1);
    assert!(!data.is_tracked());
}

#[tokio::test]
async fn delete_of_untracked_object_makes_no_call() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = master_zone("example.com");
    ZoneResource.delete(&driver, &mut data).await.unwrap();

    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn other_remote_failures_are_fatal() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = a_record("example.com", "www", "192.0.2.1");
    RecordResource.create(&driver, &mut data).await.unwrap();

    let message = "Invalid authentication, incorrect auth-id or auth-password.";
    api.fail_with(message);
    let diag = RecordResource.read(&driver, &mut data).await.unwrap_err();

    assert!(diag.is_fatal());
    assert!(diag.summary.contains(message));
    // state is left alone on a real failure
    assert!(data.is_tracked());
}

#[tokio::test]
async fn update_of_missing_record_is_fatal() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = a_record("example.com", "www", "192.0.2.1").with_id("404");
    let diag = RecordResource.update(&driver, &mut data).await.unwrap_err();

    assert!(diag.is_fatal());
    assert!(diag.summary.contains("Invalid record-id"));
}

#[tokio::test]
async fn not_found_on_create_is_fatal() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    api.fail_with("Missing domain-name");
    let mut record = a_record("example.com", "www", "192.0.2.1");
    let diag = RecordResource.create(&driver, &mut record).await.unwrap_err();
    assert!(diag.is_fatal(), "{}", diag);
    assert!(diag.summary.contains("Missing domain-name"));
    assert!(!record.is_tracked());

    let mut zone = master_zone("example.com");
    let diag = ZoneResource.create(&driver, &mut zone).await.unwrap_err();
    assert_eq!(diag.severity, Severity::Error);

    let mut failover = ping_failover("example.com", "42");
    let diag = FailoverResource.create(&driver, &mut failover).await.unwrap_err();
    assert_eq!(diag.severity, Severity::Error);
}

#[tokio::test]
async fn not_found_on_update_is_fatal() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);

    let mut data = a_record("example.com", "www", "192.0.2.1");
    RecordResource.create(&driver, &mut data).await.unwrap();

    api.fail_with("Record not found.");
    data.set("ttl", 60i64);
    let diag = RecordResource.update(&driver, &mut data).await.unwrap_err();

    assert_eq!(diag.severity, Severity::Error);
    assert!(diag.summary.contains("Record not found."));
    assert!(data.is_tracked());
}

#[tokio::test]
async fn not_found_on_failover_update_is_fatal() {
    let api = FakeZoneApi::new();
    let (driver, _limiter) = driver(&api);
    let id = api.seed_record(remote_a_record("example.com", "www", "192.0.2.1"));

    let mut data = ping_failover("example.com", &id);
    FailoverResource.create(&driver, &mut data).await.unwrap();

    api.fail_with("Failover not found.");
    let diag = FailoverResource.update(&driver, &mut data).await.unwrap_err();
    assert_eq!(diag.severity, Severity::Error);
}
