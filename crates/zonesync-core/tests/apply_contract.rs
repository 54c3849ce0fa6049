//! Contract Test: Apply Engine
//!
//! Constraints verified:
//! - A second pass over an unchanged manifest is a no-op
//! - In-place changes update, force-new changes replace
//! - Objects deleted out of band are dropped and recreated
//! - Resources removed from the manifest are deleted (zones last)
//! - One failing resource does not stop the pass
//! - Observed state survives a restart with the file store
//!
//! If this test fails, the engine has stopped converging.

mod common;

use common::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use zonesync_core::config::EngineConfig;
use zonesync_core::state::{FileStateStore, MemoryStateStore};
use zonesync_core::{
    ApplyEngine, ApplyEvent, Manifest, ManifestEntry, ResourceData, ResourceRegistry, StateStore,
};

fn entry(kind: &str, name: &str, data: ResourceData) -> ManifestEntry {
    ManifestEntry {
        kind: kind.to_string(),
        name: name.to_string(),
        attributes: data.attributes().clone(),
    }
}

fn engine(
    api: &FakeZoneApi,
    store: Arc<dyn StateStore>,
) -> (ApplyEngine, mpsc::Receiver<ApplyEvent>) {
    let (driver, _limiter) = driver(api);
    ApplyEngine::new(
        Arc::new(ResourceRegistry::with_builtin()),
        driver,
        store,
        &EngineConfig::default(),
    )
    .expect("engine construction succeeds")
}

fn drain(rx: &mut mpsc::Receiver<ApplyEvent>) -> Vec<ApplyEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn base_manifest() -> Manifest {
    Manifest {
        resources: vec![
            entry("cloudns_dns_zone", "main", master_zone("example.com")),
            entry(
                "cloudns_dns_record",
                "www",
                a_record("example.com", "www", "192.0.2.1"),
            ),
            entry(
                "cloudns_dns_record",
                "mx",
                mx_record("example.com", "mail.example.com", 10),
            ),
        ],
    }
}

#[tokio::test]
async fn second_pass_is_a_no_op() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, mut rx) = engine(&api, store.clone());
    let manifest = base_manifest();

    let first = engine.apply(&manifest).await.unwrap();
    assert_eq!(first.created, 3);
    assert!(first.is_clean());
    assert_eq!(store.list().await.unwrap().len(), 3);

    let writes = api.calls("create_record") + api.calls("create_zone");
    let second = engine.apply(&manifest).await.unwrap();
    assert_eq!(second.unchanged, 3);
    assert_eq!(second.created + second.updated + second.replaced, 0);
    assert_eq!(api.calls("create_record") + api.calls("create_zone"), writes);
    assert_eq!(api.calls("update_record"), 0);

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(ApplyEvent::Started { resources: 3 })));
    assert!(matches!(events.last(), Some(ApplyEvent::Finished { .. })));
}

#[tokio::test]
async fn ttl_change_updates_in_place() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, mut rx) = engine(&api, store);

    let mut manifest = base_manifest();
    engine.apply(&manifest).await.unwrap();
    drain(&mut rx);

    manifest.resources[1]
        .attributes
        .insert("ttl".to_string(), 60i64.into());
    let summary = engine.apply(&manifest).await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 2);
    assert_eq!(api.calls("update_record"), 1);
    assert!(drain(&mut rx).contains(&ApplyEvent::Updated {
        address: "cloudns_dns_record.www".to_string()
    }));
}

#[tokio::test]
async fn zone_change_replaces() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, _rx) = engine(&api, store);

    let mut manifest = Manifest {
        resources: vec![entry("cloudns_dns_zone", "main", master_zone("example.com"))],
    };
    engine.apply(&manifest).await.unwrap();

    manifest.resources[0] = entry(
        "cloudns_dns_zone",
        "main",
        master_zone("example.com")
            .with("type", "slave")
            .with("master", "198.51.100.1"),
    );
    let summary = engine.apply(&manifest).await.unwrap();

    assert_eq!(summary.replaced, 1);
    assert_eq!(api.calls("delete_zone"), 1);
    assert_eq!(api.calls("create_zone"), 2);
}

#[tokio::test]
async fn out_of_band_delete_is_recreated() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, mut rx) = engine(&api, store.clone());
    let manifest = base_manifest();
    engine.apply(&manifest).await.unwrap();
    drain(&mut rx);

    let stored = store.get("cloudns_dns_record.www").await.unwrap().unwrap();
    let old_id = stored.data.id().unwrap().to_string();
    api.drop_record("example.com", &old_id);

    let summary = engine.apply(&manifest).await.unwrap();
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.created, 1);

    let events = drain(&mut rx);
    assert!(events.contains(&ApplyEvent::Dropped {
        address: "cloudns_dns_record.www".to_string()
    }));
    let stored = store.get("cloudns_dns_record.www").await.unwrap().unwrap();
    assert_ne!(stored.data.id(), Some(old_id.as_str()));
}

#[tokio::test]
async fn removed_entries_are_pruned_zone_last() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, mut rx) = engine(&api, store.clone());
    engine.apply(&base_manifest()).await.unwrap();
    drain(&mut rx);

    let summary = engine.apply(&Manifest::default()).await.unwrap();
    assert_eq!(summary.deleted, 3);
    assert!(store.list().await.unwrap().is_empty());
    assert!(!api.has_zone("example.com"));

    let deleted: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            ApplyEvent::Deleted { address } => Some(address),
            _ => None,
        })
        .collect();
    assert_eq!(deleted.last().map(String::as_str), Some("cloudns_dns_zone.main"));
}

#[tokio::test]
async fn prune_can_be_disabled() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (driver, _limiter) = driver(&api);
    let config = EngineConfig {
        prune: false,
        ..EngineConfig::default()
    };
    let (engine, _rx) = ApplyEngine::new(
        Arc::new(ResourceRegistry::with_builtin()),
        driver,
        store.clone(),
        &config,
    )
    .unwrap();

    engine.apply(&base_manifest()).await.unwrap();
    let summary = engine.apply(&Manifest::default()).await.unwrap();

    assert_eq!(summary.deleted, 0);
    assert_eq!(store.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn failures_do_not_stop_the_pass() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (engine, mut rx) = engine(&api, store);

    let mut broken = mx_record("example.com", "mail.example.com", 10);
    broken.remove("priority");
    let manifest = Manifest {
        resources: vec![
            entry("cloudns_dns_record", "broken", broken),
            entry("cloudns_unknown", "x", ResourceData::new()),
            entry(
                "cloudns_dns_record",
                "www",
                a_record("example.com", "www", "192.0.2.1"),
            ),
        ],
    };

    let summary = engine.apply(&manifest).await.unwrap();
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.created, 1);
    assert!(!summary.is_clean());

    let failed: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            ApplyEvent::Failed { address, error } => Some(format!("{}: {}", address, error)),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed[0].contains("Priority is required"));
}

#[tokio::test]
async fn file_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let api = FakeZoneApi::new();
    let manifest = base_manifest();

    {
        let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&path).await.unwrap());
        let (engine, _rx) = engine(&api, store);
        assert_eq!(engine.apply(&manifest).await.unwrap().created, 3);
    }

    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&path).await.unwrap());
    let (engine, _rx) = engine(&api, store);
    let summary = engine.apply(&manifest).await.unwrap();

    assert_eq!(summary.unchanged, 3);
    assert_eq!(api.calls("create_record"), 2);
}

#[tokio::test]
async fn full_event_channel_does_not_block() {
    let api = FakeZoneApi::new();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let (driver, _limiter) = driver(&api);
    let config = EngineConfig {
        event_channel_capacity: 1,
        ..EngineConfig::default()
    };
    let (engine, _rx) = ApplyEngine::new(
        Arc::new(ResourceRegistry::with_builtin()),
        driver,
        store,
        &config,
    )
    .unwrap();

    let summary = engine.apply(&base_manifest()).await.unwrap();
    assert_eq!(summary.created, 3);
}
