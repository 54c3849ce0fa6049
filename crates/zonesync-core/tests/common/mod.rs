//! Test doubles and common utilities for contract tests
//!
//! [`FakeZoneApi`] keeps remote objects in memory and answers with the same
//! error phrasings the real provider uses, so absence classification is
//! exercised end to end. Every call is counted per operation.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonesync_core::error::{Error, Result};
use zonesync_core::model::{
    DynamicUrlBinding, FailoverBinding, FailoverHealth, Nameserver, Record, RecordData,
    RecordType, Zone, ZoneKind,
};
use zonesync_core::traits::{RateLimiter, RemoteZoneApi};
use zonesync_core::{ResourceData, SyncDriver};

const PROVIDER: &str = "fake";

/// Nameservers the fake assigns when a zone is created without any
pub const DEFAULT_NAMESERVERS: [&str; 2] = ["ns1.fake.test", "ns2.fake.test"];

#[derive(Default)]
struct FakeState {
    zones: BTreeMap<String, Zone>,
    records: BTreeMap<String, Vec<Record>>,
    failovers: BTreeMap<(String, String), FailoverBinding>,
    dynamic_urls: BTreeMap<(String, String), DynamicUrlBinding>,
    next_id: u64,
    fail_with: Option<String>,
}

impl FakeState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn has_record(&self, zone: &str, record_id: &str) -> bool {
        self.records
            .get(zone)
            .is_some_and(|records| records.iter().any(|r| r.id.as_deref() == Some(record_id)))
    }
}

fn remote(message: &str) -> Error {
    Error::remote(PROVIDER, message)
}

/// In-memory stand-in for the provider API
#[derive(Clone, Default)]
pub struct FakeZoneApi {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<HashMap<&'static str, usize>>>,
    catalog: Arc<Vec<Nameserver>>,
}

impl FakeZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this nameserver catalog
    pub fn with_catalog(catalog: Vec<Nameserver>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ..Self::default()
        }
    }

    /// Number of calls made to one operation
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    /// Number of calls made to any operation
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Make every following call fail with this provider message
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().fail_with = Some(message.to_string());
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        self.state.lock().unwrap().fail_with = None;
    }

    /// Register a zone out of band
    pub fn seed_zone(&self, domain: &str) {
        let mut state = self.state.lock().unwrap();
        state.zones.insert(
            domain.to_string(),
            Zone {
                domain: domain.to_string(),
                kind: ZoneKind::Master,
                nameservers: None,
            },
        );
    }

    /// Insert a record out of band and return its ID
    pub fn seed_record(&self, mut record: Record) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.allocate_id();
        record.id = Some(id.clone());
        state
            .records
            .entry(record.zone.clone())
            .or_default()
            .push(record);
        id
    }

    /// Simulate an object removed outside of this tool
    pub fn drop_record(&self, zone: &str, record_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(records) = state.records.get_mut(zone) {
            records.retain(|r| r.id.as_deref() != Some(record_id));
        }
    }

    /// Current copy of a record
    pub fn record(&self, zone: &str, record_id: &str) -> Option<Record> {
        let state = self.state.lock().unwrap();
        state
            .records
            .get(zone)?
            .iter()
            .find(|r| r.id.as_deref() == Some(record_id))
            .cloned()
    }

    /// Number of records in a zone
    pub fn record_count(&self, zone: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.records.get(zone).map(Vec::len).unwrap_or(0)
    }

    pub fn has_zone(&self, domain: &str) -> bool {
        self.state.lock().unwrap().zones.contains_key(domain)
    }

    pub fn failover(&self, domain: &str, record_id: &str) -> Option<FailoverBinding> {
        let state = self.state.lock().unwrap();
        state
            .failovers
            .get(&(domain.to_string(), record_id.to_string()))
            .cloned()
    }

    pub fn has_dynamic_url(&self, domain: &str, record_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .dynamic_urls
            .contains_key(&(domain.to_string(), record_id.to_string()))
    }

    fn enter(&self, op: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_with {
            return Err(remote(message));
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl RemoteZoneApi for FakeZoneApi {
    async fn create_record(&self, record: &Record) -> Result<String> {
        let mut state = self.enter("create_record")?;
        let id = state.allocate_id();
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        state
            .records
            .entry(record.zone.clone())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let state = self.enter("list_records")?;
        Ok(state.records.get(zone).cloned().unwrap_or_default())
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let mut state = self.enter("update_record")?;
        let slot = state
            .records
            .get_mut(&record.zone)
            .and_then(|records| records.iter_mut().find(|r| r.id == record.id))
            .ok_or_else(|| remote("Invalid record-id param."))?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        let mut state = self.enter("delete_record")?;
        if !state.has_record(zone, record_id) {
            return Err(remote("The record you are trying to delete was not found."));
        }
        if let Some(records) = state.records.get_mut(zone) {
            records.retain(|r| r.id.as_deref() != Some(record_id));
        }
        Ok(())
    }

    async fn create_zone(&self, zone: &Zone) -> Result<()> {
        let mut state = self.enter("create_zone")?;
        if state.zones.contains_key(&zone.domain) {
            return Err(remote("Zone already exists."));
        }

        let nameservers = zone
            .nameservers
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESERVERS.iter().map(|s| s.to_string()).collect());
        for ns in nameservers {
            let id = state.allocate_id();
            state
                .records
                .entry(zone.domain.clone())
                .or_default()
                .push(Record {
                    id: Some(id),
                    host: String::new(),
                    zone: zone.domain.clone(),
                    ttl: 3600,
                    value: ns,
                    geodns: Default::default(),
                    data: RecordData::Simple {
                        rtype: RecordType::Ns,
                    },
                });
        }

        let mut stored = zone.clone();
        stored.nameservers = None;
        state.zones.insert(zone.domain.clone(), stored);
        Ok(())
    }

    async fn read_zone(&self, domain: &str) -> Result<Zone> {
        let state = self.enter("read_zone")?;
        let mut zone = state
            .zones
            .get(domain)
            .cloned()
            .ok_or_else(|| remote("Missing domain-name"))?;
        // zone info does not carry the master, like the real API
        if let ZoneKind::Slave { master } = &mut zone.kind {
            master.clear();
        }
        Ok(zone)
    }

    async fn read_zone_master(&self, domain: &str) -> Result<Option<String>> {
        let state = self.enter("read_zone_master")?;
        match state.zones.get(domain).map(|zone| &zone.kind) {
            Some(ZoneKind::Slave { master }) => Ok(Some(master.clone())),
            Some(_) => Ok(None),
            None => Err(remote("Missing domain-name")),
        }
    }

    async fn delete_zone(&self, domain: &str) -> Result<()> {
        let mut state = self.enter("delete_zone")?;
        if state.zones.remove(domain).is_none() {
            return Err(remote("Missing domain-name"));
        }
        state.records.remove(domain);
        Ok(())
    }

    async fn list_nameservers(&self) -> Result<Vec<Nameserver>> {
        let _state = self.enter("list_nameservers")?;
        Ok(self.catalog.as_ref().clone())
    }

    async fn create_or_read_dynamic_url(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<DynamicUrlBinding> {
        let mut state = self.enter("create_or_read_dynamic_url")?;
        if !state.has_record(domain, record_id) {
            return Err(remote("Record not found."));
        }
        let key = (domain.to_string(), record_id.to_string());
        let binding = state.dynamic_urls.entry(key).or_insert_with(|| {
            let mut binding = DynamicUrlBinding::new(domain, record_id);
            binding.url = Some(format!(
                "https://ipv4.fake.test/api/dynamicURL/?q={}-{}",
                domain, record_id
            ));
            binding
        });
        Ok(binding.clone())
    }

    async fn delete_dynamic_url(&self, domain: &str, record_id: &str) -> Result<()> {
        let mut state = self.enter("delete_dynamic_url")?;
        let key = (domain.to_string(), record_id.to_string());
        state
            .dynamic_urls
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| remote("Dynamic URL not found."))
    }

    async fn create_failover(&self, binding: &FailoverBinding) -> Result<()> {
        let mut state = self.enter("create_failover")?;
        let key = (binding.domain.clone(), binding.record_id.clone());
        if state.failovers.contains_key(&key) {
            return Err(remote("Failover is already activated for this record."));
        }
        state.failovers.insert(key, binding.clone());
        Ok(())
    }

    async fn read_failover(&self, domain: &str, record_id: &str) -> Result<FailoverBinding> {
        let state = self.enter("read_failover")?;
        let mut binding = state
            .failovers
            .get(&(domain.to_string(), record_id.to_string()))
            .cloned()
            .ok_or_else(|| remote("Failover not found."))?;
        binding.health = Some(FailoverHealth {
            state: "1".to_string(),
            status: "1".to_string(),
        });
        Ok(binding)
    }

    async fn update_failover(&self, binding: &FailoverBinding) -> Result<()> {
        let mut state = self.enter("update_failover")?;
        let key = (binding.domain.clone(), binding.record_id.clone());
        match state.failovers.get_mut(&key) {
            Some(slot) => {
                *slot = binding.clone();
                Ok(())
            }
            None => Err(remote("Failover not found.")),
        }
    }

    async fn delete_failover(&self, domain: &str, record_id: &str) -> Result<()> {
        let mut state = self.enter("delete_failover")?;
        state
            .failovers
            .remove(&(domain.to_string(), record_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| remote("Failover not found."))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Rate limiter that never waits and counts tokens taken
#[derive(Default)]
pub struct CountingRateLimiter {
    taken: AtomicUsize,
}

impl CountingRateLimiter {
    pub fn taken(&self) -> usize {
        self.taken.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RateLimiter for CountingRateLimiter {
    async fn take(&self) {
        self.taken.fetch_add(1, Ordering::SeqCst);
    }
}

/// Driver over a fake API with a counting limiter
pub fn driver(api: &FakeZoneApi) -> (SyncDriver, Arc<CountingRateLimiter>) {
    let limiter = Arc::new(CountingRateLimiter::default());
    let driver = SyncDriver::new(Arc::new(api.clone()), limiter.clone());
    (driver, limiter)
}

pub fn nameserver(name: &str, kind: &str) -> Nameserver {
    Nameserver {
        name: name.to_string(),
        kind: kind.to_string(),
        ipv4: None,
        ipv6: None,
        location: None,
    }
}

pub fn a_record(zone: &str, host: &str, value: &str) -> ResourceData {
    ResourceData::new()
        .with("zone", zone)
        .with("name", host)
        .with("type", "A")
        .with("value", value)
        .with("ttl", 3600i64)
}

pub fn mx_record(zone: &str, value: &str, priority: i64) -> ResourceData {
    ResourceData::new()
        .with("zone", zone)
        .with("name", "")
        .with("type", "MX")
        .with("value", value)
        .with("ttl", 3600i64)
        .with("priority", priority)
}

pub fn master_zone(domain: &str) -> ResourceData {
    ResourceData::new()
        .with("domain", domain)
        .with("type", "master")
}

pub fn ping_failover(domain: &str, record_id: &str) -> ResourceData {
    ResourceData::new()
        .with("domain", domain)
        .with("recordid", record_id)
        .with("mainip", "192.0.2.10")
        .with("backupip1", "192.0.2.20")
        .with("checktype", 1i64)
}

pub fn dynamic_url(domain: &str, record_id: &str) -> ResourceData {
    ResourceData::new()
        .with("domain", domain)
        .with("recordid", record_id)
}

/// A record as the provider would hold it
pub fn remote_a_record(zone: &str, host: &str, value: &str) -> Record {
    Record {
        id: None,
        host: host.to_string(),
        zone: zone.to_string(),
        ttl: 3600,
        value: value.to_string(),
        geodns: Default::default(),
        data: RecordData::Simple {
            rtype: RecordType::A,
        },
    }
}
