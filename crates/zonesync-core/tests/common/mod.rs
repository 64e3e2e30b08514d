//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides counting mocks used to verify the engine's
//! cycle-level behavior without any real network traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use zonesync_core::config::{
    AddressSourceConfig, DomainConfig, EngineConfig, RegistrarConfig, ZonesyncConfig,
};
use zonesync_core::error::Result;
use zonesync_core::traits::{AddressSource, DnsEntry, Registrar};
use zonesync_core::Error;

/// A mock Registrar backed by an in-memory entry map
///
/// Successful `replace_entries` calls are applied to the stored map, so a
/// second cycle observes the state the first cycle wrote. Failures can be
/// injected per operation.
pub struct MockRegistrar {
    /// Entry sets per domain, mutated by successful writes
    entries: Mutex<HashMap<String, Vec<DnsEntry>>>,
    /// When set, domain_names() fails with this authentication error
    list_error: Option<String>,
    /// Domains whose entries() call fails
    fetch_failures: HashSet<String>,
    /// Domains whose replace_entries() call fails
    write_failures: HashSet<String>,
    /// When set, domain_names() sleeps this long before answering
    list_delay: Option<Duration>,
    /// Call counter for domain_names()
    list_call_count: AtomicUsize,
    /// Instant of each domain_names() call, in call order
    list_call_times: Mutex<Vec<Instant>>,
    /// Call counter for entries()
    fetch_call_count: AtomicUsize,
    /// Call counter for replace_entries()
    replace_call_count: AtomicUsize,
    /// Recorded (domain, entry set) pairs from successful writes
    replaced: Mutex<Vec<(String, Vec<DnsEntry>)>>,
}

impl MockRegistrar {
    pub fn new(entries: HashMap<String, Vec<DnsEntry>>) -> Self {
        Self {
            entries: Mutex::new(entries),
            list_error: None,
            fetch_failures: HashSet::new(),
            write_failures: HashSet::new(),
            list_delay: None,
            list_call_count: AtomicUsize::new(0),
            list_call_times: Mutex::new(Vec::new()),
            fetch_call_count: AtomicUsize::new(0),
            replace_call_count: AtomicUsize::new(0),
            replaced: Mutex::new(Vec::new()),
        }
    }

    /// Make domain_names() fail with an authentication error
    pub fn with_list_error(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Make entries() fail for one domain
    pub fn with_fetch_failure(mut self, domain: impl Into<String>) -> Self {
        self.fetch_failures.insert(domain.into());
        self
    }

    /// Make replace_entries() fail for one domain
    pub fn with_write_failure(mut self, domain: impl Into<String>) -> Self {
        self.write_failures.insert(domain.into());
        self
    }

    /// Make domain_names() take this long, to simulate a slow registrar
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the instant of each domain_names() call, in call order
    pub fn list_call_times(&self) -> Vec<Instant> {
        self.list_call_times.lock().unwrap().clone()
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    pub fn replace_call_count(&self) -> usize {
        self.replace_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded successful writes, in call order
    pub fn replaced(&self) -> Vec<(String, Vec<DnsEntry>)> {
        self.replaced.lock().unwrap().clone()
    }

    /// Get the current entry set for a domain
    pub fn current_entries(&self, domain: &str) -> Vec<DnsEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Registrar for MockRegistrar {
    async fn domain_names(&self) -> Result<Vec<String>> {
        self.list_call_times.lock().unwrap().push(Instant::now());
        self.list_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.list_error {
            return Err(Error::auth(message.clone()));
        }

        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    async fn entries(&self, domain: &str) -> Result<Vec<DnsEntry>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        if self.fetch_failures.contains(domain) {
            return Err(Error::registrar("mock", format!("fetch failed for {}", domain)));
        }

        self.entries
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .ok_or_else(|| Error::not_found(domain.to_string()))
    }

    async fn replace_entries(&self, domain: &str, entries: &[DnsEntry]) -> Result<()> {
        self.replace_call_count.fetch_add(1, Ordering::SeqCst);

        if self.write_failures.contains(domain) {
            return Err(Error::registrar("mock", format!("write failed for {}", domain)));
        }

        self.entries
            .lock()
            .unwrap()
            .insert(domain.to_string(), entries.to_vec());
        self.replaced
            .lock()
            .unwrap()
            .push((domain.to_string(), entries.to_vec()));
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "mock"
    }
}

/// A mock AddressSource returning a fixed address, counting lookups
pub struct MockAddressSource {
    address: String,
    error: Option<String>,
    call_count: AtomicUsize,
}

impl MockAddressSource {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            error: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Make current() fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            address: String::new(),
            error: Some(message.into()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for MockAddressSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.error {
            return Err(Error::address_source(message.clone()));
        }

        Ok(self.address.clone())
    }
}

/// Helper to build a published entry
pub fn entry(name: &str, record_type: zonesync_core::config::RecordType, content: &str) -> DnsEntry {
    DnsEntry {
        name: name.to_string(),
        record_type,
        content: content.to_string(),
        ttl: 300,
    }
}

/// Helper to create a minimal ZonesyncConfig for testing
pub fn minimal_config(domains: Vec<DomainConfig>) -> ZonesyncConfig {
    ZonesyncConfig {
        address_source: AddressSourceConfig::Http {
            url: "http://wan.test.invalid".to_string(),
        },
        registrar: RegistrarConfig::Transip {
            api_token: "test-token".to_string(),
        },
        domains,
        engine: EngineConfig {
            poll_interval_secs: 300,
            event_channel_capacity: 100,
        },
    }
}
