//! Architectural Contract Test: Cycle Reconciliation & Idempotency
//!
//! Verifies the engine's per-cycle write behavior:
//! - A changed tracking entry produces exactly one whole-set write
//! - Unmanaged entries survive the write verbatim
//! - A converged domain produces no write at all
//! - Applying a cycle's write makes the next cycle a no-op
//!
//! If this test fails, the reconcile → write path is broken.

mod common;

use common::*;
use std::collections::HashMap;
use std::sync::Arc;
use zonesync_core::SyncEngine;
use zonesync_core::config::{DomainConfig, EntryConfig, RecordType};
use zonesync_core::engine::DomainOutcome;

fn engine_with(
    registrar: Arc<MockRegistrar>,
    source: Arc<MockAddressSource>,
    domains: Vec<DomainConfig>,
) -> SyncEngine {
    let (engine, _event_rx) = SyncEngine::new(registrar, source, minimal_config(domains))
        .expect("engine construction succeeds");
    engine
}

#[tokio::test]
async fn changed_tracking_entry_triggers_one_whole_set_write() {
    let registrar = Arc::new(MockRegistrar::new(HashMap::from([(
        "example.com".to_string(),
        vec![
            entry("@", RecordType::A, "198.51.100.2"),
            entry("mail", RecordType::Mx, "10 mail.example.com."),
        ],
    )])));
    let source = Arc::new(MockAddressSource::new("198.51.100.50"));

    let domains = vec![
        DomainConfig::new("example.com").with_entry(EntryConfig::tracking("@", RecordType::A)),
    ];
    let engine = engine_with(registrar.clone(), source.clone(), domains);

    let summary = engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].1, DomainOutcome::Updated { changed: 1 });
    assert_eq!(registrar.replace_call_count(), 1);

    // Whole-set write: the unmanaged MX entry is part of the submitted set,
    // byte for byte.
    let replaced = registrar.replaced();
    assert_eq!(replaced.len(), 1);
    let (domain, entries) = &replaced[0];
    assert_eq!(domain, "example.com");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], entry("@", RecordType::A, "198.51.100.50"));
    assert_eq!(entries[1], entry("mail", RecordType::Mx, "10 mail.example.com."));
}

#[tokio::test]
async fn converged_domain_issues_no_write() {
    let registrar = Arc::new(MockRegistrar::new(HashMap::from([(
        "example.com".to_string(),
        vec![entry("@", RecordType::A, "198.51.100.50")],
    )])));
    let source = Arc::new(MockAddressSource::new("198.51.100.50"));

    let domains = vec![
        DomainConfig::new("example.com").with_entry(EntryConfig::tracking("@", RecordType::A)),
    ];
    let engine = engine_with(registrar.clone(), source, domains);

    let summary = engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(summary.outcomes[0].1, DomainOutcome::Unchanged);
    assert_eq!(registrar.replace_call_count(), 0);
}

#[tokio::test]
async fn cycle_after_applied_write_is_a_noop() {
    let registrar = Arc::new(MockRegistrar::new(HashMap::from([(
        "example.com".to_string(),
        vec![
            entry("@", RecordType::A, "198.51.100.2"),
            entry("www", RecordType::Cname, "example.com."),
        ],
    )])));
    let source = Arc::new(MockAddressSource::new("198.51.100.50"));

    let domains = vec![
        DomainConfig::new("example.com").with_entry(EntryConfig::tracking("@", RecordType::A)),
    ];
    let engine = engine_with(registrar.clone(), source, domains);

    let first = engine.run_cycle().await.expect("first cycle succeeds");
    assert_eq!(first.updated(), 1);
    assert_eq!(registrar.replace_call_count(), 1);

    // The mock applied the write, so the second cycle observes converged
    // state and must not write again.
    let second = engine.run_cycle().await.expect("second cycle succeeds");
    assert_eq!(second.outcomes[0].1, DomainOutcome::Unchanged);
    assert_eq!(registrar.replace_call_count(), 1);
}

#[tokio::test]
async fn explicit_content_is_written_regardless_of_address() {
    let registrar = Arc::new(MockRegistrar::new(HashMap::from([(
        "example.com".to_string(),
        vec![entry("ftp", RecordType::A, "198.51.100.2")],
    )])));
    let source = Arc::new(MockAddressSource::new("198.51.100.50"));

    let domains = vec![DomainConfig::new("example.com").with_entry(EntryConfig::fixed(
        "ftp",
        RecordType::A,
        "203.0.113.9",
    ))];
    let engine = engine_with(registrar.clone(), source.clone(), domains);

    engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        registrar.current_entries("example.com"),
        vec![entry("ftp", RecordType::A, "203.0.113.9")]
    );
    // A fixed-content-only domain never needs the WAN address.
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn configured_domain_unknown_to_registrar_is_skipped() {
    let registrar = Arc::new(MockRegistrar::new(HashMap::from([(
        "example.com".to_string(),
        vec![entry("@", RecordType::A, "198.51.100.50")],
    )])));
    let source = Arc::new(MockAddressSource::new("198.51.100.50"));

    let domains = vec![
        DomainConfig::new("example.com").with_entry(EntryConfig::tracking("@", RecordType::A)),
        DomainConfig::new("ghost.example").with_entry(EntryConfig::tracking("@", RecordType::A)),
    ];
    let engine = engine_with(registrar.clone(), source, domains);

    let summary = engine.run_cycle().await.expect("cycle succeeds");

    // Only the intersected domain is fetched; the unknown one appears in
    // no outcome at all.
    assert_eq!(registrar.fetch_call_count(), 1);
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].0, "example.com");
}
