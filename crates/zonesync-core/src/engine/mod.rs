//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Running a fixed-period polling loop of reconciliation cycles
//! - Intersecting configured domains with registrar-known domains
//! - Fanning out per-domain fetch → reconcile → write work
//! - Scheduling the next cycle relative to the previous cycle's completion
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ AddressSource │── current address (once per cycle, lazily) ──┐
//! └───────────────┘                                              │
//!                                                                ▼
//!                                                       ┌──────────────┐
//!                                                       │  SyncEngine  │
//!                                                       └──────────────┘
//!                                                                │
//!                              ┌─────────────────────────────────┼────────────────┐
//!                              │                                 │                │
//!                              ▼                                 ▼                ▼
//!                      ┌──────────────┐                 ┌──────────────┐  ┌─────────────┐
//!                      │  Registrar   │                 │  Reconciler  │  │   Events    │
//!                      │ (fetch/write)│                 │    (diff)    │  │  (notify)   │
//!                      └──────────────┘                 └──────────────┘  └─────────────┘
//! ```
//!
//! ## Cycle flow
//!
//! 1. List registrar-known domains (failure here is fatal)
//! 2. Intersect with configured domains; skip one-sided domains silently
//! 3. One task per domain: fetch snapshot, reconcile, write on `Replace`
//! 4. Join all tasks, capturing per-domain errors
//! 5. Sleep `period - elapsed` (clamped to zero), then repeat

use crate::config::{DomainConfig, ZonesyncConfig};
use crate::error::Result;
use crate::reconcile::{self, Outcome};
use crate::traits::{AddressSource, Registrar};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, mpsc};
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        domains_count: usize,
    },

    /// A domain's entry set was rewritten at the registrar
    DomainUpdated {
        domain: String,
        changed_entries: usize,
    },

    /// A domain's published entries already matched its configuration
    DomainUnchanged {
        domain: String,
    },

    /// A domain's fetch or write failed; it will be retried next cycle
    DomainFailed {
        domain: String,
        error: String,
    },

    /// One polling cycle finished
    CycleCompleted {
        updated: usize,
        unchanged: usize,
        failed: usize,
        next_check: DateTime<Utc>,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Per-domain result of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Published entries already matched the configuration
    Unchanged,
    /// The entry set was replaced; `changed` entries differed
    Updated { changed: usize },
    /// Fetch or write failed; absorbed, not fatal
    Failed { error: String },
}

/// Summary of one polling cycle
#[derive(Debug, Clone)]
pub struct CycleSummary {
    /// Per-domain outcomes, in configuration order
    pub outcomes: Vec<(String, DomainOutcome)>,
    /// Wall-clock time the cycle took
    pub elapsed: Duration,
    /// When the next cycle is scheduled to start
    pub next_check: DateTime<Utc>,
}

impl CycleSummary {
    fn count(&self, matches: impl Fn(&DomainOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| matches(o)).count()
    }

    /// Number of domains whose entry set was rewritten
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Updated { .. }))
    }

    /// Number of domains that needed no write
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Unchanged))
    }

    /// Number of domains that failed this cycle
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Failed { .. }))
    }
}

/// Core sync engine
///
/// The engine orchestrates the polling → reconcile → write flow. It runs
/// continuously, one cycle per polling period, until shutdown.
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Start with [`SyncEngine::run()`]
/// 3. Engine runs until shutdown signal received or a fatal error occurs
///
/// ## Failure semantics
///
/// Inability to list the registrar's domains (bad credentials, registrar
/// unreachable) is fatal: `run()` returns the error and the process is
/// expected to exit. Per-domain fetch/write failures are absorbed as
/// [`DomainOutcome::Failed`]; the diff will still show the mismatch next
/// cycle, so the poll itself is the retry.
///
/// ## Concurrency
///
/// Per-domain work within a cycle runs as independent tokio tasks joined
/// before the next cycle is scheduled, so cycles never overlap and one
/// domain's failure cannot cancel its siblings. Tasks share only the
/// per-cycle address cell, written once and read-only afterwards.
pub struct SyncEngine {
    /// Registrar client for listing, fetching and replacing entries
    registrar: Arc<dyn Registrar>,

    /// WAN address source, consulted at most once per cycle
    address_source: Arc<dyn AddressSource>,

    /// Desired state, immutable for the process lifetime
    domains: Vec<Arc<DomainConfig>>,

    /// Polling period between cycle starts
    period: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `registrar`: Registrar client implementation
    /// - `address_source`: WAN address source implementation
    /// - `config`: zonesync configuration (validated here)
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        registrar: Arc<dyn Registrar>,
        address_source: Arc<dyn AddressSource>,
        config: ZonesyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            registrar,
            address_source,
            domains: config.domains.into_iter().map(Arc::new).collect(),
            period: Duration::from_secs(config.engine.poll_interval_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine
    ///
    /// Runs polling cycles continuously until a shutdown signal is
    /// received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error (domain listing failed)
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            domains_count: self.domains.len(),
        });

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal between cycles
            loop {
                let summary = self.run_cycle().await?;
                let delay = self.period.saturating_sub(summary.elapsed);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}

                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT/SIGTERM between cycles
            loop {
                let summary = self.run_cycle().await?;
                let delay = self.period.saturating_sub(summary.elapsed);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}

                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one polling cycle
    ///
    /// Fatal only if the registrar's domain listing fails; every
    /// per-domain error is captured in the summary instead.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        info!("Checking for changes");
        let started = Instant::now();

        let known = self.registrar.domain_names().await.map_err(|e| {
            error!(
                "Unable to list domains at {}; verify account and credentials: {}",
                self.registrar.registrar_name(),
                e
            );
            e
        })?;

        // Address for this cycle, resolved at most once, on first need.
        let cycle_address: Arc<OnceCell<String>> = Arc::new(OnceCell::new());

        let mut handles = Vec::new();
        for domain in &self.domains {
            if !known.iter().any(|name| name == &domain.name) {
                debug!(domain = %domain.name, "domain not known to registrar, skipping");
                continue;
            }

            let registrar = Arc::clone(&self.registrar);
            let address_source = Arc::clone(&self.address_source);
            let cycle_address = Arc::clone(&cycle_address);
            let domain = Arc::clone(domain);

            handles.push(tokio::spawn(async move {
                let outcome =
                    sync_domain(&*registrar, &*address_source, &cycle_address, &domain).await;
                (domain.name.clone(), outcome)
            }));
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((name, outcome)) => {
                    match &outcome {
                        DomainOutcome::Unchanged => {
                            self.emit_event(EngineEvent::DomainUnchanged {
                                domain: name.clone(),
                            });
                        }
                        DomainOutcome::Updated { changed } => {
                            self.emit_event(EngineEvent::DomainUpdated {
                                domain: name.clone(),
                                changed_entries: *changed,
                            });
                        }
                        DomainOutcome::Failed { error } => {
                            self.emit_event(EngineEvent::DomainFailed {
                                domain: name.clone(),
                                error: error.clone(),
                            });
                        }
                    }
                    outcomes.push((name, outcome));
                }
                Err(e) => {
                    // A panicked task loses its domain attribution; the
                    // remaining domains are unaffected.
                    error!("Domain task panicked: {}", e);
                }
            }
        }

        let elapsed = started.elapsed();
        let delay = self.period.saturating_sub(elapsed);
        let next_check = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());

        debug!("Processing time {}ms", elapsed.as_millis());
        info!("Next check will be around {}", next_check.to_rfc3339());

        let summary = CycleSummary {
            outcomes,
            elapsed,
            next_check,
        };

        self.emit_event(EngineEvent::CycleCompleted {
            updated: summary.updated(),
            unchanged: summary.unchanged(),
            failed: summary.failed(),
            next_check,
        });

        Ok(summary)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging a warning if the channel is full. Dropping
        // events bounds memory when the consumer falls behind.
        if self.event_tx.try_send(event).is_err() {
            warn!(
                "Event channel full, dropping event. Consider increasing event_channel_capacity."
            );
        }
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: Contract tests require controlled shutdown.
    /// Production daemon code should use `run()` instead, which manages
    /// shutdown via OS signals.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}

/// Fetch, reconcile and (if needed) rewrite one domain
///
/// Every failure is absorbed into [`DomainOutcome::Failed`]; the next cycle
/// retries implicitly because the diff still shows the mismatch.
async fn sync_domain(
    registrar: &dyn Registrar,
    address_source: &dyn AddressSource,
    cycle_address: &OnceCell<String>,
    domain: &DomainConfig,
) -> DomainOutcome {
    let snapshot = match registrar.entries(&domain.name).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(domain = %domain.name, "unable to fetch entries: {}", e);
            return DomainOutcome::Failed {
                error: e.to_string(),
            };
        }
    };

    // The address is only needed when some entry tracks it. All domains in
    // the same cycle observe the same value: the first task to get here
    // resolves it, the rest reuse it.
    let current_address = if domain.entries.iter().any(|e| e.content.is_none()) {
        match cycle_address
            .get_or_try_init(|| async { address_source.current().await })
            .await
        {
            Ok(address) => {
                info!(domain = %domain.name, "Current address: {}", address);
                address.clone()
            }
            Err(e) => {
                warn!(domain = %domain.name, "unable to resolve current address: {}", e);
                return DomainOutcome::Failed {
                    error: e.to_string(),
                };
            }
        }
    } else {
        String::new()
    };

    match reconcile::reconcile(domain, &snapshot, &current_address) {
        Outcome::NoChange => {
            info!(domain = %domain.name, "Nothing changed");
            DomainOutcome::Unchanged
        }
        Outcome::Replace(entries) => {
            let changed = entries
                .iter()
                .zip(snapshot.iter())
                .filter(|(new, old)| new != old)
                .count();

            match registrar.replace_entries(&domain.name, &entries).await {
                Ok(()) => {
                    info!(
                        domain = %domain.name,
                        changed,
                        total = entries.len(),
                        "entry set replaced"
                    );
                    DomainOutcome::Updated { changed }
                }
                Err(e) => {
                    error!(domain = %domain.name, "Unable to set dns entries: {}", e);
                    DomainOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            }
        }
    }
}
