//! DNS entry reconciliation
//!
//! The reconciler computes, for one domain, the minimal replacement entry
//! set needed to bring the registrar's published state in line with the
//! configured intent.
//!
//! ## Algorithm
//!
//! The **registrar snapshot** defines the shape of the result: every
//! published entry is either carried through verbatim (not mentioned in
//! configuration, or already correct) or re-emitted with its content
//! replaced. Configured entries with no published counterpart are skipped;
//! the reconciler converges existing records, it never creates new ones.
//!
//! Because the registrar's write contract is whole-set replacement, a
//! [`Outcome::Replace`] always carries the *full* entry list, changed and
//! unchanged entries together. Omitting an unchanged entry would delete it.
//!
//! ## Purity
//!
//! `reconcile` never performs I/O. Only the caller acts on a `Replace`,
//! which is what makes the pass idempotent: applying the result and
//! reconciling again yields `NoChange`.

use crate::config::DomainConfig;
use crate::traits::DnsEntry;
use tracing::debug;

/// Result of reconciling one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every published entry already matches its desired content
    NoChange,

    /// At least one entry differs; the full replacement set to publish
    Replace(Vec<DnsEntry>),
}

/// Per-entry decision, ephemeral within one pass
struct EntryDecision {
    changed: bool,
    entry: DnsEntry,
}

/// Reconcile one domain's published entries against its configuration
///
/// # Parameters
///
/// - `domain`: The operator's desired state for this domain
/// - `snapshot`: The registrar's currently published entries
/// - `current_address`: The public address resolved for this cycle, used
///   for configured entries without explicit content
pub fn reconcile(domain: &DomainConfig, snapshot: &[DnsEntry], current_address: &str) -> Outcome {
    let decisions: Vec<EntryDecision> = snapshot
        .iter()
        .map(|published| decide(domain, published, current_address))
        .collect();

    if decisions.iter().all(|d| !d.changed) {
        return Outcome::NoChange;
    }

    Outcome::Replace(decisions.into_iter().map(|d| d.entry).collect())
}

/// Decide whether a single published entry needs its content replaced
fn decide(domain: &DomainConfig, published: &DnsEntry, current_address: &str) -> EntryDecision {
    let Some(configured) = domain.entry(&published.name, published.record_type) else {
        // Not managed by configuration: carry through verbatim.
        return EntryDecision {
            changed: false,
            entry: published.clone(),
        };
    };

    // Explicit content wins; absence means "track the public address".
    let desired = configured.content.as_deref().unwrap_or(current_address);

    if desired == published.content {
        return EntryDecision {
            changed: false,
            entry: published.clone(),
        };
    }

    debug!(
        domain = %domain.name,
        entry = %published.name,
        record_type = %published.record_type,
        old = %published.content,
        new = %desired,
        "entry content changed"
    );

    EntryDecision {
        changed: true,
        entry: published.with_content(desired),
    }
}
