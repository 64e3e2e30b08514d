// # Registrar Trait
//
// Defines the interface for reading and replacing DNS entry sets at a
// registrar.
//
// ## Implementations
//
// - TransIP: `zonesync-registrar-transip` crate
// - Future: Cloudflare, Gandi, OVH, etc.
//
// ## Write contract
//
// `replace_entries` is whole-set replacement: the registrar discards the
// domain's current entry set and publishes exactly what it is given. The
// caller must therefore always submit the complete desired entry list,
// never a delta.

use crate::config::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single DNS entry as published by the registrar
///
/// Identity within a domain is the (name, record_type) pair. The `ttl` and
/// any other metadata belong to the registrar; the reconciler carries them
/// forward untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    /// Record name within the domain (e.g., "@", "www")
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record content (address, hostname, text, ...)
    pub content: String,

    /// Time-to-live in seconds
    pub ttl: u32,
}

impl DnsEntry {
    /// Copy this entry with its content replaced
    ///
    /// Field-level copy-and-override: name, record type and TTL are
    /// preserved from the registrar entry; only the content changes.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            record_type: self.record_type,
            content: content.into(),
            ttl: self.ttl,
        }
    }

    /// Check whether this entry matches a (name, type) identity
    pub fn matches(&self, name: &str, record_type: RecordType) -> bool {
        self.name == name && self.record_type == record_type
    }
}

/// Trait for registrar client implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// Registrar clients are transport only. They must not retry, cache, or
/// decide whether a write is needed; scheduling and diffing are owned by
/// `SyncEngine`. A failed call returns an error and the engine's next cycle
/// is the retry.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// List the domain names known to the registrar account
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: All domain names the account can manage
    /// - `Err(Error)`: On authentication or network failure
    async fn domain_names(&self) -> Result<Vec<String>, crate::Error>;

    /// Fetch the current DNS entry set for a domain
    ///
    /// # Parameters
    ///
    /// - `domain`: The domain name
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsEntry>)`: The domain's published entries
    /// - `Err(Error)`: If the domain is unknown or the request failed
    async fn entries(&self, domain: &str) -> Result<Vec<DnsEntry>, crate::Error>;

    /// Replace a domain's entire DNS entry set
    ///
    /// This is whole-set replacement: `entries` becomes the domain's
    /// complete published state. Omitting an entry deletes it.
    ///
    /// # Parameters
    ///
    /// - `domain`: The domain name
    /// - `entries`: The complete replacement entry set
    async fn replace_entries(&self, domain: &str, entries: &[DnsEntry])
    -> Result<(), crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn registrar_name(&self) -> &'static str;
}

/// Helper trait for constructing registrar clients from configuration
pub trait RegistrarFactory: Send + Sync {
    /// Create a Registrar instance from configuration
    fn create(
        &self,
        config: &crate::config::RegistrarConfig,
    ) -> Result<Box<dyn Registrar>, crate::Error>;
}
