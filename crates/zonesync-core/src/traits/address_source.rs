// # Address Source Trait
//
// Defines the interface for looking up the current public (WAN) address.
//
// ## Implementations
//
// - HTTP-based ("what is my IP" services): `zonesync-wan-http` crate
// - Future: router/UPnP queries, STUN
//
// ## Usage
//
// The engine resolves the address at most once per cycle, lazily on first
// need. Implementations should return quickly and leave retrying to the
// next polling cycle.

use async_trait::async_trait;

/// Trait for WAN address source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// They are lookups only: no caching across cycles, no retry logic, no
/// background tasks. The engine owns scheduling.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Get the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The caller's current public address
    /// - `Err(Error)`: If the lookup failed
    async fn current(&self) -> Result<String, crate::Error>;
}

/// Helper trait for constructing address sources from configuration
pub trait AddressSourceFactory: Send + Sync {
    /// Create an AddressSource instance from configuration
    fn create(
        &self,
        config: &crate::config::AddressSourceConfig,
    ) -> Result<Box<dyn AddressSource>, crate::Error>;
}
