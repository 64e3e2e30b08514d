// # HTTP WAN Address Source
//
// This crate provides an HTTP-based WAN address source for zonesync.
//
// ## Purpose
//
// Asks an external "what is my IP" service (e.g., api.ipify.org,
// icanhazip.com) for the caller's current public address. The engine
// consults this source at most once per cycle, so the service sees one
// request per polling period at most.
//
// ## Behavior
//
// The response body is trimmed and must parse as an IP address; anything
// else (HTML error pages, captive portal responses) is rejected rather
// than written into DNS.

use zonesync_core::ProviderRegistry;
use zonesync_core::config::AddressSourceConfig;
use zonesync_core::traits::{AddressSource, AddressSourceFactory};
use zonesync_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for address lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Well-known plain-text address services (for documentation/failover)
#[allow(dead_code)]
const DEFAULT_ADDRESS_SERVICES: &[&str] = &[
    "https://api.ipify.org",  // returns plain text IP
    "https://ifconfig.me/ip", // no rate limit documented
    "https://icanhazip.com",  // no rate limit documented
];

/// HTTP-based WAN address source
pub struct HttpAddressSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a new HTTP address source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the caller's address as plain text
    ///   (e.g., "https://api.ipify.org")
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl AddressSource for HttpAddressSource {
    async fn current(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::address_source(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::address_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::address_source(format!("Failed to read response: {}", e)))?;

        let address = body.trim();

        // Services return the address as plain text; anything that does
        // not parse as an IP must not end up in a DNS record.
        address
            .parse::<IpAddr>()
            .map_err(|_| Error::address_source(format!("Invalid address: {}", address)))?;

        tracing::debug!("WAN address resolved: {}", address);
        Ok(address.to_string())
    }
}

/// Factory for creating HTTP address sources
pub struct HttpFactory;

impl AddressSourceFactory for HttpFactory {
    fn create(&self, config: &AddressSourceConfig) -> Result<Box<dyn AddressSource>> {
        match config {
            AddressSourceConfig::Http { url } => {
                Ok(Box::new(HttpAddressSource::new(url.clone())))
            }
            _ => Err(Error::config("Invalid config for HTTP address source")),
        }
    }
}

/// Register the HTTP address source with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_address_source("http", Box::new(HttpFactory));
}
