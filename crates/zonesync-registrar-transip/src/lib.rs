// # TransIP Registrar Client
//
// This crate provides a TransIP registrar client for zonesync, against the
// TransIP REST API v6.
//
// ## API mapping
//
// - List domains:    GET `/domains`
// - Fetch entries:   GET `/domains/{domainName}/dns`
// - Replace entries: PUT `/domains/{domainName}/dns` with `{"dnsEntries": [...]}`
//
// The PUT call is whole-set replacement: TransIP publishes exactly the
// submitted list, which matches the `Registrar::replace_entries` contract.
// The wire field `expire` carries what the core calls `ttl`.
//
// ## Constraints
//
// - One API call per trait method; no retry, backoff or caching here.
//   Failures propagate to the engine, whose next polling cycle is the retry.
// - The API token NEVER appears in logs; the Debug impl redacts it.
// - Dry-run mode performs GET requests but logs intended PUTs instead of
//   sending them.
//
// ## API Reference
//
// - TransIP API v6: https://api.transip.nl/rest/docs.html

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zonesync_core::config::{RecordType, RegistrarConfig};
use zonesync_core::traits::{DnsEntry, Registrar, RegistrarFactory};
use zonesync_core::{Error, Result};

use std::time::Duration;

/// TransIP API base URL
const TRANSIP_API_BASE: &str = "https://api.transip.nl/v6";

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// TransIP registrar client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client performs all GET requests but logs
/// the intended PUT payload instead of sending it, so a configuration can
/// be exercised without touching live DNS.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct TransipRegistrar {
    /// TransIP API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

impl std::fmt::Debug for TransipRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransipRegistrar")
            .field("api_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Domain object as returned by `GET /domains`
#[derive(Debug, Deserialize)]
struct WireDomain {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DomainsResponse {
    domains: Vec<WireDomain>,
}

/// DNS entry in TransIP wire shape
///
/// TransIP calls the TTL field `expire`; the core calls it `ttl`.
#[derive(Debug, Serialize, Deserialize)]
struct WireDnsEntry {
    name: String,
    expire: u32,
    #[serde(rename = "type")]
    record_type: RecordType,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DnsEntriesResponse {
    #[serde(rename = "dnsEntries")]
    dns_entries: Vec<WireDnsEntry>,
}

impl From<WireDnsEntry> for DnsEntry {
    fn from(wire: WireDnsEntry) -> Self {
        DnsEntry {
            name: wire.name,
            record_type: wire.record_type,
            content: wire.content,
            ttl: wire.expire,
        }
    }
}

impl From<&DnsEntry> for WireDnsEntry {
    fn from(entry: &DnsEntry) -> Self {
        WireDnsEntry {
            name: entry.name.clone(),
            expire: entry.ttl,
            record_type: entry.record_type,
            content: entry.content.clone(),
        }
    }
}

impl TransipRegistrar {
    /// Create a new TransIP registrar client
    ///
    /// # Parameters
    ///
    /// - `api_token`: TransIP API token with DNS management permissions
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    ///
    /// # Security
    ///
    /// The API token will NEVER be logged or displayed in error messages.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();

        if api_token.is_empty() {
            return Err(Error::config("TransIP API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::registrar("transip", format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            client,
            dry_run,
        })
    }

    /// Create a client in live mode
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, false)
    }

    /// Create a client in dry-run mode
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, true)
    }

    /// Map a failed API response to the core error taxonomy
    async fn error_from_response(context: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API token or insufficient permissions ({}). Status: {}",
                context, status
            )),
            404 => Error::not_found(format!("{}: {}", context, error_text)),
            406 | 409 | 422 => Error::validation(format!(
                "{}: {} - {}",
                context, status, error_text
            )),
            429 => Error::rate_limited(format!(
                "{}: please retry later. Status: {}",
                context, status
            )),
            500..=599 => Error::registrar(
                "transip",
                format!("Server error (transient) during {}: {} - {}", context, status, error_text),
            ),
            _ => Error::registrar(
                "transip",
                format!("{} failed: {} - {}", context, status, error_text),
            ),
        }
    }

    /// Send a GET request and deserialize the response body
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = format!("{}{}", TRANSIP_API_BASE, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::registrar("transip", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(context, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::registrar("transip", format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Registrar for TransipRegistrar {
    /// List the domain names in the TransIP account
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /domains
    /// Authorization: Bearer <token>
    /// ```
    async fn domain_names(&self) -> Result<Vec<String>> {
        let response: DomainsResponse = self.get_json("/domains", "Domain listing").await?;

        let names: Vec<String> = response.domains.into_iter().map(|d| d.name).collect();
        tracing::debug!("TransIP account manages {} domain(s)", names.len());
        Ok(names)
    }

    /// Fetch a domain's current DNS entry set
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /domains/{domainName}/dns
    /// Authorization: Bearer <token>
    /// ```
    async fn entries(&self, domain: &str) -> Result<Vec<DnsEntry>> {
        let path = format!("/domains/{}/dns", domain);
        let context = format!("Entry fetch for {}", domain);
        let response: DnsEntriesResponse = self.get_json(&path, &context).await?;

        Ok(response.dns_entries.into_iter().map(DnsEntry::from).collect())
    }

    /// Replace a domain's entire entry set
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /domains/{domainName}/dns
    /// Authorization: Bearer <token>
    /// {"dnsEntries": [...]}
    /// ```
    ///
    /// Skipped in dry-run mode; the intended payload is logged instead.
    async fn replace_entries(&self, domain: &str, entries: &[DnsEntry]) -> Result<()> {
        let wire_entries: Vec<WireDnsEntry> = entries.iter().map(WireDnsEntry::from).collect();
        let payload = serde_json::json!({ "dnsEntries": wire_entries });
        let url = format!("{}/domains/{}/dns", TRANSIP_API_BASE, domain);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with {} entries: {}",
                url,
                entries.len(),
                payload
            );
            return Ok(());
        }

        tracing::info!("Replacing entry set for {} ({} entries)", domain, entries.len());

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::registrar("transip", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let context = format!("Entry replacement for {}", domain);
            return Err(Self::error_from_response(&context, response).await);
        }

        tracing::info!("Entry set for {} replaced successfully", domain);
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "transip"
    }
}

/// Factory for creating TransIP registrar clients
pub struct TransipFactory;

impl RegistrarFactory for TransipFactory {
    fn create(&self, config: &RegistrarConfig) -> Result<Box<dyn Registrar>> {
        match config {
            RegistrarConfig::Transip { api_token } => {
                if api_token.is_empty() {
                    return Err(Error::config("TransIP API token is required"));
                }

                // Check for dry-run mode environment variable
                let dry_run = std::env::var("ZONESYNC_MODE")
                    .unwrap_or_default()
                    .to_lowercase()
                    == "dry-run";

                if dry_run {
                    tracing::warn!(
                        "TransIP registrar running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(TransipRegistrar::new(api_token.clone(), dry_run)?))
            }
            _ => Err(Error::config("Invalid config for TransIP registrar")),
        }
    }
}

/// Register the TransIP registrar with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_registrar_transip::register(&registry);
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_registrar("transip", Box::new(TransipFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let factory = TransipFactory;

        let config = RegistrarConfig::Transip {
            api_token: "test_token".to_string(),
        };

        let registrar = factory.create(&config);
        assert!(registrar.is_ok());
    }

    #[test]
    fn test_factory_missing_token() {
        let factory = TransipFactory;

        let config = RegistrarConfig::Transip {
            api_token: "".to_string(),
        };

        let registrar = factory.create(&config);
        assert!(registrar.is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(TransipRegistrar::new("", false).is_err());
    }

    #[test]
    fn test_dry_run_mode() {
        let registrar_dry = TransipRegistrar::new_dry_run("token").unwrap();
        let registrar_live = TransipRegistrar::new_live("token").unwrap();

        assert!(registrar_dry.dry_run);
        assert!(!registrar_live.dry_run);
    }

    #[test]
    fn test_registrar_name() {
        let registrar = TransipRegistrar::new("token", false).unwrap();
        assert_eq!(registrar.registrar_name(), "transip");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let registrar = TransipRegistrar::new("secret_token_12345", false).unwrap();

        let debug_str = format!("{:?}", registrar);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("TransipRegistrar"));
    }

    #[test]
    fn test_wire_entry_uses_expire_for_ttl() {
        let entry = DnsEntry {
            name: "@".to_string(),
            record_type: RecordType::A,
            content: "198.51.100.2".to_string(),
            ttl: 300,
        };

        let json = serde_json::to_value(WireDnsEntry::from(&entry)).unwrap();
        assert_eq!(json["expire"], 300);
        assert_eq!(json["type"], "A");
        assert!(json.get("ttl").is_none());
    }

    #[test]
    fn test_entries_response_parses_transip_shape() {
        let body = r#"{
            "dnsEntries": [
                {"name": "@", "expire": 86400, "type": "A", "content": "198.51.100.2"},
                {"name": "@", "expire": 86400, "type": "CAA", "content": "0 issue \"letsencrypt.org\""}
            ]
        }"#;

        let response: DnsEntriesResponse = serde_json::from_str(body).unwrap();
        let entries: Vec<DnsEntry> = response.dns_entries.into_iter().map(DnsEntry::from).collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ttl, 86400);
        assert_eq!(entries[1].record_type, RecordType::Caa);
    }
}
