//! Configuration types for the zonesync system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesyncConfig {
    /// WAN address source configuration
    pub address_source: AddressSourceConfig,

    /// Registrar configuration
    pub registrar: RegistrarConfig,

    /// Domains to reconcile
    pub domains: Vec<DomainConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ZonesyncConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            address_source: AddressSourceConfig::default(),
            registrar: RegistrarConfig::default(),
            domains: Vec::new(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domains.is_empty() {
            return Err(crate::Error::config("No domains configured"));
        }

        self.registrar.validate()?;
        self.address_source.validate()?;

        for domain in &self.domains {
            domain.validate()?;
        }

        Ok(())
    }
}

impl Default for ZonesyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// WAN address source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddressSourceConfig {
    /// HTTP-based address source (uses an external "what is my IP" service)
    Http {
        /// URL returning the caller's public address as plain text
        url: String,
    },

    /// Custom address source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl AddressSourceConfig {
    /// Validate the address source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            AddressSourceConfig::Http { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("WAN check URL cannot be empty"));
                }
                Ok(())
            }
            AddressSourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom address source factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom address source config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Default for AddressSourceConfig {
    fn default() -> Self {
        AddressSourceConfig::Http {
            url: String::new(),
        }
    }
}

/// Registrar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrarConfig {
    /// TransIP registrar (REST API v6)
    Transip {
        /// TransIP API token
        api_token: String,
    },

    /// Custom registrar
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl RegistrarConfig {
    /// Validate the registrar configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistrarConfig::Transip { api_token } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("TransIP API token cannot be empty"));
                }
                Ok(())
            }
            RegistrarConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom registrar factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom registrar config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the registrar type name
    pub fn type_name(&self) -> &str {
        match self {
            RegistrarConfig::Transip { .. } => "transip",
            RegistrarConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        RegistrarConfig::Transip {
            api_token: String::new(),
        }
    }
}

/// Desired DNS state for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Domain name (e.g., "example.com")
    pub name: String,

    /// Desired entries within the domain
    pub entries: Vec<EntryConfig>,
}

impl DomainConfig {
    /// Create a new domain configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add a desired entry
    pub fn with_entry(mut self, entry: EntryConfig) -> Self {
        self.entries.push(entry);
        self
    }

    /// Validate the domain configuration
    ///
    /// Entry identity within a domain is the (name, type) pair; duplicates
    /// would make the reconciler's lookup order-dependent, so they are
    /// rejected here before the first cycle runs.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.is_empty() {
            return Err(crate::Error::config("Domain name cannot be empty"));
        }

        if self.entries.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain {} has no entries configured",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.name.is_empty() {
                return Err(crate::Error::config(format!(
                    "Domain {} has an entry with an empty name",
                    self.name
                )));
            }
            if !seen.insert((entry.name.as_str(), entry.record_type)) {
                return Err(crate::Error::config(format!(
                    "Domain {} has duplicate entry ({}, {})",
                    self.name, entry.name, entry.record_type
                )));
            }
        }

        Ok(())
    }

    /// Find the desired entry matching a (name, type) pair
    pub fn entry(&self, name: &str, record_type: RecordType) -> Option<&EntryConfig> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.record_type == record_type)
    }
}

/// One desired DNS entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Record name within the domain (e.g., "@", "www")
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Explicit record content
    ///
    /// When absent, the entry tracks the current public address.
    #[serde(default)]
    pub content: Option<String>,
}

impl EntryConfig {
    /// Create an entry that tracks the current public address
    pub fn tracking(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
            content: None,
        }
    }

    /// Create an entry with explicit content
    pub fn fixed(
        name: impl Into<String>,
        record_type: RecordType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            content: Some(content.into()),
        }
    }
}

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
    #[serde(rename = "CNAME")]
    Cname,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "NS")]
    Ns,
    #[serde(rename = "SRV")]
    Srv,
    #[serde(rename = "TXT")]
    Txt,
    #[serde(rename = "CAA")]
    Caa,
    #[serde(rename = "ALIAS")]
    Alias,
    #[serde(rename = "SSHFP")]
    Sshfp,
    #[serde(rename = "TLSA")]
    Tlsa,
    #[serde(rename = "NAPTR")]
    Naptr,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
            RecordType::Caa => "CAA",
            RecordType::Alias => "ALIAS",
            RecordType::Sshfp => "SSHFP",
            RecordType::Tlsa => "TLSA",
            RecordType::Naptr => "NAPTR",
        };
        f.write_str(s)
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Polling period between cycles (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}
