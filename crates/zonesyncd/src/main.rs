// # zonesyncd - zonesync Daemon
//
// Thin integration layer: reads configuration, initializes the runtime,
// registers registrars and address sources, and runs the sync engine. All
// reconciliation logic lives in zonesync-core.
//
// ## Configuration
//
// Scalar settings come from environment variables; the per-domain entry
// lists are structured data and come from a JSON file:
//
// ### Registrar
// - `ZONESYNC_REGISTRAR_TYPE`: Registrar type (transip)
// - `ZONESYNC_REGISTRAR_TOKEN`: API token
// - `ZONESYNC_MODE`: Set to `dry-run` to log writes instead of sending them
//
// ### WAN address source
// - `ZONESYNC_WAN_URL`: URL returning the public address as plain text
//
// ### Domains
// - `ZONESYNC_DOMAINS_FILE`: Path to a JSON file with the desired entries:
//   `[{"name": "example.com", "entries": [{"name": "@", "type": "A"}]}]`
//   An entry without `content` tracks the current public address.
//
// ### Engine
// - `ZONESYNC_POLL_INTERVAL_SECS`: Seconds between cycle starts
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export ZONESYNC_REGISTRAR_TYPE=transip
// export ZONESYNC_REGISTRAR_TOKEN=your_token
// export ZONESYNC_WAN_URL=https://api.ipify.org
// export ZONESYNC_DOMAINS_FILE=/etc/zonesync/domains.json
// export ZONESYNC_POLL_INTERVAL_SECS=300
//
// zonesyncd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{
    AddressSourceConfig, DomainConfig, EngineConfig, RegistrarConfig, ZonesyncConfig,
};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (fatal engine failure)
#[derive(Debug, Clone, Copy)]
enum ZonesyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (e.g., registrar domain listing unusable)
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    registrar_type: String,
    registrar_token: String,
    wan_url: String,
    domains_file: String,
    poll_interval_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            registrar_type: env::var("ZONESYNC_REGISTRAR_TYPE")
                .unwrap_or_else(|_| "transip".to_string()),
            registrar_token: env::var("ZONESYNC_REGISTRAR_TOKEN")?,
            wan_url: env::var("ZONESYNC_WAN_URL")
                .unwrap_or_else(|_| "https://api.ipify.org".to_string()),
            domains_file: env::var("ZONESYNC_DOMAINS_FILE")?,
            poll_interval_secs: env::var("ZONESYNC_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks required fields, value formats, numeric ranges and obvious
    /// placeholder tokens before anything talks to the network.
    fn validate(&self) -> Result<()> {
        if self.registrar_token.is_empty() {
            anyhow::bail!(
                "ZONESYNC_REGISTRAR_TOKEN is required. \
                Set it via: export ZONESYNC_REGISTRAR_TOKEN=your_token"
            );
        }

        if self.registrar_token.len() < 20 {
            anyhow::bail!(
                "ZONESYNC_REGISTRAR_TOKEN appears too short ({} chars). \
                Verify your token is correct.",
                self.registrar_token.len()
            );
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.registrar_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower.contains("example")
            || token_lower == "token"
        {
            anyhow::bail!(
                "ZONESYNC_REGISTRAR_TOKEN appears to be a placeholder. \
                Use an actual API token from your registrar."
            );
        }

        match self.registrar_type.as_str() {
            "transip" => {}
            _ => anyhow::bail!(
                "ZONESYNC_REGISTRAR_TYPE '{}' is not supported. \
                Supported registrars: transip",
                self.registrar_type
            ),
        }

        if !self.wan_url.starts_with("https://") && !self.wan_url.starts_with("http://") {
            anyhow::bail!(
                "ZONESYNC_WAN_URL must use HTTP or HTTPS scheme. Got: {}",
                self.wan_url
            );
        }

        if self.wan_url.starts_with("http://") {
            eprintln!(
                "WARNING: ZONESYNC_WAN_URL uses HTTP (not HTTPS). \
                      This is less secure. Consider using HTTPS."
            );
        }

        if self.domains_file.is_empty() {
            anyhow::bail!(
                "ZONESYNC_DOMAINS_FILE is required. \
                Set it via: export ZONESYNC_DOMAINS_FILE=/etc/zonesync/domains.json"
            );
        }

        if !std::path::Path::new(&self.domains_file).exists() {
            anyhow::bail!("ZONESYNC_DOMAINS_FILE does not exist: {}", self.domains_file);
        }

        if !(10..=86400).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "ZONESYNC_POLL_INTERVAL_SECS must be between 10 and 86400 seconds. Got: {}",
                self.poll_interval_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Load and validate the per-domain entry lists
    fn load_domains(&self) -> Result<Vec<DomainConfig>> {
        let contents = std::fs::read_to_string(&self.domains_file).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", self.domains_file, e)
        })?;

        let domains: Vec<DomainConfig> = serde_json::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse {}: {}", self.domains_file, e)
        })?;

        if domains.is_empty() {
            anyhow::bail!("No domains found in {}", self.domains_file);
        }

        for domain in &domains {
            validate_domain_name(&domain.name)?;
        }

        Ok(domains)
    }

    /// Build the validated engine configuration
    ///
    /// Loads the domains file and assembles the full configuration. Any
    /// failure here (unreadable or malformed file, invalid domain name,
    /// duplicate (name, type) entry) is a configuration error, not a
    /// runtime error.
    fn build_sync_config(&self) -> Result<ZonesyncConfig> {
        let domains = self.load_domains()?;

        let sync_config = ZonesyncConfig {
            address_source: AddressSourceConfig::Http {
                url: self.wan_url.clone(),
            },
            registrar: RegistrarConfig::Transip {
                api_token: self.registrar_token.clone(),
            },
            domains,
            engine: EngineConfig {
                poll_interval_secs: self.poll_interval_secs,
                ..EngineConfig::default()
            },
        };

        sync_config.validate()?;
        Ok(sync_config)
    }
}

/// Validate that a string is a valid domain name
///
/// Basic DNS domain name validation per RFC 1035. Not comprehensive, but
/// catches common mistakes before the first registrar call.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    info!("Starting zonesyncd daemon");

    // Load the domains file and validate the full configuration before
    // entering the runtime, so every configuration problem exits with
    // code 1 and only engine failures exit with code 2.
    let sync_config = match config.build_sync_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration validation error: {}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    info!(
        "Configuration loaded: {} domain(s)",
        sync_config.domains.len()
    );
    for domain in &sync_config.domains {
        info!(
            "Managing domain: {} ({} entries)",
            domain.name,
            domain.entries.len()
        );
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(sync_config).await {
            error!("Daemon error: {}", e);
            ZonesyncExitCode::RuntimeError
        } else {
            ZonesyncExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
///
/// Takes an already validated configuration; everything that fails from
/// here on is a runtime error.
async fn run_daemon(config: ZonesyncConfig) -> Result<()> {
    // Create provider registry and register built-in implementations
    let registry = zonesync_core::ProviderRegistry::new();

    #[cfg(feature = "transip")]
    {
        info!("Registering TransIP registrar");
        zonesync_registrar_transip::register(&registry);
    }

    #[cfg(feature = "wan-http")]
    {
        info!("Registering HTTP WAN address source");
        zonesync_wan_http::register(&registry);
    }

    let registrar = registry.create_registrar(&config.registrar)?;
    let address_source = registry.create_address_source(&config.address_source)?;

    let (engine, mut event_rx) = zonesync_core::SyncEngine::new(
        Arc::from(registrar),
        Arc::from(address_source),
        config,
    )?;

    // Drain engine events so the bounded channel never fills up
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("engine event: {:?}", event);
        }
    });

    info!("Starting sync engine");
    engine.run().await?;

    info!("Shutting down daemon");
    Ok(())
}
