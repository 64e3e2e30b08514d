//! Plugin-based provider registry
//!
//! The registry allows registrar clients and address sources to be
//! registered dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonesync_core::registry::ProviderRegistry;
//! use zonesync_core::config::RegistrarConfig;
//!
//! // Create a registry
//! let registry = ProviderRegistry::new();
//!
//! // Register registrars
//! registry.register_registrar("transip", Box::new(transip_factory));
//!
//! // Create a registrar client from config
//! let config = RegistrarConfig::Transip { api_token: "...".into() };
//! let registrar = registry.create_registrar(&config)?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! // In zonesync-registrar-transip crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_registrar("transip", Box::new(TransipFactory));
//! }
//! ```

use crate::config::{AddressSourceConfig, RegistrarConfig};
use crate::error::{Error, Result};
use crate::traits::{AddressSource, AddressSourceFactory, Registrar, RegistrarFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry for plugin-based registrar and address source creation
///
/// The registry maintains a map of type names to factory objects, allowing
/// dynamic instantiation based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered registrar factories
    registrars: RwLock<HashMap<String, Box<dyn RegistrarFactory>>>,

    /// Registered address source factories
    address_sources: RwLock<HashMap<String, Box<dyn AddressSourceFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a registrar factory
    ///
    /// # Parameters
    ///
    /// - `name`: Registrar type name (e.g., "transip")
    /// - `factory`: Factory object for creating registrar instances
    pub fn register_registrar(&self, name: impl Into<String>, factory: Box<dyn RegistrarFactory>) {
        let name = name.into();
        let mut registrars = self.registrars.write().unwrap();
        registrars.insert(name, factory);
    }

    /// Register an address source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Address source type name (e.g., "http")
    /// - `factory`: Factory object for creating address source instances
    pub fn register_address_source(
        &self,
        name: impl Into<String>,
        factory: Box<dyn AddressSourceFactory>,
    ) {
        let name = name.into();
        let mut sources = self.address_sources.write().unwrap();
        sources.insert(name, factory);
    }

    /// Create a registrar client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Registrar>)`: Created registrar instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_registrar(&self, config: &RegistrarConfig) -> Result<Box<dyn Registrar>> {
        let registrar_type = config.type_name();
        let registrars = self.registrars.read().unwrap();

        let factory = registrars
            .get(registrar_type)
            .ok_or_else(|| Error::config(format!("Unknown registrar type: {}", registrar_type)))?;

        factory.create(config)
    }

    /// Create an address source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn AddressSource>)`: Created address source instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_address_source(
        &self,
        config: &AddressSourceConfig,
    ) -> Result<Box<dyn AddressSource>> {
        let source_type = match config {
            AddressSourceConfig::Http { .. } => "http",
            AddressSourceConfig::Custom { factory, .. } => factory,
        };

        let sources = self.address_sources.read().unwrap();

        let factory = sources
            .get(source_type)
            .ok_or_else(|| Error::config(format!("Unknown address source type: {}", source_type)))?;

        factory.create(config)
    }

    /// List all registered registrar types
    pub fn list_registrars(&self) -> Vec<String> {
        let registrars = self.registrars.read().unwrap();
        registrars.keys().cloned().collect()
    }

    /// List all registered address source types
    pub fn list_address_sources(&self) -> Vec<String> {
        let sources = self.address_sources.read().unwrap();
        sources.keys().cloned().collect()
    }

    /// Check if a registrar type is registered
    pub fn has_registrar(&self, name: &str) -> bool {
        let registrars = self.registrars.read().unwrap();
        registrars.contains_key(name)
    }

    /// Check if an address source type is registered
    pub fn has_address_source(&self, name: &str) -> bool {
        let sources = self.address_sources.read().unwrap();
        sources.contains_key(name)
    }
}
