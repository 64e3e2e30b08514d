// # zonesync-core
//
// Core library for the zonesync periodic DNS reconciler.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping registrar DNS
// state converged with the operator's declared configuration:
// - **AddressSource**: Trait for looking up the current public address
// - **Registrar**: Trait for listing domains and fetching/replacing DNS
//   entry sets
// - **reconcile**: The pure per-domain diffing algorithm
// - **SyncEngine**: Polling loop that orchestrates fetch → diff → write
// - **ProviderRegistry**: Plugin-based registry for registrars and sources
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Pure Core**: The reconciler computes decisions without any I/O
// 3. **Plugin-Based**: Registrars are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: A converged domain always reconciles to a no-op

pub mod config;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{AddressSourceConfig, DomainConfig, RegistrarConfig, ZonesyncConfig};
pub use engine::{CycleSummary, DomainOutcome, EngineEvent, SyncEngine};
pub use error::{Error, Result};
pub use reconcile::{Outcome, reconcile};
pub use registry::ProviderRegistry;
pub use traits::{AddressSource, DnsEntry, Registrar};
