//! Core traits for the zonesync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressSource`]: Look up the current public (WAN) address
//! - [`Registrar`]: List domains and fetch/replace their DNS entry sets

pub mod address_source;
pub mod registrar;

pub use address_source::{AddressSource, AddressSourceFactory};
pub use registrar::{DnsEntry, Registrar, RegistrarFactory};
