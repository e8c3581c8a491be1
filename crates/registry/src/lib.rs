//! Codec registry and dispatch engine.
//!
//! # Mental Model
//!
//! 1. **Discovery:** encoders and decoders are discovered ([`Discovery`]),
//!    configured once ([`Configurator`]) and frozen.
//! 2. **Publication:** both codec sets, their key indexes and the merged
//!    namespace/schema tables form one [`Generation`], published atomically.
//! 3. **Dispatch:** consumers ask [`CodecRepository`] for the most specific codec
//!    for a [`ows_codec::Key`] or composite query.
//! 4. **Capabilities:** per (service, version) format catalogs are derived from
//!    the published codecs and carry runtime activation flags.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`CodecRepository`] | Shared handle; lookups, capability views, reload. |
//! | [`Generation`] | One immutable published codec set. |
//! | [`CodecIndex`] | Static key map plus memo cache for one codec family. |
//! | [`FormatCatalog`] | Declared formats with activation flags. |
//! | [`NamespaceTable`] | Merged namespace/prefix map. |

pub mod capability;
pub mod config;
pub mod discovery;
pub mod error;
pub mod index;
pub mod namespace;
pub mod repository;

#[cfg(test)]
mod test_fixtures;

pub use capability::{
	ActivationOverride, ActivationSettings, ActivationSource, BuildSummary, CapabilityKey, FormatCatalog, FormatKind, ServiceOperators,
	ServiceVersion,
};
pub use config::{CacheConfig, CodecsConfig, ConfigError, RegistryConfig, ServiceEntry};
pub use discovery::{CodecFamily, Configurator, Discovery, FnDiscovery, InventoryDiscovery, NoopConfigurator, SettingsConfigurator, StaticDiscovery};
pub use error::{CapabilityError, LoadError, RegistryError, Result};
pub use index::{CacheStats, CodecIndex, KeyCollision};
pub use namespace::{NamespaceTable, SchemaTable};
pub use repository::{CapabilitySummary, CodecRepository, Generation, ReloadReport, RepositoryBuilder};
