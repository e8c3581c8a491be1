//! Registry configuration.
//!
//! A single TOML document configures the repository:
//!
//! ```toml
//! [cache]
//! capacity = 512
//!
//! [codecs]
//! verbose_errors = false
//! [codecs.options."ows-exception-report"]
//! indent = "2"
//!
//! [activation]
//! default = true
//! [[activation.overrides]]
//! kind = "response-format"
//! service = "SOS"
//! version = "2.0.0"
//! format = "application/json"
//! active = false
//!
//! [[services]]
//! service = "SOS"
//! versions = ["1.0.0", "2.0.0"]
//! ```
//!
//! Missing tables take their defaults. Unknown fields are rejected.


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ows_codec::CodecSettings;
use serde::Deserialize;

use crate::capability::{ActivationSettings, ServiceOperators, ServiceVersion};

/// Default number of memoized lookups kept per generation and registry.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid config: {0}")]
	Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	pub cache: CacheConfig,
	pub codecs: CodecsConfig,
	pub activation: ActivationSettings,
	pub services: Vec<ServiceEntry>,
}

impl RegistryConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	/// Flattens `[[services]]` into (service, version) pairs, in declaration order.
	pub fn service_versions(&self) -> Vec<ServiceVersion> {
		self.services
			.iter()
			.flat_map(|entry| entry.versions.iter().map(|version| ServiceVersion::new(entry.service.as_str(), version.as_str())))
			.collect()
	}
}

impl ServiceOperators for RegistryConfig {
	fn service_versions(&self) -> Vec<ServiceVersion> {
		RegistryConfig::service_versions(self)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	/// Maximum memoized lookups per registry; zero is treated as one.
	pub capacity: usize,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CACHE_CAPACITY,
		}
	}
}

/// Settings handed to codecs before publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecsConfig {
	pub verbose_errors: bool,
	/// Per-codec options keyed by codec name.
	pub options: BTreeMap<String, BTreeMap<String, String>>,
}

impl CodecsConfig {
	/// Settings for the codec called `name`.
	pub fn settings_for(&self, name: &str) -> CodecSettings {
		CodecSettings {
			verbose_errors: self.verbose_errors,
			options: self.options.get(name).cloned().unwrap_or_default(),
		}
	}
}

/// One `[[services]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
	pub service: String,
	pub versions: Vec<String>,
}
