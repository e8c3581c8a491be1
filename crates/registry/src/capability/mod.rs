//! Capability catalogs derived from the published codec set.
//!
//! # Role
//!
//! Capabilities documents list, per (service, version), the response formats and
//! procedure description formats a deployment offers. This module derives those
//! lists from what codecs declare and pairs every (service, version, format)
//! tuple with an activation flag obtained from an [`ActivationSource`].
//!
//! # Invariants
//!
//! - A failed rebuild leaves the previously published maps untouched
//!   (tested by `failed_rebuild_keeps_previous_maps`).
//! - Tuples already known keep their current flag across rebuilds; only new
//!   tuples are queried (tested by `rebuild_preserves_runtime_toggles`).
//! - `set_active` only updates existing tuples (tested by `set_active_ignores_unknown_tuples`).

mod activation;
mod catalog;


use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

pub use activation::{ActivationOverride, ActivationSettings, ActivationSource};
pub use catalog::{BuildSummary, FormatCatalog};
use ows_codec::Codec;
use serde::Deserialize;
use strum::Display;

/// Which format family a catalog tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
	ResponseFormat,
	ProcedureDescriptionFormat,
}

impl FormatKind {
	/// Formats of this kind that `codec` declares for `service`/`version`.
	pub fn declared_by<C: Codec + ?Sized>(self, codec: &C, service: &str, version: &str) -> BTreeSet<String> {
		match self {
			FormatKind::ResponseFormat => codec.supported_response_formats(service, version),
			FormatKind::ProcedureDescriptionFormat => codec.supported_procedure_description_formats(service, version),
		}
	}
}

/// A (service, version) combination offered by the hosting system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceVersion {
	pub service: String,
	pub version: String,
}

impl ServiceVersion {
	pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			service: service.into(),
			version: version.into(),
		}
	}
}

impl fmt::Display for ServiceVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.service, self.version)
	}
}

/// A (service, version, format) tuple carrying an activation flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityKey {
	pub service: String,
	pub version: String,
	pub format: String,
}

impl CapabilityKey {
	pub fn new(service: impl Into<String>, version: impl Into<String>, format: impl Into<String>) -> Self {
		Self {
			service: service.into(),
			version: version.into(),
			format: format.into(),
		}
	}

	pub(crate) fn from_parts(service_version: &ServiceVersion, format: &str) -> Self {
		Self::new(service_version.service.as_str(), service_version.version.as_str(), format)
	}

	pub fn service_version(&self) -> ServiceVersion {
		ServiceVersion::new(self.service.as_str(), self.version.as_str())
	}
}

impl fmt::Display for CapabilityKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.service, self.version, self.format)
	}
}

/// Supplies every (service, version) the hosting system currently supports.
pub trait ServiceOperators: Send + Sync {
	fn service_versions(&self) -> Vec<ServiceVersion>;
}

impl ServiceOperators for Vec<ServiceVersion> {
	fn service_versions(&self) -> Vec<ServiceVersion> {
		self.clone()
	}
}

/// Declared formats per (service, version), before activation filtering.
pub type DeclaredFormats = BTreeMap<ServiceVersion, BTreeSet<String>>;

/// Adds the formats of `kind` declared by `codecs` for each of `services` to `into`.
pub fn collect_declared<C: Codec + ?Sized>(kind: FormatKind, services: &[ServiceVersion], codecs: &[Arc<C>], into: &mut DeclaredFormats) {
	for service_version in services {
		for codec in codecs {
			let formats = kind.declared_by(&**codec, &service_version.service, &service_version.version);
			if !formats.is_empty() {
				into.entry(service_version.clone()).or_default().extend(formats);
			}
		}
	}
}
