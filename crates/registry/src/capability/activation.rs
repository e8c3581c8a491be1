use serde::Deserialize;

use super::{CapabilityKey, FormatKind};
use crate::error::CapabilityError;

/// Reports the activation flag of a capability tuple.
///
/// Consulted once per tuple, the first time a catalog build sees it.
pub trait ActivationSource: Send + Sync {
	fn is_active(&self, kind: FormatKind, key: &CapabilityKey) -> Result<bool, CapabilityError>;
}

/// Activation flags read from the `[activation]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivationSettings {
	/// Flag for tuples without an override.
	pub default: bool,
	/// Explicit flags; the last matching entry wins.
	pub overrides: Vec<ActivationOverride>,
}

impl Default for ActivationSettings {
	fn default() -> Self {
		Self {
			default: true,
			overrides: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivationOverride {
	pub kind: FormatKind,
	pub service: String,
	pub version: String,
	pub format: String,
	pub active: bool,
}

impl ActivationOverride {
	fn applies_to(&self, kind: FormatKind, key: &CapabilityKey) -> bool {
		self.kind == kind && self.service == key.service && self.version == key.version && self.format == key.format
	}
}

impl ActivationSettings {
	/// Resolved flag for `key`.
	pub fn status(&self, kind: FormatKind, key: &CapabilityKey) -> bool {
		self.overrides
			.iter()
			.rev()
			.find(|entry| entry.applies_to(kind, key))
			.map_or(self.default, |entry| entry.active)
	}
}

impl ActivationSource for ActivationSettings {
	fn is_active(&self, kind: FormatKind, key: &CapabilityKey) -> Result<bool, CapabilityError> {
		Ok(self.status(kind, key))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn last_matching_override_wins() {
		let key = CapabilityKey::new("SOS", "2.0.0", "application/json");
		let entry = |active| ActivationOverride {
			kind: FormatKind::ResponseFormat,
			service: "SOS".into(),
			version: "2.0.0".into(),
			format: "application/json".into(),
			active,
		};
		let settings = ActivationSettings {
			default: true,
			overrides: vec![entry(false), entry(true), entry(false)],
		};
		assert!(!settings.status(FormatKind::ResponseFormat, &key));
		assert!(
			settings.status(FormatKind::ProcedureDescriptionFormat, &key),
			"overrides are scoped to their format kind"
		);
		assert!(settings.status(FormatKind::ResponseFormat, &CapabilityKey::new("SOS", "1.0.0", "application/json")));
	}
}
