use std::collections::BTreeSet;

use parking_lot::{Mutex, MutexGuard, RwLock};
use rustc_hash::FxHashMap;

use super::{ActivationSource, CapabilityKey, DeclaredFormats, FormatKind, ServiceVersion};
use crate::error::CapabilityError;

#[derive(Debug, Default)]
struct CatalogState {
	formats: DeclaredFormats,
	status: FxHashMap<CapabilityKey, bool>,
}

/// Outcome of a successful [`FormatCatalog::rebuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
	/// Tuples in the published catalog.
	pub tuples: usize,
	/// Tuples seen for the first time and queried for their activation flag.
	pub discovered: usize,
}

/// Activation flags queried by [`FormatCatalog::prepare`], not yet published.
#[derive(Debug)]
pub(crate) struct PreparedBuild {
	declared: DeclaredFormats,
	queried: FxHashMap<CapabilityKey, bool>,
}

/// Per-(service, version) format sets with activation flags.
pub struct FormatCatalog {
	kind: FormatKind,
	state: RwLock<CatalogState>,
	/// Serializes rebuilds so concurrent builds cannot interleave their queries.
	build: Mutex<()>,
}

impl FormatCatalog {
	pub fn new(kind: FormatKind) -> Self {
		Self {
			kind,
			state: RwLock::new(CatalogState::default()),
			build: Mutex::new(()),
		}
	}

	pub fn kind(&self) -> FormatKind {
		self.kind
	}

	/// Replaces the catalog with `declared`.
	///
	/// Tuples already present keep their flag; new tuples are queried from
	/// `activation`. Any query failure aborts the build and leaves the published
	/// catalog unchanged.
	pub fn rebuild(&self, declared: DeclaredFormats, activation: &dyn ActivationSource) -> Result<BuildSummary, CapabilityError> {
		let _build = self.lock_builds();
		let prepared = self.prepare(declared, activation)?;
		Ok(self.commit(prepared))
	}

	/// Held across a `prepare`/`commit` pair.
	pub(crate) fn lock_builds(&self) -> MutexGuard<'_, ()> {
		self.build.lock()
	}

	/// Queries activation for every tuple of `declared` the catalog does not know yet.
	///
	/// Nothing is published; callers that build several catalogs together commit
	/// only once every catalog prepared successfully. Callers hold
	/// [`Self::lock_builds`] until the matching `commit`.
	pub(crate) fn prepare(&self, declared: DeclaredFormats, activation: &dyn ActivationSource) -> Result<PreparedBuild, CapabilityError> {
		let unknown: Vec<CapabilityKey> = {
			let state = self.state.read();
			declared
				.iter()
				.flat_map(|(service_version, formats)| formats.iter().map(move |format| CapabilityKey::from_parts(service_version, format)))
				.filter(|key| !state.status.contains_key(key))
				.collect()
		};

		let mut queried = FxHashMap::default();
		for key in unknown {
			let active = activation.is_active(self.kind, &key)?;
			queried.insert(key, active);
		}
		Ok(PreparedBuild { declared, queried })
	}

	/// Publishes a prepared build. Flags set since `prepare` take precedence over queried ones.
	pub(crate) fn commit(&self, prepared: PreparedBuild) -> BuildSummary {
		let PreparedBuild { declared, queried } = prepared;
		let mut state = self.state.write();
		let mut status = FxHashMap::default();
		for (service_version, formats) in &declared {
			for format in formats {
				let key = CapabilityKey::from_parts(service_version, format);
				let active = state.status.get(&key).or_else(|| queried.get(&key)).copied().unwrap_or(false);
				status.insert(key, active);
			}
		}

		let summary = BuildSummary {
			tuples: status.len(),
			discovered: queried.len(),
		};
		*state = CatalogState { formats: declared, status };
		drop(state);

		tracing::debug!(kind = %self.kind, tuples = summary.tuples, discovered = summary.discovered, "capability catalog rebuilt");
		summary
	}

	/// Every declared format for `service`/`version`, regardless of activation.
	pub fn all(&self, service: &str, version: &str) -> BTreeSet<String> {
		self.state.read().formats.get(&ServiceVersion::new(service, version)).cloned().unwrap_or_default()
	}

	/// Declared formats for `service`/`version` whose flag is currently true.
	pub fn active(&self, service: &str, version: &str) -> BTreeSet<String> {
		let state = self.state.read();
		let Some(formats) = state.formats.get(&ServiceVersion::new(service, version)) else {
			return BTreeSet::new();
		};
		formats
			.iter()
			.filter(|format| state.status.get(&CapabilityKey::new(service, version, format.as_str())).copied().unwrap_or(false))
			.cloned()
			.collect()
	}

	/// Current flag of `key`, or `None` when the tuple is unknown.
	pub fn is_active(&self, key: &CapabilityKey) -> Option<bool> {
		self.state.read().status.get(key).copied()
	}

	/// True if `format` is declared and active for `service`/`version`.
	pub fn is_supported(&self, service: &str, version: &str, format: &str) -> bool {
		self.is_active(&CapabilityKey::new(service, version, format)).unwrap_or(false)
	}

	/// Updates the flag of an existing tuple. Unknown tuples are ignored.
	///
	/// Returns true if a tuple was updated.
	pub fn set_active(&self, key: &CapabilityKey, active: bool) -> bool {
		let mut state = self.state.write();
		match state.status.get_mut(key) {
			Some(flag) => {
				*flag = active;
				true
			}
			None => false,
		}
	}

	/// (service, version) pairs with at least one declared format.
	pub fn service_versions(&self) -> Vec<ServiceVersion> {
		self.state.read().formats.keys().cloned().collect()
	}

	/// Number of known tuples.
	pub fn len(&self) -> usize {
		self.state.read().status.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for FormatCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FormatCatalog").field("kind", &self.kind).field("tuples", &self.len()).finish()
	}
}
