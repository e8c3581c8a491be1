//! Namespace prefix and schema location tables merged from a codec set.
//!
//! Both tables are merged in discovery order, encoders before decoders, and the
//! last codec to declare a namespace wins.

use ows_codec::{Codec, NamespacePrefix, SchemaLocation};
use rustc_hash::FxHashMap;

/// Bidirectional namespace/prefix map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
	by_namespace: FxHashMap<String, String>,
	by_prefix: FxHashMap<String, String>,
}

impl NamespaceTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds every prefix declared by `codec`.
	pub fn merge<C: Codec + ?Sized>(&mut self, codec: &C) {
		for NamespacePrefix { namespace, prefix } in codec.namespace_prefixes() {
			self.insert(namespace, prefix);
		}
	}

	/// Binds `namespace` to `prefix`.
	///
	/// An earlier prefix of `namespace` is released, and a namespace that held
	/// `prefix` before loses its binding, so both directions always agree.
	pub fn insert(&mut self, namespace: String, prefix: String) {
		if let Some(previous) = self.by_namespace.insert(namespace.clone(), prefix.clone())
			&& previous != prefix
			&& self.by_prefix.get(&previous) == Some(&namespace)
		{
			self.by_prefix.remove(&previous);
		}
		if let Some(displaced) = self.by_prefix.insert(prefix.clone(), namespace.clone())
			&& displaced != namespace
			&& self.by_namespace.get(&displaced) == Some(&prefix)
		{
			self.by_namespace.remove(&displaced);
		}
	}

	pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
		self.by_namespace.get(namespace).map(String::as_str)
	}

	pub fn namespace_for(&self, prefix: &str) -> Option<&str> {
		self.by_prefix.get(prefix).map(String::as_str)
	}

	/// (namespace, prefix) pairs sorted by namespace.
	pub fn entries(&self) -> Vec<(&str, &str)> {
		let mut entries: Vec<(&str, &str)> = self.by_namespace.iter().map(|(ns, prefix)| (ns.as_str(), prefix.as_str())).collect();
		entries.sort_unstable();
		entries
	}

	pub fn len(&self) -> usize {
		self.by_namespace.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_namespace.is_empty()
	}
}

/// Namespace to schema location map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTable {
	by_namespace: FxHashMap<String, SchemaLocation>,
}

impl SchemaTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn merge<C: Codec + ?Sized>(&mut self, codec: &C) {
		for location in codec.schema_locations() {
			self.by_namespace.insert(location.namespace.clone(), location);
		}
	}

	pub fn get(&self, namespace: &str) -> Option<&SchemaLocation> {
		self.by_namespace.get(namespace)
	}

	/// Locations sorted by namespace.
	pub fn entries(&self) -> Vec<&SchemaLocation> {
		let mut entries: Vec<&SchemaLocation> = self.by_namespace.values().collect();
		entries.sort_unstable();
		entries
	}

	pub fn len(&self) -> usize {
		self.by_namespace.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_namespace.is_empty()
	}
}
