//! Dispatch keys.
//!
//! # Role
//!
//! A [`Key`] names one translation capability a codec offers ("this namespace",
//! "this namespace and domain type", "this operation in this media type"). Codecs
//! declare a set of keys; the registry finds codecs for a query key by asking each
//! declared key how closely it matches.
//!
//! # Similarity
//!
//! [`Key::similarity`] is called on the *declared* key with the *query* key:
//!
//! - negative: incompatible, the codec is not a candidate;
//! - `0`: exact match;
//! - positive: looser match, smaller is more specific.
//!
//! | Declared | Query | Distance |
//! |----------|-------|----------|
//! | any key | equal key | 0 |
//! | `DomainType(T)` | `DomainType(U)` | parent steps from U to T |
//! | `Xml(ns, T)` | `Xml(ns, U)` | parent steps from U to T |
//! | `Xml(ns, _)` / `Namespace(ns)` | `Namespace(ns)` / `Xml(ns, _)` | 1 |
//! | `Xml(_, T)` / `DomainType(T)` | `DomainType(U)` / `Xml(_, U)` | parent steps + 1 |
//! | `Operation` | `Operation` | see [`OperationKey::similarity`] |
//! | `OperationDecoder` | `OperationDecoder` | operation + media type distance |
//! | `ResponseFormat` | `ResponseFormat` | see [`ResponseFormatKey::similarity`] |
//! | `MediaType` | `MediaType` | see [`MediaType::similarity`] |
//! | `Composite` | `Composite` | sum of best member distances |
//!
//! Every other pairing is incompatible.
//!
//! # Invariants
//!
//! - Reflexive: `k.similarity(&k) == 0` for every key (tested by `prop_similarity_is_reflexive`).
//! - [`CompositeKey::matches`] is invariant under member permutation (tested by
//!   `prop_composite_match_ignores_member_order`).

mod composite;
mod media_type;
mod operation;


use std::fmt;
use std::sync::Arc;

pub use composite::{CompositeKey, best_distance};
pub use media_type::MediaType;
pub use operation::{ANY_VERSION, OperationDecoderKey, OperationKey, ResponseFormatKey};

use crate::domain::DomainType;

/// XML namespace key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceKey {
	namespace: Arc<str>,
}

impl NamespaceKey {
	pub fn new(namespace: &str) -> Self {
		Self {
			namespace: Arc::from(namespace),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}
}

/// Domain element category key, independent of any namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainTypeKey {
	pub kind: DomainType,
}

impl DomainTypeKey {
	pub const fn new(kind: DomainType) -> Self {
		Self { kind }
	}
}

/// (namespace, domain type) key used by XML dialect codecs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XmlTypeKey {
	namespace: Arc<str>,
	pub kind: DomainType,
}

impl XmlTypeKey {
	pub fn new(namespace: &str, kind: DomainType) -> Self {
		Self {
			namespace: Arc::from(namespace),
			kind,
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}
}

/// A dispatch key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Namespace(NamespaceKey),
	DomainType(DomainTypeKey),
	Xml(XmlTypeKey),
	Operation(OperationKey),
	OperationDecoder(OperationDecoderKey),
	ResponseFormat(ResponseFormatKey),
	MediaType(MediaType),
	Composite(CompositeKey),
}

impl Key {
	pub fn namespace(namespace: &str) -> Self {
		Key::Namespace(NamespaceKey::new(namespace))
	}

	pub fn domain_type(kind: DomainType) -> Self {
		Key::DomainType(DomainTypeKey::new(kind))
	}

	pub fn xml(namespace: &str, kind: DomainType) -> Self {
		Key::Xml(XmlTypeKey::new(namespace, kind))
	}

	pub fn operation(service: &str, version: &str, operation: &str) -> Self {
		Key::Operation(OperationKey::new(service, version, operation))
	}

	pub fn composite(members: impl IntoIterator<Item = Key>) -> Self {
		Key::Composite(CompositeKey::new(members))
	}

	/// Distance from this declared key to `query`; negative means incompatible.
	pub fn similarity(&self, query: &Key) -> i32 {
		if self == query {
			return 0;
		}
		match (self, query) {
			(Key::Namespace(declared), Key::Namespace(query)) => exact(declared == query),
			(Key::Namespace(ns), Key::Xml(xml)) | (Key::Xml(xml), Key::Namespace(ns)) => {
				if ns.namespace == xml.namespace { 1 } else { -1 }
			}
			(Key::DomainType(declared), Key::DomainType(query)) => hierarchy(declared.kind, query.kind, 0),
			(Key::Xml(declared), Key::Xml(query)) => {
				if declared.namespace != query.namespace {
					return -1;
				}
				hierarchy(declared.kind, query.kind, 0)
			}
			(Key::Xml(declared), Key::DomainType(query)) => hierarchy(declared.kind, query.kind, 1),
			(Key::DomainType(declared), Key::Xml(query)) => hierarchy(declared.kind, query.kind, 1),
			(Key::Operation(declared), Key::Operation(query)) => declared.similarity(query),
			(Key::OperationDecoder(declared), Key::OperationDecoder(query)) => declared.similarity(query),
			(Key::ResponseFormat(declared), Key::ResponseFormat(query)) => declared.similarity(query),
			(Key::MediaType(declared), Key::MediaType(query)) => declared.similarity(query),
			(Key::Composite(declared), Key::Composite(query)) => {
				query.distance(declared.members()).map_or(-1, |d| i32::try_from(d).unwrap_or(i32::MAX))
			}
			_ => -1,
		}
	}

	/// Returns true if this declared key is compatible with `query`.
	#[inline]
	pub fn matches(&self, query: &Key) -> bool {
		self.similarity(query) >= 0
	}
}

fn exact(equal: bool) -> i32 {
	if equal { 0 } else { -1 }
}

fn hierarchy(declared: DomainType, query: DomainType, penalty: u32) -> i32 {
	match query.distance_to(declared) {
		Some(steps) => (steps + penalty) as i32,
		None => -1,
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Namespace(key) => write!(f, "ns({})", key.namespace),
			Key::DomainType(key) => write!(f, "type({})", key.kind),
			Key::Xml(key) => write!(f, "xml({}, {})", key.namespace, key.kind),
			Key::Operation(key) => write!(f, "op({key})"),
			Key::OperationDecoder(key) => write!(f, "decode({key})"),
			Key::ResponseFormat(key) => write!(f, "response({key})"),
			Key::MediaType(key) => write!(f, "media({key})"),
			Key::Composite(key) => write!(f, "composite{key}"),
		}
	}
}

impl From<NamespaceKey> for Key {
	fn from(key: NamespaceKey) -> Self {
		Key::Namespace(key)
	}
}

impl From<DomainTypeKey> for Key {
	fn from(key: DomainTypeKey) -> Self {
		Key::DomainType(key)
	}
}

impl From<XmlTypeKey> for Key {
	fn from(key: XmlTypeKey) -> Self {
		Key::Xml(key)
	}
}

impl From<OperationKey> for Key {
	fn from(key: OperationKey) -> Self {
		Key::Operation(key)
	}
}

impl From<OperationDecoderKey> for Key {
	fn from(key: OperationDecoderKey) -> Self {
		Key::OperationDecoder(key)
	}
}

impl From<ResponseFormatKey> for Key {
	fn from(key: ResponseFormatKey) -> Self {
		Key::ResponseFormat(key)
	}
}

impl From<MediaType> for Key {
	fn from(key: MediaType) -> Self {
		Key::MediaType(key)
	}
}

impl From<CompositeKey> for Key {
	fn from(key: CompositeKey) -> Self {
		Key::Composite(key)
	}
}
