//! Codec plugin contracts.
//!
//! A codec declares the [`Key`]s it can translate and, optionally, the capability
//! metadata the registry aggregates (response formats, procedure description
//! formats, schema locations, namespace prefixes). Codecs are configured once via
//! [`Codec::configure`] before they are published, and are shared immutably
//! (`Arc<dyn Encoder>` / `Arc<dyn Decoder>`) afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Element, EncodedDocument};
use crate::error::CodecError;
use crate::key::Key;

/// Location of the XML schema for a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaLocation {
	pub namespace: String,
	pub location: String,
}

impl SchemaLocation {
	pub fn new(namespace: impl Into<String>, location: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			location: location.into(),
		}
	}
}

/// Preferred prefix for an XML namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacePrefix {
	pub namespace: String,
	pub prefix: String,
}

impl NamespacePrefix {
	pub fn new(namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			prefix: prefix.into(),
		}
	}
}

/// Externally sourced settings applied to one codec before publication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecSettings {
	/// Include diagnostic detail in produced documents (error reports in particular).
	pub verbose_errors: bool,
	/// Codec specific options keyed by option name.
	pub options: BTreeMap<String, String>,
}

impl CodecSettings {
	pub fn option(&self, name: &str) -> Option<&str> {
		self.options.get(name).map(String::as_str)
	}

	/// Parses option `name` with [`str::parse`], reporting failures as [`CodecError::InvalidSetting`].
	pub fn parse_option<T>(&self, name: &str) -> Result<Option<T>, CodecError>
	where
		T: std::str::FromStr,
		T::Err: std::fmt::Display,
	{
		self.option(name)
			.map(|raw| {
				raw.parse().map_err(|error: T::Err| CodecError::InvalidSetting {
					key: name.to_string(),
					reason: error.to_string(),
				})
			})
			.transpose()
	}
}

/// Common surface of encoders and decoders.
pub trait Codec: Send + Sync + 'static {
	/// Stable name used for configuration lookup and diagnostics.
	fn name(&self) -> &str;

	/// Keys this codec translates. Must not change after configuration.
	fn keys(&self) -> &[Key];

	/// Response formats offered for `service`/`version`.
	fn supported_response_formats(&self, _service: &str, _version: &str) -> BTreeSet<String> {
		BTreeSet::new()
	}

	/// Procedure description formats offered for `service`/`version`.
	fn supported_procedure_description_formats(&self, _service: &str, _version: &str) -> BTreeSet<String> {
		BTreeSet::new()
	}

	fn schema_locations(&self) -> Vec<SchemaLocation> {
		Vec::new()
	}

	fn namespace_prefixes(&self) -> Vec<NamespacePrefix> {
		Vec::new()
	}

	/// Applies settings; called exactly once before the codec is published.
	fn configure(&mut self, _settings: &CodecSettings) -> Result<(), CodecError> {
		Ok(())
	}
}

/// Translates domain elements into an external representation.
pub trait Encoder: Codec {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError>;
}

/// Translates an external representation into domain elements.
pub trait Decoder: Codec {
	fn decode(&self, document: &EncodedDocument) -> Result<Element, CodecError>;
}
