use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CodecError;

const WILDCARD: &str = "*";

/// A parsed `type/subtype; name=value` media type.
///
/// Type, subtype and parameter names are lowercased on parse; parameters are
/// kept sorted so equal media types hash equally regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaType {
	kind: Arc<str>,
	subtype: Arc<str>,
	parameters: Arc<[(Arc<str>, Arc<str>)]>,
}

impl MediaType {
	/// Creates a media type without parameters.
	pub fn new(kind: &str, subtype: &str) -> Self {
		Self {
			kind: Arc::from(kind.to_ascii_lowercase()),
			subtype: Arc::from(subtype.to_ascii_lowercase()),
			parameters: Arc::from([]),
		}
	}

	/// `*/*`.
	pub fn any() -> Self {
		Self::new(WILDCARD, WILDCARD)
	}

	pub fn application_xml() -> Self {
		Self::new("application", "xml")
	}

	pub fn text_xml() -> Self {
		Self::new("text", "xml")
	}

	pub fn application_json() -> Self {
		Self::new("application", "json")
	}

	/// Returns a copy with `name=value` added (or replaced).
	pub fn with_parameter(&self, name: &str, value: &str) -> Self {
		let name: Arc<str> = Arc::from(name.to_ascii_lowercase());
		let mut parameters: Vec<_> = self.parameters.iter().filter(|(n, _)| *n != name).cloned().collect();
		parameters.push((name, Arc::from(value)));
		parameters.sort();
		Self {
			kind: self.kind.clone(),
			subtype: self.subtype.clone(),
			parameters: Arc::from(parameters),
		}
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn subtype(&self) -> &str {
		&self.subtype
	}

	pub fn parameter(&self, name: &str) -> Option<&str> {
		self.parameters.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_ref())
	}

	/// Distance from this (declared) media type to `query`.
	///
	/// Each wildcard component of `self` that stands in for a concrete component
	/// of `query` costs 1. Every parameter of `self` must appear in `query` with
	/// the same value; each extra parameter on `query` costs 1.
	pub fn similarity(&self, query: &MediaType) -> i32 {
		let Some(kind) = component_distance(&self.kind, &query.kind) else {
			return -1;
		};
		let Some(subtype) = component_distance(&self.subtype, &query.subtype) else {
			return -1;
		};
		if self.parameters.iter().any(|(n, v)| query.parameter(n) != Some(v.as_ref())) {
			return -1;
		}
		let extra = query.parameters.len().saturating_sub(self.parameters.len());
		kind + subtype + extra as i32
	}
}

fn component_distance(declared: &str, query: &str) -> Option<i32> {
	if declared == query {
		Some(0)
	} else if declared == WILDCARD {
		Some(1)
	} else {
		None
	}
}

impl FromStr for MediaType {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || CodecError::InvalidMediaType(s.to_string());
		let mut parts = s.split(';');
		let essence = parts.next().map(str::trim).ok_or_else(invalid)?;
		let (kind, subtype) = essence.split_once('/').ok_or_else(invalid)?;
		let (kind, subtype) = (kind.trim(), subtype.trim());
		if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
			return Err(invalid());
		}
		let mut media_type = MediaType::new(kind, subtype);
		for parameter in parts {
			let parameter = parameter.trim();
			if parameter.is_empty() {
				continue;
			}
			let (name, value) = parameter.split_once('=').ok_or_else(invalid)?;
			let value = value.trim().trim_matches('"');
			media_type = media_type.with_parameter(name.trim(), value);
		}
		Ok(media_type)
	}
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.kind, self.subtype)?;
		for (name, value) in self.parameters.iter() {
			write!(f, "; {name}={value}")?;
		}
		Ok(())
	}
}
