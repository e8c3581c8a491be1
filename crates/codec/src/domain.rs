//! Domain element categories and the values handed to codecs.
//!
//! # Role
//!
//! [`DomainType`] is the closed set of element categories codecs dispatch on. Each
//! category has at most one parent, rooted at [`DomainType::Any`]; the number of
//! parent steps between a declared category and a queried one is the similarity
//! distance used by [`crate::key::Key::similarity`].
//!
//! [`Element`] carries a concrete value of one of those categories. Call sites
//! match on the variant instead of probing the value's type.

use std::collections::BTreeMap;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::key::{Key, MediaType, NamespaceKey, OperationKey, XmlTypeKey};

/// Category of a domain element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DomainType {
	/// Root of the hierarchy; matches every category.
	Any,
	Request,
	GetCapabilitiesRequest,
	DescribeSensorRequest,
	GetObservationRequest,
	GetFeatureOfInterestRequest,
	InsertObservationRequest,
	Response,
	GetCapabilitiesResponse,
	DescribeSensorResponse,
	GetObservationResponse,
	GetFeatureOfInterestResponse,
	InsertObservationResponse,
	Exception,
	OwsExceptionReport,
	Observation,
	OmObservation,
	Feature,
	SamplingFeature,
	ProcedureDescription,
	SensorMl,
}

impl DomainType {
	/// Returns the direct parent category, or `None` for [`DomainType::Any`].
	pub const fn parent(self) -> Option<DomainType> {
		use DomainType::*;
		match self {
			Any => None,
			Request | Response | Exception | Observation | Feature | ProcedureDescription => Some(Any),
			GetCapabilitiesRequest | DescribeSensorRequest | GetObservationRequest | GetFeatureOfInterestRequest | InsertObservationRequest => {
				Some(Request)
			}
			GetCapabilitiesResponse
			| DescribeSensorResponse
			| GetObservationResponse
			| GetFeatureOfInterestResponse
			| InsertObservationResponse => Some(Response),
			OwsExceptionReport => Some(Exception),
			OmObservation => Some(Observation),
			SamplingFeature => Some(Feature),
			SensorMl => Some(ProcedureDescription),
		}
	}

	/// Number of parent steps from `self` up to `ancestor`.
	///
	/// Returns `Some(0)` when both are equal and `None` when `ancestor` is not on
	/// the parent chain of `self`.
	pub fn distance_to(self, ancestor: DomainType) -> Option<u32> {
		let mut current = Some(self);
		let mut steps = 0;
		while let Some(kind) = current {
			if kind == ancestor {
				return Some(steps);
			}
			current = kind.parent();
			steps += 1;
		}
		None
	}

	/// Returns true if `self` is `other` or one of its ancestors.
	#[inline]
	pub fn is_ancestor_of(self, other: DomainType) -> bool {
		other.distance_to(self).is_some()
	}
}

/// A protocol request handed to or produced by a codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
	pub operation: OperationKey,
	pub kind: DomainType,
	pub parameters: BTreeMap<String, String>,
}

impl ServiceRequest {
	pub fn new(operation: OperationKey, kind: DomainType) -> Self {
		Self {
			operation,
			kind,
			parameters: BTreeMap::new(),
		}
	}

	/// Adds a request parameter, replacing any previous value.
	pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parameters.insert(name.into(), value.into());
		self
	}
}

/// An operation response awaiting encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
	pub operation: OperationKey,
	pub kind: DomainType,
	/// Response format requested by the client, if any.
	pub response_format: Option<String>,
	pub body: String,
}

/// Service exception content as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceException {
	pub code: String,
	pub locator: Option<String>,
	pub message: String,
	/// Diagnostic detail, only rendered by codecs configured for verbose output.
	pub detail: Option<String>,
}

impl ServiceException {
	pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			locator: None,
			message: message.into(),
			detail: None,
		}
	}

	pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
		self.locator = Some(locator.into());
		self
	}

	pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
		self.detail = Some(detail.into());
		self
	}
}

/// Any other domain document (observations, features, procedure descriptions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDocument {
	pub kind: DomainType,
	pub body: String,
}

/// A domain value exchanged with codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
	Request(ServiceRequest),
	Response(ServiceResponse),
	Exception(ServiceException),
	Document(DomainDocument),
}

impl Element {
	/// Returns the category of the carried value.
	pub fn domain_type(&self) -> DomainType {
		match self {
			Element::Request(request) => request.kind,
			Element::Response(response) => response.kind,
			Element::Exception(_) => DomainType::OwsExceptionReport,
			Element::Document(document) => document.kind,
		}
	}

	/// Dispatch key for encoding this element into `namespace`.
	pub fn key_in(&self, namespace: &str) -> Key {
		Key::Xml(XmlTypeKey::new(namespace, self.domain_type()))
	}
}

/// Output of an encoder and input of a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
	pub media_type: MediaType,
	pub namespace: String,
	pub content: String,
}

impl EncodedDocument {
	pub fn new(media_type: MediaType, namespace: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			media_type,
			namespace: namespace.into(),
			content: content.into(),
		}
	}

	/// Dispatch key for decoding this document.
	pub fn dispatch_key(&self) -> Key {
		Key::Namespace(NamespaceKey::new(self.namespace.as_str()))
	}
}
