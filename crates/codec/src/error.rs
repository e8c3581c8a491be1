use thiserror::Error;

use crate::domain::DomainType;

/// Errors raised by codecs while translating or being configured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	/// The codec does not translate this element category.
	#[error("unsupported element: {0}")]
	UnsupportedElement(DomainType),
	/// The document's media type is not handled by this codec.
	#[error("unsupported media type: {0}")]
	UnsupportedMediaType(String),
	/// A media type string could not be parsed.
	#[error("invalid media type: '{0}'")]
	InvalidMediaType(String),
	/// Input document is not well formed for this codec.
	#[error("malformed document: {0}")]
	Malformed(String),
	/// Output could not be written.
	#[error("failed to write document: {0}")]
	Write(String),
	/// A configuration value was rejected.
	#[error("invalid setting '{key}': {reason}")]
	InvalidSetting {
		/// Setting name.
		key: String,
		/// Why the value was rejected.
		reason: String,
	},
	/// The codec could not be constructed.
	#[error("construction failed: {0}")]
	Construction(String),
}
