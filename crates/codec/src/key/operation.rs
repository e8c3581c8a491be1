use std::fmt;
use std::sync::Arc;

use super::MediaType;

/// Version placeholder matching every version of a service.
pub const ANY_VERSION: &str = "*";

/// (service, version, operation) triple identifying a protocol operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
	service: Arc<str>,
	version: Arc<str>,
	operation: Arc<str>,
}

impl OperationKey {
	pub fn new(service: &str, version: &str, operation: &str) -> Self {
		Self {
			service: Arc::from(service),
			version: Arc::from(version),
			operation: Arc::from(operation),
		}
	}

	/// Operation key matching every version of `service`.
	pub fn any_version(service: &str, operation: &str) -> Self {
		Self::new(service, ANY_VERSION, operation)
	}

	pub fn service(&self) -> &str {
		&self.service
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn operation(&self) -> &str {
		&self.operation
	}

	/// Service and operation must be equal; a declared [`ANY_VERSION`] matches any
	/// concrete version at distance 1.
	pub fn similarity(&self, query: &OperationKey) -> i32 {
		if self.service != query.service || self.operation != query.operation {
			return -1;
		}
		if self.version == query.version {
			0
		} else if &*self.version == ANY_VERSION {
			1
		} else {
			-1
		}
	}
}

impl fmt::Display for OperationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.service, self.version, self.operation)
	}
}

/// Operation request decoder key: an operation received in a given media type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationDecoderKey {
	pub operation: OperationKey,
	pub media_type: MediaType,
}

impl OperationDecoderKey {
	pub fn new(operation: OperationKey, media_type: MediaType) -> Self {
		Self { operation, media_type }
	}

	pub fn similarity(&self, query: &OperationDecoderKey) -> i32 {
		let operation = self.operation.similarity(&query.operation);
		let media_type = self.media_type.similarity(&query.media_type);
		if operation < 0 || media_type < 0 {
			return -1;
		}
		operation + media_type
	}
}

impl fmt::Display for OperationDecoderKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} [{}]", self.operation, self.media_type)
	}
}

/// Response encoder key: an operation response rendered in a named response format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseFormatKey {
	pub operation: OperationKey,
	format: Arc<str>,
}

impl ResponseFormatKey {
	pub fn new(operation: OperationKey, format: &str) -> Self {
		Self {
			operation,
			format: Arc::from(format),
		}
	}

	pub fn format(&self) -> &str {
		&self.format
	}

	/// Formats are compared exactly; the operation follows [`OperationKey::similarity`].
	pub fn similarity(&self, query: &ResponseFormatKey) -> i32 {
		if self.format != query.format {
			return -1;
		}
		self.operation.similarity(&query.operation)
	}
}

impl fmt::Display for ResponseFormatKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} as {}", self.operation, self.format)
	}
}
