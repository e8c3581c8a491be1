use ows_codec::{CodecError, Key};
use thiserror::Error;

use crate::capability::{CapabilityKey, FormatKind};
use crate::config::ConfigError;

/// Failure while discovering or configuring a codec set. Always fatal to the load.
#[derive(Debug, Error)]
pub enum LoadError {
	/// A discovered codec could not be constructed.
	#[error("failed to construct {registry} '{name}': {source}")]
	Construct {
		registry: &'static str,
		name: String,
		#[source]
		source: CodecError,
	},
	/// The configuration collaborator rejected a codec's settings.
	#[error("failed to configure {registry} '{name}': {source}")]
	Configure {
		registry: &'static str,
		name: String,
		#[source]
		source: CodecError,
	},
	/// The discovery collaborator itself failed.
	#[error("{registry} discovery failed: {reason}")]
	Discovery { registry: &'static str, reason: String },
}

/// Failure while building a capability catalog.
#[derive(Debug, Error)]
pub enum CapabilityError {
	/// The activation collaborator could not report a status.
	#[error("activation status unavailable for {kind} {key}: {reason}")]
	Activation { kind: FormatKind, key: CapabilityKey, reason: String },
}

/// Top level error for repository operations.
#[derive(Debug, Error)]
pub enum RegistryError {
	#[error(transparent)]
	Load(#[from] LoadError),

	#[error("capability build failed: {0}")]
	Capability(#[from] CapabilityError),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("no encoder for {0}")]
	NoEncoder(Key),

	#[error("no decoder for {0}")]
	NoDecoder(Key),

	#[error("codec '{codec}' failed: {source}")]
	Codec {
		codec: String,
		#[source]
		source: CodecError,
	},
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
