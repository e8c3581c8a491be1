//! Link-time codec descriptors collected with `inventory`.
//!
//! Codec crates submit descriptors:
//!
//! ```ignore
//! inventory::submit! {
//!     ows_codec::EncoderPlugin::new("ows-exception-report", || Ok(Box::new(ExceptionReportEncoder::default())))
//! }
//! ```
//!
//! and the registry's `InventoryDiscovery` instantiates every submitted codec on
//! each load.

use crate::codec::{Decoder, Encoder};
use crate::error::CodecError;

/// Constructor for a boxed encoder.
pub type EncoderFactory = fn() -> Result<Box<dyn Encoder>, CodecError>;

/// Constructor for a boxed decoder.
pub type DecoderFactory = fn() -> Result<Box<dyn Decoder>, CodecError>;

/// Descriptor for an encoder discovered at link time.
pub struct EncoderPlugin {
	/// Name reported when construction fails.
	pub name: &'static str,
	pub build: EncoderFactory,
}

inventory::collect!(EncoderPlugin);

impl EncoderPlugin {
	pub const fn new(name: &'static str, build: EncoderFactory) -> Self {
		Self { name, build }
	}
}

/// Descriptor for a decoder discovered at link time.
pub struct DecoderPlugin {
	/// Name reported when construction fails.
	pub name: &'static str,
	pub build: DecoderFactory,
}

inventory::collect!(DecoderPlugin);

impl DecoderPlugin {
	pub const fn new(name: &'static str, build: DecoderFactory) -> Self {
		Self { name, build }
	}
}
