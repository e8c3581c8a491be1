//! Dispatch keys and codec contracts.
//!
//! This crate holds the vocabulary shared by codec implementations and the
//! registry that selects among them:
//! - [`Key`] / [`CompositeKey`]: what a codec can translate, with a similarity order
//! - [`DomainType`] / [`Element`]: the closed set of domain values codecs exchange
//! - [`Codec`], [`Encoder`], [`Decoder`]: the plugin contracts
//! - [`EncoderPlugin`] / [`DecoderPlugin`]: `inventory` descriptors for discovery

pub mod codec;
pub mod domain;
pub mod error;
pub mod key;
pub mod plugin;

pub use codec::{Codec, CodecSettings, Decoder, Encoder, NamespacePrefix, SchemaLocation};
pub use domain::{DomainDocument, DomainType, Element, EncodedDocument, ServiceException, ServiceRequest, ServiceResponse};
pub use error::CodecError;
pub use key::{
	ANY_VERSION, CompositeKey, DomainTypeKey, Key, MediaType, NamespaceKey, OperationDecoderKey, OperationKey, ResponseFormatKey, XmlTypeKey,
};
pub use plugin::{DecoderPlugin, EncoderPlugin};
