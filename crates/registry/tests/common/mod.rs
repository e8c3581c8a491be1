#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use ows_codec::{Codec, CodecError, Decoder, DomainDocument, Element, EncodedDocument, Encoder, Key, MediaType};
use ows_registry::{Discovery, LoadError, StaticDiscovery};
use parking_lot::Mutex;

pub const SOS: &str = "SOS";
pub const V2: &str = "2.0.0";

/// Encoder and decoder declaring a fixed key set and response formats for SOS 2.0.0.
#[derive(Debug, Clone)]
pub struct Stub {
	pub name: &'static str,
	pub keys: Vec<Key>,
	pub formats: Vec<&'static str>,
}

impl Stub {
	pub fn new(name: &'static str, keys: impl IntoIterator<Item = Key>) -> Self {
		Self {
			name,
			keys: keys.into_iter().collect(),
			formats: Vec::new(),
		}
	}

	pub fn formats(mut self, formats: &[&'static str]) -> Self {
		self.formats.extend_from_slice(formats);
		self
	}
}

impl Codec for Stub {
	fn name(&self) -> &str {
		self.name
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn supported_response_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		if service == SOS && version == V2 {
			self.formats.iter().map(|format| format.to_string()).collect()
		} else {
			BTreeSet::new()
		}
	}
}

impl Encoder for Stub {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError> {
		Ok(EncodedDocument::new(MediaType::text_xml(), "urn:stub", format!("{}:{}", self.name, element.domain_type())))
	}
}

impl Decoder for Stub {
	fn decode(&self, document: &EncodedDocument) -> Result<Element, CodecError> {
		Ok(Element::Document(DomainDocument {
			kind: ows_codec::DomainType::Any,
			body: format!("{}:{}", self.name, document.content),
		}))
	}
}

pub fn encoders(stubs: Vec<Stub>) -> StaticDiscovery<dyn Encoder> {
	let mut discovery = StaticDiscovery::new();
	for stub in stubs {
		discovery.push(stub.name, move || -> Result<Box<dyn Encoder>, CodecError> { Ok(Box::new(stub.clone())) });
	}
	discovery
}

pub fn decoders(stubs: Vec<Stub>) -> StaticDiscovery<dyn Decoder> {
	let mut discovery = StaticDiscovery::new();
	for stub in stubs {
		discovery.push(stub.name, move || -> Result<Box<dyn Decoder>, CodecError> { Ok(Box::new(stub.clone())) });
	}
	discovery
}

/// Decoder discovery whose result can be replaced between loads.
pub struct Swappable {
	next: Mutex<Result<Vec<Stub>, String>>,
}

impl Swappable {
	pub fn new(stubs: Vec<Stub>) -> Arc<Self> {
		Arc::new(Self { next: Mutex::new(Ok(stubs)) })
	}

	pub fn set(&self, stubs: Vec<Stub>) {
		*self.next.lock() = Ok(stubs);
	}

	pub fn fail(&self, reason: &str) {
		*self.next.lock() = Err(reason.to_string());
	}
}

impl Discovery<dyn Decoder> for Swappable {
	fn discover(&self) -> Result<Vec<Box<dyn Decoder>>, LoadError> {
		match &*self.next.lock() {
			Ok(stubs) => Ok(stubs
				.iter()
				.cloned()
				.map(|stub| -> Box<dyn Decoder> { Box::new(stub) })
				.collect()),
			Err(reason) => Err(LoadError::Discovery {
				registry: "decoder",
				reason: reason.clone(),
			}),
		}
	}
}

pub fn names<C: Codec + ?Sized>(codecs: &[Arc<C>]) -> Vec<String> {
	codecs.iter().map(|codec| codec.name().to_string()).collect()
}
