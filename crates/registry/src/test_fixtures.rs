//! Configurable codecs shared by unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use ows_codec::{
	Codec, CodecError, CodecSettings, Decoder, DomainDocument, DomainType, Element, EncodedDocument, Encoder, Key, MediaType, NamespacePrefix,
	SchemaLocation,
};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::discovery::{CodecFamily, Discovery, StaticDiscovery};
use crate::error::LoadError;
use crate::index::CodecIndex;

/// A codec that declares whatever the test hands it and works as encoder or decoder.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fixture {
	pub name: String,
	pub keys: Vec<Key>,
	pub response_formats: Vec<(String, String, String)>,
	pub procedure_formats: Vec<(String, String, String)>,
	pub prefixes: Vec<NamespacePrefix>,
	pub schemas: Vec<SchemaLocation>,
	pub verbose: bool,
}

impl Fixture {
	pub fn new(name: &str, keys: impl IntoIterator<Item = Key>) -> Self {
		Self {
			name: name.to_string(),
			keys: keys.into_iter().collect(),
			..Self::default()
		}
	}

	pub fn response_format(mut self, service: &str, version: &str, format: &str) -> Self {
		self.response_formats.push((service.into(), version.into(), format.into()));
		self
	}

	pub fn procedure_format(mut self, service: &str, version: &str, format: &str) -> Self {
		self.procedure_formats.push((service.into(), version.into(), format.into()));
		self
	}

	pub fn prefix(mut self, namespace: &str, prefix: &str) -> Self {
		self.prefixes.push(NamespacePrefix::new(namespace, prefix));
		self
	}

	pub fn schema(mut self, namespace: &str, location: &str) -> Self {
		self.schemas.push(SchemaLocation::new(namespace, location));
		self
	}
}

fn formats_for(entries: &[(String, String, String)], service: &str, version: &str) -> BTreeSet<String> {
	entries
		.iter()
		.filter(|(s, v, _)| s == service && v == version)
		.map(|(_, _, format)| format.clone())
		.collect()
}

impl Codec for Fixture {
	fn name(&self) -> &str {
		&self.name
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn supported_response_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		formats_for(&self.response_formats, service, version)
	}

	fn supported_procedure_description_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		formats_for(&self.procedure_formats, service, version)
	}

	fn schema_locations(&self) -> Vec<SchemaLocation> {
		self.schemas.clone()
	}

	fn namespace_prefixes(&self) -> Vec<NamespacePrefix> {
		self.prefixes.clone()
	}

	fn configure(&mut self, settings: &CodecSettings) -> Result<(), CodecError> {
		if let Some(reason) = settings.option("reject") {
			return Err(CodecError::InvalidSetting {
				key: "reject".into(),
				reason: reason.into(),
			});
		}
		self.verbose = settings.verbose_errors;
		Ok(())
	}
}

impl Encoder for Fixture {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError> {
		Ok(EncodedDocument::new(
			MediaType::application_xml(),
			"urn:fixture",
			format!("{}:{}:{}", self.name, element.domain_type(), self.verbose),
		))
	}
}

impl Decoder for Fixture {
	fn decode(&self, document: &EncodedDocument) -> Result<Element, CodecError> {
		Ok(Element::Document(DomainDocument {
			kind: DomainType::Any,
			body: format!("{}:{}", self.name, document.content),
		}))
	}
}

pub(crate) fn encoder_index(fixtures: Vec<Fixture>) -> CodecIndex<dyn Encoder> {
	let codecs = fixtures.into_iter().map(|fixture| Arc::new(fixture) as Arc<dyn Encoder>).collect();
	CodecIndex::build(codecs, 16)
}

pub(crate) fn encoders(fixtures: Vec<Fixture>) -> StaticDiscovery<dyn Encoder> {
	let mut discovery = StaticDiscovery::new();
	for fixture in fixtures {
		let name = fixture.name.clone();
		discovery.push(name, move || -> Result<Box<dyn Encoder>, CodecError> { Ok(Box::new(fixture.clone())) });
	}
	discovery
}

pub(crate) fn decoders(fixtures: Vec<Fixture>) -> StaticDiscovery<dyn Decoder> {
	let mut discovery = StaticDiscovery::new();
	for fixture in fixtures {
		let name = fixture.name.clone();
		discovery.push(name, move || -> Result<Box<dyn Decoder>, CodecError> { Ok(Box::new(fixture.clone())) });
	}
	discovery
}

/// Discovery whose output tests swap between loads.
pub(crate) struct Switchable {
	fixtures: Mutex<Result<Vec<Fixture>, String>>,
}

impl Switchable {
	pub fn new(fixtures: Vec<Fixture>) -> Arc<Self> {
		Arc::new(Self {
			fixtures: Mutex::new(Ok(fixtures)),
		})
	}

	pub fn set(&self, fixtures: Vec<Fixture>) {
		*self.fixtures.lock() = Ok(fixtures);
	}

	pub fn fail(&self, reason: &str) {
		*self.fixtures.lock() = Err(reason.to_string());
	}

	fn produce<C: CodecFamily + ?Sized>(&self, wrap: fn(Fixture) -> Box<C>) -> Result<Vec<Box<C>>, LoadError> {
		match &*self.fixtures.lock() {
			Ok(fixtures) => Ok(fixtures.iter().cloned().map(wrap).collect()),
			Err(reason) => Err(LoadError::Discovery {
				registry: C::LABEL,
				reason: reason.clone(),
			}),
		}
	}
}

impl Discovery<dyn Encoder> for Switchable {
	fn discover(&self) -> Result<Vec<Box<dyn Encoder>>, LoadError> {
		self.produce::<dyn Encoder>(|fixture| -> Box<dyn Encoder> { Box::new(fixture) })
	}
}

impl Discovery<dyn Decoder> for Switchable {
	fn discover(&self) -> Result<Vec<Box<dyn Decoder>>, LoadError> {
		self.produce::<dyn Decoder>(|fixture| -> Box<dyn Decoder> { Box::new(fixture) })
	}
}

/// One captured tracing event: its message and its fields rendered as strings.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedEvent {
	pub message: String,
	pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value.as_str())
	}
}

impl Visit for CapturedEvent {
	fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{value:?}");
		} else {
			self.fields.push((field.name().to_string(), format!("{value:?}")));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.push((field.name().to_string(), value.to_string()));
		}
	}
}

/// Layer recording every event emitted while it is installed.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog {
	events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventLog {
	/// Runs `f` with this log installed as the thread's default subscriber.
	pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
		let subscriber = tracing_subscriber::registry().with(self.clone());
		tracing::subscriber::with_default(subscriber, f)
	}

	/// Events whose message is `message`.
	pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
		self.events.lock().iter().filter(|event| event.message == message).cloned().collect()
	}
}

impl<S: Subscriber> Layer<S> for EventLog {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut captured = CapturedEvent::default();
		event.record(&mut captured);
		self.events.lock().push(captured);
	}
}
