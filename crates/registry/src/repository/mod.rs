//! Codec repository facade.
//!
//! # Role
//!
//! [`CodecRepository`] is the explicit, shareable handle consumers query for
//! encoders, decoders, capability formats, namespace prefixes and schema
//! locations. It owns the collaborators and republishes everything on
//! [`CodecRepository::reload`].
//!
//! # Concurrency
//!
//! - The current [`Generation`] is published through one `ArcSwap`; readers load
//!   it wait-free and use that snapshot for the whole call.
//! - Reloads and capability rebuilds are serialized by `reload_lock`.
//!
//! # Invariants
//!
//! - A reload is atomic for observers: encoders, decoders, namespaces and schema
//!   locations change together (tested by `reload_publishes_tables_together`).
//! - A failed reload keeps the previous generation (tested by
//!   `failing_reload_keeps_previous_generation`).
//! - Capability catalogs change only when both catalogs build successfully
//!   (tested by `failed_capability_build_keeps_catalogs`).

mod generation;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
pub use generation::Generation;
use generation::Sources;
use ows_codec::{Decoder, Element, EncodedDocument, Encoder, Key, SchemaLocation};
use parking_lot::Mutex;

use crate::capability::{
	ActivationSettings, ActivationSource, BuildSummary, CapabilityKey, DeclaredFormats, FormatCatalog, FormatKind, ServiceOperators,
	ServiceVersion, collect_declared,
};
use crate::config::{DEFAULT_CACHE_CAPACITY, RegistryConfig};
use crate::discovery::{Configurator, Discovery, InventoryDiscovery, NoopConfigurator, SettingsConfigurator};
use crate::error::{CapabilityError, RegistryError, Result};

/// Outcome of a successful [`CodecRepository::reload`].
#[derive(Debug)]
pub struct ReloadReport {
	pub generation: u64,
	pub encoders: usize,
	pub decoders: usize,
	/// Set when the catalogs could not be rebuilt for the new codec set. The new
	/// generation is published regardless; the catalogs keep their previous content.
	pub capability_error: Option<CapabilityError>,
}

/// Tuple counts of both catalogs after a capability build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySummary {
	pub response_formats: BuildSummary,
	pub procedure_description_formats: BuildSummary,
}

/// Assembles a [`CodecRepository`] from its collaborators.
pub struct RepositoryBuilder {
	encoders: Box<dyn Discovery<dyn Encoder>>,
	decoders: Box<dyn Discovery<dyn Decoder>>,
	encoder_config: Arc<dyn Configurator<dyn Encoder>>,
	decoder_config: Arc<dyn Configurator<dyn Decoder>>,
	activation: Box<dyn ActivationSource>,
	services: Box<dyn ServiceOperators>,
	cache_capacity: usize,
}

impl Default for RepositoryBuilder {
	fn default() -> Self {
		Self {
			encoders: Box::new(InventoryDiscovery),
			decoders: Box::new(InventoryDiscovery),
			encoder_config: Arc::new(NoopConfigurator),
			decoder_config: Arc::new(NoopConfigurator),
			activation: Box::new(ActivationSettings::default()),
			services: Box::new(Vec::<ServiceVersion>::new()),
			cache_capacity: DEFAULT_CACHE_CAPACITY,
		}
	}
}

impl RepositoryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn encoders(mut self, discovery: impl Discovery<dyn Encoder> + 'static) -> Self {
		self.encoders = Box::new(discovery);
		self
	}

	pub fn decoders(mut self, discovery: impl Discovery<dyn Decoder> + 'static) -> Self {
		self.decoders = Box::new(discovery);
		self
	}

	/// Configurator applied to every encoder and decoder before publication.
	pub fn configurator<T>(mut self, configurator: T) -> Self
	where
		T: Configurator<dyn Encoder> + Configurator<dyn Decoder> + 'static,
	{
		let shared = Arc::new(configurator);
		self.encoder_config = shared.clone();
		self.decoder_config = shared;
		self
	}

	pub fn activation(mut self, activation: impl ActivationSource + 'static) -> Self {
		self.activation = Box::new(activation);
		self
	}

	pub fn services(mut self, services: impl ServiceOperators + 'static) -> Self {
		self.services = Box::new(services);
		self
	}

	pub fn cache_capacity(mut self, capacity: usize) -> Self {
		self.cache_capacity = capacity;
		self
	}

	/// Applies cache capacity, codec settings, activation flags and services from `config`.
	pub fn with_config(self, config: &RegistryConfig) -> Self {
		self.cache_capacity(config.cache.capacity)
			.configurator(SettingsConfigurator::new(config.codecs.clone()))
			.activation(config.activation.clone())
			.services(config.service_versions())
	}

	/// Loads the first generation and builds both catalogs. Any failure is returned
	/// and no repository is created.
	pub fn build(self) -> Result<CodecRepository> {
		let first = Generation::load(1, &self.sources())?;
		let repository = CodecRepository {
			current: ArcSwap::from_pointee(first),
			reload_lock: Mutex::new(()),
			response_formats: FormatCatalog::new(FormatKind::ResponseFormat),
			procedure_formats: FormatCatalog::new(FormatKind::ProcedureDescriptionFormat),
			builder: self,
		};
		let generation = repository.current.load_full();
		repository.build_capabilities(&generation)?;
		tracing::info!(
			generation = generation.id(),
			encoders = generation.encoders().len(),
			decoders = generation.decoders().len(),
			"codec repository loaded"
		);
		Ok(repository)
	}

	fn sources(&self) -> Sources<'_> {
		Sources {
			encoders: &*self.encoders,
			decoders: &*self.decoders,
			encoder_config: &*self.encoder_config,
			decoder_config: &*self.decoder_config,
			cache_capacity: self.cache_capacity,
		}
	}
}

/// Shared handle to the published codec set and capability catalogs.
pub struct CodecRepository {
	current: ArcSwap<Generation>,
	reload_lock: Mutex<()>,
	response_formats: FormatCatalog,
	procedure_formats: FormatCatalog,
	builder: RepositoryBuilder,
}

impl CodecRepository {
	pub fn builder() -> RepositoryBuilder {
		RepositoryBuilder::new()
	}

	/// Current generation. Stays valid after later reloads.
	pub fn snapshot(&self) -> Arc<Generation> {
		self.current.load_full()
	}

	pub fn generation(&self) -> u64 {
		self.current.load().id()
	}

	/// Most specific encoder for `key`, narrowed by `extra` keys when given.
	pub fn get_encoder(&self, key: &Key, extra: &[Key]) -> Option<Arc<dyn Encoder>> {
		self.current.load().encoders().lookup(&query(key, extra))
	}

	/// Most specific decoder for `key`, narrowed by `extra` keys when given.
	pub fn get_decoder(&self, key: &Key, extra: &[Key]) -> Option<Arc<dyn Decoder>> {
		self.current.load().decoders().lookup(&query(key, extra))
	}

	pub fn has_encoder(&self, key: &Key, extra: &[Key]) -> bool {
		self.get_encoder(key, extra).is_some()
	}

	pub fn has_decoder(&self, key: &Key, extra: &[Key]) -> bool {
		self.get_decoder(key, extra).is_some()
	}

	/// Encodes `element` with the most specific encoder for `namespace`.
	pub fn encode(&self, namespace: &str, element: &Element) -> Result<EncodedDocument> {
		let key = element.key_in(namespace);
		let encoder = self.get_encoder(&key, &[]).ok_or(RegistryError::NoEncoder(key))?;
		encoder.encode(element).map_err(|source| RegistryError::Codec {
			codec: encoder.name().to_string(),
			source,
		})
	}

	/// Decodes `document` with the most specific decoder for its namespace.
	pub fn decode(&self, document: &EncodedDocument) -> Result<Element> {
		let key = document.dispatch_key();
		let decoder = self.get_decoder(&key, &[]).ok_or(RegistryError::NoDecoder(key))?;
		decoder.decode(document).map_err(|source| RegistryError::Codec {
			codec: decoder.name().to_string(),
			source,
		})
	}

	pub fn encoder_keys(&self) -> Vec<Key> {
		self.current.load().encoders().keys()
	}

	pub fn decoder_keys(&self) -> Vec<Key> {
		self.current.load().decoders().keys()
	}

	/// Active response formats for `service`/`version`.
	pub fn get_supported_response_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		self.response_formats.active(service, version)
	}

	/// Every declared response format for `service`/`version`, active or not.
	pub fn get_all_supported_response_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		self.response_formats.all(service, version)
	}

	pub fn get_supported_procedure_description_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		self.procedure_formats.active(service, version)
	}

	pub fn get_all_supported_procedure_description_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		self.procedure_formats.all(service, version)
	}

	pub fn catalog(&self, kind: FormatKind) -> &FormatCatalog {
		match kind {
			FormatKind::ResponseFormat => &self.response_formats,
			FormatKind::ProcedureDescriptionFormat => &self.procedure_formats,
		}
	}

	/// Updates the flag of a known tuple; unknown tuples are ignored.
	pub fn set_active(&self, kind: FormatKind, key: &CapabilityKey, active: bool) -> bool {
		let updated = self.catalog(kind).set_active(key, active);
		if updated {
			tracing::debug!(kind = %kind, key = %key, active, "capability flag updated");
		}
		updated
	}

	pub fn get_schema_location(&self, namespace: &str) -> Option<SchemaLocation> {
		self.current.load().schemas().get(namespace).cloned()
	}

	pub fn get_prefix_for(&self, namespace: &str) -> Option<String> {
		self.current.load().namespaces().prefix_for(namespace).map(str::to_string)
	}

	pub fn get_namespace_for(&self, prefix: &str) -> Option<String> {
		self.current.load().namespaces().namespace_for(prefix).map(str::to_string)
	}

	/// Rediscovers both codec families and publishes them as the next generation.
	///
	/// On a load failure the current generation stays published and the error is
	/// returned. A capability failure does not undo the publication; it is reported
	/// in [`ReloadReport::capability_error`].
	pub fn reload(&self) -> Result<ReloadReport> {
		let _reload = self.reload_lock.lock();
		let id = self.current.load().id() + 1;

		let next = match Generation::load(id, &self.builder.sources()) {
			Ok(generation) => Arc::new(generation),
			Err(error) => {
				tracing::warn!(generation = id - 1, %error, "reload failed, keeping previous codec set");
				return Err(error.into());
			}
		};
		self.current.store(Arc::clone(&next));
		tracing::info!(
			generation = id,
			encoders = next.encoders().len(),
			decoders = next.decoders().len(),
			"codec repository reloaded"
		);

		let capability_error = self
			.build_capabilities(&next)
			.inspect_err(|error| tracing::warn!(generation = id, %error, "capability build failed, keeping previous catalogs"))
			.err();

		Ok(ReloadReport {
			generation: id,
			encoders: next.encoders().len(),
			decoders: next.decoders().len(),
			capability_error,
		})
	}

	/// Rebuilds both catalogs from the current generation.
	pub fn rebuild_capabilities(&self) -> Result<CapabilitySummary> {
		let _reload = self.reload_lock.lock();
		let generation = self.current.load_full();
		Ok(self.build_capabilities(&generation)?)
	}

	/// Prepares both catalogs before committing either, so a failure leaves both untouched.
	fn build_capabilities(&self, generation: &Generation) -> Result<CapabilitySummary, CapabilityError> {
		let services = self.builder.services.service_versions();
		let activation = &*self.builder.activation;

		let declared = |kind: FormatKind| {
			let mut formats = DeclaredFormats::new();
			collect_declared(kind, &services, generation.encoders().codecs(), &mut formats);
			collect_declared(kind, &services, generation.decoders().codecs(), &mut formats);
			formats
		};

		// Lock order: response, then procedure.
		let _response_build = self.response_formats.lock_builds();
		let _procedure_build = self.procedure_formats.lock_builds();
		let response = self.response_formats.prepare(declared(FormatKind::ResponseFormat), activation)?;
		let procedure = self
			.procedure_formats
			.prepare(declared(FormatKind::ProcedureDescriptionFormat), activation)?;

		Ok(CapabilitySummary {
			response_formats: self.response_formats.commit(response),
			procedure_description_formats: self.procedure_formats.commit(procedure),
		})
	}
}

impl std::fmt::Debug for CodecRepository {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CodecRepository")
			.field("generation", &self.generation())
			.field("response_formats", &self.response_formats)
			.field("procedure_formats", &self.procedure_formats)
			.finish()
	}
}

/// Folds `extra` into a composite query; a plain key when there is nothing extra.
fn query(key: &Key, extra: &[Key]) -> Key {
	if extra.is_empty() {
		return key.clone();
	}
	let head: Vec<Key> = match key {
		Key::Composite(composite) => composite.members().to_vec(),
		other => vec![other.clone()],
	};
	Key::composite(head.into_iter().chain(extra.iter().cloned()))
}
