use ows_codec::{Decoder, Encoder};

use crate::discovery::{self, Configurator, Discovery};
use crate::error::LoadError;
use crate::index::CodecIndex;
use crate::namespace::{NamespaceTable, SchemaTable};

/// One published codec set: both registries and the tables derived from them.
///
/// Immutable once built. Readers holding an `Arc<Generation>` keep seeing the same
/// codecs while a reload publishes the next generation.
#[derive(Debug)]
pub struct Generation {
	id: u64,
	encoders: CodecIndex<dyn Encoder>,
	decoders: CodecIndex<dyn Decoder>,
	namespaces: NamespaceTable,
	schemas: SchemaTable,
}

pub(crate) struct Sources<'a> {
	pub encoders: &'a dyn Discovery<dyn Encoder>,
	pub decoders: &'a dyn Discovery<dyn Decoder>,
	pub encoder_config: &'a dyn Configurator<dyn Encoder>,
	pub decoder_config: &'a dyn Configurator<dyn Decoder>,
	pub cache_capacity: usize,
}

impl Generation {
	/// Discovers, configures and indexes both codec families.
	pub(crate) fn load(id: u64, sources: &Sources<'_>) -> Result<Self, LoadError> {
		let encoders = discovery::load(sources.encoders, sources.encoder_config)?;
		let decoders = discovery::load(sources.decoders, sources.decoder_config)?;

		let mut namespaces = NamespaceTable::new();
		let mut schemas = SchemaTable::new();
		for encoder in &encoders {
			namespaces.merge(&**encoder);
			schemas.merge(&**encoder);
		}
		for decoder in &decoders {
			namespaces.merge(&**decoder);
			schemas.merge(&**decoder);
		}

		Ok(Self {
			id,
			encoders: CodecIndex::build(encoders, sources.cache_capacity),
			decoders: CodecIndex::build(decoders, sources.cache_capacity),
			namespaces,
			schemas,
		})
	}

	/// Monotonic generation number; the first successful load is 1.
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn encoders(&self) -> &CodecIndex<dyn Encoder> {
		&self.encoders
	}

	pub fn decoders(&self) -> &CodecIndex<dyn Decoder> {
		&self.decoders
	}

	pub fn namespaces(&self) -> &NamespaceTable {
		&self.namespaces
	}

	pub fn schemas(&self) -> &SchemaTable {
		&self.schemas
	}
}
