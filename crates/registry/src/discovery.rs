//! Discovery and configuration collaborators.
//!
//! # Role
//!
//! A load asks a [`Discovery`] for fresh codec instances, hands each instance to
//! a [`Configurator`] exactly once, and only then freezes it behind an `Arc`.
//! Any failure in either step aborts the whole load.

use std::sync::Arc;

use ows_codec::{Codec, CodecError, Decoder, DecoderPlugin, Encoder, EncoderPlugin};

use crate::config::CodecsConfig;
use crate::error::LoadError;

/// Codec trait objects the repository keeps a registry for.
pub trait CodecFamily: Codec {
	/// Registry label used in diagnostics.
	const LABEL: &'static str;
}

impl CodecFamily for dyn Encoder {
	const LABEL: &'static str = "encoder";
}

impl CodecFamily for dyn Decoder {
	const LABEL: &'static str = "decoder";
}

/// Produces the codec instances of one load, in discovery order.
pub trait Discovery<C: ?Sized>: Send + Sync {
	fn discover(&self) -> Result<Vec<Box<C>>, LoadError>;
}

impl<C: ?Sized, D: Discovery<C> + ?Sized> Discovery<C> for Arc<D> {
	fn discover(&self) -> Result<Vec<Box<C>>, LoadError> {
		(**self).discover()
	}
}

/// Instantiates every codec submitted with `inventory::submit!`.
///
/// Descriptors are ordered by name so discovery order does not depend on link order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscovery;

impl Discovery<dyn Encoder> for InventoryDiscovery {
	fn discover(&self) -> Result<Vec<Box<dyn Encoder>>, LoadError> {
		let mut plugins: Vec<&EncoderPlugin> = inventory::iter::<EncoderPlugin>.into_iter().collect();
		plugins.sort_by_key(|plugin| plugin.name);
		plugins
			.into_iter()
			.map(|plugin| (plugin.build)().map_err(|source| construct_error::<dyn Encoder>(plugin.name, source)))
			.collect()
	}
}

impl Discovery<dyn Decoder> for InventoryDiscovery {
	fn discover(&self) -> Result<Vec<Box<dyn Decoder>>, LoadError> {
		let mut plugins: Vec<&DecoderPlugin> = inventory::iter::<DecoderPlugin>.into_iter().collect();
		plugins.sort_by_key(|plugin| plugin.name);
		plugins
			.into_iter()
			.map(|plugin| (plugin.build)().map_err(|source| construct_error::<dyn Decoder>(plugin.name, source)))
			.collect()
	}
}

fn construct_error<C: CodecFamily + ?Sized>(name: &str, source: CodecError) -> LoadError {
	LoadError::Construct {
		registry: C::LABEL,
		name: name.to_string(),
		source,
	}
}

/// Discovery backed by a closure, called once per load.
pub struct FnDiscovery<F>(pub F);

impl<C: ?Sized, F> Discovery<C> for FnDiscovery<F>
where
	F: Fn() -> Result<Vec<Box<C>>, LoadError> + Send + Sync,
{
	fn discover(&self) -> Result<Vec<Box<C>>, LoadError> {
		(self.0)()
	}
}

type Factory<C> = Box<dyn Fn() -> Result<Box<C>, CodecError> + Send + Sync>;

/// Explicitly listed constructors, run in insertion order on every load.
pub struct StaticDiscovery<C: ?Sized> {
	factories: Vec<(String, Factory<C>)>,
}

impl<C: ?Sized> Default for StaticDiscovery<C> {
	fn default() -> Self {
		Self { factories: Vec::new() }
	}
}

impl<C: ?Sized> StaticDiscovery<C> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push<F>(&mut self, name: impl Into<String>, factory: F)
	where
		F: Fn() -> Result<Box<C>, CodecError> + Send + Sync + 'static,
	{
		self.factories.push((name.into(), Box::new(factory)));
	}

	pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
	where
		F: Fn() -> Result<Box<C>, CodecError> + Send + Sync + 'static,
	{
		self.push(name, factory);
		self
	}

	pub fn len(&self) -> usize {
		self.factories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}
}

impl<C: CodecFamily + ?Sized> Discovery<C> for StaticDiscovery<C> {
	fn discover(&self) -> Result<Vec<Box<C>>, LoadError> {
		self.factories
			.iter()
			.map(|(name, factory)| factory().map_err(|source| construct_error::<C>(name, source)))
			.collect()
	}
}

/// Applies external settings to a codec before it is published.
pub trait Configurator<C: ?Sized>: Send + Sync {
	fn configure(&self, codec: &mut C) -> Result<(), CodecError>;
}

/// Leaves codecs as constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConfigurator;

impl<C: ?Sized> Configurator<C> for NoopConfigurator {
	fn configure(&self, _codec: &mut C) -> Result<(), CodecError> {
		Ok(())
	}
}

/// Feeds each codec the `[codecs]` settings registered under its name.
#[derive(Debug, Clone, Default)]
pub struct SettingsConfigurator {
	codecs: CodecsConfig,
}

impl SettingsConfigurator {
	pub fn new(codecs: CodecsConfig) -> Self {
		Self { codecs }
	}
}

impl<C: Codec + ?Sized> Configurator<C> for SettingsConfigurator {
	fn configure(&self, codec: &mut C) -> Result<(), CodecError> {
		let settings = self.codecs.settings_for(codec.name());
		codec.configure(&settings)
	}
}

/// Discovers, configures and freezes one codec set.
pub(crate) fn load<C: CodecFamily + ?Sized>(discovery: &dyn Discovery<C>, configurator: &dyn Configurator<C>) -> Result<Vec<Arc<C>>, LoadError> {
	let codecs = discovery.discover()?;
	codecs
		.into_iter()
		.map(|mut codec| {
			configurator.configure(&mut *codec).map_err(|source| LoadError::Configure {
				registry: C::LABEL,
				name: codec.name().to_string(),
				source,
			})?;
			Ok(Arc::from(codec))
		})
		.collect()
}
