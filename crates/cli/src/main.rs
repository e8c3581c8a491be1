//! Operator CLI for the codec registry.
//!
//! Loads the registry configuration, discovers the builtin codecs and prints
//! what the repository would dispatch and advertise.

mod builtins;
mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, FormatFamily};
use ows_codec::{Codec, EncodedDocument, Key, MediaType};
use ows_registry::{CodecRepository, FormatKind, RegistryConfig, ServiceEntry};
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let mut config = match &cli.config {
		Some(path) => RegistryConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => RegistryConfig::default(),
	};
	if config.services.is_empty() {
		config.services.push(ServiceEntry {
			service: "SOS".into(),
			versions: vec!["1.0.0".into(), "2.0.0".into()],
		});
	}

	let repository = CodecRepository::builder().with_config(&config).build().context("building codec repository")?;
	info!(generation = repository.generation(), "registry ready");

	run(&repository, cli.command)
}

fn run(repository: &CodecRepository, command: Command) -> anyhow::Result<()> {
	match command {
		Command::Codecs => print_codecs(repository),
		Command::Formats {
			service,
			version,
			kind,
			all,
		} => {
			let kind = match kind {
				FormatFamily::Response => FormatKind::ResponseFormat,
				FormatFamily::Procedure => FormatKind::ProcedureDescriptionFormat,
			};
			let catalog = repository.catalog(kind);
			let formats = if all { catalog.all(&service, &version) } else { catalog.active(&service, &version) };
			for format in formats {
				println!("{format}");
			}
		}
		Command::Namespaces => {
			let generation = repository.snapshot();
			for (namespace, prefix) in generation.namespaces().entries() {
				match generation.schemas().get(namespace) {
					Some(schema) => println!("{prefix}\t{namespace}\t{}", schema.location),
					None => println!("{prefix}\t{namespace}"),
				}
			}
		}
		Command::Resolve { namespace, kind, decoder } => {
			let key = match kind {
				Some(kind) => Key::xml(&namespace, kind),
				None => Key::namespace(&namespace),
			};
			let name = if decoder {
				repository.get_decoder(&key, &[]).map(|codec| codec.name().to_string())
			} else {
				repository.get_encoder(&key, &[]).map(|codec| codec.name().to_string())
			};
			match name {
				Some(name) => println!("{key} -> {name}"),
				None => anyhow::bail!("no codec for {key}"),
			}
		}
		Command::Decode {
			namespace,
			content,
			media_type,
		} => {
			let media_type: MediaType = media_type.parse()?;
			let element = repository.decode(&EncodedDocument::new(media_type, namespace, content))?;
			println!("{element:#?}");
		}
	}
	Ok(())
}

fn print_codecs(repository: &CodecRepository) {
	let generation = repository.snapshot();
	println!("generation {}", generation.id());
	print_family("encoder", generation.encoders().codecs());
	print_family("decoder", generation.decoders().codecs());

	let collisions = generation.encoders().collisions().iter().chain(generation.decoders().collisions());
	for collision in collisions {
		println!("shared {} key {}: {}", collision.registry, collision.key, collision.codecs.join(", "));
	}
}

fn print_family<C: Codec + ?Sized>(label: &str, codecs: &[std::sync::Arc<C>]) {
	for codec in codecs {
		println!("{label} {}", codec.name());
		for key in codec.keys() {
			println!("\t{key}");
		}
	}
}
