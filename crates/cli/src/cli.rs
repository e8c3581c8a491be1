use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ows_codec::DomainType;

#[derive(Parser, Debug)]
#[command(name = "ows-registry")]
#[command(about = "Inspect codec dispatch and capability formats")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Registry configuration (TOML)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// List discovered encoders and decoders with their keys
	Codecs,
	/// Show capability formats for a service version
	Formats {
		#[arg(long, default_value = "SOS")]
		service: String,
		#[arg(long, default_value = "2.0.0")]
		version: String,
		/// Which catalog to show
		#[arg(long, value_enum, default_value_t = FormatFamily::Response)]
		kind: FormatFamily,
		/// Include deactivated formats
		#[arg(long)]
		all: bool,
	},
	/// Show merged namespace prefixes and schema locations
	Namespaces,
	/// Resolve the codec that would handle a namespace and optional domain type
	Resolve {
		namespace: String,
		/// Domain type in kebab-case, e.g. get-observation-request
		#[arg(long = "type", value_name = "TYPE")]
		kind: Option<DomainType>,
		/// Query decoders instead of encoders
		#[arg(long)]
		decoder: bool,
	},
	/// Decode a document with the decoder registered for its namespace
	Decode {
		namespace: String,
		content: String,
		#[arg(long, default_value = "application/x-www-form-urlencoded")]
		media_type: String,
	},
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatFamily {
	Response,
	Procedure,
}
