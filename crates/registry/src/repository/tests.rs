use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use ows_codec::{DomainDocument, DomainType, Element, EncodedDocument, Key, MediaType, ServiceException};
use pretty_assertions::assert_eq;

use super::*;
use crate::capability::{CapabilityKey, ServiceVersion};
use crate::error::LoadError;
use crate::test_fixtures::{Fixture, Switchable, decoders, encoders};

const OWS: &str = "http://www.opengis.net/ows/1.1";
const SML: &str = "http://www.opengis.net/sensorml/2.0";

fn sos2() -> Vec<ServiceVersion> {
	vec![ServiceVersion::new("SOS", "2.0.0")]
}

fn set(formats: &[&str]) -> BTreeSet<String> {
	formats.iter().map(|format| format.to_string()).collect()
}

/// Activation source that can be switched into failure between builds.
#[derive(Default)]
struct Flaky {
	failing: AtomicBool,
}

impl ActivationSource for Arc<Flaky> {
	fn is_active(&self, kind: FormatKind, key: &CapabilityKey) -> std::result::Result<bool, CapabilityError> {
		if self.failing.load(Ordering::Relaxed) {
			return Err(CapabilityError::Activation {
				kind,
				key: key.clone(),
				reason: "unreachable".into(),
			});
		}
		Ok(true)
	}
}

#[test]
fn extra_keys_narrow_the_lookup() {
	let repository = CodecRepository::builder()
		.encoders(encoders(vec![
			Fixture::new("plain", [Key::namespace(OWS)]),
			Fixture::new("sos", [Key::namespace(OWS), Key::operation("SOS", "2.0.0", "GetCapabilities")]),
		]))
		.decoders(decoders(vec![]))
		.build()
		.expect("repository builds");

	let plain = repository.get_encoder(&Key::namespace(OWS), &[]).expect("namespace encoder");
	assert_eq!(plain.name(), "plain");

	let narrowed = repository
		.get_encoder(&Key::namespace(OWS), &[Key::operation("SOS", "2.0.0", "GetCapabilities")])
		.expect("narrowed encoder");
	assert_eq!(narrowed.name(), "sos");

	assert!(!repository.has_encoder(&Key::namespace(OWS), &[Key::operation("SPS", "2.0.0", "GetCapabilities")]));
}

#[test]
fn encode_and_decode_dispatch_by_namespace() {
	let repository = CodecRepository::builder()
		.encoders(encoders(vec![Fixture::new("exceptions", [Key::xml(OWS, DomainType::Exception)])]))
		.decoders(decoders(vec![Fixture::new("fixture-reader", [Key::namespace("urn:fixture")])]))
		.build()
		.expect("repository builds");

	let element = Element::Exception(ServiceException::new("NoApplicableCode", "boom"));
	let document = repository.encode(OWS, &element).expect("exception report encodes");
	assert_eq!(document.content, "exceptions:ows-exception-report:false");

	match repository.decode(&document).expect("fixture namespace decodes") {
		Element::Document(DomainDocument { body, .. }) => assert_eq!(body, "fixture-reader:exceptions:ows-exception-report:false"),
		other => panic!("unexpected element {other:?}"),
	}

	let unknown = EncodedDocument::new(MediaType::application_xml(), "urn:unknown", "<x/>");
	assert!(matches!(repository.decode(&unknown), Err(RegistryError::NoDecoder(_))));
	let feature = Element::Document(DomainDocument {
		kind: DomainType::SamplingFeature,
		body: String::new(),
	});
	assert!(matches!(repository.encode(OWS, &feature), Err(RegistryError::NoEncoder(_))));
}

#[test]
fn config_settings_reach_codecs() {
	let config = RegistryConfig::from_toml_str(
		r#"
[codecs]
verbose_errors = true

[[services]]
service = "SOS"
versions = ["2.0.0"]
"#,
	)
	.expect("config parses");

	let repository = CodecRepository::builder()
		.encoders(encoders(vec![Fixture::new("exceptions", [Key::xml(OWS, DomainType::Exception)]).response_format(
			"SOS",
			"2.0.0",
			"text/xml",
		)]))
		.decoders(decoders(vec![]))
		.with_config(&config)
		.build()
		.expect("repository builds");

	let element = Element::Exception(ServiceException::new("NoApplicableCode", "boom"));
	assert_eq!(repository.encode(OWS, &element).expect("encodes").content, "exceptions:ows-exception-report:true");
	assert_eq!(repository.get_supported_response_formats("SOS", "2.0.0"), set(&["text/xml"]));
}

#[test]
fn rejected_settings_fail_construction() {
	let config = RegistryConfig::from_toml_str("[codecs.options.strict]\nreject = \"no\"\n").expect("config parses");
	let error = CodecRepository::builder()
		.encoders(encoders(vec![Fixture::new("strict", [Key::namespace(OWS)])]))
		.decoders(decoders(vec![]))
		.with_config(&config)
		.build()
		.expect_err("configuration failure is fatal");

	assert!(matches!(
		error,
		RegistryError::Load(LoadError::Configure { registry: "encoder", ref name, .. }) if name == "strict"
	));
}

#[test]
fn capability_views_follow_activation_and_toggles() {
	let repository = CodecRepository::builder()
		.encoders(encoders(vec![
			Fixture::new("om", [Key::namespace("http://www.opengis.net/om/2.0")])
				.response_format("SOS", "2.0.0", "http://www.opengis.net/om/2.0")
				.response_format("SOS", "2.0.0", "application/json"),
		]))
		.decoders(decoders(vec![
			Fixture::new("sml", [Key::namespace(SML)]).procedure_format("SOS", "2.0.0", SML),
		]))
		.services(sos2())
		.build()
		.expect("repository builds");

	assert_eq!(
		repository.get_supported_response_formats("SOS", "2.0.0"),
		set(&["application/json", "http://www.opengis.net/om/2.0"])
	);
	assert_eq!(repository.get_supported_procedure_description_formats("SOS", "2.0.0"), set(&[SML]));

	let json = CapabilityKey::new("SOS", "2.0.0", "application/json");
	assert!(repository.set_active(FormatKind::ResponseFormat, &json, false));
	assert_eq!(repository.get_supported_response_formats("SOS", "2.0.0"), set(&["http://www.opengis.net/om/2.0"]));
	assert_eq!(
		repository.get_all_supported_response_formats("SOS", "2.0.0"),
		set(&["application/json", "http://www.opengis.net/om/2.0"])
	);

	assert!(!repository.set_active(FormatKind::ProcedureDescriptionFormat, &json, true));
	assert_eq!(repository.get_all_supported_procedure_description_formats("SOS", "2.0.0"), set(&[SML]));
	assert!(repository.get_supported_response_formats("SOS", "1.0.0").is_empty());
}

#[test]
fn reload_publishes_tables_together() {
	let discovery = Switchable::new(vec![
		Fixture::new("first", [Key::namespace("urn:a")])
			.prefix("urn:a", "a")
			.schema("urn:a", "http://example.org/a.xsd"),
	]);
	let repository = CodecRepository::builder()
		.encoders(Arc::clone(&discovery))
		.decoders(decoders(vec![]))
		.build()
		.expect("repository builds");

	let before = repository.snapshot();
	discovery.set(vec![Fixture::new("second", [Key::namespace("urn:b")]).prefix("urn:b", "b")]);
	let report = repository.reload().expect("reload succeeds");

	assert_eq!((report.generation, report.encoders, report.decoders), (2, 1, 0));
	assert!(report.capability_error.is_none());
	assert_eq!(repository.generation(), 2);
	assert_eq!(repository.get_prefix_for("urn:b").as_deref(), Some("b"));
	assert_eq!(repository.get_namespace_for("a"), None);
	assert_eq!(repository.get_schema_location("urn:a"), None);

	// The old snapshot is still internally consistent.
	assert_eq!(before.id(), 1);
	assert_eq!(before.namespaces().prefix_for("urn:a"), Some("a"));
	assert!(before.encoders().lookup(&Key::namespace("urn:a")).is_some());
}

#[test]
fn failing_reload_keeps_previous_generation() {
	let discovery = Switchable::new(vec![Fixture::new("stable", [Key::namespace("urn:a")])]);
	let repository = CodecRepository::builder()
		.encoders(Arc::clone(&discovery))
		.decoders(decoders(vec![]))
		.build()
		.expect("repository builds");

	discovery.fail("plugin directory unreadable");
	let error = repository.reload().expect_err("discovery failure surfaces");

	assert!(matches!(error, RegistryError::Load(LoadError::Discovery { registry: "encoder", .. })));
	assert_eq!(repository.generation(), 1);
	assert_eq!(
		repository.get_encoder(&Key::namespace("urn:a"), &[]).map(|codec| codec.name().to_string()),
		Some("stable".to_string())
	);
}

#[test]
fn failed_capability_build_keeps_catalogs() {
	let activation = Arc::new(Flaky::default());
	let discovery = Switchable::new(vec![Fixture::new("om", [Key::namespace("urn:om")]).response_format("SOS", "2.0.0", "text/xml")]);
	let repository = CodecRepository::builder()
		.encoders(Arc::clone(&discovery))
		.decoders(decoders(vec![]))
		.activation(Arc::clone(&activation))
		.services(sos2())
		.build()
		.expect("repository builds");

	activation.failing.store(true, Ordering::Relaxed);
	discovery.set(vec![
		Fixture::new("om", [Key::namespace("urn:om")])
			.response_format("SOS", "2.0.0", "text/xml")
			.procedure_format("SOS", "2.0.0", SML),
		Fixture::new("json", [Key::namespace("urn:json")]).response_format("SOS", "2.0.0", "application/json"),
	]);
	let report = repository.reload().expect("codec reload succeeds");

	assert!(report.capability_error.is_some());
	assert_eq!(repository.generation(), 2);
	assert!(repository.has_encoder(&Key::namespace("urn:json"), &[]));
	assert_eq!(repository.get_all_supported_response_formats("SOS", "2.0.0"), set(&["text/xml"]));
	assert!(repository.get_all_supported_procedure_description_formats("SOS", "2.0.0").is_empty());

	activation.failing.store(false, Ordering::Relaxed);
	let summary = repository.rebuild_capabilities().expect("rebuild succeeds");
	assert_eq!(summary.response_formats.tuples, 2);
	assert_eq!(summary.procedure_description_formats.tuples, 1);
	assert_eq!(
		repository.get_supported_response_formats("SOS", "2.0.0"),
		set(&["application/json", "text/xml"])
	);
}

#[test]
fn initial_capability_failure_is_fatal() {
	let activation = Arc::new(Flaky::default());
	activation.failing.store(true, Ordering::Relaxed);

	let error = CodecRepository::builder()
		.encoders(encoders(vec![Fixture::new("om", [Key::namespace("urn:om")]).response_format("SOS", "2.0.0", "text/xml")]))
		.decoders(decoders(vec![]))
		.activation(activation)
		.services(sos2())
		.build()
		.expect_err("activation failure aborts construction");
	assert!(matches!(error, RegistryError::Capability(_)));
}

#[test]
fn closure_discovery_and_config_services() {
	let config = RegistryConfig::from_toml_str(
		r#"
[[services]]
service = "SOS"
versions = ["1.0.0", "2.0.0"]
"#,
	)
	.expect("config parses");
	let discovery = crate::discovery::FnDiscovery(|| -> std::result::Result<Vec<Box<dyn Encoder>>, LoadError> {
		let om: Box<dyn Encoder> = Box::new(
			Fixture::new("om", [Key::namespace("urn:om")])
				.response_format("SOS", "1.0.0", "text/xml")
				.response_format("SOS", "2.0.0", "application/json"),
		);
		Ok(vec![om])
	});
	let repository = CodecRepository::builder()
		.encoders(discovery)
		.decoders(decoders(vec![]))
		.services(config)
		.build()
		.expect("repository builds");

	assert_eq!(repository.get_supported_response_formats("SOS", "1.0.0"), set(&["text/xml"]));
	assert_eq!(repository.get_supported_response_formats("SOS", "2.0.0"), set(&["application/json"]));
	assert_eq!(
		repository.catalog(FormatKind::ResponseFormat).service_versions(),
		vec![ServiceVersion::new("SOS", "1.0.0"), ServiceVersion::new("SOS", "2.0.0")]
	);
}

#[test]
fn direct_catalog_rebuilds_wait_for_repository_builds() {
	let repository = Arc::new(
		CodecRepository::builder()
			.encoders(encoders(vec![
				Fixture::new("json", [Key::namespace("urn:json")]).response_format("SOS", "2.0.0", "application/json"),
			]))
			.decoders(decoders(vec![]))
			.services(sos2())
			.build()
			.expect("repository builds"),
	);
	let json = CapabilityKey::new("SOS", "2.0.0", "application/json");

	let clearing = {
		let repository = Arc::clone(&repository);
		thread::spawn(move || {
			for _ in 0..500 {
				repository
					.catalog(FormatKind::ResponseFormat)
					.rebuild(DeclaredFormats::new(), &ActivationSettings::default())
					.expect("empty rebuild succeeds");
			}
		})
	};
	for _ in 0..500 {
		repository.rebuild_capabilities().expect("rebuild succeeds");
		assert_ne!(
			repository.catalog(FormatKind::ResponseFormat).is_active(&json),
			Some(false),
			"a tuple dropped mid-build must be re-queried, not recorded inactive"
		);
	}
	clearing.join().expect("clearing thread");
}
