//! Codecs linked into the binary and registered through `inventory`.

use std::collections::BTreeSet;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

use ows_codec::{
	ANY_VERSION, Codec, CodecError, CodecSettings, Decoder, DecoderPlugin, DomainType, Element, EncodedDocument, Encoder, EncoderPlugin, Key,
	MediaType, NamespacePrefix, OperationDecoderKey, OperationKey, ResponseFormatKey, SchemaLocation, ServiceRequest,
};

pub const OWS_NAMESPACE: &str = "http://www.opengis.net/ows/1.1";
pub const SOS_NAMESPACE: &str = "http://www.opengis.net/sos/2.0";
pub const SML_NAMESPACE: &str = "http://www.opengis.net/sensorml/2.0";

const JSON_FORMAT: &str = "application/json";
const KVP_MEDIA: (&str, &str) = ("application", "x-www-form-urlencoded");

inventory::submit! {
	EncoderPlugin::new("ows-exception-report", || Ok(Box::new(ExceptionReportEncoder::new())))
}

inventory::submit! {
	EncoderPlugin::new("sos-json-response", || Ok(Box::new(JsonResponseEncoder::new())))
}

inventory::submit! {
	EncoderPlugin::new("sensorml-description", || Ok(Box::new(SensorMlEncoder::new())))
}

inventory::submit! {
	DecoderPlugin::new("sos-kvp-request", || Ok(Box::new(KvpRequestDecoder::new())))
}

/// Renders service exceptions as OWS 1.1 exception reports.
pub struct ExceptionReportEncoder {
	keys: Vec<Key>,
	verbose: bool,
	indent: usize,
}

impl ExceptionReportEncoder {
	pub fn new() -> Self {
		Self {
			keys: vec![Key::xml(OWS_NAMESPACE, DomainType::Exception)],
			verbose: false,
			indent: 2,
		}
	}
}

impl Codec for ExceptionReportEncoder {
	fn name(&self) -> &str {
		"ows-exception-report"
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn schema_locations(&self) -> Vec<SchemaLocation> {
		vec![SchemaLocation::new(OWS_NAMESPACE, "http://schemas.opengis.net/ows/1.1.0/owsExceptionReport.xsd")]
	}

	fn namespace_prefixes(&self) -> Vec<NamespacePrefix> {
		vec![NamespacePrefix::new(OWS_NAMESPACE, "ows")]
	}

	fn configure(&mut self, settings: &CodecSettings) -> Result<(), CodecError> {
		self.verbose = settings.verbose_errors;
		if let Some(indent) = settings.parse_option::<usize>("indent")? {
			self.indent = indent;
		}
		Ok(())
	}
}

impl Encoder for ExceptionReportEncoder {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError> {
		let Element::Exception(exception) = element else {
			return Err(CodecError::UnsupportedElement(element.domain_type()));
		};
		let mut xml = XmlWriter::new(self.indent);
		xml.start(
			BytesStart::new("ows:ExceptionReport").with_attributes([("xmlns:ows", OWS_NAMESPACE), ("version", "2.0.0")]),
		)?;
		let mut start = BytesStart::new("ows:Exception");
		start.push_attribute(("exceptionCode", exception.code.as_str()));
		if let Some(locator) = &exception.locator {
			start.push_attribute(("locator", locator.as_str()));
		}
		xml.start(start)?;
		xml.text_element("ows:ExceptionText", &exception.message)?;
		if self.verbose
			&& let Some(detail) = &exception.detail
		{
			xml.text_element("ows:ExceptionText", detail)?;
		}
		xml.end("ows:Exception")?;
		xml.end("ows:ExceptionReport")?;
		let xml = xml.finish()?;

		Ok(EncodedDocument::new(MediaType::application_xml(), OWS_NAMESPACE, xml))
	}
}

/// Encodes SOS 2.0 responses as JSON when the client asked for `application/json`.
pub struct JsonResponseEncoder {
	keys: Vec<Key>,
}

impl JsonResponseEncoder {
	pub fn new() -> Self {
		let keys = ["GetObservation", "GetFeatureOfInterest", "DescribeSensor"]
			.into_iter()
			.map(|operation| Key::ResponseFormat(ResponseFormatKey::new(OperationKey::new("SOS", "2.0.0", operation), JSON_FORMAT)))
			.chain([Key::MediaType(MediaType::application_json())])
			.collect();
		Self { keys }
	}
}

impl Codec for JsonResponseEncoder {
	fn name(&self) -> &str {
		"sos-json-response"
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn supported_response_formats(&self, service: &str, version: &str) -> BTreeSet<String> {
		if service == "SOS" && version == "2.0.0" {
			BTreeSet::from([JSON_FORMAT.to_string()])
		} else {
			BTreeSet::new()
		}
	}
}

impl Encoder for JsonResponseEncoder {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError> {
		let Element::Response(response) = element else {
			return Err(CodecError::UnsupportedElement(element.domain_type()));
		};
		let content = serde_json::to_string(&JsonResponse {
			service: response.operation.service(),
			version: response.operation.version(),
			operation: response.operation.operation(),
			kind: response.kind.to_string(),
			body: &response.body,
		})
		.map_err(|error| CodecError::Write(error.to_string()))?;
		Ok(EncodedDocument::new(MediaType::application_json(), "", content))
	}
}

#[derive(Serialize)]
struct JsonResponse<'a> {
	service: &'a str,
	version: &'a str,
	operation: &'a str,
	#[serde(rename = "type")]
	kind: String,
	body: &'a str,
}

/// Wraps procedure descriptions into SensorML 2.0 documents.
pub struct SensorMlEncoder {
	keys: Vec<Key>,
}

impl SensorMlEncoder {
	pub fn new() -> Self {
		Self {
			keys: vec![Key::xml(SML_NAMESPACE, DomainType::ProcedureDescription)],
		}
	}
}

impl Codec for SensorMlEncoder {
	fn name(&self) -> &str {
		"sensorml-description"
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn supported_procedure_description_formats(&self, service: &str, _version: &str) -> BTreeSet<String> {
		if service == "SOS" {
			BTreeSet::from([SML_NAMESPACE.to_string()])
		} else {
			BTreeSet::new()
		}
	}

	fn schema_locations(&self) -> Vec<SchemaLocation> {
		vec![SchemaLocation::new(SML_NAMESPACE, "http://schemas.opengis.net/sensorML/2.0/sensorML.xsd")]
	}

	fn namespace_prefixes(&self) -> Vec<NamespacePrefix> {
		vec![NamespacePrefix::new(SML_NAMESPACE, "sml")]
	}
}

impl Encoder for SensorMlEncoder {
	fn encode(&self, element: &Element) -> Result<EncodedDocument, CodecError> {
		let Element::Document(document) = element else {
			return Err(CodecError::UnsupportedElement(element.domain_type()));
		};
		if !DomainType::ProcedureDescription.is_ancestor_of(document.kind) {
			return Err(CodecError::UnsupportedElement(document.kind));
		}
		let mut xml = XmlWriter::new(0);
		xml.start(BytesStart::new("sml:PhysicalSystem").with_attributes([("xmlns:sml", SML_NAMESPACE)]))?;
		xml.text(&document.body)?;
		xml.end("sml:PhysicalSystem")?;
		let xml = xml.finish()?;
		Ok(EncodedDocument::new(MediaType::application_xml(), SML_NAMESPACE, xml))
	}
}

/// Decodes key-value-pair encoded SOS requests (`service=SOS&request=...`).
pub struct KvpRequestDecoder {
	keys: Vec<Key>,
}

impl KvpRequestDecoder {
	pub fn new() -> Self {
		let media = MediaType::new(KVP_MEDIA.0, KVP_MEDIA.1);
		let keys = std::iter::once(Key::namespace(SOS_NAMESPACE))
			.chain(REQUESTS.iter().map(|(operation, _)| {
				Key::OperationDecoder(OperationDecoderKey::new(OperationKey::new("SOS", ANY_VERSION, operation), media.clone()))
			}))
			.collect();
		Self { keys }
	}
}

const REQUESTS: &[(&str, DomainType)] = &[
	("GetCapabilities", DomainType::GetCapabilitiesRequest),
	("DescribeSensor", DomainType::DescribeSensorRequest),
	("GetObservation", DomainType::GetObservationRequest),
	("GetFeatureOfInterest", DomainType::GetFeatureOfInterestRequest),
];

impl Codec for KvpRequestDecoder {
	fn name(&self) -> &str {
		"sos-kvp-request"
	}

	fn keys(&self) -> &[Key] {
		&self.keys
	}

	fn namespace_prefixes(&self) -> Vec<NamespacePrefix> {
		vec![NamespacePrefix::new(SOS_NAMESPACE, "sos")]
	}
}

impl Decoder for KvpRequestDecoder {
	fn decode(&self, document: &EncodedDocument) -> Result<Element, CodecError> {
		let mut service = None;
		let mut version = None;
		let mut request = None;
		let mut parameters = Vec::new();

		for (name, value) in url::form_urlencoded::parse(document.content.trim().as_bytes()) {
			if name.is_empty() {
				continue;
			}
			match name.to_ascii_lowercase().as_str() {
				"service" => service = Some(value.into_owned()),
				"version" | "acceptversions" => version = Some(value.into_owned()),
				"request" => request = Some(value.into_owned()),
				_ => parameters.push((name.into_owned(), value.into_owned())),
			}
		}

		let service = service.ok_or_else(|| CodecError::Malformed("missing 'service'".into()))?;
		let request = request.ok_or_else(|| CodecError::Malformed("missing 'request'".into()))?;
		let kind = REQUESTS
			.iter()
			.find(|(operation, _)| operation.eq_ignore_ascii_case(&request))
			.map(|(_, kind)| *kind)
			.ok_or_else(|| CodecError::Malformed(format!("unknown request '{request}'")))?;
		let version = version.unwrap_or_else(|| ANY_VERSION.to_string());

		let request = parameters.into_iter().fold(
			ServiceRequest::new(OperationKey::new(&service, &version, &request), kind),
			|request, (name, value)| request.with_parameter(name, value),
		);
		Ok(Element::Request(request))
	}
}

/// Event writer for the XML codecs. Text and attribute values are escaped by quick-xml.
struct XmlWriter {
	writer: Writer<Vec<u8>>,
}

impl XmlWriter {
	/// `indent` spaces per level; zero writes the document on one line.
	fn new(indent: usize) -> Self {
		let writer = if indent == 0 {
			Writer::new(Vec::new())
		} else {
			Writer::new_with_indent(Vec::new(), b' ', indent)
		};
		Self { writer }
	}

	fn event(&mut self, event: Event<'_>) -> Result<(), CodecError> {
		self.writer.write_event(event).map_err(|error| CodecError::Write(error.to_string()))
	}

	fn start(&mut self, start: BytesStart<'_>) -> Result<(), CodecError> {
		self.event(Event::Start(start))
	}

	fn end(&mut self, name: &str) -> Result<(), CodecError> {
		self.event(Event::End(BytesEnd::new(name)))
	}

	fn text(&mut self, text: &str) -> Result<(), CodecError> {
		self.event(Event::Text(BytesText::new(text)))
	}

	fn text_element(&mut self, name: &str, text: &str) -> Result<(), CodecError> {
		self.start(BytesStart::new(name))?;
		self.text(text)?;
		self.end(name)
	}

	fn finish(self) -> Result<String, CodecError> {
		let mut bytes = self.writer.into_inner();
		bytes.push(b'\n');
		String::from_utf8(bytes).map_err(|error| CodecError::Write(error.to_string()))
	}
}
