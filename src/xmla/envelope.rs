//! SOAP envelope encoding and decoding.
//!
//! Requests are written as a single line:
//!
//! ```text
//! SOAP-ENV:Envelope
//! └── SOAP-ENV:Body
//!     └── Discover | Execute          (xmlns = urn:schemas-microsoft-com:xml-analysis)
//!         ├── RequestType | Command/Statement
//!         ├── Restrictions/RestrictionList/*   (Discover only)
//!         └── Properties/PropertyList/*
//! ```
//!
//! Responses are decoded into one of three outcomes: the payload `root`
//! element, a SOAP fault / XML/A exception, or a parse error.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::dom::{self, Element};
use super::request::{MetadataRequest, Restrictions, SoapAction};
use super::row::find_child;
use super::{SOAP_ENCODING_STYLE, SOAP_NS, SOAP_PREFIX, XMLA_NS};
use crate::error::{XmlaError, XmlaResult};

/// Ordered `PropertyList` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pairs: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties of a metadata (Discover) request.
    pub fn discover(catalog: Option<&str>, data_source_info: Option<&str>) -> Self {
        Self::new()
            .with_opt("DataSourceInfo", data_source_info)
            .with_opt("Catalog", catalog)
            .with("Format", "Tabular")
            .with("Content", "SchemaData")
    }

    /// Properties of a query (Execute) request.
    pub fn execute(catalog: Option<&str>, data_source_info: Option<&str>) -> Self {
        Self::new()
            .with_opt("DataSourceInfo", data_source_info)
            .with_opt("Catalog", catalog)
            .with("Format", "Multidimensional")
            .with("AxisFormat", "TupleFormat")
    }

    /// Append a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Append a property when `value` is present.
    pub fn with_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Value of the first property called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

struct EnvelopeWriter {
    writer: Writer<Vec<u8>>,
}

impl EnvelopeWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> XmlaResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlaError::Encode(e.to_string()))
    }

    fn start(&mut self, start: BytesStart<'_>) -> XmlaResult<()> {
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> XmlaResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> XmlaResult<()> {
        self.start(BytesStart::new(name))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn list(&mut self, outer: &str, inner: &str, pairs: impl Iterator<Item = (String, String)>)
        -> XmlaResult<()>
    {
        self.start(BytesStart::new(outer))?;
        self.start(BytesStart::new(inner))?;
        for (name, value) in pairs {
            self.text_element(&name, &value)?;
        }
        self.end(inner)?;
        self.end(outer)
    }

    fn envelope(
        mut self,
        action: SoapAction,
        body: impl FnOnce(&mut Self) -> XmlaResult<()>,
    ) -> XmlaResult<Vec<u8>> {
        let envelope = format!("{SOAP_PREFIX}:Envelope");
        let soap_body = format!("{SOAP_PREFIX}:Body");
        let xmlns_soap = format!("xmlns:{SOAP_PREFIX}");
        let encoding_style = format!("{SOAP_PREFIX}:encodingStyle");

        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.start(BytesStart::new(envelope.as_str()).with_attributes([
            (xmlns_soap.as_str(), SOAP_NS),
            (encoding_style.as_str(), SOAP_ENCODING_STYLE),
        ]))?;
        self.start(BytesStart::new(soap_body.as_str()))?;
        self.start(BytesStart::new(action.element()).with_attributes([("xmlns", XMLA_NS)]))?;
        body(&mut self)?;
        self.end(action.element())?;
        self.end(&soap_body)?;
        self.end(&envelope)?;
        Ok(self.writer.into_inner())
    }
}

/// Encode a Discover request.
pub fn discover_request(
    request: MetadataRequest,
    restrictions: &Restrictions,
    properties: &Properties,
) -> XmlaResult<Vec<u8>> {
    EnvelopeWriter::new().envelope(SoapAction::Discover, |w| {
        w.text_element("RequestType", request.name())?;
        w.list(
            "Restrictions",
            "RestrictionList",
            restrictions.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )?;
        w.list(
            "Properties",
            "PropertyList",
            properties.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
    })
}

/// Encode an Execute request carrying an MDX statement.
pub fn execute_request(statement: &str, properties: &Properties) -> XmlaResult<Vec<u8>> {
    EnvelopeWriter::new().envelope(SoapAction::Execute, |w| {
        w.start(BytesStart::new("Command"))?;
        w.text_element("Statement", statement)?;
        w.end("Command")?;
        w.list(
            "Properties",
            "PropertyList",
            properties.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
    })
}

/// Decode a response envelope and return its payload `root` element.
///
/// A `Fault` body or an XML/A `Exception` inside the payload is always an
/// error, never an empty result.
pub fn parse_response(bytes: &[u8]) -> XmlaResult<Element> {
    let envelope = dom::parse(bytes)?;
    if !envelope.is(Some(SOAP_NS), "Envelope") {
        return Err(XmlaError::Protocol(format!(
            "expected SOAP Envelope, found <{}>",
            envelope.local_name()
        )));
    }

    let body = find_child(&envelope, Some(SOAP_NS), "Body")
        .ok_or_else(|| XmlaError::Protocol("envelope has no Body".to_string()))?;

    if let Some(fault) = find_child(body, Some(SOAP_NS), "Fault") {
        return Err(decode_fault(fault));
    }

    // DiscoverResponse | ExecuteResponse
    let response = body
        .elements()
        .next()
        .ok_or_else(|| XmlaError::Protocol("empty SOAP Body".to_string()))?;
    let ret = find_child(response, None, "return")
        .ok_or_else(|| XmlaError::Protocol(format!("<{}> has no return", response.local_name())))?;
    let root = find_child(ret, None, "root")
        .ok_or_else(|| XmlaError::Protocol("return has no root".to_string()))?;

    if let Some(err) = decode_exception(root) {
        return Err(err);
    }
    Ok(root.clone())
}

fn decode_fault(fault: &Element) -> XmlaError {
    let text = |name: &str| find_child(fault, None, name).map(Element::text);

    // Providers put the useful message in detail/Error/@Description.
    let detail = find_child(fault, None, "detail").map(|detail| {
        detail
            .elements()
            .find_map(|e| e.attribute("Description").map(str::to_string))
            .unwrap_or_else(|| detail.text())
    });

    XmlaError::Fault {
        code: text("faultcode").unwrap_or_default(),
        string: text("faultstring").unwrap_or_default(),
        actor: text("faultactor"),
        detail,
    }
}

fn decode_exception(root: &Element) -> Option<XmlaError> {
    find_child(root, None, "Exception")?;

    let error = find_child(root, None, "Messages").and_then(|m| find_child(m, None, "Error"));
    Some(XmlaError::ServerException {
        code: error
            .and_then(|e| e.attribute("ErrorCode"))
            .unwrap_or_default()
            .to_string(),
        description: error
            .and_then(|e| e.attribute("Description"))
            .unwrap_or("server reported an exception")
            .to_string(),
    })
}
