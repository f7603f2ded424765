//! XML/A wire protocol: envelopes, request catalog and row extraction.

pub mod dom;
pub mod envelope;
pub mod request;
pub mod row;

pub use dom::{Element, Node};
pub use envelope::{discover_request, execute_request, parse_response, Properties};
pub use request::{MetadataRequest, RequestShape, Restrictions, SoapAction};

/// SOAP 1.1 envelope namespace.
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Prefix used for the SOAP namespace in outgoing envelopes.
pub const SOAP_PREFIX: &str = "SOAP-ENV";

/// XML/A method namespace.
pub const XMLA_NS: &str = "urn:schemas-microsoft-com:xml-analysis";

/// Tabular rowset payload namespace.
pub const ROWSET_NS: &str = "urn:schemas-microsoft-com:xml-analysis:rowset";

/// Multidimensional dataset payload namespace.
pub const MDDATASET_NS: &str = "urn:schemas-microsoft-com:xml-analysis:mddataset";
