//! SOAP envelope encoding and response classification.

use insta::assert_snapshot;

use olapxml::transport::canned::{dataset_response, fault_response, rowset_response};
use olapxml::xmla::row::find_child;
use olapxml::xmla::{
    dom, execute_request, parse_response, discover_request, MetadataRequest, Properties,
    Restrictions, ROWSET_NS, SOAP_NS, XMLA_NS,
};
use olapxml::XmlaError;

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_execute_envelope_wire_format() {
    let bytes = execute_request(
        "SELECT FROM [Sales]",
        &Properties::new().with("Catalog", "FoodMart"),
    )
    .unwrap();

    assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"<?xml version="1.0" encoding="UTF-8"?><SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><SOAP-ENV:Body><Execute xmlns="urn:schemas-microsoft-com:xml-analysis"><Command><Statement>SELECT FROM [Sales]</Statement></Command><Properties><PropertyList><Catalog>FoodMart</Catalog></PropertyList></Properties></Execute></SOAP-ENV:Body></SOAP-ENV:Envelope>"#);
}

#[test]
fn test_discover_envelope_is_namespaced() {
    let bytes = discover_request(
        MetadataRequest::MdschemaDimensions,
        &Restrictions::new()
            .with("CATALOG_NAME", "FoodMart")
            .with("CUBE_NAME", "Warehouse and Sales"),
        &Properties::discover(Some("FoodMart"), Some("Provider=Mondrian;DataSource=FoodMart")),
    )
    .unwrap();

    let envelope = dom::parse(&bytes).unwrap();
    assert!(envelope.is(Some(SOAP_NS), "Envelope"));

    let discover = find_child(&envelope, Some(SOAP_NS), "Body")
        .and_then(|body| find_child(body, Some(XMLA_NS), "Discover"))
        .unwrap();
    assert_eq!(
        find_child(discover, Some(XMLA_NS), "RequestType").unwrap().text(),
        "MDSCHEMA_DIMENSIONS"
    );

    let properties = find_child(discover, None, "Properties")
        .and_then(|p| find_child(p, None, "PropertyList"))
        .unwrap();
    let names: Vec<&str> = properties.elements().map(|e| e.local_name()).collect();
    assert_eq!(names, vec!["DataSourceInfo", "Catalog", "Format", "Content"]);
    assert_eq!(
        find_child(properties, None, "DataSourceInfo").unwrap().text(),
        "Provider=Mondrian;DataSource=FoodMart"
    );
}

#[test]
fn test_restriction_values_survive_escaping() {
    let bytes = discover_request(
        MetadataRequest::MdschemaMembers,
        &Restrictions::new()
            .with("CATALOG_NAME", "FoodMart")
            .with("CUBE_NAME", "Sales")
            .with("MEMBER_UNIQUE_NAME", "[Store].[A & B <\"Ltd\">]"),
        &Properties::new(),
    )
    .unwrap();
    let xml = String::from_utf8(bytes.clone()).unwrap();
    assert!(xml.contains("[A &amp; B &lt;&quot;Ltd&quot;&gt;]"));

    let envelope = dom::parse(&bytes).unwrap();
    let text = envelope.text();
    assert!(text.contains("[Store].[A & B <\"Ltd\">]"));
}

// ============================================================================
// Responses
// ============================================================================

#[test]
fn test_empty_rowset_is_not_an_error() {
    let root = parse_response(rowset_response(&[]).as_bytes()).unwrap();
    assert_eq!(root.namespace(), Some(ROWSET_NS));
    assert_eq!(root.elements().count(), 0);
}

#[test]
fn test_fault_is_an_error_not_an_empty_rowset() {
    let err = parse_response(fault_response("SOAP-ENV:Server", "Internal error").as_bytes())
        .unwrap_err();

    assert!(err.is_fault());
    assert!(!err.is_parse());
    match err {
        XmlaError::Fault { code, string, actor, detail } => {
            assert_eq!(code, "SOAP-ENV:Server");
            assert_eq!(string, "Internal error");
            assert_eq!(actor, None);
            assert_eq!(detail, None);
        }
        other => panic!("expected Fault, got {other:?}"),
    }
}

#[test]
fn test_fault_detail_description_is_kept() {
    let body = r#"<?xml version="1.0"?>
        <SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
          <SOAP-ENV:Body>
            <SOAP-ENV:Fault>
              <faultcode>SOAP-ENV:Server.00HSBE02</faultcode>
              <faultstring>XMLA Discover unparse results error</faultstring>
              <faultactor>Mondrian</faultactor>
              <detail>
                <XA:error xmlns:XA="http://mondrian.sourceforge.net" Description="Cube 'Salez' not found"/>
              </detail>
            </SOAP-ENV:Fault>
          </SOAP-ENV:Body>
        </SOAP-ENV:Envelope>"#;

    let err = parse_response(body.as_bytes()).unwrap_err();
    match err {
        XmlaError::Fault { code, actor, detail, .. } => {
            assert_eq!(code, "SOAP-ENV:Server.00HSBE02");
            assert_eq!(actor.as_deref(), Some("Mondrian"));
            assert_eq!(detail.as_deref(), Some("Cube 'Salez' not found"));
        }
        other => panic!("expected Fault, got {other:?}"),
    }
}

#[test]
fn test_in_band_exception_is_a_server_exception() {
    let body = dataset_response(
        r#"<Exception xmlns="urn:schemas-microsoft-com:xml-analysis:exception"/><Messages xmlns="urn:schemas-microsoft-com:xml-analysis:exception"><Error ErrorCode="3238658057" Description="Query (1, 8) Parser: syntax error near 'FROMM'"/></Messages>"#,
    );

    let err = parse_response(body.as_bytes()).unwrap_err();
    assert!(err.is_fault());
    match err {
        XmlaError::ServerException { code, description } => {
            assert_eq!(code, "3238658057");
            assert!(description.contains("syntax error"));
        }
        other => panic!("expected ServerException, got {other:?}"),
    }
}

#[test]
fn test_malformed_xml_is_a_parse_error() {
    let mut truncated = rowset_response(&[&[("CATALOG_NAME", "FoodMart")]]);
    truncated.truncate(truncated.len() / 2);

    let err = parse_response(truncated.as_bytes()).unwrap_err();
    assert!(err.is_parse());
    assert!(!err.is_fault());
}

#[test]
fn test_html_error_page_is_a_protocol_error() {
    let err = parse_response(b"<html><body><h1>502 Bad Gateway</h1></body></html>").unwrap_err();
    assert!(matches!(err, XmlaError::Protocol(_)));
    assert!(!err.is_parse());
}

#[test]
fn test_response_without_return_is_a_protocol_error() {
    let body = r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body><DiscoverResponse xmlns="urn:schemas-microsoft-com:xml-analysis"/></SOAP-ENV:Body></SOAP-ENV:Envelope>"#;

    let err = parse_response(body.as_bytes()).unwrap_err();
    match err {
        XmlaError::Protocol(message) => assert!(message.contains("DiscoverResponse")),
        other => panic!("expected Protocol, got {other:?}"),
    }
}
