//! Typed field extraction from rows of a decoded rowset.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use olapxml::xmla::row::{
    big_decimal_element, big_integer_element, boolean_element, double_element, find_children,
    int_element, integer_element, long_element, optional_string, string_element,
};
use olapxml::xmla::{parse_response, Element, ROWSET_NS};
use olapxml::XmlaError;

/// Rows of an MDSCHEMA_LEVELS-style response, as a Mondrian server sends them.
fn rows() -> Vec<Element> {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <cxmla:DiscoverResponse xmlns:cxmla="urn:schemas-microsoft-com:xml-analysis">
      <cxmla:return>
        <root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset"
              xmlns:xsd="http://www.w3.org/2001/XMLSchema">
          <xsd:schema targetNamespace="urn:schemas-microsoft-com:xml-analysis:rowset"/>
          <row>
            <LEVEL_NAME>Store Country</LEVEL_NAME>
            <LEVEL_NUMBER>1</LEVEL_NUMBER>
            <LEVEL_CARDINALITY>3</LEVEL_CARDINALITY>
            <LEVEL_TYPE></LEVEL_TYPE>
            <LEVEL_IS_VISIBLE>true</LEVEL_IS_VISIBLE>
            <MEMBER_COUNT>9007199254740993</MEMBER_COUNT>
            <AVG_SALES>12.375</AVG_SALES>
            <SCOPE><Global/></SCOPE>
          </row>
          <row>
            <LEVEL_NAME>Store State</LEVEL_NAME>
            <LEVEL_NUMBER>two</LEVEL_NUMBER>
            <LEVEL_IS_VISIBLE>false</LEVEL_IS_VISIBLE>
            <DESCRIPTION/>
          </row>
        </root>
      </cxmla:return>
    </cxmla:DiscoverResponse>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    let root = parse_response(body.as_bytes()).unwrap();
    find_children(&root, Some(ROWSET_NS), "row")
        .into_iter()
        .cloned()
        .collect()
}

#[test]
fn test_rows_skip_inline_schema() {
    let rows = rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(string_element(&rows[0], "LEVEL_NAME").as_deref(), Some("Store Country"));
}

#[test]
fn test_absent_integer_is_none_but_required_integer_fails() {
    let rows = rows();

    assert_eq!(integer_element(&rows[1], "LEVEL_CARDINALITY").unwrap(), None);
    assert!(matches!(
        int_element(&rows[1], "LEVEL_CARDINALITY"),
        Err(XmlaError::MissingField { field }) if field == "LEVEL_CARDINALITY"
    ));

    // Present but empty reads as absent.
    assert_eq!(integer_element(&rows[0], "LEVEL_TYPE").unwrap(), None);
    assert_eq!(int_element(&rows[0], "LEVEL_NUMBER").unwrap(), 1);
}

#[test]
fn test_malformed_number_is_invalid_field() {
    let rows = rows();
    let err = integer_element(&rows[1], "LEVEL_NUMBER").unwrap_err();
    match err {
        XmlaError::InvalidField { field, value, .. } => {
            assert_eq!(field, "LEVEL_NUMBER");
            assert_eq!(value, "two");
        }
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn test_wide_numeric_fields() {
    let rows = rows();
    assert_eq!(long_element(&rows[0], "MEMBER_COUNT").unwrap(), 9_007_199_254_740_993);
    assert_eq!(
        big_integer_element(&rows[0], "MEMBER_COUNT").unwrap(),
        "9007199254740993".parse::<BigInt>().unwrap()
    );
    assert_eq!(double_element(&rows[0], "AVG_SALES").unwrap(), 12.375);
    assert_eq!(
        big_decimal_element(&rows[0], "AVG_SALES").unwrap(),
        "12.375".parse::<BigDecimal>().unwrap()
    );
}

#[test]
fn test_structured_content_reads_as_marker_name() {
    let rows = rows();
    assert_eq!(string_element(&rows[0], "SCOPE").as_deref(), Some("Global"));
}

#[test]
fn test_empty_element_is_present_but_not_optional() {
    let rows = rows();
    assert_eq!(string_element(&rows[1], "DESCRIPTION").as_deref(), Some(""));
    assert_eq!(optional_string(&rows[1], "DESCRIPTION"), None);
    assert_eq!(string_element(&rows[1], "CAPTION"), None);
}

#[test]
fn test_boolean_fields() {
    let rows = rows();
    assert!(boolean_element(&rows[0], "LEVEL_IS_VISIBLE"));
    assert!(!boolean_element(&rows[1], "LEVEL_IS_VISIBLE"));
    assert!(!boolean_element(&rows[1], "MISSING"));
}
