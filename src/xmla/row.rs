//! Field extraction from rowset rows.
//!
//! Fields are matched by local name only; providers choose their own prefixes
//! and some omit the rowset namespace on row children entirely.
//!
//! Two flavours of typed accessor exist. `integer_element` and the other
//! `Option`-returning accessors treat an absent or empty field as "no value".
//! The strict accessors (`int_element`, `long_element`, ...) turn the same
//! input into [`XmlaError::MissingField`] instead of inventing a default.

use std::fmt::Display;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::dom::Element;
use crate::error::{XmlaError, XmlaResult};

/// First child element matching `tag`, optionally restricted to namespace `ns`.
pub fn find_child<'a>(element: &'a Element, ns: Option<&str>, tag: &str) -> Option<&'a Element> {
    element.elements().find(|child| child.is(ns, tag))
}

/// All child elements matching `tag`, optionally restricted to namespace `ns`.
pub fn find_children<'a>(element: &'a Element, ns: Option<&str>, tag: &str) -> Vec<&'a Element> {
    element.elements().filter(|child| child.is(ns, tag)).collect()
}

/// All child elements, skipping text nodes.
pub fn child_elements(element: &Element) -> Vec<&Element> {
    element.elements().collect()
}

/// Text content of an element and all its descendants.
pub fn gather_text(element: &Element) -> String {
    element.text()
}

/// Text of the field `name` in `row`.
///
/// When the field holds structured content instead of text (enumerations
/// encoded as a nested marker element), the local name of its first child
/// element is returned.
pub fn string_element(row: &Element, name: &str) -> Option<String> {
    let field = find_child(row, None, name)?;
    if field.own_text().trim().is_empty() {
        if let Some(first) = field.elements().next() {
            return Some(first.local_name().to_string());
        }
    }
    Some(field.text())
}

/// Text of the field `name`, which must be present (it may be empty).
pub fn require_string(row: &Element, name: &str) -> XmlaResult<String> {
    string_element(row, name).ok_or_else(|| XmlaError::missing_field(name))
}

/// Text of the field `name`, `None` when absent or empty.
pub fn optional_string(row: &Element, name: &str) -> Option<String> {
    string_element(row, name).filter(|s| !s.is_empty())
}

fn optional<T>(row: &Element, name: &str) -> XmlaResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match string_element(row, name) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| XmlaError::invalid_field(name, s.clone(), e)),
    }
}

fn required<T>(row: &Element, name: &str) -> XmlaResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    optional(row, name)?.ok_or_else(|| XmlaError::missing_field(name))
}

/// Integer field, `None` when absent or empty.
pub fn integer_element(row: &Element, name: &str) -> XmlaResult<Option<i32>> {
    optional(row, name)
}

/// Integer field that must be present.
pub fn int_element(row: &Element, name: &str) -> XmlaResult<i32> {
    required(row, name)
}

/// 64-bit integer field that must be present.
pub fn long_element(row: &Element, name: &str) -> XmlaResult<i64> {
    required(row, name)
}

/// 16-bit integer field that must be present.
pub fn short_element(row: &Element, name: &str) -> XmlaResult<i16> {
    required(row, name)
}

/// 8-bit integer field that must be present.
pub fn byte_element(row: &Element, name: &str) -> XmlaResult<i8> {
    required(row, name)
}

/// Double field that must be present.
pub fn double_element(row: &Element, name: &str) -> XmlaResult<f64> {
    required(row, name)
}

/// Float field that must be present.
pub fn float_element(row: &Element, name: &str) -> XmlaResult<f32> {
    required(row, name)
}

/// Arbitrary-precision decimal field that must be present.
pub fn big_decimal_element(row: &Element, name: &str) -> XmlaResult<BigDecimal> {
    required(row, name)
}

/// Arbitrary-precision integer field that must be present.
pub fn big_integer_element(row: &Element, name: &str) -> XmlaResult<BigInt> {
    required(row, name)
}

/// Boolean field; only the literal `true` counts as true.
pub fn boolean_element(row: &Element, name: &str) -> bool {
    string_element(row, name).as_deref() == Some("true")
}
