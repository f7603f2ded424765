//! Server-level metadata: data sources, literals and MDX functions.

use std::sync::Arc;

use super::context::Context;
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::row::{integer_element, optional_string, require_string};

/// A data source advertised by DISCOVER_DATASOURCES.
#[derive(Debug, Clone)]
pub struct DataSource {
    name: String,
    info: Option<String>,
    url: Option<String>,
    provider_name: Option<String>,
    description: Option<String>,
}

impl DataSource {
    pub(crate) fn from_row(
        _client: &Arc<XmlaClient>,
        _context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        Ok(Self {
            name: require_string(row, "DataSourceName")?,
            info: optional_string(row, "DataSourceInfo"),
            url: optional_string(row, "URL"),
            provider_name: optional_string(row, "ProviderName"),
            description: optional_string(row, "DataSourceDescription"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value to send as the `DataSourceInfo` property.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Named for DataSource {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Quoting rules for one kind of literal (identifier, string, ...).
#[derive(Debug, Clone)]
pub struct Literal {
    name: String,
    value: Option<String>,
    invalid_chars: Option<String>,
    invalid_starting_chars: Option<String>,
    max_length: Option<i32>,
}

impl Literal {
    pub(crate) fn from_row(
        _client: &Arc<XmlaClient>,
        _context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        Ok(Self {
            name: require_string(row, "LiteralName")?,
            value: optional_string(row, "LiteralValue"),
            invalid_chars: optional_string(row, "LiteralInvalidChars"),
            invalid_starting_chars: optional_string(row, "LiteralInvalidStartingChars"),
            max_length: integer_element(row, "LiteralMaxLength")?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The literal text itself, e.g. the quote character.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn invalid_chars(&self) -> Option<&str> {
        self.invalid_chars.as_deref()
    }

    pub fn invalid_starting_chars(&self) -> Option<&str> {
        self.invalid_starting_chars.as_deref()
    }

    /// Maximum length, `-1` or `None` meaning unbounded.
    pub fn max_length(&self) -> Option<i32> {
        self.max_length
    }
}

impl Named for Literal {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An MDX function. Overloads share a name, so functions are kept in a plain list.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    description: Option<String>,
    parameter_list: Option<String>,
    return_type: Option<i32>,
    origin: Option<i32>,
    interface_name: Option<String>,
}

impl Function {
    pub(crate) fn from_row(row: &Element) -> XmlaResult<Self> {
        Ok(Self {
            name: require_string(row, "FUNCTION_NAME")?,
            description: optional_string(row, "DESCRIPTION"),
            parameter_list: optional_string(row, "PARAMETER_LIST"),
            return_type: integer_element(row, "RETURN_TYPE")?,
            origin: integer_element(row, "ORIGIN")?,
            interface_name: optional_string(row, "INTERFACE_NAME"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Comma-separated parameter signature.
    pub fn parameter_list(&self) -> Option<&str> {
        self.parameter_list.as_deref()
    }

    pub fn return_type(&self) -> Option<i32> {
        self.return_type
    }

    pub fn origin(&self) -> Option<i32> {
        self.origin
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.interface_name.as_deref()
    }
}
