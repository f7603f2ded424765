//! Catalog of supported Discover request types.
//!
//! Each request type maps to one row of a closed table: wire name, SOAP
//! action, row element name, and which restriction keys it requires and
//! accepts. Adding a metadata kind means adding a variant, one table row here
//! and one handler in `metadata::handler`.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{XmlaError, XmlaResult};

/// SOAP action of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapAction {
    Discover,
    Execute,
}

impl SoapAction {
    /// Element name of the request body.
    pub fn element(&self) -> &'static str {
        match self {
            SoapAction::Discover => "Discover",
            SoapAction::Execute => "Execute",
        }
    }

    /// Value of the `SOAPAction` HTTP header.
    pub fn header_value(&self) -> &'static str {
        match self {
            SoapAction::Discover => "\"urn:schemas-microsoft-com:xml-analysis:Discover\"",
            SoapAction::Execute => "\"urn:schemas-microsoft-com:xml-analysis:Execute\"",
        }
    }
}

/// Supported Discover request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataRequest {
    DiscoverDatasources,
    DiscoverLiterals,
    DbschemaCatalogs,
    DbschemaSchemata,
    MdschemaCubes,
    MdschemaDimensions,
    MdschemaHierarchies,
    MdschemaLevels,
    MdschemaMembers,
    MdschemaMeasures,
    MdschemaMeasuregroups,
    MdschemaMeasuregroupDimensions,
    MdschemaFunctions,
}

/// One row of the request table.
#[derive(Debug, Clone, Copy)]
pub struct RequestShape {
    /// `RequestType` value on the wire.
    pub name: &'static str,
    /// SOAP action carrying the request.
    pub action: SoapAction,
    /// Local name of each row element in the response rowset.
    pub row_element: &'static str,
    /// Restriction keys that must be present.
    pub required: &'static [&'static str],
    /// Restriction keys the request accepts, in the order servers document them.
    pub allowed: &'static [&'static str],
}

impl MetadataRequest {
    /// Every request type, in table order.
    pub const ALL: [MetadataRequest; 13] = [
        MetadataRequest::DiscoverDatasources,
        MetadataRequest::DiscoverLiterals,
        MetadataRequest::DbschemaCatalogs,
        MetadataRequest::DbschemaSchemata,
        MetadataRequest::MdschemaCubes,
        MetadataRequest::MdschemaDimensions,
        MetadataRequest::MdschemaHierarchies,
        MetadataRequest::MdschemaLevels,
        MetadataRequest::MdschemaMembers,
        MetadataRequest::MdschemaMeasures,
        MetadataRequest::MdschemaMeasuregroups,
        MetadataRequest::MdschemaMeasuregroupDimensions,
        MetadataRequest::MdschemaFunctions,
    ];

    /// The table row for this request type.
    pub fn shape(&self) -> RequestShape {
        use MetadataRequest::*;

        let (name, required, allowed): (&str, &[&str], &[&str]) = match self {
            DiscoverDatasources => (
                "DISCOVER_DATASOURCES",
                &[],
                &["DataSourceName", "URL", "ProviderName", "ProviderType", "AuthenticationMode"],
            ),
            DiscoverLiterals => ("DISCOVER_LITERALS", &[], &["LiteralName"]),
            DbschemaCatalogs => ("DBSCHEMA_CATALOGS", &[], &["CATALOG_NAME"]),
            DbschemaSchemata => (
                "DBSCHEMA_SCHEMATA",
                &["CATALOG_NAME"],
                &["CATALOG_NAME", "SCHEMA_NAME", "SCHEMA_OWNER"],
            ),
            MdschemaCubes => (
                "MDSCHEMA_CUBES",
                &["CATALOG_NAME"],
                &["CATALOG_NAME", "SCHEMA_NAME", "CUBE_NAME", "CUBE_SOURCE"],
            ),
            MdschemaDimensions => (
                "MDSCHEMA_DIMENSIONS",
                &["CATALOG_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "DIMENSION_NAME",
                    "DIMENSION_UNIQUE_NAME",
                    "CUBE_SOURCE",
                    "DIMENSION_VISIBILITY",
                ],
            ),
            MdschemaHierarchies => (
                "MDSCHEMA_HIERARCHIES",
                &["CATALOG_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "DIMENSION_UNIQUE_NAME",
                    "HIERARCHY_NAME",
                    "HIERARCHY_UNIQUE_NAME",
                    "HIERARCHY_ORIGIN",
                    "CUBE_SOURCE",
                    "HIERARCHY_VISIBILITY",
                ],
            ),
            MdschemaLevels => (
                "MDSCHEMA_LEVELS",
                &["CATALOG_NAME", "CUBE_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "DIMENSION_UNIQUE_NAME",
                    "HIERARCHY_UNIQUE_NAME",
                    "LEVEL_NAME",
                    "LEVEL_UNIQUE_NAME",
                    "LEVEL_ORIGIN",
                    "CUBE_SOURCE",
                    "LEVEL_VISIBILITY",
                ],
            ),
            MdschemaMembers => (
                "MDSCHEMA_MEMBERS",
                &["CATALOG_NAME", "CUBE_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "DIMENSION_UNIQUE_NAME",
                    "HIERARCHY_UNIQUE_NAME",
                    "LEVEL_UNIQUE_NAME",
                    "LEVEL_NUMBER",
                    "MEMBER_NAME",
                    "MEMBER_UNIQUE_NAME",
                    "MEMBER_CAPTION",
                    "MEMBER_TYPE",
                    "TREE_OP",
                    "CUBE_SOURCE",
                ],
            ),
            MdschemaMeasures => (
                "MDSCHEMA_MEASURES",
                &["CATALOG_NAME", "CUBE_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "MEASURE_NAME",
                    "MEASURE_UNIQUE_NAME",
                    "MEASUREGROUP_NAME",
                    "CUBE_SOURCE",
                    "MEASURE_VISIBILITY",
                ],
            ),
            MdschemaMeasuregroups => (
                "MDSCHEMA_MEASUREGROUPS",
                &["CATALOG_NAME", "CUBE_NAME"],
                &["CATALOG_NAME", "SCHEMA_NAME", "CUBE_NAME", "MEASUREGROUP_NAME"],
            ),
            MdschemaMeasuregroupDimensions => (
                "MDSCHEMA_MEASUREGROUP_DIMENSIONS",
                &["CATALOG_NAME", "CUBE_NAME", "MEASUREGROUP_NAME"],
                &[
                    "CATALOG_NAME",
                    "SCHEMA_NAME",
                    "CUBE_NAME",
                    "MEASUREGROUP_NAME",
                    "DIMENSION_UNIQUE_NAME",
                    "DIMENSION_VISIBILITY",
                ],
            ),
            MdschemaFunctions => (
                "MDSCHEMA_FUNCTIONS",
                &[],
                &["LIBRARY_NAME", "INTERFACE_NAME", "FUNCTION_NAME", "ORIGIN"],
            ),
        };

        RequestShape {
            name,
            action: SoapAction::Discover,
            row_element: "row",
            required,
            allowed,
        }
    }

    /// `RequestType` value on the wire.
    pub fn name(&self) -> &'static str {
        self.shape().name
    }

    /// Resolve a wire name.
    pub fn from_name(name: &str) -> XmlaResult<Self> {
        static BY_NAME: Lazy<HashMap<&'static str, MetadataRequest>> = Lazy::new(|| {
            MetadataRequest::ALL
                .iter()
                .map(|request| (request.name(), *request))
                .collect()
        });

        BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| XmlaError::UnknownRequestType(name.to_string()))
    }

    /// Check restriction keys against the table before anything is sent.
    pub fn validate(&self, restrictions: &Restrictions) -> XmlaResult<()> {
        let shape = self.shape();

        for (key, _) in restrictions.iter() {
            if !shape.allowed.iter().any(|allowed| *allowed == key) {
                return Err(XmlaError::UnsupportedRestriction {
                    request: shape.name.to_string(),
                    key: key.to_string(),
                });
            }
        }
        for key in shape.required {
            if restrictions.get(key).is_none() {
                return Err(XmlaError::MissingRestriction {
                    request: shape.name.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for MetadataRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered name/value pairs narrowing a Discover request.
///
/// Order is preserved on the wire; some providers short-circuit on the first
/// restriction they recognise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restrictions {
    pairs: Vec<(String, String)>,
}

impl Restrictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a restriction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Append a restriction when `value` is present.
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Value of the first restriction named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
