use std::sync::Arc;

use futures::future::try_join_all;

use super::context::Context;
use super::deferred::DeferredNamedList;
use super::handler::RowHandler;
use super::hierarchy::Hierarchy;
use super::named_list::{Named, NamedList};
use crate::client::XmlaClient;
use crate::error::{XmlaError, XmlaResult};
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::{integer_element, optional_string, require_string};

/// Dimension type, from the `DIMENSION_TYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionType {
    Unknown,
    Time,
    Measure,
    Other,
    Quantitative,
    Accounts,
    Customers,
    Products,
    Scenario,
    Utility,
    Currency,
    Rates,
    Channel,
    Promotion,
    Organization,
    BillOfMaterials,
    Geography,
}

impl DimensionType {
    pub fn from_code(code: i32) -> Option<Self> {
        use DimensionType::*;
        Some(match code {
            0 => Unknown,
            1 => Time,
            2 => Measure,
            3 => Other,
            5 => Quantitative,
            6 => Accounts,
            7 => Customers,
            8 => Products,
            9 => Scenario,
            10 => Utility,
            11 => Currency,
            12 => Rates,
            13 => Channel,
            14 => Promotion,
            15 => Organization,
            16 => BillOfMaterials,
            17 => Geography,
            _ => return None,
        })
    }

    pub fn code(&self) -> i32 {
        use DimensionType::*;
        match self {
            Unknown => 0,
            Time => 1,
            Measure => 2,
            Other => 3,
            Quantitative => 5,
            Accounts => 6,
            Customers => 7,
            Products => 8,
            Scenario => 9,
            Utility => 10,
            Currency => 11,
            Rates => 12,
            Channel => 13,
            Promotion => 14,
            Organization => 15,
            BillOfMaterials => 16,
            Geography => 17,
        }
    }
}

/// A dimension of a cube, or a shared dimension of a schema.
#[derive(Debug)]
pub struct Dimension {
    name: String,
    unique_name: String,
    caption: String,
    description: Option<String>,
    dimension_type: DimensionType,
    ordinal: Option<i32>,
    default_hierarchy: Option<String>,
    context: Context,
    hierarchies: DeferredNamedList<Hierarchy>,
}

impl Dimension {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "DIMENSION_NAME")?;
        let unique_name = require_string(row, "DIMENSION_UNIQUE_NAME")?;

        let mut context = context.with_dimension(&unique_name);
        // Shared dimensions are listed outside any cube; their rows name one.
        if context.cube.is_none() {
            context.cube = optional_string(row, "CUBE_NAME");
        }

        let dimension_type = match integer_element(row, "DIMENSION_TYPE")? {
            None => DimensionType::Unknown,
            Some(code) => DimensionType::from_code(code).ok_or_else(|| {
                XmlaError::invalid_field("DIMENSION_TYPE", code.to_string(), "unknown dimension type")
            })?,
        };

        let hierarchies = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaHierarchies,
            context.clone(),
            Restrictions::new()
                .with_opt("CATALOG_NAME", context.catalog())
                .with_opt("SCHEMA_NAME", context.schema())
                .with_opt("CUBE_NAME", context.cube())
                .with("DIMENSION_UNIQUE_NAME", &unique_name),
            RowHandler::merging(client.clone(), Hierarchy::from_row),
        );

        Ok(Self {
            caption: optional_string(row, "DIMENSION_CAPTION").unwrap_or_else(|| name.clone()),
            description: optional_string(row, "DESCRIPTION"),
            dimension_type,
            ordinal: integer_element(row, "DIMENSION_ORDINAL")?,
            default_hierarchy: optional_string(row, "DEFAULT_HIERARCHY"),
            name,
            unique_name,
            context,
            hierarchies,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dimension_type(&self) -> DimensionType {
        self.dimension_type
    }

    pub fn ordinal(&self) -> Option<i32> {
        self.ordinal
    }

    /// Unique name of the default hierarchy, as reported by the server.
    pub fn default_hierarchy_name(&self) -> Option<&str> {
        self.default_hierarchy.as_deref()
    }

    /// The default hierarchy, falling back to the first one.
    pub async fn default_hierarchy(&self) -> XmlaResult<Option<Arc<Hierarchy>>> {
        let hierarchies = self.hierarchies.items().await?;
        let found = self
            .default_hierarchy
            .as_deref()
            .and_then(|name| hierarchies.get(name))
            .or_else(|| hierarchies.get_index(0));
        Ok(found.cloned())
    }

    pub fn cube_name(&self) -> Option<&str> {
        self.context.cube()
    }

    pub fn hierarchies(&self) -> &DeferredNamedList<Hierarchy> {
        &self.hierarchies
    }
}

impl Named for Dimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}

/// Hierarchies of every dimension in `dimensions`, in dimension order.
pub(crate) async fn flatten_hierarchies(
    dimensions: &DeferredNamedList<Dimension>,
) -> XmlaResult<NamedList<Hierarchy>> {
    let items = dimensions.items().await?;
    let per_dimension =
        try_join_all(items.iter().map(|dimension| dimension.hierarchies().items())).await?;

    let mut flattened = NamedList::new();
    for hierarchy in per_dimension.iter().flat_map(|hierarchies| hierarchies.iter()) {
        if !flattened.insert(hierarchy.clone()) {
            return Err(XmlaError::DuplicateName {
                collection: format!("hierarchies of {dimensions}"),
                name: hierarchy.unique_name().to_string(),
            });
        }
    }
    Ok(flattened)
}
