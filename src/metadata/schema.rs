use std::sync::Arc;

use super::context::Context;
use super::cube::Cube;
use super::deferred::DeferredNamedList;
use super::dimension::Dimension;
use super::handler::RowHandler;
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::require_string;

/// `CUBE_SOURCE` value selecting dimensions shared across cubes.
const CUBE_SOURCE_DIMENSIONS: &str = "2";

/// A schema within a catalog.
#[derive(Debug)]
pub struct Schema {
    catalog: String,
    name: String,
    cubes: DeferredNamedList<Cube>,
    shared_dimensions: DeferredNamedList<Dimension>,
}

impl Schema {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "SCHEMA_NAME")?;
        let catalog = match context.catalog() {
            Some(catalog) => catalog.to_string(),
            None => require_string(row, "CATALOG_NAME")?,
        };
        let context = context.with_catalog(&catalog).with_schema(&name);

        let scope = Restrictions::new()
            .with("CATALOG_NAME", &catalog)
            .with("SCHEMA_NAME", &name);

        let cubes = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaCubes,
            context.clone(),
            scope.clone(),
            RowHandler::new(client.clone(), Cube::from_row),
        );
        let shared_dimensions = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaDimensions,
            context,
            scope.with("CUBE_SOURCE", CUBE_SOURCE_DIMENSIONS),
            RowHandler::merging(client.clone(), Dimension::from_row),
        );

        Ok(Self {
            catalog,
            name,
            cubes,
            shared_dimensions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog
    }

    pub fn cubes(&self) -> &DeferredNamedList<Cube> {
        &self.cubes
    }

    /// Dimensions defined at schema level and shared by cubes.
    pub fn shared_dimensions(&self) -> &DeferredNamedList<Dimension> {
        &self.shared_dimensions
    }
}

impl Named for Schema {
    fn name(&self) -> &str {
        &self.name
    }
}
