use std::sync::Arc;

use super::context::Context;
use super::deferred::DeferredNamedList;
use super::handler::RowHandler;
use super::named_list::Named;
use super::schema::Schema;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::{optional_string, require_string};

/// A catalog (database) on the server.
#[derive(Debug)]
pub struct Catalog {
    name: String,
    description: Option<String>,
    schemas: DeferredNamedList<Schema>,
}

impl Catalog {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "CATALOG_NAME")?;
        let context = context.with_catalog(&name);
        let schemas = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::DbschemaSchemata,
            context,
            Restrictions::new().with("CATALOG_NAME", &name),
            RowHandler::new(client.clone(), Schema::from_row),
        );

        Ok(Self {
            description: optional_string(row, "DESCRIPTION"),
            name,
            schemas,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn schemas(&self) -> &DeferredNamedList<Schema> {
        &self.schemas
    }
}

impl Named for Catalog {
    fn name(&self) -> &str {
        &self.name
    }
}
