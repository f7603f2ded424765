use std::sync::Arc;

use tokio::sync::OnceCell;

use super::context::Context;
use super::deferred::DeferredNamedList;
use super::dimension::{flatten_hierarchies, Dimension};
use super::handler::{MeasureGroupHandler, RowHandler};
use super::hierarchy::Hierarchy;
use super::measure::Measure;
use super::measure_group::MeasureGroup;
use super::member::{lookup_member, Member};
use super::named_list::{Named, NamedList};
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::{optional_string, require_string};

/// Restrictions selecting the cube named in `context`.
pub(crate) fn cube_restrictions(context: &Context) -> Restrictions {
    Restrictions::new()
        .with_opt("CATALOG_NAME", context.catalog())
        .with_opt("SCHEMA_NAME", context.schema())
        .with_opt("CUBE_NAME", context.cube())
}

/// A cube: dimensions, measures and measure groups over one fact space.
#[derive(Debug)]
pub struct Cube {
    name: String,
    caption: String,
    description: Option<String>,
    context: Context,
    client: Arc<XmlaClient>,
    dimensions: Arc<DeferredNamedList<Dimension>>,
    measures: DeferredNamedList<Measure>,
    measure_groups: DeferredNamedList<MeasureGroup>,
    hierarchies: OnceCell<Arc<NamedList<Hierarchy>>>,
}

impl Cube {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "CUBE_NAME")?;
        let mut context = context.with_cube(&name);
        if context.schema.is_none() {
            context.schema = optional_string(row, "SCHEMA_NAME");
        }
        let scope = cube_restrictions(&context);

        let dimensions = Arc::new(DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaDimensions,
            context.clone(),
            scope.clone(),
            RowHandler::merging(client.clone(), Dimension::from_row),
        ));
        let measures = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaMeasures,
            context.clone(),
            scope.clone(),
            RowHandler::new(client.clone(), Measure::from_row),
        );
        let measure_groups = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaMeasuregroups,
            context.clone(),
            scope,
            MeasureGroupHandler::new(client.clone(), Arc::downgrade(&dimensions)),
        );

        Ok(Self {
            caption: optional_string(row, "CUBE_CAPTION").unwrap_or_else(|| name.clone()),
            description: optional_string(row, "DESCRIPTION"),
            name,
            context,
            client: client.clone(),
            dimensions,
            measures,
            measure_groups,
            hierarchies: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn catalog_name(&self) -> Option<&str> {
        self.context.catalog()
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.context.schema()
    }

    pub fn dimensions(&self) -> &DeferredNamedList<Dimension> {
        &self.dimensions
    }

    pub fn measures(&self) -> &DeferredNamedList<Measure> {
        &self.measures
    }

    pub fn measure_groups(&self) -> &DeferredNamedList<MeasureGroup> {
        &self.measure_groups
    }

    /// Every hierarchy of every dimension, in dimension order.
    pub async fn hierarchies(&self) -> XmlaResult<Arc<NamedList<Hierarchy>>> {
        self.hierarchies
            .get_or_try_init(|| async { flatten_hierarchies(&self.dimensions).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Fetch a member by unique name. Not cached.
    pub async fn lookup_member(&self, unique_name: &str) -> XmlaResult<Option<Member>> {
        lookup_member(&self.client, &self.context, unique_name).await
    }
}

impl Named for Cube {
    fn name(&self) -> &str {
        &self.name
    }
}
