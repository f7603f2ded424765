use std::sync::{Arc, Weak};

use tokio::sync::OnceCell;

use super::context::Context;
use super::cube::cube_restrictions;
use super::deferred::DeferredNamedList;
use super::dimension::{flatten_hierarchies, Dimension};
use super::handler::{MeasureGroupDimensionHandler, RowHandler};
use super::hierarchy::Hierarchy;
use super::measure::Measure;
use super::named_list::{Named, NamedList};
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::MetadataRequest;
use crate::xmla::row::{optional_string, require_string};

/// A measure group: the measures sharing one grain and the dimensions they use.
///
/// `dimensions` holds the cube's own `Dimension` objects, restricted to those
/// this group uses. `hierarchies` is derived from them on first use and cached
/// separately.
#[derive(Debug)]
pub struct MeasureGroup {
    name: String,
    unique_name: String,
    caption: String,
    description: Option<String>,
    context: Context,
    dimensions: DeferredNamedList<Dimension>,
    measures: DeferredNamedList<Measure>,
    hierarchies: OnceCell<Arc<NamedList<Hierarchy>>>,
}

impl MeasureGroup {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
        cube_dimensions: Weak<DeferredNamedList<Dimension>>,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "MEASUREGROUP_NAME")?;
        let context = context.with_measure_group(&name);
        let scope = cube_restrictions(&context).with("MEASUREGROUP_NAME", &name);

        let dimensions = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaMeasuregroupDimensions,
            context.clone(),
            scope.clone(),
            MeasureGroupDimensionHandler::new(cube_dimensions),
        );
        let measures = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaMeasures,
            context.clone(),
            scope,
            RowHandler::new(client.clone(), Measure::from_row),
        );

        Ok(Self {
            caption: optional_string(row, "MEASUREGROUP_CAPTION").unwrap_or_else(|| name.clone()),
            description: optional_string(row, "DESCRIPTION"),
            unique_name: format!("[{name}]"),
            name,
            context,
            dimensions,
            measures,
            hierarchies: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bracketed name, e.g. `[Sales]`.
    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Measure groups are always visible; the rowset has no visibility column.
    pub fn is_visible(&self) -> bool {
        true
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn cube_name(&self) -> Option<&str> {
        self.context.cube()
    }

    pub fn dimensions(&self) -> &DeferredNamedList<Dimension> {
        &self.dimensions
    }

    pub fn measures(&self) -> &DeferredNamedList<Measure> {
        &self.measures
    }

    /// Hierarchies of this group's dimensions only, in dimension order.
    pub async fn hierarchies(&self) -> XmlaResult<Arc<NamedList<Hierarchy>>> {
        self.hierarchies
            .get_or_try_init(|| async { flatten_hierarchies(&self.dimensions).await.map(Arc::new) })
            .await
            .cloned()
    }
}

impl Named for MeasureGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}
