use std::sync::Arc;

use super::context::Context;
use super::deferred::DeferredNamedList;
use super::handler::RowHandler;
use super::level::Level;
use super::member::{lookup_member, Member};
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::{optional_string, require_string};

/// A hierarchy of a dimension.
///
/// The default member is held by name and fetched on request.
#[derive(Debug)]
pub struct Hierarchy {
    name: String,
    unique_name: String,
    caption: String,
    description: Option<String>,
    dimension_unique_name: Option<String>,
    all_member: Option<String>,
    default_member: Option<String>,
    context: Context,
    client: Arc<XmlaClient>,
    levels: DeferredNamedList<Level>,
}

impl Hierarchy {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "HIERARCHY_NAME")?;
        let unique_name = require_string(row, "HIERARCHY_UNIQUE_NAME")?;
        let dimension_unique_name = context
            .dimension()
            .map(str::to_string)
            .or_else(|| optional_string(row, "DIMENSION_UNIQUE_NAME"));

        let mut context = context.with_hierarchy(&unique_name);
        context.dimension = dimension_unique_name.clone();
        if context.cube.is_none() {
            context.cube = optional_string(row, "CUBE_NAME");
        }

        let levels = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::MdschemaLevels,
            context.clone(),
            Restrictions::new()
                .with_opt("CATALOG_NAME", context.catalog())
                .with_opt("SCHEMA_NAME", context.schema())
                .with_opt("CUBE_NAME", context.cube())
                .with_opt("DIMENSION_UNIQUE_NAME", context.dimension())
                .with("HIERARCHY_UNIQUE_NAME", &unique_name),
            RowHandler::merging(client.clone(), Level::from_row),
        );

        Ok(Self {
            caption: optional_string(row, "HIERARCHY_CAPTION").unwrap_or_else(|| name.clone()),
            description: optional_string(row, "DESCRIPTION"),
            all_member: optional_string(row, "ALL_MEMBER"),
            default_member: optional_string(row, "DEFAULT_MEMBER"),
            dimension_unique_name,
            name,
            unique_name,
            context,
            client: client.clone(),
            levels,
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

    pub fn dimension_unique_name(&self) -> Option<&str> {
        self.dimension_unique_name.as_deref()
    }

    /// Whether the hierarchy has an "all" member above its top level.
    pub fn has_all(&self) -> bool {
        self.all_member.is_some()
    }

    pub fn all_member_name(&self) -> Option<&str> {
        self.all_member.as_deref()
    }

    pub fn default_member_name(&self) -> Option<&str> {
        self.default_member.as_deref()
    }

    /// Fetch the default member. Not cached.
    pub async fn default_member(&self) -> XmlaResult<Option<Member>> {
        match &self.default_member {
            Some(unique_name) => lookup_member(&self.client, &self.context, unique_name).await,
            None => Ok(None),
        }
    }

    pub fn levels(&self) -> &DeferredNamedList<Level> {
        &self.levels
    }
}

impl Named for Hierarchy {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}
