use std::sync::Arc;

use super::context::Context;
use super::member::Member;
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};
use crate::xmla::row::{int_element, integer_element, optional_string, require_string};

/// A level of a hierarchy.
///
/// Levels do not cache their members; a level can hold millions of them.
#[derive(Debug)]
pub struct Level {
    name: String,
    unique_name: String,
    caption: String,
    depth: i32,
    level_type: i32,
    cardinality: Option<i32>,
    context: Context,
    client: Arc<XmlaClient>,
}

impl Level {
    pub(crate) fn from_row(
        client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "LEVEL_NAME")?;
        let unique_name = require_string(row, "LEVEL_UNIQUE_NAME")?;

        let mut context = context.with_level(&unique_name);
        if context.hierarchy.is_none() {
            context.hierarchy = optional_string(row, "HIERARCHY_UNIQUE_NAME");
        }
        if context.dimension.is_none() {
            context.dimension = optional_string(row, "DIMENSION_UNIQUE_NAME");
        }

        Ok(Self {
            caption: optional_string(row, "LEVEL_CAPTION").unwrap_or_else(|| name.clone()),
            depth: int_element(row, "LEVEL_NUMBER")?,
            level_type: integer_element(row, "LEVEL_TYPE")?.unwrap_or(0),
            cardinality: integer_element(row, "LEVEL_CARDINALITY")?,
            name,
            unique_name,
            context,
            client: client.clone(),
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

    /// Distance from the top of the hierarchy; the top level is 0.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Raw `LEVEL_TYPE` bit mask.
    pub fn level_type(&self) -> i32 {
        self.level_type
    }

    /// Estimated member count, when the server reports one.
    pub fn cardinality(&self) -> Option<i32> {
        self.cardinality
    }

    pub fn hierarchy_unique_name(&self) -> Option<&str> {
        self.context.hierarchy()
    }

    pub fn dimension_unique_name(&self) -> Option<&str> {
        self.context.dimension()
    }

    /// Fetch this level's members. Every call issues a new request.
    pub async fn members(&self) -> XmlaResult<Vec<Member>> {
        let restrictions = Restrictions::new()
            .with_opt("CATALOG_NAME", self.context.catalog())
            .with_opt("SCHEMA_NAME", self.context.schema())
            .with_opt("CUBE_NAME", self.context.cube())
            .with("LEVEL_UNIQUE_NAME", &self.unique_name);

        let rows = self
            .client
            .discover(MetadataRequest::MdschemaMembers, self.context.catalog(), &restrictions)
            .await?;
        rows.iter()
            .map(|row| Member::from_row(&self.context, row))
            .collect()
    }
}

impl Named for Level {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}
