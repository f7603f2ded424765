use std::sync::Arc;

use super::context::Context;
use super::cube::{cube_restrictions, Cube};
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::request::MetadataRequest;
use crate::xmla::row::{int_element, integer_element, optional_string, require_string};

/// Member type, from the `MEMBER_TYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
    Unknown,
    Regular,
    All,
    Measure,
    Formula,
}

impl MemberType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => MemberType::Regular,
            2 => MemberType::All,
            3 => MemberType::Measure,
            4 => MemberType::Formula,
            _ => MemberType::Unknown,
        }
    }
}

/// A member of a level.
///
/// The parent is held by unique name and resolved against the cube on request.
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    unique_name: String,
    caption: String,
    level_unique_name: Option<String>,
    hierarchy_unique_name: Option<String>,
    dimension_unique_name: Option<String>,
    depth: i32,
    ordinal: Option<i32>,
    member_type: MemberType,
    parent_unique_name: Option<String>,
    children_cardinality: Option<i32>,
}

impl Member {
    pub(crate) fn from_row(context: &Context, row: &Element) -> XmlaResult<Self> {
        let name = require_string(row, "MEMBER_NAME")?;
        Ok(Self {
            unique_name: require_string(row, "MEMBER_UNIQUE_NAME")?,
            caption: optional_string(row, "MEMBER_CAPTION").unwrap_or_else(|| name.clone()),
            level_unique_name: optional_string(row, "LEVEL_UNIQUE_NAME")
                .or_else(|| context.level().map(str::to_string)),
            hierarchy_unique_name: optional_string(row, "HIERARCHY_UNIQUE_NAME")
                .or_else(|| context.hierarchy().map(str::to_string)),
            dimension_unique_name: optional_string(row, "DIMENSION_UNIQUE_NAME")
                .or_else(|| context.dimension().map(str::to_string)),
            depth: int_element(row, "LEVEL_NUMBER")?,
            ordinal: integer_element(row, "MEMBER_ORDINAL")?,
            member_type: integer_element(row, "MEMBER_TYPE")?
                .map(MemberType::from_code)
                .unwrap_or(MemberType::Unknown),
            parent_unique_name: optional_string(row, "PARENT_UNIQUE_NAME"),
            children_cardinality: integer_element(row, "CHILDREN_CARDINALITY")?,
            name,
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

    pub fn level_unique_name(&self) -> Option<&str> {
        self.level_unique_name.as_deref()
    }

    pub fn hierarchy_unique_name(&self) -> Option<&str> {
        self.hierarchy_unique_name.as_deref()
    }

    pub fn dimension_unique_name(&self) -> Option<&str> {
        self.dimension_unique_name.as_deref()
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn ordinal(&self) -> Option<i32> {
        self.ordinal
    }

    pub fn member_type(&self) -> MemberType {
        self.member_type
    }

    pub fn parent_unique_name(&self) -> Option<&str> {
        self.parent_unique_name.as_deref()
    }

    pub fn children_cardinality(&self) -> Option<i32> {
        self.children_cardinality
    }

    /// Fetch the parent member from `cube`. Not cached.
    pub async fn parent(&self, cube: &Cube) -> XmlaResult<Option<Member>> {
        match &self.parent_unique_name {
            Some(parent) => cube.lookup_member(parent).await,
            None => Ok(None),
        }
    }
}

impl Named for Member {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}

/// Fetch one member of the cube in `context` by unique name.
pub(crate) async fn lookup_member(
    client: &Arc<XmlaClient>,
    context: &Context,
    unique_name: &str,
) -> XmlaResult<Option<Member>> {
    let restrictions = cube_restrictions(context).with("MEMBER_UNIQUE_NAME", unique_name);
    let rows = client
        .discover(MetadataRequest::MdschemaMembers, context.catalog(), &restrictions)
        .await?;

    rows.first()
        .map(|row| Member::from_row(context, row))
        .transpose()
}
