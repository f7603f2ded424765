use std::sync::Arc;

use super::context::Context;
use super::member::MemberType;
use super::named_list::Named;
use crate::client::XmlaClient;
use crate::error::XmlaResult;
use crate::xmla::dom::Element;
use crate::xmla::row::{integer_element, optional_string, require_string, string_element};

/// Aggregation function, from the `MEASURE_AGGREGATOR` column.
///
/// Codes a server adds beyond the XML/A set read as [`Aggregator::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregator {
    Unknown,
    Sum,
    Count,
    Min,
    Max,
    Avg,
    Var,
    Std,
    DistinctCount,
    None,
    AverageOfChildren,
    FirstChild,
    LastChild,
    FirstNonEmpty,
    LastNonEmpty,
    ByAccount,
    Calculated,
}

impl Aggregator {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Aggregator::Sum,
            2 => Aggregator::Count,
            3 => Aggregator::Min,
            4 => Aggregator::Max,
            5 => Aggregator::Avg,
            6 => Aggregator::Var,
            7 => Aggregator::Std,
            8 => Aggregator::DistinctCount,
            9 => Aggregator::None,
            10 => Aggregator::AverageOfChildren,
            11 => Aggregator::FirstChild,
            12 => Aggregator::LastChild,
            13 => Aggregator::FirstNonEmpty,
            14 => Aggregator::LastNonEmpty,
            15 => Aggregator::ByAccount,
            127 => Aggregator::Calculated,
            _ => Aggregator::Unknown,
        }
    }
}

/// A measure: a member of the measures dimension with an aggregator.
#[derive(Debug)]
pub struct Measure {
    name: String,
    unique_name: String,
    caption: String,
    description: Option<String>,
    aggregator: Aggregator,
    data_type: Option<i32>,
    visible: bool,
    measure_group: Option<String>,
    cube: Option<String>,
}

impl Measure {
    pub(crate) fn from_row(
        _client: &Arc<XmlaClient>,
        context: &Context,
        row: &Element,
    ) -> XmlaResult<Self> {
        let name = require_string(row, "MEASURE_NAME")?;

        let aggregator = integer_element(row, "MEASURE_AGGREGATOR")?
            .map(Aggregator::from_code)
            .unwrap_or(Aggregator::Unknown);

        Ok(Self {
            unique_name: require_string(row, "MEASURE_UNIQUE_NAME")?,
            caption: optional_string(row, "MEASURE_CAPTION").unwrap_or_else(|| name.clone()),
            description: optional_string(row, "DESCRIPTION"),
            aggregator,
            data_type: integer_element(row, "DATA_TYPE")?,
            // Servers that omit the column only list visible measures.
            visible: string_element(row, "MEASURE_IS_VISIBLE").map_or(true, |v| v == "true"),
            measure_group: optional_string(row, "MEASUREGROUP_NAME")
                .or_else(|| context.measure_group().map(str::to_string)),
            cube: context.cube().map(str::to_string),
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

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aggregator(&self) -> Aggregator {
        self.aggregator
    }

    /// OLE DB type code of the measure's values.
    pub fn data_type(&self) -> Option<i32> {
        self.data_type
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn measure_group_name(&self) -> Option<&str> {
        self.measure_group.as_deref()
    }

    pub fn cube_name(&self) -> Option<&str> {
        self.cube.as_deref()
    }

    /// Measures are members of type [`MemberType::Measure`].
    pub fn member_type(&self) -> MemberType {
        MemberType::Measure
    }
}

impl Named for Measure {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }
}
