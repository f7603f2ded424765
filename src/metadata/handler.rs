//! Row handlers: turn one rowset row into one metadata object.

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use super::context::Context;
use super::deferred::DeferredNamedList;
use super::dimension::Dimension;
use super::measure_group::MeasureGroup;
use super::named_list::{Named, NamedList};
use crate::client::XmlaClient;
use crate::error::{XmlaError, XmlaResult};
use crate::xmla::dom::Element;
use crate::xmla::row::require_string;

/// Converts rows of one Discover request type into objects of type `T`.
///
/// `current` is the list built so far from earlier rows of the same response.
/// Returning `Ok(None)` skips the row.
#[async_trait]
pub trait Handler<T: Send + Sync + 'static>: Send + Sync {
    async fn handle(
        &self,
        row: &Element,
        context: &Context,
        current: &NamedList<T>,
    ) -> XmlaResult<Option<Arc<T>>>;
}

/// Builds an object of type `T` from a row and its context.
pub type RowBuilder<T> = fn(&Arc<XmlaClient>, &Context, &Element) -> XmlaResult<T>;

/// Handler that builds one object per row.
///
/// A merging handler skips rows whose unique name is already in the list, so
/// re-discovered dimensions, hierarchies and levels are not duplicated. A
/// plain handler lets the collection reject the duplicate.
pub struct RowHandler<T> {
    client: Arc<XmlaClient>,
    build: RowBuilder<T>,
    merge: bool,
}

impl<T> RowHandler<T> {
    pub fn new(client: Arc<XmlaClient>, build: RowBuilder<T>) -> Self {
        Self {
            client,
            build,
            merge: false,
        }
    }

    pub fn merging(client: Arc<XmlaClient>, build: RowBuilder<T>) -> Self {
        Self {
            client,
            build,
            merge: true,
        }
    }
}

#[async_trait]
impl<T: Named + Send + Sync + 'static> Handler<T> for RowHandler<T> {
    async fn handle(
        &self,
        row: &Element,
        context: &Context,
        current: &NamedList<T>,
    ) -> XmlaResult<Option<Arc<T>>> {
        let item = (self.build)(&self.client, context, row)?;
        if self.merge && current.contains_unique(item.unique_name()) {
            return Ok(None);
        }
        Ok(Some(Arc::new(item)))
    }
}

/// Builds measure groups, handing each a view of the cube's dimensions.
pub struct MeasureGroupHandler {
    client: Arc<XmlaClient>,
    cube_dimensions: Weak<DeferredNamedList<Dimension>>,
}

impl MeasureGroupHandler {
    pub fn new(client: Arc<XmlaClient>, cube_dimensions: Weak<DeferredNamedList<Dimension>>) -> Self {
        Self {
            client,
            cube_dimensions,
        }
    }
}

#[async_trait]
impl Handler<MeasureGroup> for MeasureGroupHandler {
    async fn handle(
        &self,
        row: &Element,
        context: &Context,
        _current: &NamedList<MeasureGroup>,
    ) -> XmlaResult<Option<Arc<MeasureGroup>>> {
        let group = MeasureGroup::from_row(&self.client, context, row, self.cube_dimensions.clone())?;
        Ok(Some(Arc::new(group)))
    }
}

/// Resolves MDSCHEMA_MEASUREGROUP_DIMENSIONS rows against the cube's dimensions.
///
/// The measure group's list shares the cube's `Dimension` objects rather
/// than building copies. Rows naming a dimension the cube does not have are
/// skipped with a warning.
pub struct MeasureGroupDimensionHandler {
    cube_dimensions: Weak<DeferredNamedList<Dimension>>,
}

impl MeasureGroupDimensionHandler {
    pub fn new(cube_dimensions: Weak<DeferredNamedList<Dimension>>) -> Self {
        Self { cube_dimensions }
    }
}

#[async_trait]
impl Handler<Dimension> for MeasureGroupDimensionHandler {
    async fn handle(
        &self,
        row: &Element,
        context: &Context,
        current: &NamedList<Dimension>,
    ) -> XmlaResult<Option<Arc<Dimension>>> {
        let unique_name = require_string(row, "DIMENSION_UNIQUE_NAME")?;
        if current.contains_unique(&unique_name) {
            return Ok(None);
        }

        let cube_dimensions = self.cube_dimensions.upgrade().ok_or_else(|| {
            XmlaError::OwnerDropped(format!(
                "dimensions of cube {}",
                context.cube().unwrap_or_default()
            ))
        })?;

        match cube_dimensions.get(&unique_name).await? {
            Some(dimension) => Ok(Some(dimension)),
            None => {
                tracing::warn!(
                    cube = context.cube().unwrap_or_default(),
                    measure_group = context.measure_group().unwrap_or_default(),
                    dimension = %unique_name,
                    "Measure group references unknown dimension; skipping"
                );
                Ok(None)
            }
        }
    }
}
