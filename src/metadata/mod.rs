//! OLAP metadata model.
//!
//! Every collection below is a [`DeferredNamedList`]: it issues its Discover
//! request on first read and caches the result for the life of the
//! connection.
//!
//! # Architecture
//!
//! ```text
//! Catalog ──► Schema ──► Cube ──┬──► Dimension ──► Hierarchy ──► Level ··► Member
//!               │               ├──► Measure                                (uncached)
//!               │               └──► MeasureGroup ──┬──► Dimension (shared with cube)
//!               │                                   └──► Measure
//!               └──► shared Dimension
//!
//! DeferredNamedList::items()
//!        │  Empty: one Discover request
//!        ▼
//! XmlaClient ──► XmlaProxy ──► rows ──► Handler ──► NamedList (row order)
//! ```
//!
//! Back-references (a member's parent, a hierarchy's default member) are kept
//! as unique names and resolved with a fresh lookup, so no object owns its
//! ancestors.

mod catalog;
mod context;
mod cube;
mod deferred;
mod dimension;
mod handler;
mod hierarchy;
mod level;
mod measure;
mod measure_group;
mod member;
mod named_list;
mod schema;
mod server;

pub use catalog::Catalog;
pub use context::Context;
pub use cube::Cube;
pub use deferred::DeferredNamedList;
pub use dimension::{Dimension, DimensionType};
pub use handler::{Handler, MeasureGroupDimensionHandler, MeasureGroupHandler, RowBuilder, RowHandler};
pub use hierarchy::Hierarchy;
pub use level::Level;
pub use measure::{Aggregator, Measure};
pub use measure_group::MeasureGroup;
pub use member::{Member, MemberType};
pub use named_list::{Named, NamedList};
pub use schema::Schema;
pub use server::{DataSource, Function, Literal};
