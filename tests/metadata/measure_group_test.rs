//! Measure groups: dimensions shared with the cube and derived hierarchies.

use std::sync::Arc;

use olapxml::metadata::Cube;
use olapxml::transport::canned::rowset_response;
use olapxml::transport::CannedProxy;
use olapxml::xmla::MetadataRequest;
use olapxml::{Settings, XmlaConnection, XmlaError};

const CUBE: &[(&str, &str)] = &[("CATALOG_NAME", "FoodMart"), ("SCHEMA_NAME", "FoodMart"), ("CUBE_NAME", "Sales")];

fn dimension(name: &str) -> Vec<(&str, &str)> {
    vec![("DIMENSION_NAME", name), ("DIMENSION_UNIQUE_NAME", name), ("DIMENSION_TYPE", "3")]
}

fn hierarchy<'a>(name: &'a str, dimension: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("HIERARCHY_NAME", name),
        ("HIERARCHY_UNIQUE_NAME", name),
        ("DIMENSION_UNIQUE_NAME", dimension),
    ]
}

fn rows(rows: &[Vec<(&str, &str)>]) -> String {
    let rows: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
    rowset_response(&rows)
}

fn scoped<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    CUBE.iter().copied().chain(extra.iter().copied()).collect()
}

/// FoodMart/Sales with dimensions [Store], [Time] and [Product].
///
/// Measure group "Sales" uses [Time] and [Store] (in that order) plus
/// [Warehouse], which the cube does not have.
fn proxy() -> CannedProxy {
    proxy_with_product_hierarchies(rows(&[hierarchy("[Product]", "[Product]")]))
}

fn proxy_with_product_hierarchies(product_hierarchies: String) -> CannedProxy {
    CannedProxy::new()
        .on_discover(
            MetadataRequest::DbschemaCatalogs,
            &[],
            rowset_response(&[&[("CATALOG_NAME", "FoodMart")]]),
        )
        .on_discover(
            MetadataRequest::DbschemaSchemata,
            &[("CATALOG_NAME", "FoodMart")],
            rowset_response(&[&[("CATALOG_NAME", "FoodMart"), ("SCHEMA_NAME", "FoodMart")]]),
        )
        .on_discover(
            MetadataRequest::MdschemaCubes,
            &CUBE[..2],
            rowset_response(&[&[("CUBE_NAME", "Sales"), ("CUBE_CAPTION", "Sales")]]),
        )
        .on_discover(
            MetadataRequest::MdschemaDimensions,
            CUBE,
            rows(&[dimension("[Store]"), dimension("[Time]"), dimension("[Product]")]),
        )
        .on_discover(
            MetadataRequest::MdschemaHierarchies,
            &scoped(&[("DIMENSION_UNIQUE_NAME", "[Store]")]),
            rows(&[hierarchy("[Store]", "[Store]"), hierarchy("[Store Type]", "[Store]")]),
        )
        .on_discover(
            MetadataRequest::MdschemaHierarchies,
            &scoped(&[("DIMENSION_UNIQUE_NAME", "[Time]")]),
            rows(&[hierarchy("[Time]", "[Time]"), hierarchy("[Time.Weekly]", "[Time]")]),
        )
        .on_discover(
            MetadataRequest::MdschemaHierarchies,
            &scoped(&[("DIMENSION_UNIQUE_NAME", "[Product]")]),
            product_hierarchies,
        )
        .on_discover(
            MetadataRequest::MdschemaMeasuregroups,
            CUBE,
            rowset_response(&[&[("MEASUREGROUP_NAME", "Sales")], &[("MEASUREGROUP_NAME", "Inventory")]]),
        )
        .on_discover(
            MetadataRequest::MdschemaMeasuregroupDimensions,
            &scoped(&[("MEASUREGROUP_NAME", "Sales")]),
            rowset_response(&[
                &[("DIMENSION_UNIQUE_NAME", "[Time]")],
                &[("DIMENSION_UNIQUE_NAME", "[Warehouse]")],
                &[("DIMENSION_UNIQUE_NAME", "[Store]")],
                &[("DIMENSION_UNIQUE_NAME", "[Time]")],
            ]),
        )
        .on_discover(
            MetadataRequest::MdschemaMeasures,
            &scoped(&[("MEASUREGROUP_NAME", "Sales")]),
            rowset_response(&[&[
                ("MEASURE_NAME", "Unit Sales"),
                ("MEASURE_UNIQUE_NAME", "[Measures].[Unit Sales]"),
                ("MEASURE_AGGREGATOR", "1"),
                ("MEASUREGROUP_NAME", "Sales"),
            ]]),
        )
}

async fn sales_cube(connection: &XmlaConnection) -> Arc<Cube> {
    let catalog = connection.catalog().await.unwrap().unwrap();
    let schema = catalog.schemas().get("FoodMart").await.unwrap().unwrap();
    schema.cubes().get("Sales").await.unwrap().unwrap()
}

fn open(proxy: &Arc<CannedProxy>) -> XmlaConnection {
    let settings = Settings::for_url("http://localhost:8080/xmla").with_catalog("FoodMart");
    XmlaConnection::open(&settings, proxy.clone()).unwrap()
}

#[tokio::test]
async fn test_dimensions_are_shared_with_cube() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;

    let group = cube.measure_groups().get("Sales").await.unwrap().unwrap();
    let group_dimensions = group.dimensions().items().await.unwrap();

    let names: Vec<&str> = group_dimensions.iter().map(|d| d.unique_name()).collect();
    assert_eq!(names, vec!["[Time]", "[Store]"]);

    for dimension in group_dimensions.iter() {
        let own = cube.dimensions().get(dimension.unique_name()).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(dimension, &own));
    }
    assert_eq!(proxy.requests_for(MetadataRequest::MdschemaDimensions), 1);
}

#[tokio::test]
async fn test_hierarchies_cover_only_group_dimensions() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;
    let group = cube.measure_groups().get("Sales").await.unwrap().unwrap();

    let hierarchies = group.hierarchies().await.unwrap();
    let names: Vec<&str> = hierarchies.iter().map(|h| h.unique_name()).collect();
    assert_eq!(names, vec!["[Time]", "[Time.Weekly]", "[Store]", "[Store Type]"]);
    assert!(!hierarchies.contains_unique("[Product]"));

    // Derived once, then cached.
    let again = group.hierarchies().await.unwrap();
    assert!(Arc::ptr_eq(&hierarchies, &again));
    assert_eq!(proxy.requests_for(MetadataRequest::MdschemaHierarchies), 2);
}

#[tokio::test]
async fn test_hierarchy_objects_match_dimension_lists() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;
    let group = cube.measure_groups().get("Sales").await.unwrap().unwrap();

    let derived = group.hierarchies().await.unwrap();
    let time = cube.dimensions().get("[Time]").await.unwrap().unwrap();
    let weekly = time.hierarchies().get("[Time.Weekly]").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(derived.get("[Time.Weekly]").unwrap(), &weekly));
}

#[tokio::test]
async fn test_cube_hierarchies_span_all_dimensions() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;

    let hierarchies = cube.hierarchies().await.unwrap();
    let names: Vec<&str> = hierarchies.iter().map(|h| h.unique_name()).collect();
    assert_eq!(
        names,
        vec!["[Store]", "[Store Type]", "[Time]", "[Time.Weekly]", "[Product]"]
    );
}

#[tokio::test]
async fn test_group_measures() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;
    let group = cube.measure_groups().get("Sales").await.unwrap().unwrap();

    let measures = group.measures().items().await.unwrap();
    assert_eq!(measures.len(), 1);
    let unit_sales = measures.get("[Measures].[Unit Sales]").unwrap();
    assert_eq!(unit_sales.name(), "Unit Sales");
    assert_eq!(unit_sales.measure_group_name(), Some("Sales"));
    assert_eq!(group.cube_name(), Some("Sales"));
    assert_eq!(group.unique_name(), "[Sales]");
    assert!(group.is_visible());

    let by_unique_name = cube.measure_groups().get("[Sales]").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&group, &by_unique_name));
}

#[tokio::test]
async fn test_group_without_canned_dimensions_fails_alone() {
    let proxy = Arc::new(proxy());
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;

    let inventory = cube.measure_groups().get("Inventory").await.unwrap().unwrap();
    let err = inventory.dimensions().items().await.unwrap_err();
    assert!(err.is_fault());

    // The sibling group is unaffected.
    let sales = cube.measure_groups().get("Sales").await.unwrap().unwrap();
    assert_eq!(sales.dimensions().len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_hierarchy_name_repeated_across_dimensions_is_an_error() {
    let proxy = Arc::new(proxy_with_product_hierarchies(rows(&[
        hierarchy("[Product]", "[Product]"),
        hierarchy("[Store]", "[Product]"),
    ])));
    let connection = open(&proxy);
    let cube = sales_cube(&connection).await;

    match cube.hierarchies().await.unwrap_err() {
        XmlaError::DuplicateName { name, .. } => assert_eq!(name, "[Store]"),
        other => panic!("expected DuplicateName, got {other:?}"),
    }

    // The group view never reaches [Product], so it still derives.
    let group = cube.measure_groups().get("Sales").await.unwrap().unwrap();
    assert_eq!(group.hierarchies().await.unwrap().len(), 4);
}
