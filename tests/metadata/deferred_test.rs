//! Population behavior of deferred metadata collections.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use olapxml::config::SessionSettings;
use olapxml::metadata::{Context, DeferredNamedList, Handler, Named, NamedList};
use olapxml::transport::canned::{fault_response, rowset_response};
use olapxml::transport::{CannedProxy, ServerInfo, XmlaProxy};
use olapxml::xmla::row::require_string;
use olapxml::xmla::{Element, MetadataRequest, Restrictions, SoapAction};
use olapxml::{Settings, XmlaClient, XmlaConnection, XmlaError, XmlaResult};

fn settings() -> Settings {
    Settings::for_url("http://localhost:8080/xmla").with_catalog("FoodMart")
}

fn catalog_rows(names: &[&str]) -> String {
    let rows: Vec<Vec<(&str, &str)>> = names.iter().map(|n| vec![("CATALOG_NAME", *n)]).collect();
    let rows: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
    rowset_response(&rows)
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_second_read_issues_no_request() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&["FoodMart", "Sales"]),
    ));
    let connection = XmlaConnection::open(&settings(), proxy.clone()).unwrap();

    assert!(!connection.catalogs().is_populated());
    let first = connection.catalogs().items().await.unwrap();
    let second = connection.catalogs().items().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(connection.catalogs().len().await.unwrap(), 2);
    assert!(connection.catalogs().get("Sales").await.unwrap().is_some());
    assert_eq!(proxy.requests_for(MetadataRequest::DbschemaCatalogs), 1);
}

#[tokio::test]
async fn test_row_order_is_preserved() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&["Zeta", "Alpha", "Mu"]),
    ));
    let connection = XmlaConnection::open(&settings(), proxy).unwrap();

    let names = connection.catalogs().names().await.unwrap();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mu"]);

    let second = connection.catalogs().get_index(1).await.unwrap().unwrap();
    assert_eq!(second.name(), "Alpha");
    assert!(connection.catalogs().get_index(3).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_rowset_is_a_populated_empty_list() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&[]),
    ));
    let connection = XmlaConnection::open(&settings(), proxy.clone()).unwrap();

    assert!(connection.catalogs().is_empty().await.unwrap());
    assert!(connection.catalogs().is_populated());
    assert!(connection.catalogs().is_empty().await.unwrap());
    assert_eq!(proxy.request_count(), 1);
}

#[tokio::test]
async fn test_duplicate_names_fail_population() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&["FoodMart", "FoodMart"]),
    ));
    let connection = XmlaConnection::open(&settings(), proxy).unwrap();

    let err = connection.catalogs().items().await.unwrap_err();
    match err {
        XmlaError::DuplicateName { name, .. } => assert_eq!(name, "FoodMart"),
        other => panic!("expected DuplicateName, got {other:?}"),
    }
    assert!(!connection.catalogs().is_populated());
}

#[tokio::test]
async fn test_new_connection_starts_empty() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&["FoodMart"]),
    ));

    let first = XmlaConnection::open(&settings(), proxy.clone()).unwrap();
    first.catalogs().items().await.unwrap();
    let second = XmlaConnection::open(&settings(), proxy.clone()).unwrap();
    assert!(!second.catalogs().is_populated());
    second.catalogs().items().await.unwrap();

    assert_eq!(proxy.request_count(), 2);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_share_one_request() {
    let proxy = Arc::new(
        CannedProxy::new()
            .with_latency(Duration::from_millis(50))
            .on_discover(
                MetadataRequest::DbschemaCatalogs,
                &[],
                catalog_rows(&["FoodMart", "Sales"]),
            ),
    );
    let connection = Arc::new(XmlaConnection::open(&settings(), proxy.clone()).unwrap());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let connection = connection.clone();
            tokio::spawn(async move { connection.catalogs().items().await })
        })
        .collect();

    let lists: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(proxy.request_count(), 1);
    for list in &lists {
        assert!(Arc::ptr_eq(list, &lists[0]));
        assert_eq!(list.len(), 2);
    }
}

#[tokio::test]
async fn test_concurrent_readers_in_one_task_share_one_request() {
    let proxy = Arc::new(
        CannedProxy::new()
            .with_latency(Duration::from_millis(20))
            .on_discover(MetadataRequest::DbschemaCatalogs, &[], catalog_rows(&["FoodMart"])),
    );
    let connection = XmlaConnection::open(&settings(), proxy.clone()).unwrap();

    let results = join_all((0..8).map(|_| connection.catalogs().len())).await;
    assert!(results.into_iter().all(|len| len.unwrap() == 1));
    assert_eq!(proxy.request_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_waiters_retry_after_failed_population() {
    let proxy = Arc::new(
        CannedProxy::new()
            .with_latency(Duration::from_millis(20))
            .on_discover(
                MetadataRequest::DbschemaCatalogs,
                &[],
                fault_response("SOAP-ENV:Server", "catalog store offline"),
            ),
    );
    let connection = Arc::new(XmlaConnection::open(&settings(), proxy.clone()).unwrap());

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let connection = connection.clone();
            tokio::spawn(async move { connection.catalogs().items().await })
        })
        .collect();

    for joined in join_all(tasks).await {
        assert!(joined.unwrap().unwrap_err().is_fault());
    }
    assert!(!connection.catalogs().is_populated());
    // A failed population is never shared; each reader gives up only after
    // its own attempt fails.
    assert_eq!(proxy.request_count(), 4);
}

// ============================================================================
// Failure and retry
// ============================================================================

/// Fails the first request, then answers from canned responses.
struct FlakyProxy {
    calls: AtomicUsize,
    inner: CannedProxy,
}

#[async_trait]
impl XmlaProxy for FlakyProxy {
    async fn get(
        &self,
        server: &ServerInfo,
        action: SoapAction,
        request: &[u8],
    ) -> XmlaResult<Vec<u8>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(XmlaError::Timeout(30));
        }
        self.inner.get(server, action, request).await
    }
}

#[tokio::test]
async fn test_failed_population_is_retried_on_next_read() {
    let proxy = Arc::new(FlakyProxy {
        calls: AtomicUsize::new(0),
        inner: CannedProxy::new().on_discover(
            MetadataRequest::DbschemaCatalogs,
            &[],
            catalog_rows(&["FoodMart"]),
        ),
    });
    let connection = XmlaConnection::open(&settings(), proxy.clone()).unwrap();

    let err = connection.catalogs().items().await.unwrap_err();
    assert!(err.is_transport());
    assert!(!connection.catalogs().is_populated());

    let names = connection.catalogs().names().await.unwrap();
    assert_eq!(names, vec!["FoodMart"]);
    assert_eq!(proxy.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_handler_error_discards_partial_rows() {
    // Second row lacks its name column.
    let body = rowset_response(&[&[("CATALOG_NAME", "FoodMart")], &[("DESCRIPTION", "orphan")]]);
    let proxy = Arc::new(CannedProxy::new().on_discover(MetadataRequest::DbschemaCatalogs, &[], body));
    let connection = XmlaConnection::open(&settings(), proxy.clone()).unwrap();

    let err = connection.catalogs().items().await.unwrap_err();
    assert!(err.is_population());
    assert!(!connection.catalogs().is_populated());

    assert!(connection.catalogs().items().await.is_err());
    assert_eq!(proxy.request_count(), 2);
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[derive(Debug)]
struct Item(String);

impl Named for Item {
    fn name(&self) -> &str {
        &self.0
    }
}

/// Reads the collection it is populating.
struct SelfObserving {
    list: Arc<OnceLock<Weak<DeferredNamedList<Item>>>>,
}

#[async_trait]
impl Handler<Item> for SelfObserving {
    async fn handle(
        &self,
        row: &Element,
        _context: &Context,
        _current: &NamedList<Item>,
    ) -> XmlaResult<Option<Arc<Item>>> {
        let list = self
            .list
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| XmlaError::OwnerDropped("item list".to_string()))?;
        list.len().await?;
        Ok(Some(Arc::new(Item(require_string(row, "CATALOG_NAME")?))))
    }
}

#[tokio::test]
async fn test_reentrant_read_fails_instead_of_deadlocking() {
    let proxy = Arc::new(CannedProxy::new().on_discover(
        MetadataRequest::DbschemaCatalogs,
        &[],
        catalog_rows(&["FoodMart"]),
    ));
    let client = Arc::new(XmlaClient::new(
        proxy.clone(),
        ServerInfo::from_settings(&settings().server).unwrap(),
        SessionSettings::default(),
    ));

    let slot = Arc::new(OnceLock::new());
    let list = Arc::new(DeferredNamedList::new(
        client,
        MetadataRequest::DbschemaCatalogs,
        Context::new(),
        Restrictions::new(),
        SelfObserving { list: slot.clone() },
    ));
    slot.set(Arc::downgrade(&list)).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), list.items())
        .await
        .expect("re-entrant read must not hang");
    assert!(matches!(
        result.unwrap_err(),
        XmlaError::ReentrantPopulation(name) if name == "DBSCHEMA_CATALOGS"
    ));
    assert!(!list.is_populated());
}
