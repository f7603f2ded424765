//! Connection facade: the entry point of the driver.

use std::sync::Arc;

use crate::client::XmlaClient;
use crate::config::{ConnectString, Settings};
use crate::error::XmlaResult;
use crate::metadata::{Catalog, Context, DataSource, DeferredNamedList, Function, Literal, RowHandler};
use crate::statement::{Parameter, PreparedStatement};
use crate::transport::{HttpProxy, ServerInfo, XmlaProxy};
use crate::xmla::dom::Element;
use crate::xmla::request::{MetadataRequest, Restrictions};

/// A logical connection to one XML/A server.
///
/// Metadata collections are created with the connection and cached for its
/// lifetime; opening a new connection starts from empty collections.
///
/// # Example
///
/// ```ignore
/// use olapxml::{Settings, XmlaConnection};
///
/// let settings = Settings::load()?;
/// let connection = XmlaConnection::connect(&settings)?;
///
/// for catalog in connection.catalogs().items().await?.iter() {
///     println!("{}", catalog.name());
/// }
/// ```
#[derive(Debug)]
pub struct XmlaConnection {
    client: Arc<XmlaClient>,
    catalogs: DeferredNamedList<Catalog>,
    data_sources: DeferredNamedList<DataSource>,
    literals: DeferredNamedList<Literal>,
}

impl XmlaConnection {
    /// Open a connection that sends requests through `proxy`.
    pub fn open(settings: &Settings, proxy: Arc<dyn XmlaProxy>) -> XmlaResult<Self> {
        let server = ServerInfo::from_settings(&settings.server)?;
        let client = Arc::new(XmlaClient::new(proxy, server, settings.session.clone()));
        tracing::debug!(url = %client.server().url, catalog = ?client.catalog(), "Opening connection");

        let catalogs = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::DbschemaCatalogs,
            Context::new(),
            Restrictions::new(),
            RowHandler::new(client.clone(), Catalog::from_row),
        );
        let data_sources = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::DiscoverDatasources,
            Context::new(),
            Restrictions::new(),
            RowHandler::new(client.clone(), DataSource::from_row),
        );
        let literals = DeferredNamedList::new(
            client.clone(),
            MetadataRequest::DiscoverLiterals,
            Context::new(),
            Restrictions::new(),
            RowHandler::new(client.clone(), Literal::from_row),
        );

        Ok(Self {
            client,
            catalogs,
            data_sources,
            literals,
        })
    }

    /// Open an HTTP connection.
    pub fn connect(settings: &Settings) -> XmlaResult<Self> {
        let proxy = HttpProxy::from_settings(settings)?;
        Self::open(settings, Arc::new(proxy))
    }

    /// Open an HTTP connection from a `jdbc:xmla:` connect string.
    pub fn connect_with(connect_string: &str) -> XmlaResult<Self> {
        let settings = ConnectString::parse(connect_string)?.to_settings()?;
        Self::connect(&settings)
    }

    pub fn client(&self) -> &Arc<XmlaClient> {
        &self.client
    }

    pub fn catalogs(&self) -> &DeferredNamedList<Catalog> {
        &self.catalogs
    }

    /// The session catalog, or the first catalog when none is configured.
    pub async fn catalog(&self) -> XmlaResult<Option<Arc<Catalog>>> {
        match self.client.catalog() {
            Some(name) => self.catalogs.get(name).await,
            None => self.catalogs.get_index(0).await,
        }
    }

    pub fn data_sources(&self) -> &DeferredNamedList<DataSource> {
        &self.data_sources
    }

    pub fn literals(&self) -> &DeferredNamedList<Literal> {
        &self.literals
    }

    /// Fetch the server's MDX functions. Not cached.
    pub async fn functions(&self) -> XmlaResult<Vec<Function>> {
        let rows = self
            .client
            .discover(MetadataRequest::MdschemaFunctions, None, &Restrictions::new())
            .await?;
        rows.iter().map(Function::from_row).collect()
    }

    /// Run an MDX statement and return the multidimensional dataset root.
    pub async fn execute(&self, mdx: &str) -> XmlaResult<Element> {
        self.client.execute(mdx).await
    }

    pub fn prepare(&self, mdx: impl Into<String>) -> PreparedStatement {
        self.prepare_with_parameters(mdx, Vec::new())
    }

    /// Prepare a statement whose parameters are known to the caller.
    pub fn prepare_with_parameters(
        &self,
        mdx: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> PreparedStatement {
        PreparedStatement::new(self.client.clone(), mdx, parameters)
    }
}
