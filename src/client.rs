//! Request/response round trips against one XML/A server.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::XmlaResult;
use crate::transport::{submit, ServerInfo, XmlaProxy};
use crate::xmla::dom::Element;
use crate::xmla::envelope::{discover_request, execute_request, parse_response, Properties};
use crate::xmla::request::{MetadataRequest, Restrictions, SoapAction};

/// Encodes requests, sends them through a proxy and decodes the responses.
///
/// Holds no metadata. Collections keep an `Arc<XmlaClient>` so they can
/// populate themselves long after the connection that created them returned.
pub struct XmlaClient {
    proxy: Arc<dyn XmlaProxy>,
    server: ServerInfo,
    session: SessionSettings,
}

impl XmlaClient {
    pub fn new(proxy: Arc<dyn XmlaProxy>, server: ServerInfo, session: SessionSettings) -> Self {
        Self {
            proxy,
            server,
            session,
        }
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    /// Catalog named in the session settings.
    pub fn catalog(&self) -> Option<&str> {
        self.session.catalog.as_deref()
    }

    pub fn data_source_info(&self) -> Option<&str> {
        self.session.data_source_info.as_deref()
    }

    /// Run a Discover request and return its rows in document order.
    ///
    /// `catalog` overrides the session catalog for this request.
    pub async fn discover(
        &self,
        request: MetadataRequest,
        catalog: Option<&str>,
        restrictions: &Restrictions,
    ) -> XmlaResult<Vec<Element>> {
        request.validate(restrictions)?;

        let properties = Properties::discover(catalog.or(self.catalog()), self.data_source_info());
        let body = discover_request(request, restrictions, &properties)?;

        let request_id = Uuid::new_v4();
        tracing::debug!(
            %request_id,
            request = %request,
            restrictions = restrictions.len(),
            "Sending Discover"
        );

        let root = self.send(request_id, SoapAction::Discover, body).await?;
        let row_element = request.shape().row_element;
        let rows: Vec<Element> = root
            .into_elements()
            .filter(|e| e.local_name() == row_element)
            .collect();

        tracing::debug!(%request_id, rows = rows.len(), "Discover complete");
        Ok(rows)
    }

    /// Run an MDX statement and return the multidimensional dataset root.
    pub async fn execute(&self, statement: &str) -> XmlaResult<Element> {
        let properties = Properties::execute(self.catalog(), self.data_source_info());
        let body = execute_request(statement, &properties)?;

        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, statement_len = statement.len(), "Sending Execute");
        self.send(request_id, SoapAction::Execute, body).await
    }

    async fn send(&self, request_id: Uuid, action: SoapAction, body: Vec<u8>) -> XmlaResult<Element> {
        tracing::trace!(%request_id, bytes = body.len(), "Request encoded");

        // The round trip runs on its own task so a caller that gives up does
        // not abort a request the server is already processing.
        let response = submit(self.proxy.clone(), self.server.clone(), action, body).await??;
        tracing::trace!(%request_id, bytes = response.len(), "Response received");

        parse_response(&response).inspect_err(|e| {
            tracing::debug!(%request_id, error = %e, "Request failed");
        })
    }
}

impl std::fmt::Debug for XmlaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlaClient")
            .field("server", &self.server)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
