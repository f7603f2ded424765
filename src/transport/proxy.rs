//! The byte-level transport boundary.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tokio::task::JoinHandle;

use crate::config::{ServerSettings, SettingsError};
use crate::error::{XmlaError, XmlaResult};
use crate::xmla::SoapAction;

/// Endpoint and credentials of an XML/A server.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub url: Url,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ServerInfo {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            user: None,
            password: None,
        }
    }

    /// Resolve endpoint settings, expanding environment variables.
    pub fn from_settings(settings: &ServerSettings) -> XmlaResult<Self> {
        let raw = settings.resolved_url()?;
        let url = Url::parse(&raw).map_err(|e| {
            XmlaError::Config(SettingsError::InvalidConfig(format!(
                "invalid server url '{raw}': {e}"
            )))
        })?;

        Ok(Self {
            url,
            user: settings.resolved_user()?,
            password: settings.resolved_password()?,
        })
    }
}

impl fmt::Debug for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerInfo")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Sends an encoded request and returns the raw response body.
///
/// Implementations know nothing about envelope structure. Cookie handling,
/// authentication and timeouts live here; faults and payloads are decoded by
/// the caller.
#[async_trait]
pub trait XmlaProxy: Send + Sync {
    /// Send `request` to `server` and wait for the response body.
    async fn get(
        &self,
        server: &ServerInfo,
        action: SoapAction,
        request: &[u8],
    ) -> XmlaResult<Vec<u8>>;

    /// Character encoding of request and response bodies.
    fn encoding(&self) -> &str {
        "UTF-8"
    }
}

/// Send a request on a background task and return a handle to its result.
pub fn submit(
    proxy: Arc<dyn XmlaProxy>,
    server: ServerInfo,
    action: SoapAction,
    request: Vec<u8>,
) -> JoinHandle<XmlaResult<Vec<u8>>> {
    tokio::spawn(async move { proxy.get(&server, action, &request).await })
}
