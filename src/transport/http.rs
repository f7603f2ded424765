//! HTTP transport over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, StatusCode};

use super::cookie::CookieJar;
use super::proxy::{ServerInfo, XmlaProxy};
use crate::config::Settings;
use crate::error::{XmlaError, XmlaResult};
use crate::xmla::SoapAction;

/// Longest response body kept in an `HttpStatus` error.
const MAX_ERROR_BODY: usize = 512;

/// Proxy that POSTs envelopes to the server over HTTP.
pub struct HttpProxy {
    client: reqwest::Client,
    cookies: Option<CookieJar>,
    timeout_seconds: u64,
}

impl HttpProxy {
    /// Create a proxy with the given per-request timeout.
    pub fn new(timeout: Duration, use_cookies: bool) -> XmlaResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            cookies: use_cookies.then(CookieJar::new),
            timeout_seconds: timeout.as_secs(),
        })
    }

    /// Create a proxy from driver settings.
    pub fn from_settings(settings: &Settings) -> XmlaResult<Self> {
        Self::new(
            Duration::from_secs(settings.server.timeout_seconds),
            settings.session.cookies,
        )
    }

    /// The session cookie jar, when cookies are enabled.
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        self.cookies.as_ref()
    }

    fn build(&self, server: &ServerInfo, action: SoapAction, request: &[u8]) -> RequestBuilder {
        let mut builder = self
            .client
            .post(server.url.clone())
            .header(CONTENT_TYPE, format!("text/xml; charset={}", self.encoding()))
            .header("SOAPAction", action.header_value())
            .body(request.to_vec());

        if let Some(user) = &server.user {
            builder = builder.basic_auth(user, server.password.as_ref());
        }
        // Cookies can only be attached to a request that has not been sent.
        if let Some(header) = self
            .cookies
            .as_ref()
            .and_then(|jar| jar.cookie_header(&server.url))
        {
            builder = builder.header(COOKIE, header);
        }
        builder
    }
}

#[async_trait]
impl XmlaProxy for HttpProxy {
    async fn get(
        &self,
        server: &ServerInfo,
        action: SoapAction,
        request: &[u8],
    ) -> XmlaResult<Vec<u8>> {
        let response = self
            .build(server, action, request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    XmlaError::Timeout(self.timeout_seconds)
                } else {
                    XmlaError::Http(e)
                }
            })?;

        if let Some(jar) = &self.cookies {
            jar.store_cookies(
                &server.url,
                response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|value| value.to_str().ok()),
            );
        }

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        // SOAP faults travel on 500.
        if status.is_success() || status == StatusCode::INTERNAL_SERVER_ERROR {
            return Ok(body);
        }

        let mut text = String::from_utf8_lossy(&body).into_owned();
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Err(XmlaError::HttpStatus {
            status: status.as_u16(),
            body: text,
        })
    }
}
