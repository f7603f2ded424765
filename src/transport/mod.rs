//! Transport layer: proxies that move request bytes to an XML/A server.
//!
//! - [`XmlaProxy`] is the boundary the rest of the driver talks to
//! - [`HttpProxy`] sends requests over HTTP with a per-connection [`CookieJar`]
//! - [`CannedProxy`] answers from fixtures and counts requests

pub mod canned;
mod cookie;
mod http;
mod proxy;

pub use canned::{CannedProxy, RecordedRequest};
pub use cookie::{Cookie, CookieJar};
pub use http::HttpProxy;
pub use proxy::{submit, ServerInfo, XmlaProxy};
