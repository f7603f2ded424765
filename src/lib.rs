//! # olapxml
//!
//! A client driver for OLAP servers that speak XML for Analysis (XML/A).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    XmlaConnection                        │
//! │   catalogs · data sources · literals · execute/prepare   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │      DeferredNamedList (populate once, then cached)      │
//! │      Handler: row ──► Catalog/Cube/Dimension/...         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [client + xmla]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Request catalog · SOAP envelope codec · row extractor  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [transport]
//! ┌─────────────────────────────────────────────────────────┐
//! │      XmlaProxy: HttpProxy (+ CookieJar) | CannedProxy    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod metadata;
pub mod olap_type;
pub mod statement;
pub mod transport;
pub mod xmla;

pub use client::XmlaClient;
pub use config::{ConnectString, Settings, SettingsError};
pub use connection::XmlaConnection;
pub use error::{XmlaError, XmlaResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::connection::XmlaConnection;
    pub use crate::error::{XmlaError, XmlaResult};
    pub use crate::metadata::{
        Catalog, Cube, DeferredNamedList, Dimension, Hierarchy, Level, Measure, MeasureGroup,
        Member, Named, NamedList, Schema,
    };
    pub use crate::olap_type::{OlapType, SqlType};
    pub use crate::statement::{Parameter, PreparedStatement};
    pub use crate::transport::{CannedProxy, HttpProxy, XmlaProxy};
    pub use crate::xmla::{MetadataRequest, Restrictions};
}
