//! Driver-wide error types.

use thiserror::Error;

/// Result type for driver operations.
pub type XmlaResult<T> = Result<T, XmlaError>;

/// Errors that can occur while talking to an XML/A provider.
#[derive(Error, Debug)]
pub enum XmlaError {
    // =========================================================================
    // Transport
    // =========================================================================
    /// The HTTP exchange itself failed (connection refused, TLS, body read).
    #[error("transport failure: {0}")]
    Http(#[source] reqwest::Error),

    /// The server answered with a non-success status that carries no SOAP payload.
    #[error("server returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Request timed out waiting for a response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// A background submit task panicked or was cancelled.
    #[error("submitted request did not complete: {0}")]
    TaskJoin(String),

    // =========================================================================
    // Protocol
    // =========================================================================
    /// The server returned a SOAP Fault.
    #[error("SOAP fault {code}: {string}")]
    Fault {
        /// `faultcode` element.
        code: String,
        /// `faultstring` element.
        string: String,
        /// `faultactor` element, when present.
        actor: Option<String>,
        /// Flattened text of the `detail` element, when present.
        detail: Option<String>,
    },

    /// The payload carried an XML/A `Exception` marker with error messages.
    #[error("XML/A error {code}: {description}")]
    ServerException {
        /// `ErrorCode` attribute of the first error message.
        code: String,
        /// `Description` attribute of the first error message.
        description: String,
    },

    /// Well-formed XML that is not the envelope shape we expect.
    #[error("unexpected response structure: {0}")]
    Protocol(String),

    // =========================================================================
    // Parse / encode
    // =========================================================================
    /// The response body is not well-formed XML.
    #[error("malformed XML response: {0}")]
    Parse(String),

    /// Failed to serialize a request envelope.
    #[error("failed to encode request: {0}")]
    Encode(String),

    // =========================================================================
    // Population
    // =========================================================================
    /// Two rows produced entities with the same unique name.
    #[error("duplicate name '{name}' while populating {collection}")]
    DuplicateName {
        /// Request type that was being populated.
        collection: String,
        /// The offending unique name.
        name: String,
    },

    /// A collection was observed from inside its own population.
    #[error("collection {0} observed during its own population")]
    ReentrantPopulation(String),

    /// A strictly typed field was absent from a row.
    #[error("required field '{field}' missing from row")]
    MissingField {
        /// Local name of the field.
        field: String,
    },

    /// A field was present but could not be parsed.
    #[error("field '{field}' has invalid value '{value}': {reason}")]
    InvalidField {
        /// Local name of the field.
        field: String,
        /// Raw text content.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A back-referenced collection no longer exists.
    #[error("owner of {0} has been dropped")]
    OwnerDropped(String),

    // =========================================================================
    // Caller input
    // =========================================================================
    /// Parameter ordinal outside `1..=count`.
    #[error("parameter ordinal {ordinal} out of range (statement has {count})")]
    ParameterOutOfRange {
        /// Requested 1-based ordinal.
        ordinal: usize,
        /// Number of parameters.
        count: usize,
    },

    /// A restriction key is not accepted by the request type.
    #[error("restriction '{key}' is not supported by {request}")]
    UnsupportedRestriction {
        /// Request type wire name.
        request: String,
        /// Offending key.
        key: String,
    },

    /// A required restriction key was not supplied.
    #[error("{request} requires restriction '{key}'")]
    MissingRestriction {
        /// Request type wire name.
        request: String,
        /// Missing key.
        key: String,
    },

    /// Unknown metadata request wire name.
    #[error("unknown metadata request type: {0}")]
    UnknownRequestType(String),

    /// The operation is not supported by this driver.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid settings or connect string.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::SettingsError),
}

impl XmlaError {
    /// Create a SOAP fault error.
    pub fn fault(code: impl Into<String>, string: impl Into<String>) -> Self {
        Self::Fault {
            code: code.into(),
            string: string.into(),
            actor: None,
            detail: None,
        }
    }

    /// Create a missing-field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::HttpStatus { .. } | Self::Timeout(_) | Self::TaskJoin(_)
        )
    }

    /// Check if the server explicitly rejected the request.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. } | Self::ServerException { .. })
    }

    /// Check if the response could not be parsed as XML.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Check if this error was raised while populating a collection from rows.
    pub fn is_population(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. }
                | Self::ReentrantPopulation(_)
                | Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::OwnerDropped(_)
        )
    }
}

impl From<reqwest::Error> for XmlaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<quick_xml::Error> for XmlaError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for XmlaError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
