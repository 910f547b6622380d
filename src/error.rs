use std::fmt;
use thiserror::Error;

/// The error type for storyserver-client operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client configuration is missing required fields or holds invalid values.
    ConfigInvalid,

    /// The request could not be built (bad URI, bad header value, etc.).
    RequestInvalid,

    /// A header required by the signature scheme is absent from the request.
    MissingHeader,

    /// The requested signature algorithm is not supported.
    UnsupportedAlgorithm,

    /// The transport failed to complete the HTTP round trip.
    TransportFailed,

    /// The response body is not valid JSON.
    ResponseMalformed,

    /// Unexpected errors (I/O, encoding, etc.).
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Convenience constructors
impl Error {
    /// Create a config invalid error.
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a request invalid error.
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a missing header error.
    pub fn missing_header(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingHeader, message)
    }

    /// Create an unsupported algorithm error.
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedAlgorithm, message)
    }

    /// Create a transport failed error.
    pub fn transport_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFailed, message)
    }

    /// Create a response malformed error.
    pub fn response_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseMalformed, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::MissingHeader => write!(f, "missing signed header"),
            ErrorKind::UnsupportedAlgorithm => write!(f, "unsupported signature algorithm"),
            ErrorKind::TransportFailed => write!(f, "transport failed"),
            ErrorKind::ResponseMalformed => write!(f, "malformed response"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
