//! Error types for the HTTP wrapper.
//!
//! # Design
//! Two layers. `TransportError` is what `Client` and `Curl` hand back: the
//! transport's own failure, uninterpreted. `RequestError` is what `Api`
//! hands back: HTTP-level failures are mapped to the structured `ApiError`
//! and every other way a JSON call can go wrong gets its own variant.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while performing a request. Propagated as-is by `Client`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS, timeout or protocol failure reported by ureq.
    #[error("transport error: {0}")]
    Http(#[from] ureq::Error),

    /// Reading the response body or a local file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The attrs could not be form-urlencoded.
    #[error("could not encode attrs: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    /// The configured CA bundle could not be loaded.
    #[error("invalid CA bundle {path:?}: {reason}")]
    CaBundle { path: PathBuf, reason: String },

    /// The handle was closed and cannot issue further requests.
    #[error("transport handle is closed")]
    Closed,
}

impl TransportError {
    /// Short name of the failure kind, used when the error is folded into an
    /// `ApiError` description.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Http(ureq::Error::Timeout(_)) => "Timeout",
            TransportError::Http(_) => "Http",
            TransportError::Io(_) => "Io",
            TransportError::Encode(_) => "Encode",
            TransportError::CaBundle { .. } => "CaBundle",
            TransportError::Closed => "Closed",
        }
    }
}

/// Structured error raised by `Api::request`.
///
/// `name` and `description` come from the server's `name:description` error
/// body, or are `"exception"` and the transport failure when the request never
/// produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} - {name} ({description})")]
pub struct ApiError {
    pub code: u16,
    pub name: String,
    pub description: String,
}

impl ApiError {
    pub fn new(code: u16, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Errors returned by `Api::request`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Transport failure (code 500) or a non-accepted status from the server.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The method string does not name one of GET, POST, PUT or DELETE.
    #[error("unsupported method: {0:?}")]
    UnsupportedMethod(String),

    /// A non-accepted status whose body does not follow `name:description`.
    #[error("malformed error body for HTTP {status}: {body:?}")]
    MalformedErrorBody { status: u16, body: String },

    /// The success body is not valid JSON for the requested type.
    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl RequestError {
    /// The wrapped `ApiError`, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            RequestError::Api(err) => Some(err),
            _ => None,
        }
    }
}
