//! HTTP request and response types.
//!
//! # Design
//! Requests are described as plain data. `Client` builds an `HttpRequest`
//! from the caller's url, attrs and headers, then hands it to a `Transport`
//! which performs the round-trip and returns a `Response`. Keeping the
//! request as data makes the encoding rules testable without a network.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{RequestError, TransportError};

/// Form/query fields, form-urlencoded before transmission.
pub type Attrs = BTreeMap<String, String>;

/// Request headers keyed by name.
pub type Headers = BTreeMap<String, String>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(RequestError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Encoded fields handed to the transport in one piece (POST).
    Fields(String),
    /// Bytes streamed from a reader with a declared length (PUT).
    Upload { data: Vec<u8>, length: u64 },
}

impl RequestBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RequestBody::Fields(fields) => fields.as_bytes(),
            RequestBody::Upload { data, .. } => data,
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Headers rendered as `Key: Value` lines.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers.iter().map(|(k, v)| format!("{k}: {v}")).collect()
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Form-urlencode `attrs` (`a=1&b=two+words`).
pub fn encode_attrs(attrs: &Attrs) -> Result<String, TransportError> {
    Ok(serde_urlencoded::to_string(attrs)?)
}

/// Append `attrs` to `url` as a query string. Empty attrs leave `url` as is.
pub fn with_query(url: &str, attrs: &Attrs) -> Result<String, TransportError> {
    if attrs.is_empty() {
        return Ok(url.to_string());
    }
    Ok(format!("{url}?{}", encode_attrs(attrs)?))
}

/// Response of a completed request: status, content type and the full body.
///
/// The body is the transport's bytes, unmodified. Status and content type are
/// metadata alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: u16,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl Response {
    pub fn new(code: u16, content_type: Option<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            content_type,
            data: data.into(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.data
    }

    /// Body as text. Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.data
    }

    pub fn into_parts(self) -> (u16, Option<String>, Vec<u8>) {
        (self.code, self.content_type, self.data)
    }
}

impl AsRef<[u8]> for Response {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
