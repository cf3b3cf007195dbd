//! Blocking convenience layer over an HTTP transport.
//!
//! # Overview
//! - `Client`: GET/POST/PUT/DELETE helpers over one transport handle,
//!   returning a `Response` with status code, content type and body.
//! - `Curl`: single-URL facade kept for older call sites.
//! - `Api`: JSON client mapping non-accepted statuses to `ApiError`.
//!
//! # Design
//! - Requests are plain data (`HttpRequest`) built by `build_request`; the
//!   `Transport` trait performs them. `UreqTransport` does the real I/O.
//! - Everything is synchronous. Request methods take `&mut self`, so a single
//!   instance cannot be shared between concurrent requests.
//! - Attrs are form-urlencoded: into the query string for GET/DELETE, into the
//!   body for POST/PUT.

pub mod api;
pub mod client;
pub mod config;
pub mod curl;
pub mod error;
pub mod http;
pub mod transport;

pub use api::Api;
pub use client::{build_request, Client};
pub use config::ClientOptions;
pub use curl::Curl;
pub use error::{ApiError, RequestError, TransportError};
pub use http::{Attrs, Headers, HttpMethod, HttpRequest, RequestBody, Response};
pub use transport::{Transport, UreqTransport};
