//! Blocking HTTP client over a single transport handle.
//!
//! # Design
//! `Client` owns one handle and reuses it for every call. Each request method
//! takes `&mut self`: the handle is reconfigured per request, so one client
//! must never serve two requests at once, and the borrow checker enforces it.
//! Request building is split out into `build_request` so the url/header/body
//! rules can be checked without a network.

use crate::config::ClientOptions;
use crate::error::TransportError;
use crate::http::{
    encode_attrs, with_query, Attrs, Headers, HttpMethod, HttpRequest, RequestBody, Response,
    FORM_CONTENT_TYPE,
};
use crate::transport::{Transport, UreqTransport};

/// Build the request for `method` without performing it.
///
/// GET and DELETE carry `attrs` in the query string. POST sends them as the
/// body; PUT uploads them with a declared length.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    attrs: &Attrs,
    headers: &Headers,
) -> Result<HttpRequest, TransportError> {
    let mut request = HttpRequest {
        method,
        url: url.to_string(),
        headers: headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        body: None,
    };

    match method {
        HttpMethod::Get | HttpMethod::Delete => {
            request.url = with_query(url, attrs)?;
        }
        HttpMethod::Post => {
            if request.header("Content-Type").is_none() {
                request
                    .headers
                    .push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
            }
            request.body = Some(RequestBody::Fields(encode_attrs(attrs)?));
        }
        HttpMethod::Put => {
            let data = encode_attrs(attrs)?.into_bytes();
            let length = data.len() as u64;
            request.body = Some(RequestBody::Upload { data, length });
        }
    }

    Ok(request)
}

/// Synchronous client for GET/POST/PUT/DELETE.
#[derive(Debug)]
pub struct Client<T = UreqTransport> {
    handle: Option<T>,
}

impl Client<UreqTransport> {
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        Ok(Self::with_transport(UreqTransport::new(options)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            handle: Some(transport),
        }
    }

    pub fn get(
        &mut self,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(HttpMethod::Get, url, attrs, headers)
    }

    pub fn post(
        &mut self,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(HttpMethod::Post, url, attrs, headers)
    }

    pub fn put(
        &mut self,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(HttpMethod::Put, url, attrs, headers)
    }

    pub fn delete(
        &mut self,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(HttpMethod::Delete, url, attrs, headers)
    }

    pub fn request(
        &mut self,
        method: HttpMethod,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        let handle = self.handle.as_mut().ok_or(TransportError::Closed)?;
        let request = build_request(method, url, attrs, headers)?;
        handle.perform(&request)
    }

    /// Release the handle. Later requests fail with `TransportError::Closed`.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            tracing::trace!("transport handle closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }
}
