//! Single-URL compatibility facade over `Client`.
//!
//! Older call sites construct a `Curl` for one URL, call a verb, and read the
//! outcome back from `response_code()`/`response_type()`/`response_data()`.
//! The handle is closed after every call, so an instance serves one request.

use crate::config::ClientOptions;
use crate::error::TransportError;
use crate::http::{Attrs, Headers, HttpMethod};
use crate::transport::{Transport, UreqTransport};
use crate::Client;

#[derive(Debug)]
pub struct Curl<T = UreqTransport> {
    client: Client<T>,
    url: String,
    headers: Headers,
    response_code: Option<u16>,
    response_type: Option<String>,
    response_data: Option<Vec<u8>>,
}

impl Curl<UreqTransport> {
    pub fn new(
        url: impl Into<String>,
        headers: Headers,
        options: &ClientOptions,
    ) -> Result<Self, TransportError> {
        Ok(Self::with_transport(url, headers, UreqTransport::new(options)?))
    }
}

impl<T: Transport> Curl<T> {
    pub fn with_transport(url: impl Into<String>, headers: Headers, transport: T) -> Self {
        Self {
            client: Client::with_transport(transport),
            url: url.into(),
            headers,
            response_code: None,
            response_type: None,
            response_data: None,
        }
    }

    pub fn get(&mut self, attrs: &Attrs) -> Result<Vec<u8>, TransportError> {
        self.perform(HttpMethod::Get, attrs)
    }

    pub fn post(&mut self, attrs: &Attrs) -> Result<Vec<u8>, TransportError> {
        self.perform(HttpMethod::Post, attrs)
    }

    pub fn put(&mut self, attrs: &Attrs) -> Result<Vec<u8>, TransportError> {
        self.perform(HttpMethod::Put, attrs)
    }

    pub fn delete(&mut self, attrs: &Attrs) -> Result<Vec<u8>, TransportError> {
        self.perform(HttpMethod::Delete, attrs)
    }

    pub fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    pub fn response_type(&self) -> Option<&str> {
        self.response_type.as_deref()
    }

    pub fn response_data(&self) -> Option<&[u8]> {
        self.response_data.as_deref()
    }

    fn perform(&mut self, method: HttpMethod, attrs: &Attrs) -> Result<Vec<u8>, TransportError> {
        let result = self.client.request(method, &self.url, attrs, &self.headers);
        self.client.close();

        let (code, content_type, data) = result?.into_parts();
        self.response_code = Some(code);
        self.response_type = content_type;
        self.response_data = Some(data.clone());
        Ok(data)
    }
}
