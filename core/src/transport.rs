//! The transport seam.
//!
//! # Design
//! `Client` never talks to the network itself. It builds an `HttpRequest`
//! and asks a `Transport` to perform it. `UreqTransport` is the real one; the
//! tests plug in scripted transports to play the server.

use std::fs;
use std::io::Read;
use std::path::Path;

use ureq::tls::{parse_pem, Certificate, PemItem, RootCerts, TlsConfig};
use ureq::{Agent, SendBody};

use crate::config::ClientOptions;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, RequestBody, Response};

/// Performs one request synchronously and returns the full response.
///
/// Non-2xx statuses are responses, not errors. Redirects are not followed:
/// a 3xx comes back as is.
pub trait Transport {
    fn perform(&mut self, request: &HttpRequest) -> Result<Response, TransportError>;
}

/// Transport backed by a ureq `Agent`.
#[derive(Debug)]
pub struct UreqTransport {
    agent: Agent,
    verbose: bool,
}

impl UreqTransport {
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .user_agent(options.user_agent())
            .timeout_global(options.timeout_duration());

        if let Some(path) = &options.cainfo {
            let certs = load_ca_bundle(path)?;
            config = config.tls_config(
                TlsConfig::builder()
                    .root_certs(RootCerts::new_with_certs(&certs))
                    .build(),
            );
        }

        Ok(Self {
            agent: config.build().new_agent(),
            verbose: options.verbose,
        })
    }

    fn log_request(&self, request: &HttpRequest) {
        if self.verbose {
            tracing::debug!(method = %request.method, url = %request.url, "> request");
            for line in request.header_lines() {
                tracing::debug!("> {line}");
            }
        } else {
            tracing::trace!(method = %request.method, url = %request.url, "> request");
        }
    }

    fn log_response(&self, response: &Response) {
        if self.verbose {
            tracing::debug!(
                status = response.code(),
                content_type = response.content_type().unwrap_or(""),
                bytes = response.body().len(),
                "< response"
            );
        } else {
            tracing::trace!(status = response.code(), "< response");
        }
    }
}

impl Transport for UreqTransport {
    fn perform(&mut self, request: &HttpRequest) -> Result<Response, TransportError> {
        self.log_request(request);

        let url = request.url.as_str();
        let headers = &request.headers;
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(RequestBody::Upload { data, length })) => {
                let mut reader: &[u8] = data;
                with_headers(self.agent.put(url), headers)
                    .header("Content-Length", length.to_string())
                    .send(SendBody::from_reader(&mut reader))
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        };
        let mut response = result?;

        let code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(ureq::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut data = Vec::new();
        response.body_mut().as_reader().read_to_end(&mut data)?;

        let response = Response::new(code, content_type, data);
        self.log_response(&response);
        Ok(response)
    }
}

/// Apply request headers. An empty value suppresses the header entirely, so
/// `Expect: ""` keeps `Expect` off the wire.
fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        if value.is_empty() {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate<'static>>, TransportError> {
    let pem = fs::read(path).map_err(|e| TransportError::CaBundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut certs = Vec::new();
    for item in parse_pem(&pem) {
        let item = item.map_err(|e| TransportError::CaBundle {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if let PemItem::Certificate(cert) = item {
            certs.push(cert.to_owned());
        }
    }

    if certs.is_empty() {
        return Err(TransportError::CaBundle {
            path: path.to_path_buf(),
            reason: "no certificates found".to_string(),
        });
    }
    Ok(certs)
}
