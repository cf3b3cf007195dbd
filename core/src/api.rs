//! JSON REST client with structured errors.
//!
//! # Design
//! `Api` sends every request with `Accept: application/json`, treats 200, 201
//! and 204 as success, and expects error bodies in the `name:description`
//! convention. Any failure to reach the server is folded into an `ApiError`
//! with code 500 and name `"exception"` so callers handle one error shape.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientOptions;
use crate::error::{ApiError, RequestError, TransportError};
use crate::http::{Attrs, Headers, HttpMethod, Response};
use crate::transport::{Transport, UreqTransport};
use crate::Client;

pub const ALL_OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const DELETED: u16 = 204;
pub const ERROR: u16 = 500;

/// Headers sent with every API request unless the caller overrides them.
pub const API_HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

#[derive(Debug)]
pub struct Api<T = UreqTransport> {
    client: Client<T>,
}

impl Api<UreqTransport> {
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        Ok(Self::with_transport(UreqTransport::new(options)?))
    }
}

impl<T: Transport> Api<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            client: Client::with_transport(transport),
        }
    }

    /// Perform `method` against `url` and decode the JSON reply.
    ///
    /// An empty `204 No Content` body decodes to `Value::Null`; any other
    /// success status needs a JSON body.
    pub fn request(
        &mut self,
        method: &str,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<Value, RequestError> {
        self.request_json(method, url, attrs, headers)
    }

    /// Like `request`, decoding the reply into `D`.
    pub fn request_json<D: DeserializeOwned>(
        &mut self,
        method: &str,
        url: &str,
        attrs: &Attrs,
        headers: &Headers,
    ) -> Result<D, RequestError> {
        let method: HttpMethod = method.parse()?;
        let headers = api_headers(method, headers);

        let response = self
            .client
            .request(method, url, attrs, &headers)
            .map_err(|e| {
                tracing::debug!(%method, url, error = %e, "api request failed in transport");
                exception(&e)
            })?;

        decode(response)
    }

    pub fn close(&mut self) {
        self.client.close();
    }
}

/// Defaults merged with the caller's headers; caller values win. PUT always
/// gets `Expect: ""` to keep the transport from sending `100-continue`, which
/// some lightweight servers mishandle.
fn api_headers(method: HttpMethod, headers: &Headers) -> Headers {
    let mut merged = Headers::new();
    for (name, value) in API_HEADERS {
        set_header(&mut merged, name, value);
    }
    for (name, value) in headers {
        set_header(&mut merged, name, value);
    }
    if method == HttpMethod::Put {
        set_header(&mut merged, "Expect", "");
    }
    merged
}

/// A request that never produced a response.
fn exception(err: &TransportError) -> ApiError {
    let description = format!("{}({:?})", err.kind(), err.to_string());
    ApiError::new(ERROR, "exception", description)
}

fn set_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

fn decode<D: DeserializeOwned>(response: Response) -> Result<D, RequestError> {
    let code = response.code();
    if !matches!(code, ALL_OK | CREATED | DELETED) {
        return Err(error_from_body(code, response.into_body()));
    }

    let body = response.body();
    if code == DELETED && body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Split a `name:description` error body on its first colon.
fn error_from_body(status: u16, body: Vec<u8>) -> RequestError {
    let text = match String::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            return RequestError::MalformedErrorBody {
                status,
                body: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }
        }
    };
    match text.split_once(':') {
        Some((name, description)) => ApiError::new(status, name, description).into(),
        None => RequestError::MalformedErrorBody { status, body: text },
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::client::tests::{map, Recorder};
    use crate::http::HttpRequest;

    /// An `Api` answering every request with `code`/`body`, plus the log of
    /// requests it was sent.
    fn api_replying(code: u16, body: &str) -> (Api<Recorder>, Rc<RefCell<Vec<HttpRequest>>>) {
        let content_type = Some("application/json".to_string());
        let reply = Response::new(code, content_type, body.as_bytes().to_vec());
        let recorder = Recorder::replying(reply);
        let log = Rc::clone(&recorder.log);
        (Api::with_transport(recorder), log)
    }

    fn send<T: Transport>(api: &mut Api<T>, method: &str) -> Result<Value, RequestError> {
        api.request(method, "http://h/x", &Attrs::new(), &Headers::new())
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn perform(&mut self, _: &HttpRequest) -> Result<Response, TransportError> {
            let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            Err(err.into())
        }
    }

    #[test]
    fn success_body_is_decoded() {
        let (mut api, _) = api_replying(200, r#"{"a":1}"#);
        assert_eq!(send(&mut api, "GET").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn typed_decoding() {
        #[derive(Deserialize)]
        struct Item {
            id: u64,
            title: String,
        }
        let (mut api, _) = api_replying(201, r#"{"id":3,"title":"milk"}"#);
        let attrs = map(&[("title", "milk")]);
        let item: Item = api
            .request_json("POST", "http://h/items", &attrs, &Headers::new())
            .unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.title, "milk");
    }

    #[test]
    fn no_content_decodes_to_null() {
        let (mut api, _) = api_replying(204, "");
        assert_eq!(send(&mut api, "DELETE").unwrap(), Value::Null);
    }

    #[test]
    fn empty_body_on_ok_is_a_json_error() {
        for code in [ALL_OK, CREATED] {
            let (mut api, _) = api_replying(code, "");
            let err = send(&mut api, "GET").unwrap_err();
            assert!(matches!(err, RequestError::Json(_)), "{code}: {err}");
        }
    }

    #[test]
    fn error_status_maps_body_to_api_error() {
        let (mut api, _) = api_replying(404, "not_found:resource missing");
        let err = send(&mut api, "GET").unwrap_err();
        let expected = ApiError::new(404, "not_found", "resource missing");
        assert_eq!(err.as_api(), Some(&expected));
    }

    #[test]
    fn description_keeps_later_colons() {
        let (mut api, _) = api_replying(400, "bad_request:field: title");
        let err = send(&mut api, "POST").unwrap_err();
        let api_err = err.as_api().unwrap();
        assert_eq!(api_err.name, "bad_request");
        assert_eq!(api_err.description, "field: title");
    }

    #[test]
    fn error_body_without_colon_is_malformed() {
        let (mut api, _) = api_replying(502, "Bad Gateway");
        let err = send(&mut api, "GET").unwrap_err();
        let RequestError::MalformedErrorBody { status, body } = err else {
            panic!("expected MalformedErrorBody, got {err}");
        };
        assert_eq!(status, 502);
        assert_eq!(body, "Bad Gateway");
    }

    #[test]
    fn non_utf8_error_body_is_malformed() {
        let reply = Response::new(500, None, vec![0xff, 0xfe, b':']);
        let mut api = Api::with_transport(Recorder::replying(reply));
        let err = send(&mut api, "GET").unwrap_err();
        assert!(matches!(err, RequestError::MalformedErrorBody { status: 500, .. }));
    }

    #[test]
    fn redirect_is_not_accepted() {
        let (mut api, _) = api_replying(303, "");
        let err = send(&mut api, "GET").unwrap_err();
        assert!(matches!(err, RequestError::MalformedErrorBody { status: 303, .. }));
    }

    #[test]
    fn other_2xx_is_not_accepted() {
        let (mut api, _) = api_replying(202, "accepted:queued");
        let err = send(&mut api, "POST").unwrap_err();
        assert_eq!(err.as_api().map(|e| e.code), Some(202));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let (mut api, _) = api_replying(200, "not json");
        let err = send(&mut api, "GET").unwrap_err();
        assert!(matches!(err, RequestError::Json(_)));
    }

    #[test]
    fn transport_failure_becomes_exception() {
        let mut api = Api::with_transport(Unreachable);
        let err = send(&mut api, "GET").unwrap_err();
        let api_err = err.as_api().unwrap();
        assert_eq!(api_err.code, ERROR);
        assert_eq!(api_err.name, "exception");
        assert_eq!(api_err.description, r#"Io("i/o error: refused")"#);
    }

    #[test]
    fn unsupported_method_is_rejected_before_sending() {
        let (mut api, log) = api_replying(200, "{}");
        let err = send(&mut api, "PATCH").unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedMethod(_)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn accept_header_is_added_and_overridable() {
        let (mut api, log) = api_replying(200, "{}");
        let override_accept = map(&[("accept", "text/json")]);
        send(&mut api, "GET").unwrap();
        api.request("GET", "http://h/x", &Attrs::new(), &override_accept).unwrap();

        let log = log.borrow();
        assert_eq!(log[0].header("Accept"), Some("application/json"));
        assert_eq!(log[1].header("Accept"), Some("text/json"));
        assert_eq!(log[1].headers.len(), 1);
    }

    #[test]
    fn put_always_clears_expect() {
        let (mut api, log) = api_replying(200, "{}");
        let continue_expected = map(&[("Expect", "100-continue")]);
        api.request("PUT", "http://h/x", &Attrs::new(), &continue_expected).unwrap();
        send(&mut api, "put").unwrap();
        send(&mut api, "POST").unwrap();

        let log = log.borrow();
        assert_eq!(log[0].header("Expect"), Some(""));
        assert_eq!(log[1].header("Expect"), Some(""));
        assert_eq!(log[2].header("Expect"), None);
    }
}
