//! Verify request building and API response mapping against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each request vector gives inputs and the expected `HttpRequest`; each API
//! vector gives a simulated status/body and the expected value or error.

use curl_wrapper::{
    build_request, Api, Attrs, Headers, HttpMethod, HttpRequest, RequestBody, RequestError,
    Response, Transport, TransportError,
};
use serde_json::Value;

/// Answers every request with one canned response.
struct Scripted(Response);

impl Transport for Scripted {
    fn perform(&mut self, _request: &HttpRequest) -> Result<Response, TransportError> {
        Ok(self.0.clone())
    }
}

fn string_map(value: &Value) -> Attrs {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let attrs = string_map(&case["attrs"]);
        let headers: Headers = string_map(&case["headers"]);
        let expected = &case["expected_request"];

        let req = build_request(method, case["url"].as_str().unwrap(), &attrs, &headers).unwrap();
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_lines: Vec<String> = expected["header_lines"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l.as_str().unwrap().to_string())
            .collect();
        assert_eq!(req.header_lines(), expected_lines, "{name}: headers");

        match (&req.body, expected["body"].as_str()) {
            (None, None) => {}
            (Some(RequestBody::Fields(fields)), Some(body)) => {
                assert_eq!(method, HttpMethod::Post, "{name}: fields only for POST");
                assert_eq!(fields, body, "{name}: body");
            }
            (Some(RequestBody::Upload { data, length }), Some(body)) => {
                assert_eq!(method, HttpMethod::Put, "{name}: upload only for PUT");
                assert_eq!(data.as_slice(), body.as_bytes(), "{name}: body");
                assert_eq!(Some(*length), expected["length"].as_u64(), "{name}: length");
            }
            (body, expected) => panic!("{name}: body {body:?} does not match {expected:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// API responses
// ---------------------------------------------------------------------------

#[test]
fn api_response_test_vectors() {
    let raw = include_str!("../../test-vectors/api_responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();

        let reply = Response::new(
            status,
            Some("application/json".to_string()),
            body.as_bytes().to_vec(),
        );
        let mut api = Api::with_transport(Scripted(reply));
        let result = api.request("GET", "http://localhost:3000/x", &Attrs::new(), &Headers::new());

        let Some(expected_error) = case.get("expected_error") else {
            let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
            continue;
        };

        let err = result.unwrap_err();
        match expected_error["kind"].as_str().unwrap() {
            "Api" => {
                let api_err = err.as_api().unwrap_or_else(|| panic!("{name}: expected ApiError"));
                assert_eq!(u64::from(api_err.code), expected_error["code"], "{name}: code");
                assert_eq!(api_err.name, expected_error["name"].as_str().unwrap(), "{name}: name");
                assert_eq!(
                    api_err.description,
                    expected_error["description"].as_str().unwrap(),
                    "{name}: description"
                );
            }
            "MalformedErrorBody" => match err {
                RequestError::MalformedErrorBody { status, body: ref got } => {
                    assert_eq!(u64::from(status), expected_error["code"], "{name}: code");
                    assert_eq!(got, body, "{name}: body");
                }
                other => panic!("{name}: expected MalformedErrorBody, got {other}"),
            },
            "Json" => assert!(matches!(err, RequestError::Json(_)), "{name}: expected Json"),
            other => panic!("{name}: unknown expected_error kind: {other}"),
        }
    }
}
