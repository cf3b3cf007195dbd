//! Client configuration and user-agent generation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

/// File whose first ` (...)` token is appended to the user agent.
pub const DEFAULT_USERAGENT_CONF: &str = "/etc/apt/apt.conf.d/01turnkey";

const TRANSPORT_VERSION: &str = "ureq/3";
const TLS_INFO: &str = "rustls";

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \((.*?)\)").expect("annotation pattern is valid"));

/// Options fixed at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// PEM bundle of CA certificates to verify servers against.
    pub cainfo: Option<PathBuf>,
    /// Log request and response details at `debug` level.
    pub verbose: bool,
    /// Per-request wall-clock timeout in seconds. Zero means none.
    pub timeout: Option<u64>,
    /// Where to look for the user-agent annotation. `None` skips the lookup.
    pub useragent_conf: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cainfo: None,
            verbose: false,
            timeout: None,
            useragent_conf: Some(PathBuf::from(DEFAULT_USERAGENT_CONF)),
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cainfo(mut self, path: impl Into<PathBuf>) -> Self {
        self.cainfo = Some(path.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn useragent_conf(mut self, path: Option<PathBuf>) -> Self {
        self.useragent_conf = path;
        self
    }

    /// The effective timeout, if any.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.filter(|&t| t > 0).map(Duration::from_secs)
    }

    /// User agent for clients built from these options.
    pub fn user_agent(&self) -> String {
        gen_useragent(self.useragent_conf.as_deref())
    }
}

/// Build the user-agent string:
/// `curl_wrapper: ureq/3 rustls {arch}-{os}` plus an optional ` (token)`
/// read from `conf`.
pub fn gen_useragent(conf: Option<&Path>) -> String {
    let mut ua = format!(
        "curl_wrapper: {TRANSPORT_VERSION} {TLS_INFO} {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
    let Some(path) = conf else {
        return ua;
    };
    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(token) = annotation(&contents) {
                ua.push_str(&format!(" ({token})"));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not read user-agent annotation"
            );
        }
    }
    ua
}

/// First parenthesized token following a space, e.g. `"turnkey/18.0"` in
/// `Acquire::http::User-Agent "TurnKey APT-HTTP/1.3 (turnkey/18.0)";`.
fn annotation(contents: &str) -> Option<&str> {
    ANNOTATION
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
