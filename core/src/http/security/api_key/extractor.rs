//! Extraction of the raw API key from a request.

use std::fmt;

use actix_web::http::header;
use actix_web::HttpRequest;

use crate::http::security::http_basic::extract_basic_auth;

/// Request location an API key can be read from.
///
/// Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchType {
    /// `Authorization: <scheme> <key>`
    HeaderToken,
    /// `?<name>=<key>`
    QueryParam,
    /// Username of `Authorization: Basic ...`
    BasicAuth,
}

impl FetchType {
    /// Fixed precedence of the extraction methods.
    pub const PRECEDENCE: [FetchType; 3] = [
        FetchType::HeaderToken,
        FetchType::QueryParam,
        FetchType::BasicAuth,
    ];

    /// Configuration name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchType::HeaderToken => "header_token",
            FetchType::QueryParam => "query_param",
            FetchType::BasicAuth => "basic_auth",
        }
    }
}

impl fmt::Display for FetchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enabled extraction methods and their parameters.
///
/// For `header_token` the parameter is the scheme name, for `query_param` the
/// query parameter name. Basic auth has no parameter; it is recorded as
/// `"true"` when enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckMapping {
    header_token: Option<String>,
    query_param: Option<String>,
    basic_auth: bool,
}

impl CheckMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `Authorization: <scheme> <key>`.
    pub fn header_token(mut self, scheme: impl Into<String>) -> Self {
        self.header_token = Some(scheme.into());
        self
    }

    /// Enables `?<name>=<key>`.
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = Some(name.into());
        self
    }

    /// Enables or disables the Basic auth username.
    pub fn basic_auth(mut self, enabled: bool) -> Self {
        self.basic_auth = enabled;
        self
    }

    /// Returns the parameter configured for `method`, `None` when disabled.
    pub fn get(&self, method: FetchType) -> Option<&str> {
        match method {
            FetchType::HeaderToken => self.header_token.as_deref().filter(|s| !s.is_empty()),
            FetchType::QueryParam => self.query_param.as_deref().filter(|s| !s.is_empty()),
            FetchType::BasicAuth => self.basic_auth.then_some("true"),
        }
    }

    /// Enabled methods in evaluation order.
    pub fn enabled(&self) -> impl Iterator<Item = (FetchType, &str)> + '_ {
        FetchType::PRECEDENCE
            .into_iter()
            .filter_map(move |method| self.get(method).map(|value| (method, value)))
    }

    /// Whether no method is enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedKey {
    pub api_key: String,
    pub method: FetchType,
    pub check_value: String,
}

/// Reads the raw API key from the first enabled location that carries one.
#[derive(Debug, Clone)]
pub struct ApiKeyExtractor {
    mapping: CheckMapping,
}

impl ApiKeyExtractor {
    pub fn new(mapping: CheckMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &CheckMapping {
        &self.mapping
    }

    /// Returns the first key found, following [`FetchType::PRECEDENCE`].
    pub fn extract(&self, req: &HttpRequest) -> Option<ExtractedKey> {
        self.mapping.enabled().find_map(|(method, check_value)| {
            extract_from(req, method, check_value).map(|api_key| ExtractedKey {
                api_key,
                method,
                check_value: check_value.to_string(),
            })
        })
    }
}

/// Extracts the key from a single location.
pub fn extract_from(req: &HttpRequest, method: FetchType, check_value: &str) -> Option<String> {
    match method {
        FetchType::HeaderToken => {
            let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
            // "<scheme> <key>", the scheme is matched case-sensitively
            let token = value.strip_prefix(check_value)?.strip_prefix(' ')?;
            (!token.is_empty()).then(|| token.to_string())
        }
        FetchType::QueryParam => req.query_string().split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key != check_value {
                return None;
            }
            // form encoding: '+' stands for a space
            let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
            (!value.is_empty()).then_some(value)
        }),
        FetchType::BasicAuth => {
            let credentials = extract_basic_auth(req)?;
            (!credentials.username.is_empty()).then_some(credentials.username)
        }
    }
}
