//! HTTP Basic Authentication header parsing.
//!
//! # Spring Security Equivalent
//! `BasicAuthenticationConverter`

use actix_web::http;
use actix_web::HttpRequest;
use base64::prelude::*;

/// Decoded `Authorization: Basic <base64(username:password)>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Decodes the HTTP Basic credentials of the request, if any.
///
/// A payload without `:` is read as a username with an empty password.
pub fn extract_basic_auth(req: &HttpRequest) -> Option<BasicCredentials> {
    let auth_header = req.headers().get(http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;

    let encoded = auth_str.strip_prefix("Basic ")?;

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded_str = String::from_utf8(decoded).ok()?;

    let (username, password) = decoded_str
        .split_once(':')
        .unwrap_or((decoded_str.as_str(), ""));

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
