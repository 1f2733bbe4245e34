//! 401 challenge response.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

/// Builds the response sent when API key authentication is rejected.
///
/// # Spring Security Equivalent
/// `AuthenticationEntryPoint`
///
/// # Example
/// ```
/// use actix_apikey_core::http::security::api_key::ApiKeyEntryPoint;
///
/// let entry_point = ApiKeyEntryPoint::new(Some("Token"), "Secured API");
/// assert_eq!(
///     entry_point.www_authenticate_header().as_deref(),
///     Some("Token realm=\"Secured API\"")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyEntryPoint {
    challenge: Option<String>,
    realm: String,
}

impl ApiKeyEntryPoint {
    pub fn new(challenge: Option<&str>, realm: impl Into<String>) -> Self {
        Self {
            challenge: challenge.map(String::from),
            realm: realm.into(),
        }
    }

    pub fn get_challenge(&self) -> Option<&str> {
        self.challenge.as_deref()
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    /// Header value, present only when both scheme and realm are non-empty.
    pub fn www_authenticate_header(&self) -> Option<String> {
        challenge_header(self.challenge.as_deref(), &self.realm)
    }

    /// Returns the challenge response for `req`.
    ///
    /// The request is not inspected.
    pub fn start(&self, _req: &HttpRequest) -> HttpResponse {
        Self::build(self.challenge.as_deref(), &self.realm)
    }

    /// Builds a `401 Unauthorized` with an optional `WWW-Authenticate` header.
    pub fn build(challenge: Option<&str>, realm: &str) -> HttpResponse {
        let mut response = HttpResponse::Unauthorized();
        if let Some(value) = challenge_header(challenge, realm) {
            response.insert_header((header::WWW_AUTHENTICATE, value));
        }
        response.finish()
    }
}

fn challenge_header(challenge: Option<&str>, realm: &str) -> Option<String> {
    let challenge = challenge.filter(|c| !c.is_empty())?;
    (!realm.is_empty()).then(|| format!("{} realm=\"{}\"", challenge, realm))
}
