//! API Key authentication error types.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error};

/// Which validity check rejected a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    /// Pre-authentication check: the key is disabled for the discriminator.
    Disabled,
    /// Post-authentication check: the key has expired for the discriminator.
    Expired,
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckPhase::Disabled => write!(f, "API key is not enabled"),
            CheckPhase::Expired => write!(f, "API key has expired"),
        }
    }
}

/// Errors that can occur during API key authentication.
///
/// Client-facing credential problems ([`is_hideable`](Self::is_hideable)) end
/// in a `401` challenge. The remaining variants mean the system itself is
/// broken and propagate to the host as a `500`.
#[derive(Debug, Display, Error)]
pub enum ApiKeyError {
    /// No principal matches the key within the discriminator.
    #[display("Unauthorized: principal could not be found for API key")]
    PrincipalNotFound,

    /// The key was rejected by a validity check.
    #[display("Unauthorized: {phase}")]
    CredentialsExpired { phase: CheckPhase },

    /// Generic rejection.
    #[display("Unauthorized: {message}")]
    BadCredentials { message: String },

    /// No configured provider is able to resolve API keys.
    #[display("Configuration error: {provider} cannot load users by API key")]
    UnsupportedResolver { provider: String },

    /// The credential was issued for another firewall.
    #[display("Configuration error: credential for provider key {provider_key:?} is not supported")]
    UnsupportedCredential { provider_key: String },

    /// The firewall configuration is invalid.
    #[display("Configuration error: {message}")]
    InvalidConfiguration { message: String },

    /// A resolver or checker failed unexpectedly.
    #[display("Authentication service failure: {message}")]
    ServiceFailure {
        message: String,
        source: Arc<dyn StdError + Send + Sync>,
    },
}

impl ApiKeyError {
    /// The generic rejection substituted for hidden failures.
    pub fn bad_credentials() -> Self {
        ApiKeyError::BadCredentials {
            message: "Bad credentials".to_string(),
        }
    }

    /// Wraps an unexpected dependency error.
    pub fn service<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let source: Arc<dyn StdError + Send + Sync> = Arc::from(error.into());
        ApiKeyError::ServiceFailure {
            message: source.to_string(),
            source,
        }
    }

    /// Whether the error is a credential problem the hiding policy may collapse.
    pub fn is_hideable(&self) -> bool {
        matches!(
            self,
            ApiKeyError::PrincipalNotFound
                | ApiKeyError::CredentialsExpired { .. }
                | ApiKeyError::BadCredentials { .. }
        )
    }

    /// Whether the error must reach the host instead of a challenge.
    pub fn is_fatal(&self) -> bool {
        !self.is_hideable()
    }
}

impl ResponseError for ApiKeyError {
    fn status_code(&self) -> StatusCode {
        if self.is_hideable() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = status.canonical_reason().unwrap_or("Error");
        let body = serde_json::json!({ "error": error, "message": self.to_string() });

        HttpResponse::build(status)
            .content_type("application/json")
            .body(body.to_string())
    }
}
