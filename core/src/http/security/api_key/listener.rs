//! Per-request API key authentication.

use actix_web::{HttpRequest, HttpResponse};

use crate::http::security::audit::{AuditLogger, SecurityEvent, SecurityEventType};
use crate::http::security::context::SecurityContext;

use super::credential::{AuthenticationAttempt, Credential};
use super::entry_point::ApiKeyEntryPoint;
use super::error::ApiKeyError;
use super::extractor::{ApiKeyExtractor, CheckMapping};
use super::provider::ApiKeyProvider;

/// Result of running the listener on one request.
#[derive(Debug)]
pub enum Outcome {
    /// No key in the request; the request proceeds untouched.
    Unattempted,
    /// The context now holds an authenticated credential.
    Authenticated,
    /// The key was rejected; the response is the challenge to send.
    Rejected(HttpResponse),
}

impl Outcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Drives one authentication attempt per request.
///
/// # Spring Security Equivalent
/// `AbstractPreAuthenticatedProcessingFilter`
///
/// Extracts the key, authenticates it through the [`ApiKeyProvider`], and
/// either installs the result in the [`SecurityContext`] or answers with the
/// [`ApiKeyEntryPoint`] challenge. Every step is reported to the
/// [`AuditLogger`].
///
/// # Example
/// ```ignore
/// let listener = ApiKeyListener::new("api", ApiKeyProvider::new(users, "api"))?
///     .check_mapping(CheckMapping::new().header_token("Token"))
///     .entry_point(ApiKeyEntryPoint::new(Some("Token"), "Secured API"));
///
/// let mut ctx = SecurityContext::new();
/// match listener.handle(&req, &mut ctx)? {
///     Outcome::Rejected(resp) => return resp,
///     _ => {}
/// }
/// ```
#[derive(Clone)]
pub struct ApiKeyListener {
    provider_key: String,
    provider: ApiKeyProvider,
    extractor: ApiKeyExtractor,
    entry_point: ApiKeyEntryPoint,
    discriminator: Option<String>,
    audit_logger: AuditLogger,
}

impl ApiKeyListener {
    /// Creates a listener for the `provider_key` firewall.
    ///
    /// Starts with an empty check mapping, an entry point without challenge
    /// and a `tracing` audit logger.
    ///
    /// # Errors
    /// `InvalidConfiguration` when `provider_key` is empty.
    pub fn new(provider_key: impl Into<String>, provider: ApiKeyProvider) -> Result<Self, ApiKeyError> {
        let provider_key = provider_key.into();
        if provider_key.is_empty() {
            return Err(ApiKeyError::InvalidConfiguration {
                message: "provider key must not be empty".to_string(),
            });
        }

        Ok(Self {
            provider_key,
            provider,
            extractor: ApiKeyExtractor::new(CheckMapping::default()),
            entry_point: ApiKeyEntryPoint::default(),
            discriminator: None,
            audit_logger: AuditLogger::with_tracing(),
        })
    }

    pub fn check_mapping(mut self, mapping: CheckMapping) -> Self {
        self.extractor = ApiKeyExtractor::new(mapping);
        self
    }

    pub fn entry_point(mut self, entry_point: ApiKeyEntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Sets the discriminator attached to every credential.
    pub fn discriminator(mut self, discriminator: Option<String>) -> Self {
        self.discriminator = discriminator;
        self
    }

    pub fn audit_logger(mut self, audit_logger: AuditLogger) -> Self {
        self.audit_logger = audit_logger;
        self
    }

    pub fn get_provider_key(&self) -> &str {
        &self.provider_key
    }

    pub fn get_discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn get_extractor(&self) -> &ApiKeyExtractor {
        &self.extractor
    }

    pub fn get_entry_point(&self) -> &ApiKeyEntryPoint {
        &self.entry_point
    }

    /// Runs one authentication attempt.
    ///
    /// # Errors
    /// Fatal provider errors (`ServiceFailure`, `UnsupportedResolver`,
    /// `UnsupportedCredential`) are returned as is; the context is left
    /// untouched and no challenge is produced.
    pub fn handle(
        &self,
        req: &HttpRequest,
        ctx: &mut SecurityContext,
    ) -> Result<Outcome, ApiKeyError> {
        let Some(extracted) = self.extractor.extract(req) else {
            return Ok(Outcome::Unattempted);
        };

        let credential = Credential::unauthenticated(
            Some(extracted.api_key),
            self.discriminator.clone(),
            self.provider_key.as_str(),
        );
        let mut attempt =
            AuthenticationAttempt::new(credential, extracted.method, extracted.check_value);

        self.audit_logger.log(
            SecurityEvent::for_credential(SecurityEventType::KeyExtracted, attempt.credential())
                .fetched_by(attempt.method(), attempt.check_value())
                .path(req.path()),
        );

        match self.provider.authenticate_attempt(&mut attempt) {
            Ok(authenticated) => {
                self.audit_logger.log(
                    SecurityEvent::authentication_success(&authenticated)
                        .fetched_by(attempt.method(), attempt.check_value())
                        .path(req.path()),
                );
                ctx.set_credential(Some(authenticated));
                Ok(Outcome::Authenticated)
            }
            Err(error) if error.is_hideable() => {
                if ctx
                    .get_credential()
                    .is_some_and(|c| c.get_provider_key() == self.provider_key)
                {
                    ctx.clear();
                }

                self.audit_logger.log(
                    SecurityEvent::authentication_failure(attempt.credential(), &error.to_string())
                        .fetched_by(attempt.method(), attempt.check_value())
                        .path(req.path()),
                );
                Ok(Outcome::Rejected(self.entry_point.start(req)))
            }
            Err(error) => {
                self.audit_logger.log(
                    SecurityEvent::for_credential(
                        SecurityEventType::ServiceFailure,
                        attempt.credential(),
                    )
                    .fetched_by(attempt.method(), attempt.check_value())
                    .path(req.path())
                    .error(error.to_string()),
                );
                Err(error)
            }
        }
    }
}
