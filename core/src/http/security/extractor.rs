//! Extractors for accessing the security context in handlers.
//!
//! # Spring Equivalent
//! `@AuthenticationPrincipal` annotation / `SecurityContextHolder`

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::AuthError;
use crate::http::security::api_key::Credential;
use crate::http::security::context::SecurityContext;

/// Extractor for the authenticated credential.
///
/// # Spring Equivalent
/// `SecurityContextHolder.getContext().getAuthentication()`
///
/// # Usage
/// ```ignore
/// use actix_apikey_core::http::security::AuthenticatedCredential;
///
/// async fn handler(credential: AuthenticatedCredential) -> impl Responder {
///     format!("Hello, {}!", credential.get_username())
/// }
/// ```
///
/// # Errors
/// Returns `500` when no [`ApiKeyTransform`](super::ApiKeyTransform) ran for
/// the request and `401 Unauthorized` when the context is not authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedCredential(Credential);

impl AuthenticatedCredential {
    /// Returns the inner Credential.
    pub fn into_inner(self) -> Credential {
        self.0
    }
}

impl Deref for AuthenticatedCredential {
    type Target = Credential;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedCredential {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let Some(ctx) = extensions.get::<SecurityContext>() else {
            return ready(Err(AuthError::MissingContext));
        };

        match ctx.get_credential().filter(|c| c.is_authenticated()) {
            Some(credential) => ready(Ok(AuthenticatedCredential(credential.clone()))),
            None => ready(Err(AuthError::Unauthorized)),
        }
    }
}

/// Optional extractor for the authenticated credential.
///
/// Returns `None` if not authenticated instead of an error.
///
/// # Usage
/// ```ignore
/// async fn handler(credential: OptionalCredential) -> impl Responder {
///     match credential.into_inner() {
///         Some(c) => format!("Hello, {}!", c.get_username()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OptionalCredential(Option<Credential>);

impl OptionalCredential {
    /// Returns the inner Option<Credential>.
    pub fn into_inner(self) -> Option<Credential> {
        self.0
    }

    /// Returns true if a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalCredential {
    type Target = Option<Credential>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalCredential {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalCredential(req.get_credential())))
    }
}

/// Extension trait for HttpRequest to check authentication.
pub trait SecurityExt {
    /// Returns a copy of the request's security context, empty when none.
    fn security_context(&self) -> SecurityContext;

    /// Returns a clone of the authenticated credential if present.
    fn get_credential(&self) -> Option<Credential>;

    /// Returns true if the request is authenticated.
    fn is_authenticated(&self) -> bool;

    /// Checks if the authenticated credential has the specified role.
    fn has_role(&self, role: &str) -> bool;

    /// Checks if the authenticated credential has any of the specified roles.
    fn has_any_role(&self, roles: &[&str]) -> bool;
}

impl SecurityExt for HttpRequest {
    fn security_context(&self) -> SecurityContext {
        self.extensions()
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default()
    }

    fn get_credential(&self) -> Option<Credential> {
        self.extensions()
            .get::<SecurityContext>()
            .and_then(SecurityContext::get_credential)
            .filter(|c| c.is_authenticated())
            .cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.extensions()
            .get::<SecurityContext>()
            .is_some_and(SecurityContext::is_authenticated)
    }

    fn has_role(&self, role: &str) -> bool {
        self.extensions()
            .get::<SecurityContext>()
            .is_some_and(|ctx| ctx.has_role(role))
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        self.extensions()
            .get::<SecurityContext>()
            .is_some_and(|ctx| ctx.has_any_role(roles))
    }
}
