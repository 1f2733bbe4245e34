//! Per-request security context.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.core.context.SecurityContext`
//!
//! # Overview
//! The context holds at most one [`Credential`]. [`ApiKeyTransform`] creates
//! one per request, hands it to the listener as `&mut SecurityContext` and
//! stores the result in the request extensions, where the extractors in
//! [`extractor`](super::extractor) read it.
//!
//! [`ApiKeyTransform`]: super::middleware::ApiKeyTransform
//!
//! # Usage
//! ```ignore
//! use actix_apikey_core::http::security::{SecurityContext, SecurityExt};
//!
//! async fn handler(req: HttpRequest) -> impl Responder {
//!     let ctx = req.security_context();
//!     if ctx.has_role("ROLE_API") {
//!         // ...
//!     }
//! }
//! ```

use crate::http::security::api_key::Credential;

/// Holder for the current credential.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    credential: Option<Credential>,
}

impl SecurityContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already holding `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    /// Gets the current credential.
    ///
    /// # Spring Security Equivalent
    /// `SecurityContext.getAuthentication()`
    pub fn get_credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Replaces the current credential.
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    /// Removes and returns the current credential.
    pub fn take_credential(&mut self) -> Option<Credential> {
        self.credential.take()
    }

    /// Clears the context.
    ///
    /// # Spring Security Equivalent
    /// `SecurityContextHolder.clearContext()`
    pub fn clear(&mut self) {
        self.credential = None;
    }

    /// Whether an authenticated credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.credential
            .as_ref()
            .is_some_and(Credential::is_authenticated)
    }

    /// Gets the current username if authenticated.
    pub fn get_username(&self) -> Option<&str> {
        self.authenticated().map(Credential::get_username)
    }

    /// Checks if the authenticated credential has the specified role.
    pub fn has_role(&self, role: &str) -> bool {
        self.authenticated().is_some_and(|c| c.has_role(role))
    }

    /// Checks if the authenticated credential has any of the specified roles.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.authenticated()
            .is_some_and(|c| roles.iter().any(|role| c.has_role(role)))
    }

    fn authenticated(&self) -> Option<&Credential> {
        self.credential.as_ref().filter(|c| c.is_authenticated())
    }
}
