//! Authentication provider for API key credentials.

use std::sync::Arc;

use crate::http::security::user::Principal;

use super::checker::{ApiKeyUserChecker, UserChecker};
use super::credential::{AttemptState, AuthenticationAttempt, Credential, CredentialPrincipal};
use super::error::ApiKeyError;
use super::resolver::UserProvider;

/// Resolves an unauthenticated [`Credential`] to an authenticated one.
///
/// # Spring Security Equivalent
/// `PreAuthenticatedAuthenticationProvider`
///
/// Resolution goes through the configured [`UserProvider`], then the
/// [`UserChecker`] pre- and post-auth hooks run with the credential's
/// discriminator. With `hide_errors` enabled (the default) every credential
/// problem leaves this provider as the same generic `BadCredentials`.
#[derive(Clone)]
pub struct ApiKeyProvider {
    user_provider: Arc<dyn UserProvider>,
    user_checker: Arc<dyn UserChecker>,
    provider_key: String,
    hide_errors: bool,
}

impl ApiKeyProvider {
    /// Creates a provider with the default [`ApiKeyUserChecker`].
    pub fn new<P: UserProvider + 'static>(user_provider: P, provider_key: impl Into<String>) -> Self {
        Self::with_shared_provider(Arc::new(user_provider), provider_key)
    }

    /// Creates a provider around a shared user provider.
    pub fn with_shared_provider(
        user_provider: Arc<dyn UserProvider>,
        provider_key: impl Into<String>,
    ) -> Self {
        ApiKeyProvider {
            user_provider,
            user_checker: Arc::new(ApiKeyUserChecker),
            provider_key: provider_key.into(),
            hide_errors: true,
        }
    }

    /// Replaces the validity checker.
    pub fn user_checker<C: UserChecker + 'static>(mut self, checker: C) -> Self {
        self.user_checker = Arc::new(checker);
        self
    }

    /// Sets whether credential problems are collapsed to `BadCredentials`.
    pub fn hide_errors(mut self, hide: bool) -> Self {
        self.hide_errors = hide;
        self
    }

    pub fn get_provider_key(&self) -> &str {
        &self.provider_key
    }

    pub fn is_hiding_errors(&self) -> bool {
        self.hide_errors
    }

    /// Whether this provider handles the credential.
    pub fn supports(&self, credential: &Credential) -> bool {
        credential.get_provider_key() == self.provider_key
    }

    /// Authenticates the credential.
    ///
    /// Returns a new, authenticated credential; the input is left untouched.
    pub fn authenticate(&self, credential: &Credential) -> Result<Credential, ApiKeyError> {
        self.run(credential, &mut |_: AttemptState| {})
    }

    /// Authenticates the attempt's credential, advancing its state.
    ///
    /// The attempt ends `Authenticated` on success and `Rejected` on a
    /// credential problem. Fatal errors leave it where it failed.
    pub fn authenticate_attempt(
        &self,
        attempt: &mut AuthenticationAttempt,
    ) -> Result<Credential, ApiKeyError> {
        let credential = attempt.credential().clone();
        let result = self.run(&credential, &mut |state: AttemptState| attempt.advance(state));

        match &result {
            Ok(_) => attempt.advance(AttemptState::Authenticated),
            Err(e) if e.is_hideable() => attempt.advance(AttemptState::Rejected),
            Err(_) => {}
        }
        result
    }

    fn run(
        &self,
        credential: &Credential,
        on_state: &mut dyn FnMut(AttemptState),
    ) -> Result<Credential, ApiKeyError> {
        if !self.supports(credential) {
            return Err(ApiKeyError::UnsupportedCredential {
                provider_key: credential.get_provider_key().to_string(),
            });
        }

        on_state(AttemptState::Resolving);
        let principal = self.retrieve_user(credential).map_err(|e| self.hide(e))?;

        on_state(AttemptState::Checking);
        let discriminator = credential.get_discriminator();
        self.user_checker
            .check_pre_auth(principal.as_ref(), discriminator)
            .and_then(|()| {
                self.user_checker
                    .check_post_auth(principal.as_ref(), discriminator)
            })
            .map_err(|e| self.hide(e))?;

        Ok(Credential::authenticated(credential, principal))
    }

    fn retrieve_user(&self, credential: &Credential) -> Result<Arc<dyn Principal>, ApiKeyError> {
        if let CredentialPrincipal::Resolved(principal) = credential.get_principal() {
            return Ok(Arc::clone(principal));
        }

        let api_key = credential
            .get_api_key()
            .ok_or_else(|| ApiKeyError::BadCredentials {
                message: "No API key found in request.".to_string(),
            })?;

        let provider = self.user_provider.as_api_key_provider().ok_or_else(|| {
            ApiKeyError::UnsupportedResolver {
                provider: self.user_provider.name().to_string(),
            }
        })?;

        provider.load_user_by_api_key(api_key, credential.get_discriminator())
    }

    fn hide(&self, error: ApiKeyError) -> ApiKeyError {
        if self.hide_errors && error.is_hideable() {
            tracing::debug!(reason = %error, "hiding API key authentication failure");
            ApiKeyError::bad_credentials()
        } else {
            error
        }
    }
}
