//! Validity checks run around API key resolution.

use crate::http::security::user::Principal;

use super::error::{ApiKeyError, CheckPhase};

/// Hooks that can reject a resolved principal.
///
/// # Spring Security Equivalent
/// `UserDetailsChecker`
pub trait UserChecker: Send + Sync {
    /// Runs before the credential is accepted.
    fn check_pre_auth(
        &self,
        principal: &dyn Principal,
        discriminator: Option<&str>,
    ) -> Result<(), ApiKeyError>;

    /// Runs after the pre-auth check passed.
    fn check_post_auth(
        &self,
        principal: &dyn Principal,
        discriminator: Option<&str>,
    ) -> Result<(), ApiKeyError>;
}

/// Default checker: rejects disabled keys before and expired keys after
/// authentication.
///
/// Principals without the API key capability always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiKeyUserChecker;

impl UserChecker for ApiKeyUserChecker {
    fn check_pre_auth(
        &self,
        principal: &dyn Principal,
        discriminator: Option<&str>,
    ) -> Result<(), ApiKeyError> {
        let Some(user) = principal.as_api_key_user() else {
            return Ok(());
        };

        if !user.is_api_key_enabled(discriminator) {
            return Err(ApiKeyError::CredentialsExpired {
                phase: CheckPhase::Disabled,
            });
        }
        Ok(())
    }

    fn check_post_auth(
        &self,
        principal: &dyn Principal,
        discriminator: Option<&str>,
    ) -> Result<(), ApiKeyError> {
        let Some(user) = principal.as_api_key_user() else {
            return Ok(());
        };

        if !user.is_api_key_non_expired(discriminator) {
            return Err(ApiKeyError::CredentialsExpired {
                phase: CheckPhase::Expired,
            });
        }
        Ok(())
    }
}
