//! User providers resolving API keys to principals.

use std::sync::{Arc, PoisonError, RwLock};

use crate::http::security::user::{Principal, User};

use super::error::ApiKeyError;

/// Source of principals.
///
/// # Spring Security Equivalent
/// `UserDetailsService`
///
/// Providers able to resolve API keys advertise it through
/// [`as_api_key_provider`](UserProvider::as_api_key_provider).
pub trait UserProvider: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Loads a principal by its identity.
    fn load_user_by_username(&self, username: &str) -> Result<Arc<dyn Principal>, ApiKeyError>;

    /// Returns the API key capability, if the provider implements it.
    fn as_api_key_provider(&self) -> Option<&dyn ApiKeyUserProvider> {
        None
    }
}

/// Capability of resolving a key within a discriminator.
///
/// # Example
///
/// ```ignore
/// struct DatabaseUserProvider {
///     pool: DbPool,
/// }
///
/// impl ApiKeyUserProvider for DatabaseUserProvider {
///     fn load_user_by_api_key(
///         &self,
///         api_key: &str,
///         discriminator: Option<&str>,
///     ) -> Result<Arc<dyn Principal>, ApiKeyError> {
///         let row = self
///             .pool
///             .query_one("SELECT * FROM api_keys WHERE key = ? AND tenant = ?", &[api_key, discriminator])
///             .map_err(ApiKeyError::service)?
///             .ok_or(ApiKeyError::PrincipalNotFound)?;
///         Ok(Arc::new(User::new(row.owner).roles(&row.roles)))
///     }
/// }
/// ```
pub trait ApiKeyUserProvider: UserProvider {
    /// Resolves `api_key` within `discriminator`.
    ///
    /// Fails with [`ApiKeyError::PrincipalNotFound`] when nothing matches.
    fn load_user_by_api_key(
        &self,
        api_key: &str,
        discriminator: Option<&str>,
    ) -> Result<Arc<dyn Principal>, ApiKeyError>;
}

/// Ordered composition of providers.
///
/// # Spring Security Equivalent
/// `ProviderManager` delegating to several `AuthenticationProvider`s
///
/// Providers without the API key capability are skipped. The first provider
/// that resolves the key wins; `PrincipalNotFound` moves on to the next one,
/// any other error stops the chain.
#[derive(Clone, Default)]
pub struct ChainUserProvider {
    providers: Vec<Arc<dyn UserProvider>>,
}

impl ChainUserProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider (builder pattern).
    pub fn with_provider<P: UserProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Appends a shared provider (builder pattern).
    pub fn with_shared_provider(mut self, provider: Arc<dyn UserProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Returns the providers in evaluation order.
    pub fn get_providers(&self) -> &[Arc<dyn UserProvider>] {
        &self.providers
    }
}

impl UserProvider for ChainUserProvider {
    fn name(&self) -> &str {
        "ChainUserProvider"
    }

    fn load_user_by_username(&self, username: &str) -> Result<Arc<dyn Principal>, ApiKeyError> {
        for provider in &self.providers {
            match provider.load_user_by_username(username) {
                Err(ApiKeyError::PrincipalNotFound) => continue,
                result => return result,
            }
        }
        Err(ApiKeyError::PrincipalNotFound)
    }

    /// Capable only when at least one member is, so an enclosing chain
    /// skips a chain it could never resolve through.
    fn as_api_key_provider(&self) -> Option<&dyn ApiKeyUserProvider> {
        self.providers
            .iter()
            .any(|p| p.as_api_key_provider().is_some())
            .then_some(self as &dyn ApiKeyUserProvider)
    }
}

impl ApiKeyUserProvider for ChainUserProvider {
    fn load_user_by_api_key(
        &self,
        api_key: &str,
        discriminator: Option<&str>,
    ) -> Result<Arc<dyn Principal>, ApiKeyError> {
        let mut attempted = false;

        for provider in &self.providers {
            let Some(provider) = provider.as_api_key_provider() else {
                continue;
            };
            attempted = true;

            match provider.load_user_by_api_key(api_key, discriminator) {
                Err(ApiKeyError::PrincipalNotFound) => {
                    tracing::debug!(
                        provider = provider.name(),
                        "API key not found, trying next provider"
                    );
                }
                result => return result,
            }
        }

        if attempted {
            Err(ApiKeyError::PrincipalNotFound)
        } else {
            Err(ApiKeyError::UnsupportedResolver {
                provider: self.name().to_string(),
            })
        }
    }
}

/// In-memory implementation of [`ApiKeyUserProvider`].
///
/// Useful for development, testing, and simple applications.
///
/// # Example
///
/// ```
/// use actix_apikey_core::http::security::User;
/// use actix_apikey_core::http::security::api_key::{
///     ApiKey, ApiKeyUserProvider, InMemoryUserProvider,
/// };
///
/// let provider = InMemoryUserProvider::new()
///     .with_user(User::new("svc").api_key(ApiKey::new("abc123")));
///
/// assert!(provider.load_user_by_api_key("abc123", None).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserProvider {
    users: RwLock<Vec<Arc<User>>>,
}

impl InMemoryUserProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user (builder pattern).
    pub fn with_user(self, user: User) -> Self {
        self.add_user(user);
        self
    }

    /// Adds a user, replacing any user with the same name.
    pub fn add_user(&self, user: User) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.retain(|u| u.get_username() != user.get_username());
        users.push(Arc::new(user));
    }

    /// Removes a user by name.
    pub fn remove_user(&self, username: &str) -> Option<Arc<User>> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let index = users.iter().position(|u| u.get_username() == username)?;
        Some(users.remove(index))
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if the provider holds no user.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find<F>(&self, predicate: F) -> Result<Arc<dyn Principal>, ApiKeyError>
    where
        F: Fn(&User) -> bool,
    {
        let users = self
            .users
            .read()
            .map_err(|_| ApiKeyError::service("in-memory user store is poisoned"))?;
        users
            .iter()
            .find(|u| predicate(&***u))
            .map(|u| Arc::clone(u) as Arc<dyn Principal>)
            .ok_or(ApiKeyError::PrincipalNotFound)
    }
}

impl UserProvider for InMemoryUserProvider {
    fn name(&self) -> &str {
        "InMemoryUserProvider"
    }

    fn load_user_by_username(&self, username: &str) -> Result<Arc<dyn Principal>, ApiKeyError> {
        self.find(|u| u.get_username() == username)
    }

    fn as_api_key_provider(&self) -> Option<&dyn ApiKeyUserProvider> {
        Some(self)
    }
}

impl ApiKeyUserProvider for InMemoryUserProvider {
    fn load_user_by_api_key(
        &self,
        api_key: &str,
        discriminator: Option<&str>,
    ) -> Result<Arc<dyn Principal>, ApiKeyError> {
        self.find(|u| u.holds_key(api_key, discriminator))
    }
}
