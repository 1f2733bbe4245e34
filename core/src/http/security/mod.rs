//! Security module providing API key authentication.
//!
//! # Spring Equivalent
//! `org.springframework.security` package
//!
//! # Module Structure
//!
//! - `api_key` - Extraction, resolution, checking and challenge of API keys
//! - `audit` - Security audit events and handlers
//! - `context` - Per-request security context
//! - `extractor` - Actix Web extractors (AuthenticatedCredential, OptionalCredential)
//! - `http_basic` - HTTP Basic header decoding
//! - `middleware` - Security middleware (ApiKeyTransform)
//! - `user` - Principal traits and the User model

// Re-exports for convenience
pub use audit::{
    AuditLogger, ClosureHandler, InMemoryEventStore, SecurityEvent, SecurityEventHandler,
    SecurityEventSeverity, SecurityEventType, TracingHandler,
};
pub use context::SecurityContext;
pub use extractor::{AuthenticatedCredential, OptionalCredential, SecurityExt};
pub use middleware::{ApiKeyService, ApiKeyTransform};
pub use user::{ApiKeyUser, Principal, User};

// Internal modules (private implementation details)
mod extractor;
mod user;

// Public modules
pub mod api_key;
pub mod audit;
pub mod context;
pub mod http_basic;
pub mod middleware;
