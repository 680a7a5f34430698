//! Multi-tenant permission resolution for embedding in web applications.
//!
//! `warden` answers two questions for a host application's authorization
//! checkpoint: "does this principal hold this permission?" and "what is this
//! principal's full effective permission set?". Grants can come from three
//! sources — direct grants, standard groups, and tenant-scoped groups — and
//! the effective set is their union.
//!
//! Persistence is abstracted behind repository traits so the host can back
//! the library with whatever store it already uses. A first-party in-memory
//! store ([`MemoryAuthzStore`]) is included for tests and lightweight
//! embedding.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden::{
//!     MemoryAuthzStore, PermissionCatalog, ResolutionScope, Resolver, ResolverConfig,
//! };
//!
//! let store = Arc::new(MemoryAuthzStore::new());
//! let resolver = Resolver::from_store(
//!     store.clone(),
//!     PermissionCatalog::tenant_admin(),
//!     ResolverConfig::default(),
//! );
//!
//! // one scope per inbound request
//! let mut scope = ResolutionScope::new();
//! let allowed = resolver
//!     .has_permission(&mut scope, principal_id, "documents.add_document", None)
//!     .await?;
//! ```

pub mod actions;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod events;
pub mod groups;
pub mod key;
pub mod memory;
pub mod principal;
pub mod repository;
pub mod resolver;
pub mod scope;
pub mod secret;
pub mod source;

pub use catalog::PermissionCatalog;
pub use config::{ObjectPolicy, ResolverConfig, SourceKind};
pub use events::register_event_listeners;
pub use groups::{ScopedGroup, StandardGroup};
pub use key::PermissionKey;
pub use memory::MemoryAuthzStore;
pub use principal::Principal;
pub use repository::{
    CreatePrincipal, DirectGrantRepository, PrincipalRepository, ScopedGroupRepository,
    StandardGroupRepository,
};
pub use resolver::{ObjectRef, Resolver};
pub use scope::ResolutionScope;
pub use secret::SecretString;

use std::fmt;

/// Errors surfaced by permission resolution and provisioning.
///
/// A resolution failure is never downgraded to a `false` answer: an erroring
/// grant store must surface as [`AuthzError::StoreUnavailable`] so the host
/// can fail the request as "authorization indeterminate" instead of masking
/// an infrastructure fault as a security decision.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthzError {
    /// The supplied principal id does not resolve to a stored identity.
    UnknownPrincipal(i64),
    /// A grant-source lookup failed. Carries the store's own description.
    StoreUnavailable(String),
    /// The permission key does not match `"<domain>.<action>_<type>"`.
    MalformedKey(String),
    /// Invariant violation inside the library or a store implementation.
    Internal(String),
}

impl std::error::Error for AuthzError {}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthzError::UnknownPrincipal(id) => write!(f, "Unknown principal: {}", id),
            AuthzError::StoreUnavailable(msg) => write!(f, "Grant store unavailable: {}", msg),
            AuthzError::MalformedKey(key) => write!(f, "Malformed permission key: {}", key),
            AuthzError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}
