//! Grant sources: the pluggable inputs to the union computation.
//!
//! The host framework's pattern of chaining authorization backends is
//! modeled here as an explicit list of sources, each exposing a single
//! "grants of principal" lookup. The resolver unions whatever the configured
//! sources return; union is commutative, so source order never changes the
//! answer, only which store queries run first.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SourceKind;
use crate::key::PermissionKey;
use crate::principal::Principal;
use crate::repository::{DirectGrantRepository, ScopedGroupRepository, StandardGroupRepository};
use crate::AuthzError;

/// A single source of permission grants.
///
/// Implement this to plug an additional grant source into the resolver
/// beyond the three built-in ones.
#[async_trait]
pub trait GrantSource: Send + Sync {
    /// Which built-in source this is, for logging and diagnostics.
    fn kind(&self) -> SourceKind;

    /// The permission keys this source grants to the principal.
    ///
    /// Must error on store failure rather than returning an empty set; an
    /// empty set means "no grants", not "could not look up".
    async fn grants_of(&self, principal: &Principal) -> Result<BTreeSet<PermissionKey>, AuthzError>;
}

/// Direct principal→permission grants.
pub struct DirectGrantSource<R: DirectGrantRepository> {
    repo: Arc<R>,
}

impl<R: DirectGrantRepository> DirectGrantSource<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: DirectGrantRepository> GrantSource for DirectGrantSource<R> {
    fn kind(&self) -> SourceKind {
        SourceKind::Direct
    }

    async fn grants_of(
        &self,
        principal: &Principal,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        self.repo.grants_of(principal.id).await
    }
}

/// Grants inherited through standard group membership.
pub struct StandardGroupSource<R: StandardGroupRepository> {
    repo: Arc<R>,
}

impl<R: StandardGroupRepository> StandardGroupSource<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: StandardGroupRepository> GrantSource for StandardGroupSource<R> {
    fn kind(&self) -> SourceKind {
        SourceKind::StandardGroups
    }

    async fn grants_of(
        &self,
        principal: &Principal,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        self.repo.grants_of(principal.id).await
    }
}

/// Grants inherited through tenant-scoped group membership.
pub struct ScopedGroupSource<R: ScopedGroupRepository> {
    repo: Arc<R>,
}

impl<R: ScopedGroupRepository> ScopedGroupSource<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: ScopedGroupRepository> GrantSource for ScopedGroupSource<R> {
    fn kind(&self) -> SourceKind {
        SourceKind::ScopedGroups
    }

    async fn grants_of(
        &self,
        principal: &Principal,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        self.repo.grants_of(principal.id).await
    }
}
