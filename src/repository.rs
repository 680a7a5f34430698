//! Repository traits: the seam between the resolver and the host's store.
//!
//! The relational store itself is out of scope — implement these traits over
//! whatever persistence the host application uses. [`MemoryAuthzStore`]
//! (see [`crate::memory`]) implements all four for tests and lightweight
//! embedding.
//!
//! Implementations must map their own failures to
//! [`AuthzError::StoreUnavailable`]; the resolver performs no retries, since
//! it has no basis for deciding whether a store fault is transient.
//!
//! Any longer-lived cache an implementation maintains must be invalidated
//! synchronously with grant mutations. Staleness in a permission cache is a
//! security defect, not a performance tradeoff.
//!
//! [`MemoryAuthzStore`]: crate::memory::MemoryAuthzStore

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::groups::{ScopedGroup, StandardGroup};
use crate::key::PermissionKey;
use crate::principal::Principal;
use crate::AuthzError;

/// Input for creating a principal.
#[derive(Debug, Clone)]
pub struct CreatePrincipal {
    pub username: String,
    pub active: bool,
    pub superuser: bool,
    pub staff: bool,
}

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, AuthzError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, AuthzError>;
    async fn create(&self, data: CreatePrincipal) -> Result<Principal, AuthzError>;
    /// Deactivate or reactivate. Grants stay on record either way.
    async fn set_active(&self, id: i64, active: bool) -> Result<Principal, AuthzError>;
    /// All tenant admin principals (staff, non-superuser, `-admin` username).
    async fn tenant_admins(&self) -> Result<Vec<Principal>, AuthzError>;
}

/// Grants assigned straight to a principal, bypassing any group.
#[async_trait]
pub trait DirectGrantRepository: Send + Sync {
    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError>;
    /// Returns true if the grant was newly added.
    async fn grant(&self, principal_id: i64, key: PermissionKey) -> Result<bool, AuthzError>;
    /// Returns true if a grant was actually removed.
    async fn revoke(&self, principal_id: i64, key: &PermissionKey) -> Result<bool, AuthzError>;
}

#[async_trait]
pub trait StandardGroupRepository: Send + Sync {
    async fn get_or_create(&self, name: &str) -> Result<StandardGroup, AuthzError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<StandardGroup>, AuthzError>;
    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError>;
    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError>;
    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError>;
    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError>;
    /// Union of permissions from every group the principal belongs to.
    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError>;
}

#[async_trait]
pub trait ScopedGroupRepository: Send + Sync {
    /// Find or create a group by `(scope, name)`.
    async fn get_or_create(&self, scope_id: Uuid, name: &str) -> Result<ScopedGroup, AuthzError>;
    async fn find_by_scope_and_name(
        &self,
        scope_id: Uuid,
        name: &str,
    ) -> Result<Option<ScopedGroup>, AuthzError>;
    /// The permission keys held by a single group.
    async fn group_permissions(&self, group_id: i64)
        -> Result<BTreeSet<PermissionKey>, AuthzError>;
    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError>;
    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError>;
    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError>;
    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError>;
    /// All scoped groups the principal is a member of.
    async fn groups_of_member(&self, principal_id: i64) -> Result<Vec<ScopedGroup>, AuthzError>;
    /// Union of permissions from every scoped group the principal belongs to.
    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError>;
}

// Delegating impls so a shared Arc<Store> can be handed to several actions.

#[async_trait]
impl<T: PrincipalRepository + ?Sized> PrincipalRepository for Arc<T> {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, AuthzError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, AuthzError> {
        (**self).find_by_username(username).await
    }

    async fn create(&self, data: CreatePrincipal) -> Result<Principal, AuthzError> {
        (**self).create(data).await
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Principal, AuthzError> {
        (**self).set_active(id, active).await
    }

    async fn tenant_admins(&self) -> Result<Vec<Principal>, AuthzError> {
        (**self).tenant_admins().await
    }
}

#[async_trait]
impl<T: DirectGrantRepository + ?Sized> DirectGrantRepository for Arc<T> {
    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        (**self).grants_of(principal_id).await
    }

    async fn grant(&self, principal_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        (**self).grant(principal_id, key).await
    }

    async fn revoke(&self, principal_id: i64, key: &PermissionKey) -> Result<bool, AuthzError> {
        (**self).revoke(principal_id, key).await
    }
}

#[async_trait]
impl<T: StandardGroupRepository + ?Sized> StandardGroupRepository for Arc<T> {
    async fn get_or_create(&self, name: &str) -> Result<StandardGroup, AuthzError> {
        (**self).get_or_create(name).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StandardGroup>, AuthzError> {
        (**self).find_by_name(name).await
    }

    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        (**self).grant_to_group(group_id, key).await
    }

    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError> {
        (**self).revoke_from_group(group_id, key).await
    }

    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        (**self).add_member(group_id, principal_id).await
    }

    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        (**self).remove_member(group_id, principal_id).await
    }

    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        (**self).grants_of(principal_id).await
    }
}

#[async_trait]
impl<T: ScopedGroupRepository + ?Sized> ScopedGroupRepository for Arc<T> {
    async fn get_or_create(&self, scope_id: Uuid, name: &str) -> Result<ScopedGroup, AuthzError> {
        (**self).get_or_create(scope_id, name).await
    }

    async fn find_by_scope_and_name(
        &self,
        scope_id: Uuid,
        name: &str,
    ) -> Result<Option<ScopedGroup>, AuthzError> {
        (**self).find_by_scope_and_name(scope_id, name).await
    }

    async fn group_permissions(
        &self,
        group_id: i64,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        (**self).group_permissions(group_id).await
    }

    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        (**self).grant_to_group(group_id, key).await
    }

    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError> {
        (**self).revoke_from_group(group_id, key).await
    }

    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        (**self).add_member(group_id, principal_id).await
    }

    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        (**self).remove_member(group_id, principal_id).await
    }

    async fn groups_of_member(&self, principal_id: i64) -> Result<Vec<ScopedGroup>, AuthzError> {
        (**self).groups_of_member(principal_id).await
    }

    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        (**self).grants_of(principal_id).await
    }
}
