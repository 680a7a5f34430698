//! The permission resolver: union-of-sources lookup with short-circuits.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future;

use crate::catalog::PermissionCatalog;
use crate::config::{ObjectPolicy, ResolverConfig, SourceKind};
use crate::key::PermissionKey;
use crate::principal::Principal;
use crate::repository::{
    DirectGrantRepository, PrincipalRepository, ScopedGroupRepository, StandardGroupRepository,
};
use crate::scope::ResolutionScope;
use crate::source::{DirectGrantSource, GrantSource, ScopedGroupSource, StandardGroupSource};
use crate::AuthzError;

/// Opaque reference to a single object, for instance-level checks.
///
/// The resolver itself implements no object-level logic; see
/// [`ObjectPolicy`] for how a query carrying one of these is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Resource type, e.g. `"document"`.
    pub kind: String,
    /// Host-side identifier of the instance.
    pub id: String,
}

impl ObjectRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Answers permission queries by unioning the configured grant sources.
///
/// Resolution order:
/// 1. the key is validated (for single-key checks) — malformed keys error
///    immediately;
/// 2. the principal is loaded; an id with no stored identity is
///    [`AuthzError::UnknownPrincipal`], which is distinct from "no access";
/// 3. inactive ⇒ denied and superuser ⇒ granted, both decided before any
///    grant-source I/O so they hold even when the store is down;
/// 4. otherwise the configured sources are queried (concurrently — the three
///    lookups are independent), unioned, memoized in the caller's
///    [`ResolutionScope`] and tested.
///
/// The resolver never mutates grant records.
pub struct Resolver {
    principals: Arc<dyn PrincipalRepository>,
    sources: Vec<Arc<dyn GrantSource>>,
    catalog: PermissionCatalog,
    object_policy: ObjectPolicy,
}

impl Resolver {
    /// Build a resolver from an explicit source list.
    ///
    /// Sources are consulted in the order given. Use this when plugging in
    /// custom [`GrantSource`] implementations; otherwise prefer
    /// [`Resolver::from_store`].
    pub fn new(
        principals: Arc<dyn PrincipalRepository>,
        sources: Vec<Arc<dyn GrantSource>>,
        catalog: PermissionCatalog,
    ) -> Self {
        Self {
            principals,
            sources,
            catalog,
            object_policy: ObjectPolicy::default(),
        }
    }

    /// Override the object-query policy.
    pub fn with_object_policy(mut self, policy: ObjectPolicy) -> Self {
        self.object_policy = policy;
        self
    }

    /// Build a resolver over a store implementing all repository traits,
    /// wiring up the built-in sources named by `config` in the order they
    /// are listed.
    pub fn from_store<S>(store: Arc<S>, catalog: PermissionCatalog, config: ResolverConfig) -> Self
    where
        S: PrincipalRepository
            + DirectGrantRepository
            + StandardGroupRepository
            + ScopedGroupRepository
            + 'static,
    {
        let mut sources: Vec<Arc<dyn GrantSource>> = Vec::with_capacity(config.sources.len());
        for kind in &config.sources {
            match kind {
                SourceKind::Direct => sources.push(Arc::new(DirectGrantSource::new(store.clone()))),
                SourceKind::StandardGroups => {
                    sources.push(Arc::new(StandardGroupSource::new(store.clone())));
                }
                SourceKind::ScopedGroups => {
                    sources.push(Arc::new(ScopedGroupSource::new(store.clone())));
                }
            }
        }

        Self {
            principals: store,
            sources,
            catalog,
            object_policy: config.object_policy,
        }
    }

    /// The catalog this resolver treats as "all known permissions".
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Does the principal hold `key`?
    ///
    /// Returns a strict boolean; resolution failures are errors, never
    /// `false`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "has_permission", skip(self, scope), err)
    )]
    pub async fn has_permission(
        &self,
        scope: &mut ResolutionScope,
        principal_id: i64,
        key: &str,
        object: Option<&ObjectRef>,
    ) -> Result<bool, AuthzError> {
        // reject caller bugs before any short-circuit can hide them
        let key = PermissionKey::parse(key)?;
        let principal = self.load_principal(scope, principal_id).await?;

        if !principal.active {
            return Ok(false);
        }
        if principal.superuser {
            return Ok(true);
        }
        if object.is_some() && self.object_policy == ObjectPolicy::Deny {
            return Ok(false);
        }

        let effective = self.resolve_effective(scope, &principal).await?;
        let allowed = effective.contains(&key);
        log::debug!(
            target: "warden",
            "msg=\"permission check\", principal_id={}, key=\"{}\", allowed={}",
            principal.id,
            key,
            allowed
        );
        Ok(allowed)
    }

    /// The principal's full effective permission set.
    ///
    /// Inactive principals get an empty set. Superusers get the entire
    /// catalog — the catalog stands in for the "all permissions" sentinel.
    /// Idempotent within one scope: repeated calls return an identical set
    /// without re-querying the store.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "effective_permissions", skip(self, scope), err)
    )]
    pub async fn effective_permissions(
        &self,
        scope: &mut ResolutionScope,
        principal_id: i64,
        object: Option<&ObjectRef>,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        let principal = self.load_principal(scope, principal_id).await?;

        if !principal.active {
            return Ok(BTreeSet::new());
        }
        if principal.superuser {
            return Ok(self.catalog.keys().clone());
        }
        if object.is_some() && self.object_policy == ObjectPolicy::Deny {
            return Ok(BTreeSet::new());
        }

        let effective = self.resolve_effective(scope, &principal).await?;
        Ok((*effective).clone())
    }

    /// Effective permissions as a sorted list of key strings, for handing to
    /// a serialization layer. Sorting is for display determinism only.
    pub async fn effective_permissions_sorted(
        &self,
        scope: &mut ResolutionScope,
        principal_id: i64,
        object: Option<&ObjectRef>,
    ) -> Result<Vec<String>, AuthzError> {
        let keys = self
            .effective_permissions(scope, principal_id, object)
            .await?;
        // BTreeSet iteration is already sorted
        Ok(keys.into_iter().map(|k| k.as_str().to_owned()).collect())
    }

    async fn load_principal(
        &self,
        scope: &mut ResolutionScope,
        principal_id: i64,
    ) -> Result<Principal, AuthzError> {
        if let Some(principal) = scope.principal(principal_id) {
            return Ok(principal.clone());
        }

        let principal = self
            .principals
            .find_by_id(principal_id)
            .await?
            .ok_or(AuthzError::UnknownPrincipal(principal_id))?;
        scope.remember_principal(principal.clone());
        Ok(principal)
    }

    /// Union the configured sources, memoized per principal in `scope`.
    ///
    /// The scope is only written after every source has answered; a fault in
    /// any lookup (or cancellation of the whole call) leaves the scope
    /// untouched, so no partial set can ever be served later.
    async fn resolve_effective(
        &self,
        scope: &mut ResolutionScope,
        principal: &Principal,
    ) -> Result<Arc<BTreeSet<PermissionKey>>, AuthzError> {
        if let Some(cached) = scope.effective(principal.id) {
            return Ok(cached);
        }

        let lookups = self.sources.iter().map(|source| source.grants_of(principal));
        let sets = future::try_join_all(lookups).await?;

        let mut union = BTreeSet::new();
        for set in sets {
            union.extend(set);
        }

        Ok(scope.store_effective(principal.id, union))
    }
}
