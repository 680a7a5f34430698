//! End-to-end resolution behavior against the in-memory store.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use warden::source::{DirectGrantSource, GrantSource};
use warden::{
    AuthzError, CreatePrincipal, DirectGrantRepository, MemoryAuthzStore, PermissionCatalog,
    PermissionKey, Principal, PrincipalRepository, ResolutionScope, Resolver, ResolverConfig,
    ScopedGroupRepository, SourceKind, StandardGroupRepository,
};

fn key(raw: &str) -> PermissionKey {
    PermissionKey::parse(raw).unwrap()
}

async fn seed_principal(store: &MemoryAuthzStore, username: &str) -> Principal {
    store
        .create(CreatePrincipal {
            username: username.to_owned(),
            active: true,
            superuser: false,
            staff: false,
        })
        .await
        .unwrap()
}

fn full_resolver(store: Arc<MemoryAuthzStore>) -> Resolver {
    Resolver::from_store(
        store,
        PermissionCatalog::tenant_admin(),
        ResolverConfig::default(),
    )
}

#[tokio::test]
async fn no_grants_means_empty_set() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "nobody").await;

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    let effective = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();
    assert!(effective.is_empty());
}

#[tokio::test]
async fn direct_grant_only() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "alice").await;
    store
        .grant(principal.id, key("documents.add_document"))
        .await
        .unwrap();

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    assert!(resolver
        .has_permission(&mut scope, principal.id, "documents.add_document", None)
        .await
        .unwrap());
    assert!(!resolver
        .has_permission(&mut scope, principal.id, "documents.view_document", None)
        .await
        .unwrap());
}

#[tokio::test]
async fn scoped_group_grants_resolve() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "bob").await;

    // a "Tenant Admins" group carrying the full 60-key admin catalog
    let scoped: &dyn ScopedGroupRepository = &*store;
    let group = scoped
        .get_or_create(Uuid::new_v4(), "Tenant Admins")
        .await
        .unwrap();
    for k in PermissionCatalog::tenant_admin().iter() {
        scoped.grant_to_group(group.id, k.clone()).await.unwrap();
    }
    scoped.add_member(group.id, principal.id).await.unwrap();

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    let effective = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();
    assert_eq!(effective.len(), 60);
    assert!(effective.contains(&key("auth.add_user")));
    assert!(resolver
        .has_permission(&mut scope, principal.id, "auth.add_user", None)
        .await
        .unwrap());
}

#[tokio::test]
async fn overlapping_grants_collapse() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "carol").await;

    let standard: &dyn StandardGroupRepository = &*store;
    let editors = standard.get_or_create("Editors").await.unwrap();
    standard
        .grant_to_group(editors.id, key("documents.view_document"))
        .await
        .unwrap();
    standard.add_member(editors.id, principal.id).await.unwrap();

    let scoped: &dyn ScopedGroupRepository = &*store;
    let admins = scoped
        .get_or_create(Uuid::new_v4(), "Tenant Admins")
        .await
        .unwrap();
    scoped
        .grant_to_group(admins.id, key("documents.view_document"))
        .await
        .unwrap();
    scoped
        .grant_to_group(admins.id, key("documents.add_document"))
        .await
        .unwrap();
    scoped.add_member(admins.id, principal.id).await.unwrap();

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    let effective = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();

    let expected: BTreeSet<_> = [
        key("documents.view_document"),
        key("documents.add_document"),
    ]
    .into_iter()
    .collect();
    assert_eq!(effective, expected);
}

#[tokio::test]
async fn union_includes_all_three_sources() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "dave").await;

    store
        .grant(principal.id, key("documents.add_note"))
        .await
        .unwrap();

    let standard: &dyn StandardGroupRepository = &*store;
    let g1 = standard.get_or_create("Taggers").await.unwrap();
    standard
        .grant_to_group(g1.id, key("documents.add_tag"))
        .await
        .unwrap();
    standard.add_member(g1.id, principal.id).await.unwrap();

    let scoped: &dyn ScopedGroupRepository = &*store;
    let g2 = scoped
        .get_or_create(Uuid::new_v4(), "Tenant Admins")
        .await
        .unwrap();
    scoped
        .grant_to_group(g2.id, key("auth.add_user"))
        .await
        .unwrap();
    scoped.add_member(g2.id, principal.id).await.unwrap();

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    let effective = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();
    assert_eq!(effective.len(), 3);
    for k in ["documents.add_note", "documents.add_tag", "auth.add_user"] {
        assert!(effective.contains(&key(k)), "missing {k}");
    }
}

#[tokio::test]
async fn deactivated_principal_loses_everything() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "erin").await;
    for k in PermissionCatalog::tenant_admin().iter() {
        store.grant(principal.id, k.clone()).await.unwrap();
    }
    store.set_active(principal.id, false).await.unwrap();

    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();
    for k in PermissionCatalog::tenant_admin().iter() {
        assert!(
            !resolver
                .has_permission(&mut scope, principal.id, k.as_str(), None)
                .await
                .unwrap(),
            "deactivated principal still holds {k}"
        );
    }
    assert!(resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn superuser_holds_every_key() {
    let store = Arc::new(MemoryAuthzStore::new());
    let root = store
        .create(CreatePrincipal {
            username: "root".to_owned(),
            active: true,
            superuser: true,
            staff: true,
        })
        .await
        .unwrap();

    let catalog = PermissionCatalog::tenant_admin();
    let resolver = full_resolver(store);
    let mut scope = ResolutionScope::new();

    assert!(resolver
        .has_permission(&mut scope, root.id, "documents.delete_workflow", None)
        .await
        .unwrap());
    // even keys outside the catalog, as long as they are well-formed
    assert!(resolver
        .has_permission(&mut scope, root.id, "admin.view_logentry", None)
        .await
        .unwrap());

    let effective = resolver
        .effective_permissions(&mut scope, root.id, None)
        .await
        .unwrap();
    assert_eq!(&effective, catalog.keys());
}

struct FailingSource;

#[async_trait]
impl GrantSource for FailingSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ScopedGroups
    }

    async fn grants_of(
        &self,
        _principal: &Principal,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        Err(AuthzError::StoreUnavailable(
            "scoped group lookup failed".to_owned(),
        ))
    }
}

#[tokio::test]
async fn store_fault_propagates_instead_of_denying() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "frank").await;
    store
        .grant(principal.id, key("documents.add_document"))
        .await
        .unwrap();

    let resolver = Resolver::new(
        store.clone(),
        vec![
            Arc::new(DirectGrantSource::new(store.clone())),
            Arc::new(FailingSource),
        ],
        PermissionCatalog::tenant_admin(),
    );

    let mut scope = ResolutionScope::new();
    let err = resolver
        .has_permission(&mut scope, principal.id, "documents.add_document", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::StoreUnavailable(_)));

    let err = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::StoreUnavailable(_)));

    // nothing may be cached after a fault
    assert_eq!(scope.cached_principals(), 0);
}

#[tokio::test]
async fn active_superuser_short_circuits_before_store_access() {
    // both short-circuits must hold even when every source errors
    let store = Arc::new(MemoryAuthzStore::new());
    let root = store
        .create(CreatePrincipal {
            username: "root".to_owned(),
            active: true,
            superuser: true,
            staff: true,
        })
        .await
        .unwrap();
    let inactive = store
        .create(CreatePrincipal {
            username: "gone".to_owned(),
            active: false,
            superuser: false,
            staff: false,
        })
        .await
        .unwrap();

    let resolver = Resolver::new(
        store.clone(),
        vec![Arc::new(FailingSource)],
        PermissionCatalog::tenant_admin(),
    );

    let mut scope = ResolutionScope::new();
    assert!(resolver
        .has_permission(&mut scope, root.id, "documents.add_document", None)
        .await
        .unwrap());
    assert!(!resolver
        .has_permission(&mut scope, inactive.id, "documents.add_document", None)
        .await
        .unwrap());
}

struct CountingSource {
    inner: Arc<MemoryAuthzStore>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GrantSource for CountingSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Direct
    }

    async fn grants_of(
        &self,
        principal: &Principal,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DirectGrantRepository::grants_of(&*self.inner, principal.id).await
    }
}

#[tokio::test]
async fn repeated_queries_in_one_scope_hit_the_store_once() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "grace").await;
    store
        .grant(principal.id, key("documents.view_document"))
        .await
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = Resolver::new(
        store.clone(),
        vec![Arc::new(CountingSource {
            inner: store.clone(),
            calls: calls.clone(),
        })],
        PermissionCatalog::tenant_admin(),
    );

    let mut scope = ResolutionScope::new();
    let first = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();
    let second = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();
    resolver
        .has_permission(&mut scope, principal.id, "documents.view_document", None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // a fresh scope re-queries
    let mut fresh = ResolutionScope::new();
    resolver
        .effective_permissions(&mut fresh, principal.id, None)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn grants_are_monotonic_across_sources() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "heidi").await;
    let resolver = full_resolver(store.clone());

    let mut scope = ResolutionScope::new();
    let before = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();

    store
        .grant(principal.id, key("documents.add_document"))
        .await
        .unwrap();
    let standard: &dyn StandardGroupRepository = &*store;
    let g = standard.get_or_create("Viewers").await.unwrap();
    standard
        .grant_to_group(g.id, key("documents.view_document"))
        .await
        .unwrap();
    standard.add_member(g.id, principal.id).await.unwrap();

    let mut scope = ResolutionScope::new();
    let after = resolver
        .effective_permissions(&mut scope, principal.id, None)
        .await
        .unwrap();

    assert!(after.is_superset(&before));
    assert_eq!(after.len(), before.len() + 2);
}

#[tokio::test]
async fn revoking_sole_source_removes_the_key() {
    let store = Arc::new(MemoryAuthzStore::new());
    let principal = seed_principal(&store, "ivan").await;
    let k = key("documents.delete_document");
    store.grant(principal.id, k.clone()).await.unwrap();

    let resolver = full_resolver(store.clone());
    let mut scope = ResolutionScope::new();
    assert!(resolver
        .has_permission(&mut scope, principal.id, k.as_str(), None)
        .await
        .unwrap());

    store.revoke(principal.id, &k).await.unwrap();

    // fresh scope observes the revocation
    let mut fresh = ResolutionScope::new();
    assert!(!resolver
        .has_permission(&mut fresh, principal.id, k.as_str(), None)
        .await
        .unwrap());
}
