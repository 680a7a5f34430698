use chrono::Utc;
use uuid::Uuid;

use crate::catalog::PermissionCatalog;
use crate::events::{dispatch, AuthzEvent};
use crate::repository::{PrincipalRepository, ScopedGroupRepository};
use crate::AuthzError;

use super::provision_admin::TENANT_ADMIN_GROUP;

/// Input for an admin grant sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncAdminGrantsInput {
    /// Report what is missing without granting anything.
    pub report_only: bool,
}

/// Per-admin summary from a sync run.
#[derive(Debug, Clone)]
pub struct AdminGrantReport {
    pub principal_id: i64,
    pub username: String,
    /// Scope of the admin group inspected, if the admin belongs to one.
    pub scope_id: Option<Uuid>,
    /// Catalog keys the group already held.
    pub held: usize,
    /// Catalog keys the group was missing when the run started.
    pub missing: usize,
}

/// Result of an admin grant sync run.
#[derive(Debug)]
pub struct SyncAdminGrantsOutput {
    pub admins: Vec<AdminGrantReport>,
    /// Total keys granted across all groups. Zero in report-only mode.
    pub granted: usize,
}

/// Repairs tenant admin grants across the whole installation.
///
/// For every tenant admin principal, ensures the admin group of their scope
/// holds the complete admin catalog. Run this after a release that extends
/// the catalog, or to heal drift. Grants live on the group only — the group
/// is the single source of truth, and this action never duplicates keys
/// into direct grants.
///
/// Idempotent; a second run grants nothing and reports nothing missing.
pub struct SyncAdminGrantsAction<P, G>
where
    P: PrincipalRepository,
    G: ScopedGroupRepository,
{
    principals: P,
    scoped_groups: G,
    catalog: PermissionCatalog,
}

impl<P: PrincipalRepository, G: ScopedGroupRepository> SyncAdminGrantsAction<P, G> {
    pub fn new(principals: P, scoped_groups: G, catalog: PermissionCatalog) -> Self {
        Self {
            principals,
            scoped_groups,
            catalog,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sync_admin_grants", skip_all, err)
    )]
    pub async fn execute(
        &self,
        input: SyncAdminGrantsInput,
    ) -> Result<SyncAdminGrantsOutput, AuthzError> {
        let admins = self.principals.tenant_admins().await?;

        let mut reports = Vec::with_capacity(admins.len());
        let mut granted_total = 0;

        for admin in &admins {
            let admin_group = self
                .scoped_groups
                .groups_of_member(admin.id)
                .await?
                .into_iter()
                .find(|g| g.name == TENANT_ADMIN_GROUP);

            let Some(group) = admin_group else {
                log::warn!(
                    target: "warden",
                    "msg=\"tenant admin has no admin group\", principal_id={}, username=\"{}\"",
                    admin.id,
                    admin.username
                );
                reports.push(AdminGrantReport {
                    principal_id: admin.id,
                    username: admin.username.clone(),
                    scope_id: None,
                    held: 0,
                    missing: self.catalog.len(),
                });
                continue;
            };

            let held = self.scoped_groups.group_permissions(group.id).await?;
            let missing: Vec<_> = self
                .catalog
                .iter()
                .filter(|key| !held.contains(key))
                .cloned()
                .collect();

            reports.push(AdminGrantReport {
                principal_id: admin.id,
                username: admin.username.clone(),
                scope_id: Some(group.scope_id),
                held: held.len(),
                missing: missing.len(),
            });

            if input.report_only {
                continue;
            }

            for key in missing {
                if self
                    .scoped_groups
                    .grant_to_group(group.id, key.clone())
                    .await?
                {
                    granted_total += 1;
                    dispatch(AuthzEvent::GroupGrantAdded {
                        group_id: group.id,
                        key,
                        at: Utc::now(),
                    })
                    .await;
                }
            }
        }

        if !input.report_only {
            dispatch(AuthzEvent::GrantsSynced {
                admins: reports.len(),
                granted: granted_total,
                at: Utc::now(),
            })
            .await;
        }

        log::info!(
            target: "warden",
            "msg=\"admin grant sync finished\", admins={}, granted={}, report_only={}",
            reports.len(),
            granted_total,
            input.report_only
        );

        Ok(SyncAdminGrantsOutput {
            admins: reports,
            granted: granted_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ProvisionTenantAdminAction, ProvisionTenantAdminInput};
    use crate::key::PermissionKey;
    use crate::memory::MemoryAuthzStore;
    use std::sync::Arc;

    async fn provision(store: &Arc<MemoryAuthzStore>, subdomain: &str) -> i64 {
        let output = ProvisionTenantAdminAction::new(
            store.clone(),
            store.clone(),
            PermissionCatalog::tenant_admin(),
        )
        .execute(ProvisionTenantAdminInput {
            scope_id: Uuid::new_v4(),
            subdomain: subdomain.to_owned(),
        })
        .await
        .unwrap();
        output.group.id
    }

    fn sync(
        store: &Arc<MemoryAuthzStore>,
    ) -> SyncAdminGrantsAction<Arc<MemoryAuthzStore>, Arc<MemoryAuthzStore>> {
        SyncAdminGrantsAction::new(
            store.clone(),
            store.clone(),
            PermissionCatalog::tenant_admin(),
        )
    }

    #[tokio::test]
    async fn test_sync_is_noop_when_healthy() {
        let store = Arc::new(MemoryAuthzStore::new());
        provision(&store, "acme").await;
        provision(&store, "globex").await;

        let output = sync(&store)
            .execute(SyncAdminGrantsInput::default())
            .await
            .unwrap();

        assert_eq!(output.admins.len(), 2);
        assert_eq!(output.granted, 0);
        assert!(output.admins.iter().all(|r| r.missing == 0 && r.held == 60));
    }

    #[tokio::test]
    async fn test_sync_repairs_drift() {
        let store = Arc::new(MemoryAuthzStore::new());
        let group_id = provision(&store, "acme").await;

        let scoped: &dyn ScopedGroupRepository = &*store;
        for raw in ["auth.add_user", "documents.delete_document"] {
            let key = PermissionKey::parse(raw).unwrap();
            scoped.revoke_from_group(group_id, &key).await.unwrap();
        }

        let output = sync(&store)
            .execute(SyncAdminGrantsInput::default())
            .await
            .unwrap();
        assert_eq!(output.granted, 2);
        assert_eq!(output.admins[0].missing, 2);
        assert_eq!(output.admins[0].held, 58);

        let perms = scoped.group_permissions(group_id).await.unwrap();
        assert_eq!(perms.len(), 60);
    }

    #[tokio::test]
    async fn test_report_only_does_not_mutate() {
        let store = Arc::new(MemoryAuthzStore::new());
        let group_id = provision(&store, "acme").await;

        let scoped: &dyn ScopedGroupRepository = &*store;
        let key = PermissionKey::parse("auth.add_user").unwrap();
        scoped.revoke_from_group(group_id, &key).await.unwrap();

        let output = sync(&store)
            .execute(SyncAdminGrantsInput { report_only: true })
            .await
            .unwrap();
        assert_eq!(output.granted, 0);
        assert_eq!(output.admins[0].missing, 1);

        // still missing afterwards
        let perms = scoped.group_permissions(group_id).await.unwrap();
        assert_eq!(perms.len(), 59);
    }

    #[tokio::test]
    async fn test_admin_without_group_is_reported() {
        let store = Arc::new(MemoryAuthzStore::new());
        store
            .create(crate::repository::CreatePrincipal {
                username: "orphan-admin".to_owned(),
                active: true,
                superuser: false,
                staff: true,
            })
            .await
            .unwrap();

        let output = sync(&store)
            .execute(SyncAdminGrantsInput::default())
            .await
            .unwrap();
        assert_eq!(output.admins.len(), 1);
        assert!(output.admins[0].scope_id.is_none());
        assert_eq!(output.admins[0].missing, 60);
        assert_eq!(output.granted, 0);
    }
}
