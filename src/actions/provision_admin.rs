use chrono::Utc;
use uuid::Uuid;

use crate::catalog::PermissionCatalog;
use crate::credentials::{generate_password, DEFAULT_PASSWORD_LENGTH};
use crate::events::{dispatch, AuthzEvent};
use crate::groups::ScopedGroup;
use crate::principal::Principal;
use crate::repository::{CreatePrincipal, PrincipalRepository, ScopedGroupRepository};
use crate::secret::SecretString;
use crate::AuthzError;

/// Name of the per-tenant admin group.
pub const TENANT_ADMIN_GROUP: &str = "Tenant Admin";

/// Suffix appended to the tenant subdomain to form the admin username.
pub const ADMIN_USERNAME_SUFFIX: &str = "-admin";

/// Configuration for tenant admin provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Length of the generated one-time password. Default: 16.
    pub password_length: usize,
    /// Name of the admin group created per scope. Default: `"Tenant Admin"`.
    pub group_name: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            password_length: DEFAULT_PASSWORD_LENGTH,
            group_name: TENANT_ADMIN_GROUP.to_owned(),
        }
    }
}

/// Input for provisioning a tenant admin.
#[derive(Debug, Clone)]
pub struct ProvisionTenantAdminInput {
    /// The tenant being provisioned.
    pub scope_id: Uuid,
    /// Tenant subdomain; the admin username becomes `"{subdomain}-admin"`.
    pub subdomain: String,
}

/// Result of a provisioning run.
#[derive(Debug)]
pub struct ProvisionTenantAdminOutput {
    /// The admin principal (created, or found if it already existed).
    pub principal: Principal,
    /// The scope's admin group.
    pub group: ScopedGroup,
    /// One-time password for a newly created principal. `None` when the
    /// principal already existed; existing credentials are never reset.
    pub password: Option<SecretString>,
    /// Whether the principal was created by this run.
    pub created: bool,
    /// How many catalog keys were newly granted to the group.
    pub granted: usize,
}

/// Provisions the admin account and admin group for a tenant.
///
/// This is the workflow that runs when a tenant is created:
/// 1. create the `"{subdomain}-admin"` principal (staff, not superuser)
///    with a generated one-time password;
/// 2. get-or-create the scope's `"Tenant Admin"` group and grant it the full
///    admin catalog;
/// 3. add the principal to the group.
///
/// Every step is idempotent, so re-running for an existing tenant repairs
/// missing grants and membership without duplicating anything or touching
/// credentials.
pub struct ProvisionTenantAdminAction<P, G>
where
    P: PrincipalRepository,
    G: ScopedGroupRepository,
{
    principals: P,
    scoped_groups: G,
    catalog: PermissionCatalog,
    config: ProvisionConfig,
}

impl<P: PrincipalRepository, G: ScopedGroupRepository> ProvisionTenantAdminAction<P, G> {
    /// Creates the action with default configuration. `catalog` is the grant
    /// list for the admin group, usually [`PermissionCatalog::tenant_admin`].
    pub fn new(principals: P, scoped_groups: G, catalog: PermissionCatalog) -> Self {
        Self {
            principals,
            scoped_groups,
            catalog,
            config: ProvisionConfig::default(),
        }
    }

    /// Creates the action with custom configuration.
    pub fn with_config(
        principals: P,
        scoped_groups: G,
        catalog: PermissionCatalog,
        config: ProvisionConfig,
    ) -> Self {
        Self {
            principals,
            scoped_groups,
            catalog,
            config,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "provision_tenant_admin", skip_all, err)
    )]
    pub async fn execute(
        &self,
        input: ProvisionTenantAdminInput,
    ) -> Result<ProvisionTenantAdminOutput, AuthzError> {
        if input.subdomain.is_empty() {
            return Err(AuthzError::Internal("subdomain must not be empty".into()));
        }
        let username = format!("{}{}", input.subdomain, ADMIN_USERNAME_SUFFIX);

        let (principal, password, created) =
            match self.principals.find_by_username(&username).await? {
                Some(existing) => (existing, None, false),
                None => {
                    let principal = self
                        .principals
                        .create(CreatePrincipal {
                            username: username.clone(),
                            active: true,
                            superuser: false,
                            staff: true,
                        })
                        .await?;
                    let password = generate_password(self.config.password_length);
                    (principal, Some(password), true)
                }
            };

        let group = self
            .scoped_groups
            .get_or_create(input.scope_id, &self.config.group_name)
            .await?;

        let mut granted = 0;
        for key in self.catalog.iter() {
            if self
                .scoped_groups
                .grant_to_group(group.id, key.clone())
                .await?
            {
                granted += 1;
                dispatch(AuthzEvent::GroupGrantAdded {
                    group_id: group.id,
                    key: key.clone(),
                    at: Utc::now(),
                })
                .await;
            }
        }

        let member_added = self
            .scoped_groups
            .add_member(group.id, principal.id)
            .await?;

        if created {
            dispatch(AuthzEvent::AdminProvisioned {
                scope_id: input.scope_id,
                principal_id: principal.id,
                username: principal.username.clone(),
                at: Utc::now(),
            })
            .await;
        }
        if member_added {
            dispatch(AuthzEvent::MembershipAdded {
                group_id: group.id,
                principal_id: principal.id,
                at: Utc::now(),
            })
            .await;
        }

        log::info!(
            target: "warden",
            "msg=\"tenant admin provisioned\", scope_id={}, principal_id={}, username=\"{}\", created={}, granted={}",
            input.scope_id,
            principal.id,
            principal.username,
            created,
            granted
        );

        Ok(ProvisionTenantAdminOutput {
            principal,
            group,
            password,
            created,
            granted,
        })
    }
}
