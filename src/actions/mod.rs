//! Provisioning workflows, packaged as actions.
//!
//! Actions are generic over the repository traits they touch, so they run
//! against any store implementation.

mod provision_admin;
mod sync_grants;

pub use provision_admin::{
    ProvisionConfig, ProvisionTenantAdminAction, ProvisionTenantAdminInput,
    ProvisionTenantAdminOutput, ADMIN_USERNAME_SUFFIX, TENANT_ADMIN_GROUP,
};
pub use sync_grants::{
    AdminGrantReport, SyncAdminGrantsAction, SyncAdminGrantsInput, SyncAdminGrantsOutput,
};
