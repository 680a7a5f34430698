//! Principal identity as seen by the authorization layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An identity that may hold permissions.
///
/// Authentication (credentials, sessions) is the host's job; `warden` only
/// consumes the resolved identity and its flags. Principals are deactivated
/// on offboarding, never deleted, so grant history stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier.
    pub id: i64,
    /// Login name. Tenant admins follow the `"{subdomain}-admin"` pattern.
    pub username: String,
    /// Inactive principals have an empty effective permission set no matter
    /// what grants are on record.
    pub active: bool,
    /// Superusers hold every permission unconditionally.
    pub superuser: bool,
    /// Marks operational/admin accounts (tenant admins are staff).
    pub staff: bool,
    /// When the principal was provisioned.
    pub created_at: DateTime<Utc>,
    /// When the principal was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Whether this principal is a tenant admin account.
    ///
    /// Matches the provisioning convention: staff, not a global superuser,
    /// username ending in `-admin`.
    pub fn is_tenant_admin(&self) -> bool {
        self.staff && !self.superuser && self.username.ends_with("-admin")
    }
}

#[cfg(test)]
impl Principal {
    pub fn mock(id: i64) -> Self {
        let now = Utc::now();
        Principal {
            id,
            username: format!("user{id}"),
            active: true,
            superuser: false,
            staff: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mock_admin(id: i64, subdomain: &str) -> Self {
        Principal {
            username: format!("{subdomain}-admin"),
            staff: true,
            ..Principal::mock(id)
        }
    }
}
