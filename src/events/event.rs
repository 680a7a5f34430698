use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::key::PermissionKey;

/// Audit events emitted by provisioning actions.
#[derive(Debug, Clone)]
pub enum AuthzEvent {
    /// A tenant admin account was created.
    AdminProvisioned {
        scope_id: Uuid,
        principal_id: i64,
        username: String,
        at: DateTime<Utc>,
    },
    /// A permission key was added to a scoped group.
    GroupGrantAdded {
        group_id: i64,
        key: PermissionKey,
        at: DateTime<Utc>,
    },
    /// A principal was added to a scoped group.
    MembershipAdded {
        group_id: i64,
        principal_id: i64,
        at: DateTime<Utc>,
    },
    /// A repair pass over tenant admin grants finished.
    GrantsSynced {
        admins: usize,
        granted: usize,
        at: DateTime<Utc>,
    },
}

impl AuthzEvent {
    /// Dot-separated event name for logging and tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdminProvisioned { .. } => "tenant.admin.provisioned",
            Self::GroupGrantAdded { .. } => "authz.group.grant_added",
            Self::MembershipAdded { .. } => "authz.group.member_added",
            Self::GrantsSynced { .. } => "tenant.admin.grants_synced",
        }
    }

    /// When the event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::AdminProvisioned { at, .. }
            | Self::GroupGrantAdded { at, .. }
            | Self::MembershipAdded { at, .. }
            | Self::GrantsSynced { at, .. } => *at,
        }
    }
}
