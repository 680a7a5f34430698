//! Group types: the two organizational grouping mechanisms for grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conventional named permission bundle with membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardGroup {
    /// Unique identifier.
    pub id: i64,
    /// Group name, unique across the installation.
    pub name: String,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
    /// When the group was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A permission bundle partitioned by tenant scope.
///
/// Scoped groups carry a tenant identifier so administrative roles can be
/// provisioned per tenant. Group names are unique within a scope, not
/// globally — every tenant gets its own `"Tenant Admin"` group. Cross-scope
/// row isolation is enforced by the host's data layer, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedGroup {
    /// Unique identifier.
    pub id: i64,
    /// The tenant this group belongs to.
    pub scope_id: Uuid,
    /// Group name, unique within the scope.
    pub name: String,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
    /// When the group was last updated.
    pub updated_at: DateTime<Utc>,
}
