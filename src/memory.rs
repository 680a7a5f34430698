//! In-memory grant store.
//!
//! Implements every repository trait over `RwLock`-guarded maps. This is the
//! reference store used by the test suites, and is good enough for
//! single-process embedding where grants live only as long as the process.

#![allow(clippy::significant_drop_tightening)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::groups::{ScopedGroup, StandardGroup};
use crate::key::PermissionKey;
use crate::principal::Principal;
use crate::repository::{
    CreatePrincipal, DirectGrantRepository, PrincipalRepository, ScopedGroupRepository,
    StandardGroupRepository,
};
use crate::AuthzError;

struct GroupRecords<G> {
    groups: HashMap<i64, G>,
    permissions: HashMap<i64, BTreeSet<PermissionKey>>,
    members: HashMap<i64, HashSet<i64>>,
}

impl<G> Default for GroupRecords<G> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
            permissions: HashMap::new(),
            members: HashMap::new(),
        }
    }
}

/// In-memory implementation of all four repository traits.
pub struct MemoryAuthzStore {
    principals: RwLock<HashMap<i64, Principal>>,
    direct: RwLock<HashMap<i64, BTreeSet<PermissionKey>>>,
    standard: RwLock<GroupRecords<StandardGroup>>,
    scoped: RwLock<GroupRecords<ScopedGroup>>,
    next_principal_id: AtomicI64,
    next_group_id: AtomicI64,
}

impl MemoryAuthzStore {
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(HashMap::new()),
            direct: RwLock::new(HashMap::new()),
            standard: RwLock::new(GroupRecords::default()),
            scoped: RwLock::new(GroupRecords::default()),
            next_principal_id: AtomicI64::new(1),
            next_group_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAuthzStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> AuthzError {
    AuthzError::Internal("lock poisoned".to_owned())
}

fn member_grants<G>(records: &GroupRecords<G>, principal_id: i64) -> BTreeSet<PermissionKey> {
    let mut union = BTreeSet::new();
    for (group_id, members) in &records.members {
        if members.contains(&principal_id) {
            if let Some(perms) = records.permissions.get(group_id) {
                union.extend(perms.iter().cloned());
            }
        }
    }
    union
}

#[async_trait]
impl PrincipalRepository for MemoryAuthzStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, AuthzError> {
        let principals = self.principals.read().map_err(|_| poisoned())?;
        Ok(principals.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, AuthzError> {
        let principals = self.principals.read().map_err(|_| poisoned())?;
        Ok(principals.values().find(|p| p.username == username).cloned())
    }

    async fn create(&self, data: CreatePrincipal) -> Result<Principal, AuthzError> {
        let mut principals = self.principals.write().map_err(|_| poisoned())?;
        if principals.values().any(|p| p.username == data.username) {
            return Err(AuthzError::Internal(format!(
                "username already taken: {}",
                data.username
            )));
        }

        let id = self.next_principal_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let principal = Principal {
            id,
            username: data.username,
            active: data.active,
            superuser: data.superuser,
            staff: data.staff,
            created_at: now,
            updated_at: now,
        };
        principals.insert(id, principal.clone());
        Ok(principal)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Principal, AuthzError> {
        let mut principals = self.principals.write().map_err(|_| poisoned())?;
        let principal = principals
            .get_mut(&id)
            .ok_or(AuthzError::UnknownPrincipal(id))?;
        principal.active = active;
        principal.updated_at = Utc::now();
        Ok(principal.clone())
    }

    async fn tenant_admins(&self) -> Result<Vec<Principal>, AuthzError> {
        let principals = self.principals.read().map_err(|_| poisoned())?;
        let mut admins: Vec<Principal> = principals
            .values()
            .filter(|p| p.is_tenant_admin())
            .cloned()
            .collect();
        admins.sort_by_key(|p| p.id);
        Ok(admins)
    }
}

#[async_trait]
impl DirectGrantRepository for MemoryAuthzStore {
    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        let direct = self.direct.read().map_err(|_| poisoned())?;
        Ok(direct.get(&principal_id).cloned().unwrap_or_default())
    }

    async fn grant(&self, principal_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        let mut direct = self.direct.write().map_err(|_| poisoned())?;
        Ok(direct.entry(principal_id).or_default().insert(key))
    }

    async fn revoke(&self, principal_id: i64, key: &PermissionKey) -> Result<bool, AuthzError> {
        let mut direct = self.direct.write().map_err(|_| poisoned())?;
        Ok(direct
            .get_mut(&principal_id)
            .is_some_and(|keys| keys.remove(key)))
    }
}

#[async_trait]
impl StandardGroupRepository for MemoryAuthzStore {
    async fn get_or_create(&self, name: &str) -> Result<StandardGroup, AuthzError> {
        let mut records = self.standard.write().map_err(|_| poisoned())?;
        if let Some(group) = records.groups.values().find(|g| g.name == name) {
            return Ok(group.clone());
        }

        let id = self.next_group_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let group = StandardGroup {
            id,
            name: name.to_owned(),
            created_at: now,
            updated_at: now,
        };
        records.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StandardGroup>, AuthzError> {
        let records = self.standard.read().map_err(|_| poisoned())?;
        Ok(records.groups.values().find(|g| g.name == name).cloned())
    }

    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        let mut records = self.standard.write().map_err(|_| poisoned())?;
        if !records.groups.contains_key(&group_id) {
            return Err(AuthzError::Internal(format!("no such group: {group_id}")));
        }
        Ok(records.permissions.entry(group_id).or_default().insert(key))
    }

    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError> {
        let mut records = self.standard.write().map_err(|_| poisoned())?;
        Ok(records
            .permissions
            .get_mut(&group_id)
            .is_some_and(|keys| keys.remove(key)))
    }

    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        let mut records = self.standard.write().map_err(|_| poisoned())?;
        if !records.groups.contains_key(&group_id) {
            return Err(AuthzError::Internal(format!("no such group: {group_id}")));
        }
        Ok(records
            .members
            .entry(group_id)
            .or_default()
            .insert(principal_id))
    }

    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        let mut records = self.standard.write().map_err(|_| poisoned())?;
        Ok(records
            .members
            .get_mut(&group_id)
            .is_some_and(|members| members.remove(&principal_id)))
    }

    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        let records = self.standard.read().map_err(|_| poisoned())?;
        Ok(member_grants(&records, principal_id))
    }
}

#[async_trait]
impl ScopedGroupRepository for MemoryAuthzStore {
    async fn get_or_create(&self, scope_id: Uuid, name: &str) -> Result<ScopedGroup, AuthzError> {
        let mut records = self.scoped.write().map_err(|_| poisoned())?;
        if let Some(group) = records
            .groups
            .values()
            .find(|g| g.scope_id == scope_id && g.name == name)
        {
            return Ok(group.clone());
        }

        let id = self.next_group_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let group = ScopedGroup {
            id,
            scope_id,
            name: name.to_owned(),
            created_at: now,
            updated_at: now,
        };
        records.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn find_by_scope_and_name(
        &self,
        scope_id: Uuid,
        name: &str,
    ) -> Result<Option<ScopedGroup>, AuthzError> {
        let records = self.scoped.read().map_err(|_| poisoned())?;
        Ok(records
            .groups
            .values()
            .find(|g| g.scope_id == scope_id && g.name == name)
            .cloned())
    }

    async fn group_permissions(
        &self,
        group_id: i64,
    ) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        let records = self.scoped.read().map_err(|_| poisoned())?;
        Ok(records
            .permissions
            .get(&group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn grant_to_group(&self, group_id: i64, key: PermissionKey) -> Result<bool, AuthzError> {
        let mut records = self.scoped.write().map_err(|_| poisoned())?;
        if !records.groups.contains_key(&group_id) {
            return Err(AuthzError::Internal(format!("no such group: {group_id}")));
        }
        Ok(records.permissions.entry(group_id).or_default().insert(key))
    }

    async fn revoke_from_group(
        &self,
        group_id: i64,
        key: &PermissionKey,
    ) -> Result<bool, AuthzError> {
        let mut records = self.scoped.write().map_err(|_| poisoned())?;
        Ok(records
            .permissions
            .get_mut(&group_id)
            .is_some_and(|keys| keys.remove(key)))
    }

    async fn add_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        let mut records = self.scoped.write().map_err(|_| poisoned())?;
        if !records.groups.contains_key(&group_id) {
            return Err(AuthzError::Internal(format!("no such group: {group_id}")));
        }
        Ok(records
            .members
            .entry(group_id)
            .or_default()
            .insert(principal_id))
    }

    async fn remove_member(&self, group_id: i64, principal_id: i64) -> Result<bool, AuthzError> {
        let mut records = self.scoped.write().map_err(|_| poisoned())?;
        Ok(records
            .members
            .get_mut(&group_id)
            .is_some_and(|members| members.remove(&principal_id)))
    }

    async fn groups_of_member(&self, principal_id: i64) -> Result<Vec<ScopedGroup>, AuthzError> {
        let records = self.scoped.read().map_err(|_| poisoned())?;
        let mut groups: Vec<ScopedGroup> = records
            .members
            .iter()
            .filter(|(_, members)| members.contains(&principal_id))
            .filter_map(|(group_id, _)| records.groups.get(group_id).cloned())
            .collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    async fn grants_of(&self, principal_id: i64) -> Result<BTreeSet<PermissionKey>, AuthzError> {
        let records = self.scoped.read().map_err(|_| poisoned())?;
        Ok(member_grants(&records, principal_id))
    }
}
