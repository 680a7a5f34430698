//! Per-request resolution cache.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::key::PermissionKey;
use crate::principal::Principal;

/// Memoization scope for one resolution lifetime, typically one inbound
/// request.
///
/// Within a scope, a principal's effective permission set is computed at
/// most once per grant source; repeated checks hit the cache. The scope is
/// an explicit value owned by the request handler — it is deliberately not
/// `Clone` and not shareable across tasks, so cached sets cannot leak into
/// another request where grants may since have changed.
///
/// A scope only ever stores fully computed sets. If any source lookup
/// fails (or the caller's future is dropped mid-resolution), nothing is
/// cached, so a later call inside the same scope re-queries every source.
#[derive(Debug, Default)]
pub struct ResolutionScope {
    principals: HashMap<i64, Principal>,
    effective: HashMap<i64, Arc<BTreeSet<PermissionKey>>>,
}

impl ResolutionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn principal(&self, id: i64) -> Option<&Principal> {
        self.principals.get(&id)
    }

    pub(crate) fn remember_principal(&mut self, principal: Principal) {
        self.principals.insert(principal.id, principal);
    }

    pub(crate) fn effective(&self, principal_id: i64) -> Option<Arc<BTreeSet<PermissionKey>>> {
        self.effective.get(&principal_id).cloned()
    }

    pub(crate) fn store_effective(
        &mut self,
        principal_id: i64,
        keys: BTreeSet<PermissionKey>,
    ) -> Arc<BTreeSet<PermissionKey>> {
        match self.effective.entry(principal_id) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(Arc::new(keys)).clone(),
        }
    }

    /// Number of principals with a cached effective set.
    pub fn cached_principals(&self) -> usize {
        self.effective.len()
    }

    /// Drop all cached lookups, forcing the next resolution to re-query.
    pub fn clear(&mut self) {
        self.principals.clear();
        self.effective.clear();
    }
}
