//! The catalog of permission keys known to the installation.

use std::collections::BTreeSet;

use crate::key::PermissionKey;

/// CRUD actions the host framework derives for every managed resource type.
pub const CRUD_ACTIONS: [&str; 4] = ["add", "change", "delete", "view"];

// Resource types a tenant admin manages, as (domain, type) pairs.
// 15 types x 4 actions = 60 admin permission keys.
const TENANT_ADMIN_RESOURCES: [(&str, &str); 15] = [
    ("documents", "correspondent"),
    ("documents", "tag"),
    ("documents", "documenttype"),
    ("documents", "document"),
    ("documents", "storagepath"),
    ("documents", "savedview"),
    ("documents", "note"),
    ("documents", "sharelink"),
    ("documents", "customfield"),
    ("documents", "customfieldinstance"),
    ("documents", "tenantgroup"),
    ("documents", "workflow"),
    ("documents", "workflowtrigger"),
    ("documents", "workflowaction"),
    ("auth", "user"),
];

/// The fixed set of permission keys the application defines.
///
/// The catalog serves two purposes: it is the "all permissions" set granted
/// to superusers, and it is the grant list used when provisioning tenant
/// admin groups. Keys are kept sorted so enumeration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCatalog {
    keys: BTreeSet<PermissionKey>,
}

impl PermissionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    /// Build a catalog from an iterator of keys.
    pub fn from_keys(keys: impl IntoIterator<Item = PermissionKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// The built-in tenant admin catalog: full CRUD over every managed
    /// resource type plus user administration. 60 keys.
    pub fn tenant_admin() -> Self {
        let mut keys = BTreeSet::new();
        for (domain, resource) in TENANT_ADMIN_RESOURCES {
            for action in CRUD_ACTIONS {
                keys.insert(PermissionKey::new_unchecked(format!(
                    "{domain}.{action}_{resource}"
                )));
            }
        }
        Self { keys }
    }

    /// Add a key to the catalog. Returns false if it was already present.
    pub fn insert(&mut self, key: PermissionKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionKey> {
        self.keys.iter()
    }

    /// The full key set, sorted.
    pub fn keys(&self) -> &BTreeSet<PermissionKey> {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_admin_catalog_size() {
        let catalog = PermissionCatalog::tenant_admin();
        assert_eq!(catalog.len(), 60);
    }

    #[test]
    fn test_tenant_admin_catalog_contents() {
        let catalog = PermissionCatalog::tenant_admin();
        for key in [
            "documents.add_document",
            "documents.view_workflow",
            "documents.delete_tenantgroup",
            "auth.add_user",
            "auth.change_user",
        ] {
            let key = PermissionKey::parse(key).unwrap();
            assert!(catalog.contains(&key), "missing {key}");
        }

        let unrelated = PermissionKey::parse("admin.view_logentry").unwrap();
        assert!(!catalog.contains(&unrelated));
    }

    #[test]
    fn test_catalog_keys_are_well_formed() {
        // new_unchecked must only ever see strings parse() would accept
        for key in PermissionCatalog::tenant_admin().iter() {
            assert!(PermissionKey::parse(key.as_str()).is_ok(), "bad key {key}");
        }
    }

    #[test]
    fn test_iteration_is_sorted() {
        let catalog = PermissionCatalog::tenant_admin();
        let keys: Vec<_> = catalog.iter().map(PermissionKey::as_str).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut catalog = PermissionCatalog::new();
        let key = PermissionKey::parse("documents.add_tag").unwrap();
        assert!(catalog.insert(key.clone()));
        assert!(!catalog.insert(key));
        assert_eq!(catalog.len(), 1);
    }
}
