//! Resolver configuration.
//!
//! Which grant sources participate, and in what order, is explicit
//! constructor configuration rather than ambient global state. Order does
//! not affect the union result; it only decides which lookups are issued
//! first when diagnosing store load.

/// The built-in grant sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Permissions assigned straight to the principal.
    Direct,
    /// Permissions inherited through standard groups.
    StandardGroups,
    /// Permissions inherited through tenant-scoped groups.
    ScopedGroups,
}

impl SourceKind {
    /// Stable name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::StandardGroups => "standard_groups",
            Self::ScopedGroups => "scoped_groups",
        }
    }
}

/// How the resolver treats queries that carry an object reference.
///
/// This crate implements no object-level logic itself; the object parameter
/// exists for interface compatibility with instance-level authorization
/// extensions in the host's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectPolicy {
    /// Ignore the object and answer as for a global check.
    #[default]
    Ignore,
    /// Contribute nothing to object-scoped queries (`false` / empty set),
    /// leaving them entirely to a separate instance-level system in the
    /// host's chain.
    Deny,
}

/// Configuration passed to the resolver's constructor.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Participating sources, in lookup order. Sources not listed are never
    /// consulted.
    pub sources: Vec<SourceKind>,
    /// Treatment of object-scoped queries.
    pub object_policy: ObjectPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceKind::Direct,
                SourceKind::StandardGroups,
                SourceKind::ScopedGroups,
            ],
            object_policy: ObjectPolicy::Ignore,
        }
    }
}

impl ResolverConfig {
    /// All three sources in the default order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict resolution to the given sources.
    pub fn with_sources(sources: Vec<SourceKind>) -> Self {
        Self {
            sources,
            object_policy: ObjectPolicy::default(),
        }
    }

    /// Contribute nothing to object-scoped queries.
    pub fn deny_object_queries(mut self) -> Self {
        self.object_policy = ObjectPolicy::Deny;
        self
    }
}
