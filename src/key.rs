//! Permission key parsing and validation.
//!
//! Permission keys are stable strings of the form
//! `"<resource-domain>.<action>_<resource-type>"`, e.g.
//! `"documents.add_document"` or `"auth.change_user"`. The full catalog of
//! keys is fixed by the host application's resource model; a key is never
//! reused for a different capability.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::AuthzError;

const MAX_KEY_LENGTH: usize = 100;

static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*\.[a-z][a-z0-9]*_[a-z0-9_]+$").unwrap());

/// A validated permission key.
///
/// Construction goes through [`PermissionKey::parse`], so a value of this
/// type is always well-formed. Malformed input is rejected at the call
/// boundary with [`AuthzError::MalformedKey`] rather than silently treated
/// as "not granted" — a bad key is a caller bug, not a denial.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionKey(String);

impl PermissionKey {
    /// Parse and validate a key string.
    pub fn parse(key: &str) -> Result<Self, AuthzError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH || !KEY_REGEX.is_match(key) {
            return Err(AuthzError::MalformedKey(key.to_owned()));
        }
        Ok(Self(key.to_owned()))
    }

    /// Build a key from parts already known to be well-formed (catalog data).
    pub(crate) fn new_unchecked(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The resource domain, i.e. everything before the dot.
    pub fn domain(&self) -> &str {
        // format guarantees exactly one '.'
        self.0.split_once('.').map(|(d, _)| d).unwrap_or(&self.0)
    }

    /// The `<action>_<type>` codename, i.e. everything after the dot.
    pub fn codename(&self) -> &str {
        self.0.split_once('.').map(|(_, c)| c).unwrap_or("")
    }

    /// The action component of the codename (e.g. `"add"`).
    pub fn action(&self) -> &str {
        self.codename()
            .split_once('_')
            .map(|(a, _)| a)
            .unwrap_or("")
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PermissionKey {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PermissionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PermissionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PermissionKey::parse(&s).map_err(serde::de::Error::custom)
    }
}
