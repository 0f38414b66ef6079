//! Access modes, required mode sets and granted permission sets.

use crate::{CairnError, CairnResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// An access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// View a resource.
    Read,
    /// Add to a resource without removing anything.
    Append,
    /// Bring a new resource into existence.
    Create,
    /// Change or replace a resource.
    Write,
    /// Remove a resource.
    Delete,
    /// Change access rules.
    Control,
}

impl AccessMode {
    /// Returns all modes in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Read,
            Self::Append,
            Self::Create,
            Self::Write,
            Self::Delete,
            Self::Control,
        ]
    }

    /// Returns the lowercase mode name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Append => "append",
            Self::Create => "create",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Control => "control",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccessMode {
    type Err = CairnError;

    fn from_str(s: &str) -> CairnResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CairnError::validation(format!("unknown access mode '{s}'")))
    }
}

/// The modes an operation requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeSet(BTreeSet<AccessMode>);

impl ModeSet {
    /// The empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mode.
    pub fn insert(&mut self, mode: AccessMode) -> bool {
        self.0.insert(mode)
    }

    /// Returns `true` if `mode` is required.
    #[must_use]
    pub fn contains(&self, mode: AccessMode) -> bool {
        self.0.contains(&mode)
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = AccessMode> + '_ {
        self.0.iter().copied()
    }

    /// Number of modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AccessMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = AccessMode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[AccessMode; N]> for ModeSet {
    fn from(modes: [AccessMode; N]) -> Self {
        modes.into_iter().collect()
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, mode) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{mode}")?;
        }
        f.write_str("}")
    }
}

/// Granted or denied status per mode, plus attribute-level restrictions, for
/// one set of credentials on one target.
///
/// Modes that were never set are denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    modes: BTreeMap<AccessMode, bool>,
    /// Attributes stripped from representations returned to this caller.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hidden_attributes: BTreeSet<String>,
    /// Attributes this caller may not set.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub read_only_attributes: BTreeSet<String>,
}

impl PermissionSet {
    /// Everything denied.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Every mode granted.
    #[must_use]
    pub fn grant_all() -> Self {
        Self::granting(AccessMode::all().iter().copied())
    }

    /// Grants exactly `modes`.
    #[must_use]
    pub fn granting(modes: impl IntoIterator<Item = AccessMode>) -> Self {
        let mut set = Self::default();
        for mode in modes {
            set.set(mode, true);
        }
        set
    }

    /// Sets the status of `mode`.
    pub fn set(&mut self, mode: AccessMode, granted: bool) -> &mut Self {
        self.modes.insert(mode, granted);
        self
    }

    /// Returns `true` if `mode` is granted.
    #[must_use]
    pub fn is_granted(&self, mode: AccessMode) -> bool {
        self.modes.get(&mode).copied().unwrap_or(false)
    }

    /// Returns the granted modes.
    #[must_use]
    pub fn granted(&self) -> ModeSet {
        self.modes
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(mode, _)| *mode)
            .collect()
    }

    /// Returns the first mode in `required` that is not granted.
    #[must_use]
    pub fn first_missing(&self, required: &ModeSet) -> Option<AccessMode> {
        required.iter().find(|mode| !self.is_granted(*mode))
    }

    /// Merges `other` in: a mode granted by either is granted, attribute
    /// restrictions accumulate.
    pub fn merge(&mut self, other: &Self) {
        for (mode, granted) in &other.modes {
            let entry = self.modes.entry(*mode).or_insert(false);
            *entry |= *granted;
        }
        self.hidden_attributes
            .extend(other.hidden_attributes.iter().cloned());
        self.read_only_attributes
            .extend(other.read_only_attributes.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("Read".parse::<AccessMode>().unwrap(), AccessMode::Read);
        assert_eq!("delete".parse::<AccessMode>().unwrap(), AccessMode::Delete);
        assert!("admin".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_mode_set_display_is_ordered() {
        let modes = ModeSet::from([AccessMode::Write, AccessMode::Read]);
        assert_eq!(modes.to_string(), "{read,write}");
    }

    #[test]
    fn test_unset_modes_are_denied() {
        let permissions = PermissionSet::granting([AccessMode::Read]);
        assert!(permissions.is_granted(AccessMode::Read));
        assert!(!permissions.is_granted(AccessMode::Write));

        let required = ModeSet::from([AccessMode::Read, AccessMode::Write]);
        assert_eq!(permissions.first_missing(&required), Some(AccessMode::Write));
    }

    #[test]
    fn test_merge_is_union() {
        let mut a = PermissionSet::granting([AccessMode::Read]);
        let mut b = PermissionSet::granting([AccessMode::Write]);
        b.set(AccessMode::Read, false);
        b.hidden_attributes.insert("secret".into());
        a.merge(&b);

        assert!(a.is_granted(AccessMode::Read));
        assert!(a.is_granted(AccessMode::Write));
        assert!(a.hidden_attributes.contains("secret"));
    }

    #[test]
    fn test_grant_all_covers_every_mode() {
        let permissions = PermissionSet::grant_all();
        let everything: ModeSet = AccessMode::all().iter().copied().collect();
        assert!(permissions.first_missing(&everything).is_none());
    }
}
