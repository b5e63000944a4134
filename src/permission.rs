//! Permission bitmask decoding.
//!
//! A [`PermissionValue`] is an arbitrary-precision non-negative integer; bit
//! `i` set means flag `i` of the [`FlagRegistry`] is granted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{Num, Zero};

use crate::error::{AclError, Result};
use crate::registry::FlagRegistry;

/// Permission bitmask as carried on a user profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionValue(BigUint);

impl PermissionValue {
    pub fn zero() -> Self {
        PermissionValue(BigUint::zero())
    }

    /// Parse the profile field, treating an absent value as `"0"`
    pub fn from_profile(value: Option<&str>) -> Result<Self> {
        value.unwrap_or("0").parse()
    }

    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        self.0.bit(index as u64)
    }

    pub fn with_bit(mut self, index: usize) -> Self {
        self.0.set_bit(index as u64, true);
        self
    }

    /// Encode a set of flag names; unknown names fail
    pub fn from_names<'a, I>(registry: &FlagRegistry, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().try_fold(Self::zero(), |v, n| {
            registry
                .bit_of(n)
                .map(|b| v.with_bit(b))
                .ok_or_else(|| AclError::UnknownFlag(n.to_string()))
        })
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for PermissionValue {
    fn from(v: u64) -> Self {
        PermissionValue(BigUint::from(v))
    }
}

impl From<u128> for PermissionValue {
    fn from(v: u128) -> Self {
        PermissionValue(BigUint::from(v))
    }
}

impl From<BigUint> for PermissionValue {
    fn from(v: BigUint) -> Self {
        PermissionValue(v)
    }
}

impl fmt::Display for PermissionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PermissionValue {
    type Err = AclError;

    /// Same coercion as big-integer construction from a string: surrounding
    /// whitespace is ignored, empty means zero, an optional `+` and a
    /// `0x`/`0o`/`0b` radix prefix are allowed. Negative values are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| AclError::InvalidPermissionValue {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let t = s.trim();
        if t.is_empty() {
            return Ok(Self::zero());
        }
        if t.starts_with('-') {
            return Err(invalid("negative values are not permitted"));
        }
        let t = t.strip_prefix('+').unwrap_or(t);
        let (radix, digits) = match t.get(..2) {
            Some("0x") | Some("0X") => (16, &t[2..]),
            Some("0o") | Some("0O") => (8, &t[2..]),
            Some("0b") | Some("0B") => (2, &t[2..]),
            _ => (10, t),
        };
        // from_str_radix tolerates '_' separators and a leading '+', neither
        // of which is valid here.
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid("not an integer"));
        }
        BigUint::from_str_radix(digits, radix)
            .map(PermissionValue)
            .map_err(|e| invalid(&e.to_string()))
    }
}

/// Flag names granted by a permission value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_superset(&self, other: &CapabilitySet) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl IntoIterator for CapabilitySet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        CapabilitySet(iter.into_iter().map(Into::into).collect())
    }
}

/// Names of the registry flags whose bit is set in `value`
pub fn decode(registry: &FlagRegistry, value: &PermissionValue) -> CapabilitySet {
    registry
        .iter()
        .filter(|(bit, _)| value.bit(*bit))
        .map(|(_, name)| name)
        .collect()
}

/// Parse and decode in one step
pub fn decode_str(registry: &FlagRegistry, value: &str) -> Result<CapabilitySet> {
    Ok(decode(registry, &value.parse()?))
}

/// Inverse of [`decode`]
pub fn encode(registry: &FlagRegistry, set: &CapabilitySet) -> Result<PermissionValue> {
    PermissionValue::from_names(registry, set.iter())
}
