//! Flag registry: the fixed mapping from bit position to flag name.
//!
//! Bit `i` of a permission value always means flag `i` of the registry that
//! issued it. The mapping is append-only: a flag may be added at the end, but
//! never removed, renamed or moved, or every stored value silently changes
//! meaning. [`FlagRegistry::check_extends`] enforces this between versions and
//! [`FlagRegistry::fingerprint`] identifies a version.

use std::borrow::Cow;
use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::error::{AclError, Result};

/// Flags compiled into the application, in bit order. Append only.
pub const BUILTIN_FLAGS: &[&str] = &[
    "DASHBOARD_DATA_VIEW",     // 0
    "LEAD_VIEW",               // 1
    "LEAD_EDIT",               // 2
    "LEAD_DELETE",             // 3
    "LEAD_EXPORT",             // 4
    "PRODUCT_VIEW",            // 5
    "PRODUCT_EDIT",            // 6
    "SERVICE_VIEW",            // 7
    "SERVICE_EDIT",            // 8
    "CONTENT_VIEW",            // 9
    "CONTENT_UPLOAD",          // 10
    "CONTENT_DELETE",          // 11
    "CONTENT_TAG_EDIT",        // 12
    "TAXONOMY_VIEW",           // 13
    "TAXONOMY_EDIT",           // 14
    "VOCABULARY_VIEW",         // 15
    "VOCABULARY_EDIT",         // 16
    "USER_VIEW",               // 17
    "USER_MANAGE",             // 18
    "COMPANY_SETTINGS_EDIT",   // 19
];

/// Ordered, append-only set of flag names. Index = bit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRegistry {
    flags: Vec<Cow<'static, str>>,
    index: HashMap<Cow<'static, str>, usize>,
}

impl FlagRegistry {
    /// Registry of [`BUILTIN_FLAGS`]
    pub fn builtin() -> Self {
        // BUILTIN_FLAGS is validated by `builtin_flags_are_valid` below.
        let flags: Vec<Cow<'static, str>> = BUILTIN_FLAGS.iter().map(|n| Cow::Borrowed(*n)).collect();
        let index = flags.iter().enumerate().map(|(bit, n)| (n.clone(), bit)).collect();
        FlagRegistry { flags, index }
    }

    pub fn empty() -> Self {
        FlagRegistry { flags: Vec::new(), index: HashMap::new() }
    }

    /// Build from a compiled-in list without copying the names
    pub fn from_static(names: &'static [&'static str]) -> Result<Self> {
        let mut r = Self::empty();
        for n in names {
            r.push(Cow::Borrowed(n))?;
        }
        Ok(r)
    }

    /// Build from owned names, e.g. a config file
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut r = Self::empty();
        for n in names {
            r.push(Cow::Owned(n.into()))?;
        }
        Ok(r)
    }

    fn push(&mut self, name: Cow<'static, str>) -> Result<usize> {
        if !is_capability_name(&name) {
            return Err(AclError::InvalidFlagName(name.into_owned()));
        }
        if self.index.contains_key(&name) {
            return Err(AclError::DuplicateFlag(name.into_owned()));
        }
        let bit = self.flags.len();
        self.index.insert(name.clone(), bit);
        self.flags.push(name);
        Ok(bit)
    }

    /// Add a flag at the next free bit and return that bit
    pub fn append(&mut self, name: impl Into<String>) -> Result<usize> {
        self.push(Cow::Owned(name.into()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    #[inline]
    pub fn bit_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn name_at(&self, bit: usize) -> Option<&str> {
        self.flags.get(bit).map(|n| n.as_ref())
    }

    /// `(bit, name)` pairs in bit order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.flags.iter().enumerate().map(|(i, n)| (i, n.as_ref()))
    }

    /// Verify `self` only appends to `older`
    pub fn check_extends(&self, older: &FlagRegistry) -> Result<()> {
        for (bit, expected) in older.iter() {
            match self.name_at(bit) {
                Some(found) if found == expected => {}
                found => {
                    return Err(AclError::RegistryConflict {
                        bit,
                        expected: expected.to_string(),
                        found: found.map(str::to_string),
                    })
                }
            }
        }
        Ok(())
    }

    /// SHA-256 over the ordered names, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (bit, name) in self.iter() {
            hasher.update((bit as u64).to_be_bytes());
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl Default for FlagRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Capability names are identifiers: `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_capability_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Hex encode
mod hex {
    pub fn encode(data: impl AsRef<[u8]>) -> String {
        data.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
