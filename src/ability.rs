//! Ability objects: the granted-name set a UI checks against.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::permission::{decode, PermissionValue};
use crate::registry::FlagRegistry;

/// Action granted to every ability
pub const READ: &str = "read";

/// Answers "is capability `name` granted for `subject`?"
pub trait Can {
    fn can(&self, name: &str, subject: &str) -> bool;
}

/// Union of decoded flags, extra capabilities and `read`.
///
/// Grants are global: `subject` is accepted for compatibility with
/// subject-scoped rule engines but never narrows a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    granted: HashSet<String>,
    unrestricted: bool,
    subject: String,
}

impl Ability {
    pub fn builder(registry: &FlagRegistry) -> AbilityBuilder<'_> {
        AbilityBuilder::new(registry)
    }

    /// Grants every name. Only for callers that explicitly want to bypass checks.
    pub fn unrestricted() -> Self {
        Ability { granted: HashSet::new(), unrestricted: true, subject: "all".into() }
    }

    /// Subject the ability was built for (subject-type detection only)
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Granted names, sorted
    pub fn granted(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.granted.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}

impl Can for Ability {
    #[inline]
    fn can(&self, name: &str, _subject: &str) -> bool {
        self.unrestricted || self.granted.contains(name)
    }
}

impl<T: Can + ?Sized> Can for &T {
    fn can(&self, name: &str, subject: &str) -> bool {
        (**self).can(name, subject)
    }
}

/// Builds an [`Ability`] from a permission value and extra capability names
#[derive(Debug, Clone)]
pub struct AbilityBuilder<'r> {
    registry: &'r FlagRegistry,
    permissions: PermissionValue,
    extras: Vec<String>,
    subject: String,
}

impl<'r> AbilityBuilder<'r> {
    pub fn new(registry: &'r FlagRegistry) -> Self {
        AbilityBuilder {
            registry,
            permissions: PermissionValue::zero(),
            extras: Vec::new(),
            subject: "all".into(),
        }
    }

    pub fn permissions(mut self, value: PermissionValue) -> Self {
        self.permissions = value;
        self
    }

    /// Parse the profile's `permissionsValue`; absent means zero
    pub fn permissions_str(self, value: Option<&str>) -> Result<Self> {
        Ok(self.permissions(PermissionValue::from_profile(value)?))
    }

    pub fn extra(mut self, name: impl Into<String>) -> Self {
        self.extras.push(name.into());
        self
    }

    pub fn extras<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extras.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn build(self) -> Ability {
        let mut granted: HashSet<String> = decode(self.registry, &self.permissions).into_iter().collect();
        granted.extend(self.extras);
        granted.insert(READ.to_string());
        debug!(granted = granted.len(), subject = %self.subject, "built ability");
        Ability { granted, unrestricted: false, subject: self.subject }
    }
}

/// One-shot build from profile fields
pub fn build_ability_for<I, S>(
    registry: &FlagRegistry,
    permissions_value: Option<&str>,
    extras: I,
    subject: &str,
) -> Result<Ability>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(AbilityBuilder::new(registry)
        .permissions_str(permissions_value)?
        .extras(extras)
        .subject(subject)
        .build())
}
