//! Configuration and the access-control context built from it.
//!
//! The context is constructed once at application entry and passed to
//! whatever needs it. There is no global instance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ability::{build_ability_for, Ability, Can};
use crate::error::{config_err, Result};
use crate::expr::{deny_on_error, Expression, DEFAULT_ACTION, DEFAULT_SUBJECT};
use crate::plan::{plan_capabilities_with_prefix, PLAN_PREFIX};
use crate::registry::FlagRegistry;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CAPGATE_CONFIG";

pub const DEFAULT_HOME_ROUTE: &str = "/dashboard/statistics";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Flag names in bit order; `None` uses the builtin registry
    pub flags: Option<Vec<String>>,
    pub plan_prefix: String,
    pub home_route: String,
    /// Let anonymous visitors through checks of the default action
    pub anonymous_read: bool,
    pub default_action: String,
    pub default_subject: String,
}

impl Default for AclConfig {
    fn default() -> Self {
        AclConfig {
            flags: None,
            plan_prefix: PLAN_PREFIX.into(),
            home_route: DEFAULT_HOME_ROUTE.into(),
            anonymous_read: false,
            default_action: DEFAULT_ACTION.into(),
            default_subject: DEFAULT_SUBJECT.into(),
        }
    }
}

impl AclConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(config_err)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(config_err)?;
        Self::from_json_str(&raw)
    }

    /// Load from `$CAPGATE_CONFIG` if set, defaults otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn registry(&self) -> Result<FlagRegistry> {
        match &self.flags {
            Some(names) => FlagRegistry::new(names.iter().cloned()),
            None => Ok(FlagRegistry::builtin()),
        }
    }
}

/// What the profile and company collaborators know about the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub role: Option<String>,
    pub permissions_value: Option<String>,
    /// Plan feature flags as delivered by the company endpoint
    pub plan: Value,
}

/// Registry plus policy, shared by every check in the application
#[derive(Debug, Clone)]
pub struct AclContext {
    config: AclConfig,
    registry: FlagRegistry,
}

impl AclContext {
    pub fn new(config: AclConfig) -> Result<Self> {
        let registry = config.registry()?;
        info!(flags = registry.len(), fingerprint = %registry.fingerprint(), "access control context ready");
        Ok(AclContext { config, registry })
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    /// Plan-derived capability names for `session`
    pub fn plan_capabilities(&self, session: &Session) -> Vec<String> {
        plan_capabilities_with_prefix(&session.plan, &self.config.plan_prefix)
    }

    pub fn ability_for(&self, session: &Session, subject: &str) -> Result<Ability> {
        build_ability_for(
            &self.registry,
            session.permissions_value.as_deref(),
            self.plan_capabilities(session),
            subject,
        )
    }

    /// Home route for a role (same for every role)
    pub fn home_route(&self, _role: Option<&str>) -> &str {
        &self.config.home_route
    }

    /// Like [`crate::evaluate`], using this context's defaults and
    /// anonymous-read policy
    pub fn evaluate(&self, expression: Option<&str>, ability: Option<&dyn Can>, subject: Option<&str>) -> bool {
        let expr = match Expression::parse_with_default(expression.unwrap_or(""), &self.config.default_action) {
            Ok(e) => e,
            Err(e) => return deny_on_error(Err(e)),
        };
        let subject = match subject {
            Some(s) if !s.is_empty() => s,
            _ => self.config.default_subject.as_str(),
        };
        match ability {
            Some(a) => expr.eval(a, subject),
            None => self.config.anonymous_read && self.is_default_action(expression),
        }
    }

    fn is_default_action(&self, expression: Option<&str>) -> bool {
        let e: String = expression.unwrap_or("").chars().filter(|c| !c.is_whitespace()).collect();
        e.is_empty() || e == self.config.default_action
    }
}
