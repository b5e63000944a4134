//! Capgate - permission bitmasks and capability expressions for UI access control
//!
//! A user's permission value is a bitmask over an append-only [`FlagRegistry`].
//! It is decoded into flag names, combined with plan-derived capabilities and
//! the always-granted `read` into an [`Ability`], and UI elements are then
//! gated by expressions such as `"LEAD_EDIT|LEAD_VIEW"`.
//!
//! ```
//! use capgate::{evaluate, Ability, FlagRegistry};
//!
//! let registry = FlagRegistry::new(["CAN_READ", "CAN_WRITE", "CAN_DELETE"]).unwrap();
//! let ability = Ability::builder(&registry)
//!     .permissions_str(Some("5")).unwrap()
//!     .extra("COMPANY_SUBSCRIPTION_PREMIUM")
//!     .build();
//!
//! assert!(evaluate(Some("CAN_DELETE&!CAN_WRITE"), Some(&ability), None));
//! assert!(!evaluate(Some("CAN_WRITE"), Some(&ability), Some("Lead")));
//! ```

pub mod ability;
pub mod config;
pub mod error;
pub mod expr;
pub mod guard;
pub mod nav;
pub mod permission;
pub mod plan;
pub mod registry;

pub use ability::{build_ability_for, Ability, AbilityBuilder, Can, READ};
pub use config::{AclConfig, AclContext, Session};
pub use error::{AclError, Result};
pub use expr::{can_access, evaluate, try_evaluate, AclObject, Expression, DEFAULT_ACTION, DEFAULT_SUBJECT};
pub use guard::{decide, GuardDecision, GuardRequest};
pub use nav::{can_view_group, can_view_link, visible_items, NavItem};
pub use permission::{decode, decode_str, encode, CapabilitySet, PermissionValue};
pub use plan::plan_capabilities;
pub use registry::{FlagRegistry, BUILTIN_FLAGS};
