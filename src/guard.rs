//! Route guard: decides what a page request renders.

use crate::ability::{Ability, Can};
use crate::config::{AclContext, Session};
use crate::error::Result;
use crate::expr::AclObject;

/// Pages reachable regardless of permissions
pub const ERROR_ROUTES: &[&str] = &["/404", "/500"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRequest {
    pub route: String,
    /// Page is meant for signed-out visitors (login, register)
    pub guest_guard: bool,
    pub auth_guard: bool,
    pub acl: AclObject,
}

impl GuardRequest {
    pub fn new(route: impl Into<String>) -> Self {
        GuardRequest { route: route.into(), guest_guard: false, auth_guard: true, acl: AclObject::default() }
    }

    pub fn guest(mut self) -> Self {
        self.guest_guard = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.auth_guard = false;
        self
    }

    pub fn acl(mut self, acl: AclObject) -> Self {
        self.acl = acl;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the page, providing the ability when there is a session
    Render { ability: Option<Ability> },
    /// Signed in with a role at `/`: go to the home route
    Redirect(String),
    /// Signed in at `/` but no redirect applies yet (no role, or a guest page)
    Pending,
    NotAuthorized,
}

/// Decide a page request. `session` is `None` for anonymous visitors.
///
/// A session whose permission value cannot be parsed is an error, not a denial.
pub fn decide(ctx: &AclContext, req: &GuardRequest, session: Option<&Session>) -> Result<GuardDecision> {
    let ability = match session {
        Some(s) => Some(ctx.ability_for(s, &req.acl.subject)?),
        None => None,
    };

    if let Some(s) = session {
        if req.route == "/" {
            return Ok(match s.role.as_deref() {
                Some(role) if !req.guest_guard => GuardDecision::Redirect(ctx.home_route(Some(role)).to_string()),
                _ => GuardDecision::Pending,
            });
        }
    }

    if req.guest_guard || ERROR_ROUTES.contains(&req.route.as_str()) || !req.auth_guard {
        return Ok(GuardDecision::Render { ability });
    }

    let allowed = ctx.evaluate(
        Some(req.acl.action.as_str()),
        ability.as_ref().map(|a| a as &dyn Can),
        Some(req.acl.subject.as_str()),
    );
    Ok(if allowed { GuardDecision::Render { ability } } else { GuardDecision::NotAuthorized })
}
