//! Navigation menu visibility.
//!
//! Links are gated by their own expression. Groups are shown only when at
//! least one descendant link is visible and, if the group carries both an
//! action and a subject, the group's own expression passes as well.

use serde::{Deserialize, Serialize};

use crate::ability::Can;
use crate::expr::evaluate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// `Some(false)` marks a public item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavItem>>,
}

impl NavItem {
    pub fn link(title: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        NavItem {
            title: title.into(),
            path: Some(path.into()),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn group(title: impl Into<String>, children: Vec<NavItem>) -> Self {
        NavItem { title: title.into(), children: Some(children), ..Default::default() }
    }

    fn is_public(&self) -> bool {
        self.auth == Some(false)
    }

    fn check(&self, ability: Option<&dyn Can>) -> bool {
        ability.is_some() && evaluate(self.action.as_deref(), ability, self.subject.as_deref())
    }
}

pub fn can_view_link(link: &NavItem, ability: Option<&dyn Can>) -> bool {
    link.is_public() || link.check(ability)
}

/// Nested children are followed regardless of their own action or `auth`
fn any_visible_child(items: &[NavItem], ability: Option<&dyn Can>) -> bool {
    items.iter().any(|i| match &i.children {
        Some(children) => any_visible_child(children, ability),
        None => i.check(ability),
    })
}

pub fn can_view_group(group: &NavItem, ability: Option<&dyn Can>) -> bool {
    if group.is_public() {
        return true;
    }
    let visible_child = group.children.as_deref().is_some_and(|c| any_visible_child(c, ability));
    let set = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.is_empty());
    if !(set(&group.action) && set(&group.subject)) {
        return visible_child;
    }
    group.check(ability) && visible_child
}

/// Copy of `items` with every hidden link and group removed
pub fn visible_items(items: &[NavItem], ability: Option<&dyn Can>) -> Vec<NavItem> {
    items
        .iter()
        .filter_map(|item| match &item.children {
            Some(children) => can_view_group(item, ability).then(|| NavItem {
                children: Some(visible_items(children, ability)),
                ..item.clone()
            }),
            None => can_view_link(item, ability).then(|| item.clone()),
        })
        .collect()
}
