//! Navigation visibility tests

use capgate::{can_view_group, can_view_link, visible_items, Ability, Can, FlagRegistry, NavItem};
use serde_json::json;

fn with(extras: &[&str]) -> Ability {
    Ability::builder(&FlagRegistry::empty()).extras(extras.iter().copied()).build()
}

fn menu() -> Vec<NavItem> {
    serde_json::from_value(json!([
        {
            "title": "Dashboard",
            "children": [
                { "title": "Statistics", "path": "/dashboard/statistics", "action": "DASHBOARD_DATA_VIEW" }
            ]
        },
        {
            "title": "Leads",
            "children": [
                { "title": "All leads", "path": "/leads", "action": "LEAD_VIEW|LEAD_EDIT" },
                { "title": "Export", "path": "/leads/export", "action": "LEAD_EXPORT&COMPANY_SUBSCRIPTION_EXPORT" }
            ]
        },
        { "title": "Help", "path": "/help", "auth": false },
        { "title": "Profile", "path": "/profile" }
    ]))
    .unwrap()
}

fn titles(items: &[NavItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|i| {
            let mut v = vec![i.title.clone()];
            if let Some(c) = &i.children {
                v.extend(titles(c));
            }
            v
        })
        .collect()
}

#[test]
fn links() {
    let link = NavItem::link("Leads", "/leads", "LEAD_VIEW");
    assert!(can_view_link(&link, Some(&with(&["LEAD_VIEW"]))));
    assert!(!can_view_link(&link, Some(&with(&[]))));
    assert!(!can_view_link(&link, None));
}

/// A link without an action needs only `read`, which every ability has
#[test]
fn link_without_action() {
    let link = NavItem { title: "Profile".into(), path: Some("/profile".into()), ..Default::default() };
    assert!(can_view_link(&link, Some(&with(&[]))));
    assert!(!can_view_link(&link, None));
}

#[test]
fn public_items_skip_checks() {
    let public = NavItem { title: "Help".into(), auth: Some(false), action: Some("NOPE".into()), ..Default::default() };
    assert!(can_view_link(&public, None));
    let group = NavItem { auth: Some(false), ..NavItem::group("G", vec![]) };
    assert!(can_view_group(&group, None));
}

#[test]
fn group_needs_a_visible_child() {
    let group = NavItem::group(
        "Leads",
        vec![NavItem::link("A", "/a", "LEAD_VIEW"), NavItem::link("B", "/b", "LEAD_EDIT")],
    );
    assert!(can_view_group(&group, Some(&with(&["LEAD_EDIT"]))));
    assert!(!can_view_group(&group, Some(&with(&["PRODUCT_VIEW"]))));
    assert!(!can_view_group(&NavItem::group("Empty", vec![]), Some(&Ability::unrestricted())));
    let no_children = NavItem { title: "Bare".into(), ..Default::default() };
    assert!(!can_view_group(&no_children, Some(&Ability::unrestricted())));
}

#[test]
fn nested_groups_recurse() {
    let inner = NavItem { action: Some("NEVER".into()), ..NavItem::group("Inner", vec![NavItem::link("X", "/x", "X")]) };
    let outer = NavItem::group("Outer", vec![inner]);
    // The inner group's own action is not consulted while looking for visible descendants.
    assert!(can_view_group(&outer, Some(&with(&["X"]))));
    assert!(!can_view_group(&outer, Some(&with(&["NEVER"]))));
}

#[test]
fn group_with_own_acl() {
    let mut group = NavItem::group("Settings", vec![NavItem::link("Users", "/users", "USER_VIEW")]);
    group.action = Some("COMPANY_SETTINGS_EDIT".into());
    group.subject = Some("Company".into());
    assert!(!can_view_group(&group, Some(&with(&["USER_VIEW"]))));
    assert!(can_view_group(&group, Some(&with(&["USER_VIEW", "COMPANY_SETTINGS_EDIT"]))));

    // An action without a subject does not gate the group.
    group.subject = None;
    assert!(can_view_group(&group, Some(&with(&["USER_VIEW"]))));
}

#[test]
fn prune_menu() {
    let a = with(&["LEAD_VIEW"]);
    let visible = visible_items(&menu(), Some(&a as &dyn Can));
    assert_eq!(titles(&visible), vec!["Leads", "All leads", "Help", "Profile"]);

    let b = with(&["DASHBOARD_DATA_VIEW", "LEAD_EXPORT", "COMPANY_SUBSCRIPTION_EXPORT"]);
    let visible = visible_items(&menu(), Some(&b));
    assert_eq!(titles(&visible), vec!["Dashboard", "Statistics", "Leads", "Export", "Help", "Profile"]);
}

#[test]
fn anonymous_sees_public_only() {
    assert_eq!(titles(&visible_items(&menu(), None)), vec!["Help"]);
}
