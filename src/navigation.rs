// orgdesk/src/navigation.rs
use lazy_static::lazy_static;

use crate::ability::{Grant, PermissionChecker};
use crate::menu::{filter_menu, MenuItem, MenuRequirements};

// (key, title, path, icon, requirement)
const SECTIONS: &[(&str, &str, &str, &str, Option<Grant>)] = &[
    ("dashboard", "Dashboard", "/orgdesk/dashboard", "dashboard", None),
    ("users", "Users", "/orgdesk/users", "people", Some(Grant::fixed("view", "User"))),
    ("roles", "Roles", "/orgdesk/roles", "badge", Some(Grant::fixed("view", "Role"))),
    ("permissions", "Permissions", "/orgdesk/permissions", "lock", Some(Grant::fixed("view", "Permission"))),
    ("tasks", "Tasks", "/orgdesk/tasks", "checklist", Some(Grant::fixed("view", "Task"))),
    ("press-releases", "Press Releases", "/orgdesk/press-releases", "newspaper", Some(Grant::fixed("view", "PressRelease"))),
    ("events", "Events", "/orgdesk/events", "event", Some(Grant::fixed("view", "Event"))),
    ("categories", "Categories", "/orgdesk/categories", "category", Some(Grant::fixed("view", "Category"))),
    ("birthdays", "Birthdays", "/orgdesk/birthdays", "cake", Some(Grant::fixed("view", "Birthday"))),
    ("special-days", "Special Days", "/orgdesk/special-days", "calendar", Some(Grant::fixed("view", "SpecialDay"))),
    ("media", "Media", "/orgdesk/media", "photo", Some(Grant::fixed("view", "Media"))),
];

lazy_static! {
    /// Navigable sections in display order.
    pub static ref NAV_SECTIONS: Vec<MenuItem> = SECTIONS
        .iter()
        .map(|(key, title, path, icon, _)| MenuItem::new(key, title, path).with_icon(icon))
        .collect();

    /// Section key -> requirement. Sections missing here are always shown.
    pub static ref NAV_REQUIREMENTS: MenuRequirements = SECTIONS
        .iter()
        .filter_map(|(key, _, _, _, required)| {
            required.clone().map(|grant| (key.to_string(), grant))
        })
        .collect();
}

/// The navigation menu as `checker` should see it.
pub fn visible_menu<C: PermissionChecker>(checker: &C) -> Vec<MenuItem> {
    filter_menu(&NAV_SECTIONS, &NAV_REQUIREMENTS, checker)
}
