// orgdesk/src/menu.rs

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use tracing::debug;

use crate::ability::{Grant, PermissionChecker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub key: String,
    pub title: String,
    pub path: String,
    pub children: Option<Vec<MenuItem>>,
    pub icon: Option<String>,
}

impl MenuItem {
    pub fn new(key: &str, title: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            path: path.to_string(),
            children: None,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Section key -> required `(action, subject)`.
pub type MenuRequirements = HashMap<String, Grant>;

/// Keep the sections `checker` permits, in their original order.
///
/// Sections without an entry in `requirements` are always kept. Children go
/// through the same rule; a kept parent whose children were all removed keeps
/// an empty child list.
pub fn filter_menu<C: PermissionChecker>(
    sections: &[MenuItem],
    requirements: &MenuRequirements,
    checker: &C,
) -> Vec<MenuItem> {
    sections
        .iter()
        .filter(|section| match requirements.get(&section.key) {
            Some(required) => checker.allows(required),
            None => {
                debug!("Menu section '{}' has no requirement; showing it", section.key);
                true
            }
        })
        .map(|section| {
            let mut kept = section.clone();
            if let Some(children) = &section.children {
                kept.children = Some(filter_menu(children, requirements, checker));
            }
            kept
        })
        .collect()
}
