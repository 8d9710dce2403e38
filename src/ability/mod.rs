// orgdesk/src/ability/mod.rs
pub mod grant;
pub mod role_table;

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub use grant::{Grant, ALL, MANAGE, MANAGE_EXPANSION};
pub use role_table::{RoleTable, ROLE_TABLE};

/// Anything that can answer `can(action, subject)`.
///
/// Gate helpers are generic over this trait; `Ability` is the implementor used
/// at runtime.
pub trait PermissionChecker {
    fn can(&self, action: &str, subject: &str) -> bool;

    fn cannot(&self, action: &str, subject: &str) -> bool {
        !self.can(action, subject)
    }

    fn allows(&self, requirement: &Grant) -> bool {
        self.can(requirement.action(), requirement.subject())
    }
}

/// Resolved, immutable permission set for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    role_name: Option<String>,
    /// action -> subjects
    rules: BTreeMap<String, BTreeSet<String>>,
}

impl Ability {
    /// Ability that denies everything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role_name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered `(action, subject)` pairs, `manage` already expanded, in
    /// sorted order.
    pub fn rules(&self) -> Vec<Grant> {
        self.rules
            .iter()
            .flat_map(|(action, subjects)| {
                subjects
                    .iter()
                    .map(move |subject| Grant::new(action.clone(), subject.clone()))
            })
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(BTreeSet::len).sum()
    }

    fn register(&mut self, action: &str, subject: &str) {
        self.rules
            .entry(action.to_owned())
            .or_default()
            .insert(subject.to_owned());
    }

    fn contains(&self, action: &str, subject: &str) -> bool {
        self.rules
            .get(action)
            .is_some_and(|subjects| subjects.contains(subject))
    }
}

impl PermissionChecker for Ability {
    fn can(&self, action: &str, subject: &str) -> bool {
        self.contains(action, subject) || self.contains(action, ALL)
    }
}

/// Build an Ability from a grant list.
///
/// `manage` on a subject registers itself plus add/view/edit/delete on that
/// subject; every other grant registers its literal pair. The result is a set
/// union, so grant order and duplicates never change the outcome. A missing or
/// empty list yields an Ability that denies everything.
pub fn resolve_ability(role_name: Option<&str>, grants: Option<&[Grant]>) -> Ability {
    let mut ability = Ability {
        role_name: role_name.map(str::to_owned),
        rules: BTreeMap::new(),
    };

    for grant in grants.unwrap_or_default() {
        ability.register(grant.action(), grant.subject());
        if grant.is_manage() {
            for action in MANAGE_EXPANSION {
                ability.register(action, grant.subject());
            }
        }
    }

    debug!(
        "Resolved ability for role {:?}: {} rule(s)",
        ability.role_name,
        ability.rule_count()
    );
    ability
}

/// Look the role up in `table` and resolve its grants.
///
/// Unknown or missing roles resolve to an empty Ability instead of failing.
pub fn ability_for_role(table: &RoleTable, role_name: Option<&str>) -> Ability {
    let grants = role_name.and_then(|name| table.grants_for(name));
    if grants.is_none() {
        warn!("No grants configured for role {:?}; denying everything", role_name);
    }
    resolve_ability(role_name, grants)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [&str; 7] = ["manage", "view", "add", "edit", "delete", "modify", "read"];
    const SUBJECTS: [&str; 6] = ["User", "Task", "PressRelease", "Event", "Media", "all"];

    fn answers(ability: &Ability) -> Vec<bool> {
        let mut out = Vec::new();
        for action in ACTIONS {
            for subject in SUBJECTS {
                out.push(ability.can(action, subject));
            }
        }
        out
    }

    #[test]
    fn test_manage_expands_to_crud_on_subject_only() {
        let grants = [Grant::fixed("manage", "Task")];
        let ability = resolve_ability(Some("Tasker"), Some(&grants[..]));

        for action in MANAGE_EXPANSION {
            assert!(ability.can(action, "Task"), "{} on Task", action);
            assert!(ability.cannot(action, "Event"), "{} on Event", action);
        }
        assert!(ability.can("manage", "Task"));
        assert!(ability.cannot("modify", "Task"));
        assert_eq!(ability.role_name(), Some("Tasker"));
    }

    #[test]
    fn test_separately_granted_subject_still_allowed() {
        let grants = [Grant::fixed("manage", "Task"), Grant::fixed("view", "Event")];
        let ability = resolve_ability(None, Some(&grants[..]));
        assert!(ability.can("view", "Event"));
        assert!(ability.cannot("edit", "Event"));
    }

    #[test]
    fn test_empty_and_missing_grants_deny_everything() {
        let none = resolve_ability(Some("Anyone"), None);
        let empty = resolve_ability(Some("Anyone"), Some(&[] as &[Grant]));
        assert!(none.is_empty());
        assert!(answers(&none).iter().all(|allowed| !allowed));
        assert!(answers(&empty).iter().all(|allowed| !allowed));
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let forward = [
            Grant::fixed("manage", "Event"),
            Grant::fixed("view", "Media"),
            Grant::fixed("read", "Dashboard"),
        ];
        let shuffled = [
            Grant::fixed("read", "Dashboard"),
            Grant::fixed("view", "Media"),
            Grant::fixed("manage", "Event"),
            Grant::fixed("view", "Media"),
            Grant::fixed("manage", "Event"),
        ];
        let a = resolve_ability(None, Some(&forward[..]));
        let b = resolve_ability(None, Some(&shuffled[..]));
        assert_eq!(answers(&a), answers(&b));
        assert_eq!(a.rules(), b.rules());
    }

    #[test]
    fn test_wildcard_subject_matches_same_action_only() {
        let grants = [Grant::fixed("view", "all")];
        let ability = resolve_ability(None, Some(&grants[..]));
        assert!(ability.can("view", "User"));
        assert!(ability.can("view", "Anything"));
        assert!(ability.cannot("edit", "User"));
    }

    #[test]
    fn test_manage_all_allows_crud_everywhere() {
        let grants = [Grant::fixed("manage", "all")];
        let ability = resolve_ability(Some("Org Admin"), Some(&grants[..]));
        assert!(ability.can("delete", "Task"));
        assert!(ability.can("view", "PressRelease"));
        assert!(ability.can("manage", "Permission"));
        assert!(ability.cannot("read", "Dashboard"));
    }

    #[test]
    fn test_unknown_role_matches_empty_grants() {
        let unknown = ability_for_role(&ROLE_TABLE, Some("Night Janitor"));
        let missing = ability_for_role(&ROLE_TABLE, None);
        let empty = resolve_ability(Some("Night Janitor"), Some(&[] as &[Grant]));
        assert_eq!(answers(&unknown), answers(&empty));
        assert_eq!(answers(&missing), answers(&empty));
    }

    #[test]
    fn test_rules_are_sorted_and_expanded() {
        let grants = [Grant::fixed("manage", "Event")];
        let rules = resolve_ability(None, Some(&grants[..])).rules();
        let rendered: Vec<String> = rules.iter().map(|g| g.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["add:Event", "delete:Event", "edit:Event", "manage:Event", "view:Event"]
        );
    }

    #[test]
    fn test_allows_uses_requirement_pair() {
        let grants = [Grant::fixed("view", "Media")];
        let ability = resolve_ability(None, Some(&grants[..]));
        assert!(ability.allows(&Grant::fixed("view", "Media")));
        assert!(!ability.allows(&Grant::fixed("edit", "Media")));
    }
}
