// orgdesk/src/ability/role_table.rs
use lazy_static::lazy_static;
use std::collections::HashMap;

use super::grant::Grant;

// Role names are matched exactly as the profile endpoint reports them.
const BUILTIN_ROLES: &[(&str, &[Grant])] = &[
    ("Super Admin", &[Grant::fixed("manage", "all")]),
    ("Org Admin", &[Grant::fixed("manage", "all")]),
    (
        "Event Manager",
        &[
            Grant::fixed("read", "Dashboard"),
            Grant::fixed("manage", "Event"),
            Grant::fixed("manage", "Category"),
            Grant::fixed("view", "Media"),
            Grant::fixed("add", "Media"),
        ],
    ),
    (
        "Media Contributor",
        &[
            Grant::fixed("read", "Dashboard"),
            Grant::fixed("read", "Press Release"),
        ],
    ),
    (
        "Field Volunteer",
        &[
            Grant::fixed("read", "Dashboard"),
            Grant::fixed("read", "Tasks"),
            Grant::fixed("modify", "Task"),
        ],
    ),
    (
        "Public Viewer",
        &[
            Grant::fixed("read", "Dashboard"),
            Grant::fixed("read", "Tasks"),
        ],
    ),
];

lazy_static! {
    /// Process-wide role -> grants table. Not editable at runtime.
    pub static ref ROLE_TABLE: RoleTable = RoleTable::builtin();
}

/// Ordered mapping from role name to its grant list.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: Vec<(String, Vec<Grant>)>,
    index: HashMap<String, usize>,
}

impl RoleTable {
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_ROLES
                .iter()
                .map(|(name, grants)| (name.to_string(), grants.to_vec())),
        )
    }

    /// Later entries with an already-seen name replace the earlier grants but
    /// keep the original position.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Grant>)>,
    {
        let mut table = Self::default();
        for (name, grants) in entries {
            match table.index.get(&name) {
                Some(&pos) => table.roles[pos].1 = grants,
                None => {
                    table.index.insert(name.clone(), table.roles.len());
                    table.roles.push((name, grants));
                }
            }
        }
        table
    }

    pub fn grants_for(&self, role_name: &str) -> Option<&[Grant]> {
        self.index
            .get(role_name)
            .map(|&pos| self.roles[pos].1.as_slice())
    }

    pub fn contains(&self, role_name: &str) -> bool {
        self.index.contains_key(role_name)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
