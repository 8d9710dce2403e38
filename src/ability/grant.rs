// orgdesk/src/ability/grant.rs
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Action that expands to add/view/edit/delete on its subject.
pub const MANAGE: &str = "manage";
pub const VIEW: &str = "view";
pub const ADD: &str = "add";
pub const EDIT: &str = "edit";
pub const DELETE: &str = "delete";
pub const MODIFY: &str = "modify";

/// Subject wildcard: a grant on `all` applies to every subject.
pub const ALL: &str = "all";

/// The actions a `manage` grant stands for.
pub const MANAGE_EXPANSION: [&str; 4] = [ADD, VIEW, EDIT, DELETE];

/// A single `(action, subject)` permission statement.
///
/// Both halves are open vocabularies compared as exact strings, so `"read"`
/// and `"view"` are unrelated actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Grant {
    pub action: Cow<'static, str>,
    pub subject: Cow<'static, str>,
}

impl Grant {
    pub fn new(action: impl Into<Cow<'static, str>>, subject: impl Into<Cow<'static, str>>) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
        }
    }

    /// Const constructor for the embedded role and navigation tables.
    pub const fn fixed(action: &'static str, subject: &'static str) -> Self {
        Self {
            action: Cow::Borrowed(action),
            subject: Cow::Borrowed(subject),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_manage(&self) -> bool {
        self.action() == MANAGE
    }

    pub fn is_wildcard(&self) -> bool {
        self.subject() == ALL
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.subject)
    }
}
