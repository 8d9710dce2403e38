// orgdesk/src/gate.rs
use serde::Serialize;

use crate::ability::{grant, Grant, PermissionChecker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Render the restricted-access screen instead of the page.
    Deny,
}

/// Page-level gate: one `(action, subject)` requirement for a whole page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGate {
    pub requirement: Grant,
}

impl PageGate {
    pub fn new(action: &str, subject: &str) -> Self {
        Self {
            requirement: Grant::new(action.to_string(), subject.to_string()),
        }
    }

    pub fn evaluate<C: PermissionChecker>(&self, checker: &C) -> GateDecision {
        if checker.allows(&self.requirement) {
            GateDecision::Allow
        } else {
            GateDecision::Deny
        }
    }
}

impl Default for PageGate {
    /// `view Media` guards the application shell.
    fn default() -> Self {
        Self {
            requirement: Grant::fixed(grant::VIEW, "Media"),
        }
    }
}

/// Declarative path-prefix -> page gate table. The longest matching prefix
/// wins; paths with no match fall back to `default`.
#[derive(Debug, Clone, Default)]
pub struct RouteGuards {
    routes: Vec<(String, PageGate)>,
    default: Option<PageGate>,
}

impl RouteGuards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, gate: PageGate) -> Self {
        self.routes.push((prefix.trim_end_matches('/').to_string(), gate));
        self
    }

    pub fn fallback(mut self, gate: PageGate) -> Self {
        self.default = Some(gate);
        self
    }

    pub fn gate_for(&self, path: &str) -> Option<&PageGate> {
        self.routes
            .iter()
            .filter(|(prefix, _)| path_has_prefix(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, gate)| gate)
            .or(self.default.as_ref())
    }

    /// Paths without any gate are allowed.
    pub fn evaluate<C: PermissionChecker>(&self, path: &str, checker: &C) -> GateDecision {
        self.gate_for(path)
            .map_or(GateDecision::Allow, |gate| gate.evaluate(checker))
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Add,
    Edit,
    Delete,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::View => grant::VIEW,
            RowAction::Add => grant::ADD,
            RowAction::Edit => grant::EDIT,
            RowAction::Delete => grant::DELETE,
        }
    }

    pub fn allowed<C: PermissionChecker>(&self, checker: &C, subject: &str) -> bool {
        checker.can(self.as_str(), subject)
    }
}

/// Which row controls a list screen should render for `subject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowActions {
    pub view: bool,
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
}

impl RowActions {
    pub fn for_subject<C: PermissionChecker>(checker: &C, subject: &str) -> Self {
        Self {
            view: RowAction::View.allowed(checker, subject),
            add: RowAction::Add.allowed(checker, subject),
            edit: RowAction::Edit.allowed(checker, subject),
            delete: RowAction::Delete.allowed(checker, subject),
        }
    }

    pub fn any(&self) -> bool {
        self.view || self.add || self.edit || self.delete
    }
}
