/// Semantic role of a view, similar to ARIA roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Button,
    TextField,
    Image,
    /// Announced immediately; used for error blocks.
    Alert,
    /// Busy placeholder while something loads.
    Progress,
}

/// Semantics attached to a `View`, used by assistive tech and by tree
/// inspection in tests.
#[derive(Clone, Debug)]
pub struct Semantics {
    pub role: Role,
    /// Human‑readable label for screen readers.
    pub label: Option<String>,
}

impl Semantics {
    pub fn new(role: Role) -> Self {
        Self { role, label: None }
    }
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
