use crate::Color;

/// Presentation hints carried by a view. Reprise does no layout of its own.
#[derive(Clone, Debug, Default)]
pub struct Modifier {
    pub background: Option<Color>,
    /// Stable handle for finding a view in tests and tooling.
    pub test_tag: Option<String>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
    pub fn test_tag(mut self, tag: impl Into<String>) -> Self {
        self.test_tag = Some(tag.into());
        self
    }
}
