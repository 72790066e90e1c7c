use super::species::Energy;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A directed feeding relationship: `target` feeds on `source`.
pub struct FeedingEdge {
    pub source: String,
    pub target: String,
    /// Maximum energy transferable along this edge per round.
    pub capacity: Energy,
}

impl FeedingEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, capacity: Energy) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            capacity,
        }
    }

    /// The `(source, target)` pair that must be unique within an edge set.
    #[must_use]
    pub fn pair(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }
}

impl std::fmt::Display for FeedingEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{} cap{}", self.source, self.target, self.capacity)
    }
}
