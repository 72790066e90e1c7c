use super::edge::FeedingEdge;
use super::species::Species;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// A puzzle: species, the edges already placed, and how many edges the player must add.
///
/// Created once by the generator and read-only afterwards.
pub struct Scenario {
    pub nodes: Vec<Species>,
    pub fixed_edges: Vec<FeedingEdge>,
    /// Number of edges a candidate solution must supply on top of `fixed_edges`.
    pub required_edge_count: usize,
    pub seed: u64,
}

impl Scenario {
    #[must_use]
    pub fn species(&self, id: &str) -> Option<&Species> {
        self.nodes.iter().find(|s| s.id == id)
    }

    /// Edge count of a complete graph (fixed plus candidate).
    #[must_use]
    pub fn total_edge_count(&self) -> usize {
        self.fixed_edges.len() + self.required_edge_count
    }

    pub fn producers(&self) -> impl Iterator<Item = &Species> {
        self.nodes.iter().filter(|s| s.is_producer())
    }

    pub fn consumers(&self) -> impl Iterator<Item = &Species> {
        self.nodes.iter().filter(|s| !s.is_producer())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
/// A proposed set of edges completing a scenario. Frozen once handed out.
pub struct CandidateSolution {
    pub edges: Vec<FeedingEdge>,
}

impl CandidateSolution {
    pub fn new(edges: Vec<FeedingEdge>) -> Self {
        Self { edges }
    }

    /// Same candidate with its edges in canonical `(source, target, capacity)` order.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.edges.sort();
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn contains(&self, edge: &FeedingEdge) -> bool {
        self.edges.contains(edge)
    }

    /// Candidate without the edge `source→target`, whatever its capacity.
    #[must_use]
    pub fn without(&self, source: &str, target: &str) -> Self {
        Self {
            edges: self
                .edges
                .iter()
                .filter(|e| e.pair() != (source, target))
                .cloned()
                .collect(),
        }
    }
}
