pub mod macros;

use trophic_lib::model::{CandidateSolution, Energy, FeedingEdge, Scenario, Species};

#[allow(dead_code)]
pub struct ScenarioBuilder {
    nodes: Vec<Species>,
    fixed_edges: Vec<FeedingEdge>,
    required_edge_count: usize,
    seed: u64,
}

#[allow(dead_code)]
impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            fixed_edges: Vec::new(),
            required_edge_count: 0,
            seed: 0,
        }
    }

    pub fn with_producer(mut self, id: &str, max_out: u32) -> Self {
        self.nodes.push(Species::producer(id, max_out));
        self
    }

    pub fn with_consumer(
        mut self,
        id: &str,
        level: u32,
        intake: (Energy, Energy),
        max_out: u32,
        max_in: u32,
    ) -> Self {
        self.nodes
            .push(Species::consumer(id, level, intake, max_out, max_in));
        self
    }

    pub fn with_fixed(mut self, source: &str, target: &str, capacity: Energy) -> Self {
        self.fixed_edges
            .push(FeedingEdge::new(source, target, capacity));
        self
    }

    pub fn with_required(mut self, count: usize) -> Self {
        self.required_edge_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            nodes: self.nodes,
            fixed_edges: self.fixed_edges,
            required_edge_count: self.required_edge_count,
            seed: self.seed,
        }
    }
}

/// The two-consumer puzzle: `P` feeds `C1` and `C2`, both wanting 1..=3.
#[allow(dead_code)]
pub fn two_consumer_scenario() -> Scenario {
    ScenarioBuilder::new()
        .with_producer("P", 2)
        .with_consumer("C1", 1, (1, 3), 0, 1)
        .with_consumer("C2", 1, (1, 3), 0, 1)
        .with_required(2)
        .build()
}

#[allow(dead_code)]
pub fn candidate(edges: &[(&str, &str, Energy)]) -> CandidateSolution {
    CandidateSolution::new(
        edges
            .iter()
            .map(|&(s, t, c)| FeedingEdge::new(s, t, c))
            .collect(),
    )
}
