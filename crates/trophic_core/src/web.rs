//! Arena representation of a feeding network.
//!
//! Species and edges are addressed by integer indices into flat arrays. The
//! species table is shared behind an `Arc`, so cloning a web for a parallel
//! search branch copies only the per-node counters and the edge stack.
//! Edge insertion is O(1) and always reversible with [`FoodWeb::pop_edge`].

use crate::error::{Result, TrophicError};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::sync::Arc;
use trophic_data::{Energy, FeedingEdge, Role, Scenario, Species, ViolationKind};

/// An edge between arena indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub capacity: Energy,
}

/// First structural invariant an edge would break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breach {
    pub kind: ViolationKind,
    pub node_id: String,
}

#[derive(Debug, Clone)]
pub struct FoodWeb {
    species: Arc<[Species]>,
    index: Arc<HashMap<String, usize>>,
    edges: Vec<Edge>,
    out_degree: Vec<u32>,
    in_degree: Vec<u32>,
    /// Sum of capacities arriving from producers; delivered in full every round.
    /// Kept wide so that pushes and pops cancel exactly for any capacities.
    producer_inflow: Vec<u128>,
    /// Sum of all incoming capacities; an upper bound on intake.
    in_capacity: Vec<u128>,
    /// Row-major `n × n` adjacency flags keeping the edge set simple.
    adjacency: Vec<bool>,
}

impl FoodWeb {
    /// Builds an empty web. Fails on duplicate species ids.
    pub fn new(species: Vec<Species>) -> Result<Self> {
        let mut index = HashMap::with_capacity(species.len());
        for (i, s) in species.iter().enumerate() {
            if index.insert(s.id.clone(), i).is_some() {
                return Err(TrophicError::infeasible(format!(
                    "duplicate species id {}",
                    s.id
                )));
            }
        }
        let n = species.len();
        Ok(Self {
            species: species.into(),
            index: Arc::new(index),
            edges: Vec::new(),
            out_degree: vec![0; n],
            in_degree: vec![0; n],
            producer_inflow: vec![0; n],
            in_capacity: vec![0; n],
            adjacency: vec![false; n * n],
        })
    }

    /// Builds the web of a scenario's species and fixed edges.
    ///
    /// Fixed edges that break an invariant make the scenario infeasible.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self> {
        let mut web = Self::new(scenario.nodes.clone())?;
        for edge in &scenario.fixed_edges {
            web.try_push_feeding_edge(edge).map_err(|b| {
                TrophicError::infeasible(format!(
                    "fixed edge {edge} breaks {:?} at {}",
                    b.kind, b.node_id
                ))
            })?;
        }
        Ok(web)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    #[must_use]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    #[must_use]
    pub fn node(&self, idx: usize) -> &Species {
        &self.species[idx]
    }

    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn has_pair(&self, source: usize, target: usize) -> bool {
        self.adjacency[source * self.len() + target]
    }

    #[must_use]
    pub fn out_degree(&self, idx: usize) -> u32 {
        self.out_degree[idx]
    }

    #[must_use]
    pub fn in_degree(&self, idx: usize) -> u32 {
        self.in_degree[idx]
    }

    #[must_use]
    pub fn remaining_out(&self, idx: usize) -> u32 {
        self.species[idx]
            .max_out_degree
            .saturating_sub(self.out_degree[idx])
    }

    #[must_use]
    pub fn remaining_in(&self, idx: usize) -> u32 {
        self.species[idx]
            .max_in_degree
            .saturating_sub(self.in_degree[idx])
    }

    /// Incoming edges still needed before the node can possibly be fed.
    #[must_use]
    pub fn in_deficit(&self, idx: usize) -> u32 {
        self.species[idx]
            .min_in_degree()
            .saturating_sub(self.in_degree[idx])
    }

    /// Producer capacity into `idx`, saturating at `Energy::MAX`.
    #[must_use]
    pub fn producer_inflow(&self, idx: usize) -> Energy {
        saturate(self.producer_inflow[idx])
    }

    /// Total capacity into `idx`, saturating at `Energy::MAX`.
    #[must_use]
    pub fn in_capacity(&self, idx: usize) -> Energy {
        saturate(self.in_capacity[idx])
    }

    /// Checks every structural invariant `source→target` would have to satisfy.
    pub fn check_edge(&self, source: usize, target: usize) -> std::result::Result<(), Breach> {
        let breach = |kind, idx: usize| Breach {
            kind,
            node_id: self.species[idx].id.clone(),
        };
        if self.species[target].trophic_level <= self.species[source].trophic_level
            || self.species[target].role == Role::Producer
        {
            return Err(breach(ViolationKind::TrophicOrderViolation, target));
        }
        if self.has_pair(source, target) {
            return Err(breach(ViolationKind::DegreeViolation, target));
        }
        if self.remaining_out(source) == 0 {
            return Err(breach(ViolationKind::DegreeViolation, source));
        }
        if self.remaining_in(target) == 0 {
            return Err(breach(ViolationKind::DegreeViolation, target));
        }
        Ok(())
    }

    /// Inserts an edge after checking it.
    pub fn try_push(&mut self, edge: Edge) -> std::result::Result<(), Breach> {
        self.check_edge(edge.source, edge.target)?;
        self.push_unchecked(edge);
        Ok(())
    }

    /// Resolves ids and inserts. Unknown ids are reported as degree breaches.
    pub fn try_push_feeding_edge(&mut self, edge: &FeedingEdge) -> std::result::Result<(), Breach> {
        let resolve = |id: &str| {
            self.node_index(id).ok_or_else(|| Breach {
                kind: ViolationKind::DegreeViolation,
                node_id: id.to_string(),
            })
        };
        let source = resolve(&edge.source)?;
        let target = resolve(&edge.target)?;
        self.try_push(Edge {
            source,
            target,
            capacity: edge.capacity,
        })
    }

    /// Inserts an edge the caller has already checked.
    pub fn push_unchecked(&mut self, edge: Edge) {
        let n = self.len();
        self.adjacency[edge.source * n + edge.target] = true;
        self.out_degree[edge.source] += 1;
        self.in_degree[edge.target] += 1;
        self.in_capacity[edge.target] += u128::from(edge.capacity);
        if self.species[edge.source].is_producer() {
            self.producer_inflow[edge.target] += u128::from(edge.capacity);
        }
        self.edges.push(edge);
    }

    /// Removes the most recently inserted edge.
    pub fn pop_edge(&mut self) -> Option<Edge> {
        let edge = self.edges.pop()?;
        let n = self.len();
        self.adjacency[edge.source * n + edge.target] = false;
        self.out_degree[edge.source] -= 1;
        self.in_degree[edge.target] -= 1;
        self.in_capacity[edge.target] -= u128::from(edge.capacity);
        if self.species[edge.source].is_producer() {
            self.producer_inflow[edge.target] -= u128::from(edge.capacity);
        }
        Some(edge)
    }

    #[must_use]
    pub fn to_feeding_edge(&self, edge: &Edge) -> FeedingEdge {
        FeedingEdge::new(
            self.species[edge.source].id.clone(),
            self.species[edge.target].id.clone(),
            edge.capacity,
        )
    }

    /// Feeding edges from position `from` of the edge stack onwards.
    #[must_use]
    pub fn feeding_edges_from(&self, from: usize) -> Vec<FeedingEdge> {
        self.edges[from..]
            .iter()
            .map(|e| self.to_feeding_edge(e))
            .collect()
    }

    /// Outgoing edges per source, each list ordered by target index.
    #[must_use]
    pub fn outgoing(&self) -> Vec<Vec<Edge>> {
        let mut out = vec![Vec::new(); self.len()];
        for edge in &self.edges {
            out[edge.source].push(*edge);
        }
        for list in &mut out {
            list.sort_unstable_by_key(|e| e.target);
        }
        out
    }

    /// Number of ordered pairs an edge could legally connect, ignoring degree bounds.
    #[must_use]
    pub fn legal_pair_count(&self) -> usize {
        let mut count = 0;
        for s in self.species.iter() {
            for t in self.species.iter() {
                if t.role == Role::Consumer && t.trophic_level > s.trophic_level {
                    count += 1;
                }
            }
        }
        count
    }

    /// Petgraph view of the web with capacities as edge weights.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<usize, Energy> {
        let mut graph = DiGraph::with_capacity(self.len(), self.edges.len());
        let nodes: Vec<NodeIndex> = (0..self.len()).map(|i| graph.add_node(i)).collect();
        for e in &self.edges {
            graph.add_edge(nodes[e.source], nodes[e.target], e.capacity);
        }
        graph
    }
}

fn saturate(energy: u128) -> Energy {
    Energy::try_from(energy).unwrap_or(Energy::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: usize, target: usize, capacity: Energy) -> Edge {
        Edge {
            source,
            target,
            capacity,
        }
    }

    fn small_web() -> FoodWeb {
        FoodWeb::new(vec![
            Species::producer("P", 2),
            Species::consumer("C1", 1, (1, 3), 1, 1),
            Species::consumer("C2", 2, (1, 3), 0, 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_push_pop_restores_counters() {
        let mut web = small_web();
        web.try_push(edge(0, 1, 2)).unwrap();
        web.try_push(edge(1, 2, 1)).unwrap();
        assert_eq!(web.out_degree(0), 1);
        assert_eq!(web.producer_inflow(1), 2);
        assert_eq!(web.producer_inflow(2), 0);
        assert_eq!(web.in_capacity(2), 1);

        web.pop_edge();
        web.pop_edge();
        assert_eq!(web.edge_count(), 0);
        assert_eq!(web.out_degree(0), 0);
        assert_eq!(web.in_capacity(2), 0);
        assert!(!web.has_pair(0, 1));
        assert!(web.pop_edge().is_none());
    }

    #[test]
    fn test_huge_capacities_saturate_and_pop_exactly() {
        let mut web = FoodWeb::new(vec![
            Species::producer("P1", 1),
            Species::producer("P2", 1),
            Species::consumer("C", 1, (1, Energy::MAX), 0, 2),
        ])
        .unwrap();
        web.try_push(edge(0, 2, Energy::MAX)).unwrap();
        web.try_push(edge(1, 2, 5)).unwrap();
        assert_eq!(web.in_capacity(2), Energy::MAX);
        assert_eq!(web.producer_inflow(2), Energy::MAX);

        web.pop_edge();
        assert_eq!(web.in_capacity(2), Energy::MAX);
        web.pop_edge();
        assert_eq!(web.in_capacity(2), 0);
        assert_eq!(web.producer_inflow(2), 0);
    }

    #[test]
    fn test_trophic_order_enforced() {
        let mut web = small_web();
        let breach = web.try_push(edge(2, 1, 1)).unwrap_err();
        assert_eq!(breach.kind, ViolationKind::TrophicOrderViolation);
        assert_eq!(breach.node_id, "C1");

        let breach = web.try_push(edge(1, 1, 1)).unwrap_err();
        assert_eq!(breach.kind, ViolationKind::TrophicOrderViolation);
    }

    #[test]
    fn test_degree_bounds_enforced() {
        let mut web = small_web();
        web.try_push(edge(0, 1, 1)).unwrap();
        let dup = web.try_push(edge(0, 1, 2)).unwrap_err();
        assert_eq!(dup.kind, ViolationKind::DegreeViolation);

        web.try_push(edge(1, 2, 1)).unwrap();
        // C1 has max_out_degree 1
        let full = web.check_edge(1, 2).unwrap_err();
        assert_eq!(full.kind, ViolationKind::DegreeViolation);
    }

    #[test]
    fn test_unknown_id_and_duplicates() {
        let mut web = small_web();
        let breach = web
            .try_push_feeding_edge(&FeedingEdge::new("P", "Ghost", 1))
            .unwrap_err();
        assert_eq!(breach.node_id, "Ghost");

        let dup = FoodWeb::new(vec![Species::producer("P", 1), Species::producer("P", 1)]);
        assert!(matches!(dup, Err(TrophicError::InfeasibleScenario(_))));
    }

    #[test]
    fn test_deficit_and_legal_pairs() {
        let mut web = small_web();
        assert_eq!(web.in_deficit(1), 1);
        assert_eq!(web.in_deficit(0), 0);
        web.try_push(edge(0, 1, 1)).unwrap();
        assert_eq!(web.in_deficit(1), 0);
        // P→C1, P→C2, C1→C2
        assert_eq!(web.legal_pair_count(), 3);
        assert_eq!(web.to_digraph().edge_count(), 1);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

        #[test]
        fn test_pop_undoes_any_push_sequence(
            pushes in proptest::collection::vec((0usize..3, 0usize..3, 0u64..5), 0..8)
        ) {
            let mut web = small_web();
            let mut placed = 0;
            for (source, target, capacity) in pushes {
                if web.try_push(Edge { source, target, capacity }).is_ok() {
                    placed += 1;
                }
            }
            proptest::prop_assert_eq!(web.edge_count(), placed);
            for _ in 0..placed {
                proptest::prop_assert!(web.pop_edge().is_some());
            }
            for i in 0..web.len() {
                proptest::prop_assert_eq!(web.out_degree(i), 0);
                proptest::prop_assert_eq!(web.in_degree(i), 0);
                proptest::prop_assert_eq!(web.in_capacity(i), 0);
                proptest::prop_assert_eq!(web.producer_inflow(i), 0);
                for j in 0..web.len() {
                    proptest::prop_assert!(!web.has_pair(i, j));
                }
            }
        }
    }
}
