//! Scoring and ranking of valid completions.
//!
//! Scores only make sense for candidates that pass validation; [`rank`]
//! filters the rest out before ordering.

use crate::config::ScoringConfig;
use crate::simulator::{FeedingSimulator, Simulate};
use crate::validator::Validator;
use crate::web::FoodWeb;
use petgraph::algo::toposort;
use serde::{Deserialize, Serialize};
use trophic_data::{CandidateSolution, Energy, Scenario, SimulationTrace};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolutionScore {
    /// Required intake over delivered intake, summed over consumers.
    pub caloric_efficiency: f64,
    /// Placed edges, fixed and candidate, over trophically legal pairs.
    pub relationship_complexity: f64,
    pub producer_ratio: f64,
    /// Edges on the longest feeding chain.
    pub chain_depth: usize,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Scorer<S = FeedingSimulator> {
    config: ScoringConfig,
    validator: Validator<S>,
}

impl Scorer<FeedingSimulator> {
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            validator: Validator::new(),
        }
    }
}

impl<S: Simulate> Scorer<S> {
    pub fn with_validator(config: ScoringConfig, validator: Validator<S>) -> Self {
        Self { config, validator }
    }

    /// Scores a candidate against the trace of its simulation.
    ///
    /// Meant for validated candidates. If an edge cannot be placed, the
    /// structural components (complexity and chain depth) are zero.
    pub fn score(
        &self,
        scenario: &Scenario,
        candidate: &CandidateSolution,
        trace: &SimulationTrace,
    ) -> SolutionScore {
        let final_round = trace.final_round();
        let (mut required, mut delivered): (Energy, Energy) = (0, 0);
        for consumer in scenario.consumers() {
            required = required.saturating_add(consumer.min_intake);
            delivered = delivered.saturating_add(
                final_round
                    .and_then(|r| r.energies.get(&consumer.id))
                    .copied()
                    .unwrap_or(0),
            );
        }
        let caloric_efficiency = ratio(required as f64, delivered as f64);

        let (relationship_complexity, chain_depth) = match assemble(scenario, candidate) {
            Some(web) => (
                ratio(web.edge_count() as f64, web.legal_pair_count() as f64),
                chain_depth(&web),
            ),
            None => {
                tracing::debug!(
                    edges = candidate.len(),
                    "Scoring a structurally invalid candidate"
                );
                (0.0, 0)
            }
        };

        let producer_ratio = ratio(
            scenario.producers().count() as f64,
            scenario.nodes.len() as f64,
        );

        let w = &self.config;
        let total = w.caloric_efficiency * caloric_efficiency
            + w.relationship_complexity * relationship_complexity
            + w.producer_ratio * producer_ratio;

        SolutionScore {
            caloric_efficiency,
            relationship_complexity,
            producer_ratio,
            chain_depth,
            total,
        }
    }

    /// Keeps the valid candidates and orders them best first.
    ///
    /// Equal totals keep their input order.
    pub fn rank<I>(
        &self,
        scenario: &Scenario,
        candidates: I,
    ) -> Vec<(CandidateSolution, SolutionScore)>
    where
        I: IntoIterator<Item = CandidateSolution>,
    {
        let mut ranked: Vec<_> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let report = self.validator.report(scenario, &candidate);
                if !report.result.valid {
                    return None;
                }
                let trace = report.trace?;
                let score = self.score(scenario, &candidate, &trace);
                Some((candidate, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));
        tracing::debug!(ranked = ranked.len(), "Candidates ranked");
        ranked
    }
}

/// Web of fixed and candidate edges, or `None` if any edge breaks an invariant.
fn assemble(scenario: &Scenario, candidate: &CandidateSolution) -> Option<FoodWeb> {
    let mut web = FoodWeb::new(scenario.nodes.clone()).ok()?;
    for edge in scenario.fixed_edges.iter().chain(&candidate.edges) {
        web.try_push_feeding_edge(edge).ok()?;
    }
    Some(web)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Longest path in edges, or 0 for an empty or cyclic web.
fn chain_depth(web: &FoodWeb) -> usize {
    let graph = web.to_digraph();
    let Ok(order) = toposort(&graph, None) else {
        return 0;
    };
    let mut depth = vec![0usize; graph.node_count()];
    let mut deepest = 0;
    for node in order {
        let d = depth[node.index()];
        deepest = deepest.max(d);
        for next in graph.neighbors(node) {
            depth[next.index()] = depth[next.index()].max(d + 1);
        }
    }
    deepest
}

/// Scores with the default weights.
pub fn score(
    scenario: &Scenario,
    candidate: &CandidateSolution,
    trace: &SimulationTrace,
) -> SolutionScore {
    Scorer::new(ScoringConfig::default()).score(scenario, candidate, trace)
}

/// Ranks with the default weights and simulator.
pub fn rank<I>(scenario: &Scenario, candidates: I) -> Vec<(CandidateSolution, SolutionScore)>
where
    I: IntoIterator<Item = CandidateSolution>,
{
    Scorer::new(ScoringConfig::default()).rank(scenario, candidates)
}
