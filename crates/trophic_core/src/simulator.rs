//! Round-based feeding simulation.
//!
//! Energy is a flow, not a stock: each round a consumer's energy is exactly
//! what it received that round. Propagation is single-hop per round, so a
//! chain of depth `d` settles at round `d` and is confirmed one round later.
//!
//! Round rules:
//! - Round 0: producers hold their declared output (sum of outgoing
//!   capacities), consumers hold nothing.
//! - Producers emit every outgoing edge's full capacity each round.
//! - Consumers forward up to their previous-round energy, edge by edge in
//!   target order, each edge carrying at most its capacity.
//!
//! Energy sums saturate at `Energy::MAX`.

use crate::config::SimulationConfig;
use crate::web::FoodWeb;
use std::collections::BTreeMap;
use trophic_data::{Energy, RoundEnergies, Role, SimulationTrace};

/// Anything that can turn a web into a trace.
///
/// Implementations must be pure: same web, same trace.
pub trait Simulate: Sync {
    fn run(&self, web: &FoodWeb) -> SimulationTrace;
}

/// The reference simulator. Holds configuration only, no per-run state.
#[derive(Debug, Clone, Default)]
pub struct FeedingSimulator {
    config: SimulationConfig,
}

impl FeedingSimulator {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn round_cap(&self, web: &FoodWeb) -> usize {
        self.config.round_cap(web.len())
    }
}

impl Simulate for FeedingSimulator {
    fn run(&self, web: &FoodWeb) -> SimulationTrace {
        let n = web.len();
        let cap = self.round_cap(web);
        let outgoing = web.outgoing();

        let declared: Vec<Energy> = (0..n)
            .map(|i| match web.node(i).role {
                Role::Producer => outgoing[i]
                    .iter()
                    .map(|e| e.capacity)
                    .fold(0, Energy::saturating_add),
                Role::Consumer => 0,
            })
            .collect();

        let mut prev = declared.clone();
        let mut rounds = vec![snapshot(web, 0, &prev)];
        let mut converged_at_round = None;

        for round in 1..=cap {
            let mut next: Vec<Energy> = vec![0; n];
            for (source, edges) in outgoing.iter().enumerate() {
                match web.node(source).role {
                    Role::Producer => {
                        for e in edges {
                            next[e.target] = next[e.target].saturating_add(e.capacity);
                        }
                    }
                    Role::Consumer => {
                        let mut budget = prev[source];
                        for e in edges {
                            let given = e.capacity.min(budget);
                            next[e.target] = next[e.target].saturating_add(given);
                            budget -= given;
                        }
                    }
                }
            }
            for (i, energy) in next.iter_mut().enumerate() {
                if web.node(i).role == Role::Producer {
                    *energy = declared[i];
                }
            }

            rounds.push(snapshot(web, round, &next));
            if next == prev {
                converged_at_round = Some(round - 1);
                break;
            }
            prev = next;
        }

        if converged_at_round.is_none() {
            tracing::debug!(species = n, round_cap = cap, "Simulation did not converge");
        }

        SimulationTrace {
            rounds,
            converged: converged_at_round.is_some(),
            converged_at_round,
        }
    }
}

fn snapshot(web: &FoodWeb, index: usize, energies: &[Energy]) -> RoundEnergies {
    let energies: BTreeMap<String, Energy> = web
        .species()
        .iter()
        .zip(energies)
        .map(|(s, &e)| (s.id.clone(), e))
        .collect();
    RoundEnergies { index, energies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::Edge;
    use trophic_data::Species;

    fn edge(source: usize, target: usize, capacity: Energy) -> Edge {
        Edge {
            source,
            target,
            capacity,
        }
    }

    fn chain() -> FoodWeb {
        let mut web = FoodWeb::new(vec![
            Species::producer("P", 1),
            Species::consumer("H", 1, (1, 5), 1, 1),
            Species::consumer("K", 2, (1, 5), 0, 1),
        ])
        .unwrap();
        web.try_push(edge(0, 1, 3)).unwrap();
        web.try_push(edge(1, 2, 2)).unwrap();
        web
    }

    #[test]
    fn test_chain_settles_at_depth() {
        let trace = FeedingSimulator::default().run(&chain());
        assert!(trace.converged);
        assert_eq!(trace.converged_at_round, Some(2));
        assert_eq!(trace.rounds.len(), 4);
        assert_eq!(trace.rounds[0].energies["P"], 3);
        assert_eq!(trace.rounds[1].energies["H"], 3);
        assert_eq!(trace.rounds[1].energies["K"], 0);
        assert_eq!(trace.final_energy("K"), Some(2));
    }

    #[test]
    fn test_forwarding_limited_by_intake() {
        let mut web = FoodWeb::new(vec![
            Species::producer("P", 1),
            Species::consumer("H", 1, (1, 5), 2, 1),
            Species::consumer("A", 2, (1, 5), 0, 1),
            Species::consumer("B", 2, (1, 5), 0, 1),
        ])
        .unwrap();
        web.try_push(edge(0, 1, 3)).unwrap();
        web.try_push(edge(1, 3, 2)).unwrap();
        web.try_push(edge(1, 2, 2)).unwrap();
        let trace = FeedingSimulator::default().run(&web);
        // A is visited first (lower index) and takes its full capacity
        assert_eq!(trace.final_energy("A"), Some(2));
        assert_eq!(trace.final_energy("B"), Some(1));
    }

    #[test]
    fn test_energy_saturates_instead_of_wrapping() {
        let mut web = FoodWeb::new(vec![
            Species::producer("P", 2),
            Species::producer("Q", 1),
            Species::consumer("C", 1, (1, 5), 0, 2),
            Species::consumer("D", 1, (1, 5), 0, 1),
        ])
        .unwrap();
        web.try_push(edge(0, 2, Energy::MAX)).unwrap();
        web.try_push(edge(0, 3, 1)).unwrap();
        web.try_push(edge(1, 2, 1)).unwrap();
        let trace = FeedingSimulator::default().run(&web);
        assert!(trace.converged);
        assert_eq!(trace.rounds[0].energies["P"], Energy::MAX);
        assert_eq!(trace.final_energy("C"), Some(Energy::MAX));
        assert_eq!(trace.final_energy("D"), Some(1));
    }

    #[test]
    fn test_empty_web_is_fixed_point() {
        let web = FoodWeb::new(vec![]).unwrap();
        let trace = FeedingSimulator::default().run(&web);
        assert!(trace.converged);
        assert_eq!(trace.converged_at_round, Some(0));
    }

    #[test]
    fn test_feedback_loop_hits_cap() {
        let mut web = FoodWeb::new(vec![
            Species::producer("P", 1),
            Species::consumer("A", 1, (1, 5), 1, 2),
            Species::consumer("B", 1, (1, 5), 1, 1),
        ])
        .unwrap();
        web.push_unchecked(edge(0, 1, 1));
        web.push_unchecked(edge(1, 2, 5));
        web.push_unchecked(edge(2, 1, 5));
        let sim = FeedingSimulator::default();
        let trace = sim.run(&web);
        assert!(!trace.converged);
        assert_eq!(trace.converged_at_round, None);
        assert_eq!(trace.last_index(), sim.round_cap(&web));
    }
}
