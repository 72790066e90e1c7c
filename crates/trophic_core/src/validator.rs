//! Candidate validation.
//!
//! Checks run cheapest first and stop at the first violation:
//! 1. structural (degree bounds, simple edge set, trophic order) without simulating,
//! 2. convergence of the feeding simulation,
//! 3. every consumer's final intake against its band, in species id order.

use crate::simulator::{FeedingSimulator, Simulate};
use crate::web::FoodWeb;
use trophic_data::{
    CandidateSolution, Role, Scenario, SimulationTrace, ValidationResult, ViolationKind,
};

/// Validation outcome together with the trace that produced it, when one was run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub result: ValidationResult,
    pub trace: Option<SimulationTrace>,
}

#[derive(Debug, Clone, Default)]
pub struct Validator<S = FeedingSimulator> {
    simulator: S,
}

impl Validator<FeedingSimulator> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Simulate> Validator<S> {
    pub fn with_simulator(simulator: S) -> Self {
        Self { simulator }
    }

    #[must_use]
    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn validate(&self, scenario: &Scenario, candidate: &CandidateSolution) -> ValidationResult {
        self.report(scenario, candidate).result
    }

    /// Validates and keeps the simulation trace for explanation.
    pub fn report(&self, scenario: &Scenario, candidate: &CandidateSolution) -> Report {
        let web = match assemble(scenario, candidate) {
            Ok(web) => web,
            Err(result) => {
                return Report {
                    result,
                    trace: None,
                }
            }
        };
        let trace = self.simulator.run(&web);
        Report {
            result: judge(&web, &trace),
            trace: Some(trace),
        }
    }

    /// Validates a web that is already known to be structurally sound.
    pub fn validate_web(&self, web: &FoodWeb) -> ValidationResult {
        let trace = self.simulator.run(web);
        judge(web, &trace)
    }
}

/// Builds `fixed ∪ candidate`, reporting the first structural breach as a result.
fn assemble(
    scenario: &Scenario,
    candidate: &CandidateSolution,
) -> std::result::Result<FoodWeb, ValidationResult> {
    let mut web = FoodWeb::new(scenario.nodes.clone()).map_err(|_| {
        let dup = first_duplicate_id(scenario).unwrap_or_default();
        ValidationResult::fail(ViolationKind::DegreeViolation, dup, 0)
    })?;
    for edge in scenario.fixed_edges.iter().chain(&candidate.edges) {
        web.try_push_feeding_edge(edge)
            .map_err(|b| ValidationResult::fail(b.kind, b.node_id, 0))?;
    }
    Ok(web)
}

fn first_duplicate_id(scenario: &Scenario) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    scenario
        .nodes
        .iter()
        .find(|s| !seen.insert(s.id.as_str()))
        .map(|s| s.id.clone())
}

fn judge(web: &FoodWeb, trace: &SimulationTrace) -> ValidationResult {
    if !trace.converged {
        let node = unsettled_node(trace).unwrap_or_default();
        return ValidationResult::fail(ViolationKind::Unstable, node, trace.last_index());
    }

    let Some(final_round) = trace.final_round() else {
        return ValidationResult::ok();
    };

    let mut consumers: Vec<_> = web
        .species()
        .iter()
        .filter(|s| s.role == Role::Consumer)
        .collect();
    consumers.sort_by(|a, b| a.id.cmp(&b.id));

    for species in consumers {
        let energy = final_round.energies.get(&species.id).copied().unwrap_or(0);
        if !species.is_sustained_by(energy) {
            return ValidationResult::fail(
                ViolationKind::CapacityViolation,
                species.id.clone(),
                final_round.index,
            );
        }
    }
    ValidationResult::ok()
}

/// First species (by id) whose energy still changed in the last simulated round.
fn unsettled_node(trace: &SimulationTrace) -> Option<String> {
    let n = trace.rounds.len();
    if n < 2 {
        return None;
    }
    let (before, last) = (&trace.rounds[n - 2], &trace.rounds[n - 1]);
    last.energies
        .iter()
        .find(|(id, e)| before.energies.get(*id) != Some(*e))
        .map(|(id, _)| id.clone())
}

/// Validates with the default simulator.
pub fn validate(scenario: &Scenario, candidate: &CandidateSolution) -> ValidationResult {
    Validator::new().validate(scenario, candidate)
}
