//! Scenario generation.
//!
//! A full sustainable network is built first, checked with the simulator, and
//! then `difficulty` of its edges are hidden. The hidden edges are always a
//! valid completion, so every returned scenario is solvable.
//!
//! Construction keeps every edge fully delivered: producers emit their full
//! capacity, and a consumer is only used as a source up to the energy it will
//! itself receive, so its outgoing capacities never exceed its intake.

use crate::config::{GeneratorConfig, SimulationConfig};
use crate::error::{Result, TrophicError};
use crate::metrics::Metrics;
use crate::simulator::FeedingSimulator;
use crate::validator::Validator;
use crate::web::{Edge, FoodWeb};
use rand::seq::index::sample;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use trophic_data::{Energy, Scenario, Species};

#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    simulation: SimulationConfig,
    metrics: Option<Arc<Metrics>>,
}

/// Species being placed, before its final bounds are known.
struct Draft {
    level: u32,
    max_out: u32,
    out_used: u32,
    /// Energy a consumer can still forward without starving an outgoing edge.
    forward_budget: Energy,
    intake: Option<(Energy, Energy)>,
    max_in: u32,
}

impl Generator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds a solvable scenario with `node_count` species and `difficulty` hidden edges.
    ///
    /// Deterministic for a given seed and configuration. An out-of-range
    /// configuration is rejected before any attempt is made.
    pub fn generate(&self, seed: u64, node_count: usize, difficulty: usize) -> Result<Scenario> {
        self.config
            .validate()
            .map_err(|e| TrophicError::invalid(e.to_string()))?;
        if node_count < 2 {
            return Err(TrophicError::invalid(format!(
                "need at least 2 species, got {node_count}"
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let validator = Validator::with_simulator(FeedingSimulator::new(self.simulation.clone()));
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            let Some(web) = self.build_network(&mut rng, node_count) else {
                tracing::debug!(seed, attempt, "Network construction dead-ended");
                continue;
            };
            if web.edge_count() < difficulty {
                tracing::debug!(
                    seed,
                    attempt,
                    edges = web.edge_count(),
                    difficulty,
                    "Too few edges to hide"
                );
                continue;
            }
            let check = validator.validate_web(&web);
            if !check.valid {
                tracing::debug!(
                    seed,
                    attempt,
                    violation = ?check.violation,
                    "Network not sustainable"
                );
                continue;
            }

            let hidden = sample(&mut rng, web.edge_count(), difficulty);
            let mut is_hidden = vec![false; web.edge_count()];
            for i in hidden.iter() {
                is_hidden[i] = true;
            }
            let fixed_edges = web
                .edges()
                .iter()
                .zip(&is_hidden)
                .filter(|(_, hidden)| !**hidden)
                .map(|(e, _)| web.to_feeding_edge(e))
                .collect();

            let scenario = Scenario {
                nodes: web.species().to_vec(),
                fixed_edges,
                required_edge_count: difficulty,
                seed,
            };
            tracing::info!(
                seed,
                attempt,
                species = node_count,
                fixed = scenario.fixed_edges.len(),
                hidden = difficulty,
                "Scenario generated"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_generation(attempt, true);
            }
            return Ok(scenario);
        }

        tracing::warn!(seed, attempts, node_count, difficulty, "Scenario generation exhausted");
        if let Some(metrics) = &self.metrics {
            metrics.record_generation(attempts, false);
        }
        Err(TrophicError::GenerationExhausted { attempts })
    }

    /// Places species level by level, wiring each consumer to lower-level sources.
    fn build_network<R: Rng>(&self, rng: &mut R, node_count: usize) -> Option<FoodWeb> {
        let cfg = &self.config;
        let producers = ((node_count as f32 * cfg.producer_fraction).round() as usize)
            .clamp(1, node_count - 1);
        let consumers = node_count - producers;
        let top_level = cfg.max_trophic_level.min(consumers as u32).max(1);

        let mut levels: Vec<u32> = (0..consumers).map(|_| rng.gen_range(1..=top_level)).collect();
        levels.sort_unstable();

        let (lo, hi) = cfg.out_degree_range;
        let mut drafts: Vec<Draft> = Vec::with_capacity(node_count);
        for _ in 0..producers {
            drafts.push(Draft {
                level: 0,
                max_out: rng.gen_range(lo..=hi),
                out_used: 0,
                forward_budget: Energy::MAX,
                intake: None,
                max_in: 0,
            });
        }

        let mut edges = Vec::new();
        for level in levels {
            let target = drafts.len();
            let sources: Vec<usize> = (0..target)
                .filter(|&s| {
                    let d = &drafts[s];
                    d.level < level && d.out_used < d.max_out && d.forward_budget > 0
                })
                .collect();
            if sources.is_empty() {
                return None;
            }

            let k = rng.gen_range(1..=(cfg.max_sources as usize).min(sources.len()));
            let chosen: Vec<usize> = sample(rng, sources.len(), k)
                .iter()
                .map(|i| sources[i])
                .collect();

            let mut min_intake = k as Energy + rng.gen_range(0..=cfg.intake_floor_spread);
            let max_intake = min_intake + rng.gen_range(0..=cfg.intake_band_width);
            let wanted = rng.gen_range(min_intake..=max_intake);

            let shares = split_intake(rng, wanted, &chosen, &drafts);
            let intake: Energy = shares.iter().sum();
            min_intake = min_intake.min(intake);

            for (&source, &share) in chosen.iter().zip(&shares) {
                let d = &mut drafts[source];
                d.out_used += 1;
                if d.intake.is_some() {
                    d.forward_budget -= share;
                }
                edges.push(Edge {
                    source,
                    target,
                    capacity: share,
                });
            }

            drafts.push(Draft {
                level,
                max_out: rng.gen_range(lo..=hi),
                out_used: 0,
                forward_budget: intake,
                intake: Some((min_intake, max_intake)),
                max_in: (k as u32).saturating_add(rng.gen_range(0..=cfg.in_degree_slack)),
            });
        }

        let species = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| match d.intake {
                None => Species::producer(format!("P{:02}", i + 1), d.max_out),
                Some(band) => Species::consumer(
                    format!("C{:02}", i + 1 - producers),
                    d.level,
                    band,
                    d.max_out,
                    d.max_in,
                ),
            })
            .collect();

        let mut web = FoodWeb::new(species).ok()?;
        for edge in edges {
            web.try_push(edge).ok()?;
        }
        Some(web)
    }
}

/// Splits `wanted` energy over the chosen sources, one unit minimum each.
///
/// Consumer sources cap their share at their forward budget, so the result
/// may sum to less than `wanted`; it never sums to less than the source count.
fn split_intake<R: Rng>(
    rng: &mut R,
    wanted: Energy,
    chosen: &[usize],
    drafts: &[Draft],
) -> Vec<Energy> {
    let mut shares = vec![1; chosen.len()];
    let mut left = wanted.saturating_sub(chosen.len() as Energy);
    while left > 0 {
        let open: Vec<usize> = (0..chosen.len())
            .filter(|&i| shares[i] < drafts[chosen[i]].forward_budget)
            .collect();
        if open.is_empty() {
            break;
        }
        let pick = open[rng.gen_range(0..open.len())];
        shares[pick] += 1;
        left -= 1;
    }
    shares
}

/// Builds a scenario with the default configuration.
pub fn generate(seed: u64, node_count: usize, difficulty: usize) -> Result<Scenario> {
    Generator::default().generate(seed, node_count, difficulty)
}
