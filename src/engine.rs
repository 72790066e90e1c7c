//! One configured entry point over generator, search, validator and scorer.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use trophic_core::config::PuzzleConfig;
use trophic_core::error::Result;
use trophic_core::generator::Generator;
use trophic_core::metrics::{Metrics, MetricsSnapshot};
use trophic_core::scoring::{Scorer, SolutionScore};
use trophic_core::search::{CancellationToken, Search, Solutions};
use trophic_core::simulator::FeedingSimulator;
use trophic_core::validator::{Report, Validator};
use trophic_data::{CandidateSolution, Scenario};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}

/// Components built from one [`PuzzleConfig`], sharing one set of counters.
#[derive(Debug, Clone)]
pub struct PuzzleEngine {
    config: PuzzleConfig,
    metrics: Arc<Metrics>,
    generator: Generator,
    search: Search,
    validator: Validator,
    scorer: Scorer,
}

impl PuzzleEngine {
    pub fn new(config: PuzzleConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let metrics = Arc::new(Metrics::new());
        let validator =
            Validator::with_simulator(FeedingSimulator::new(config.simulation.clone()));

        let engine = Self {
            generator: Generator::new(config.generator.clone())
                .with_simulation(config.simulation.clone())
                .with_metrics(metrics.clone()),
            search: Search::new(config.search.clone())
                .with_simulation(config.simulation.clone())
                .with_metrics(metrics.clone()),
            scorer: Scorer::with_validator(config.scoring.clone(), validator.clone()),
            validator,
            metrics,
            config,
        };
        tracing::info!(fingerprint = %engine.config.fingerprint(), "Puzzle engine ready");
        Ok(engine)
    }

    /// Loads a TOML configuration file; missing sections use defaults.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = PuzzleConfig::from_toml(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Self::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn generate(&self, seed: u64, node_count: usize, difficulty: usize) -> Result<Scenario> {
        self.generator.generate(seed, node_count, difficulty)
    }

    pub fn solutions(&self, scenario: &Scenario, limit: Option<usize>) -> Result<Solutions> {
        self.search.enumerate(scenario, limit)
    }

    /// Like [`PuzzleEngine::solutions`], stopping once `token` is cancelled.
    pub fn solutions_with_cancel(
        &self,
        scenario: &Scenario,
        limit: Option<usize>,
        token: CancellationToken,
    ) -> Result<Solutions> {
        self.search
            .clone()
            .with_cancel(token)
            .enumerate(scenario, limit)
    }

    pub fn solve_parallel(
        &self,
        scenario: &Scenario,
        limit: Option<usize>,
    ) -> Result<Vec<CandidateSolution>> {
        self.search.enumerate_parallel(scenario, limit)
    }

    /// Validates a player's answer and keeps the trace for explanation.
    pub fn check(&self, scenario: &Scenario, candidate: &CandidateSolution) -> Report {
        let report = self.validator.report(scenario, candidate);
        if report.trace.is_some() {
            self.metrics.record_simulation();
        }
        if let Some(violation) = &report.result.violation {
            tracing::debug!(%violation, "Candidate rejected");
        }
        report
    }

    pub fn rank<I>(
        &self,
        scenario: &Scenario,
        candidates: I,
    ) -> Vec<(CandidateSolution, SolutionScore)>
    where
        I: IntoIterator<Item = CandidateSolution>,
    {
        self.scorer.rank(scenario, candidates)
    }

    /// Highest scoring completion among the first `limit` found.
    pub fn best(
        &self,
        scenario: &Scenario,
        limit: Option<usize>,
    ) -> Result<Option<(CandidateSolution, SolutionScore)>> {
        let found = self.solutions(scenario, limit)?;
        Ok(self.rank(scenario, found).into_iter().next())
    }

    /// Logs the engine's counters as one structured line.
    pub fn log_summary(&self) {
        self.metrics.log_summary();
    }
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        let config = PuzzleConfig::default();
        let metrics = Arc::new(Metrics::new());
        Self {
            generator: Generator::default().with_metrics(metrics.clone()),
            search: Search::default().with_metrics(metrics.clone()),
            validator: Validator::new(),
            scorer: Scorer::new(config.scoring.clone()),
            metrics,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puzzle.toml");
        std::fs::write(&path, "[generator]\nmax_attempts = 20\n").unwrap();
        let engine = PuzzleEngine::from_toml_file(&path).unwrap();
        assert_eq!(engine.config().generator.max_attempts, 20);
        assert!(engine.config().search.validate_leaves);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PuzzleConfig::default();
        config.generator.max_attempts = 0;
        assert!(PuzzleEngine::new(config).is_err());
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let err = PuzzleEngine::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(format!("{err:#}").contains("here.toml"));
    }

    #[test]
    fn test_engine_shares_metrics() {
        let engine = PuzzleEngine::default();
        let scenario = engine.generate(4, 6, 1).unwrap();
        let first = engine.solutions(&scenario, Some(1)).unwrap().next().unwrap();
        assert!(engine.check(&scenario, &first).result.valid);

        let m = engine.metrics();
        assert_eq!(m.scenarios_generated, 1);
        assert_eq!(m.solutions_yielded, 1);
        assert!(m.simulations_run >= 1);
    }

    #[test]
    fn test_best_is_valid() {
        let engine = PuzzleEngine::default();
        let scenario = engine.generate(9, 6, 2).unwrap();
        let (best, score) = engine.best(&scenario, Some(20)).unwrap().unwrap();
        assert!(engine.check(&scenario, &best).result.valid);
        assert!(score.total > 0.0);
    }
}
