//! Configuration for the puzzle engine.
//!
//! The engine never reads files or the environment itself: callers build a
//! [`PuzzleConfig`] (usually via [`PuzzleConfig::from_toml`]) and hand the
//! relevant section to each component explicitly.
//!
//! ## Example `puzzle.toml`
//!
//! ```toml
//! [generator]
//! max_attempts = 50
//! max_trophic_level = 3
//!
//! [search]
//! validate_leaves = true
//!
//! [simulation]
//! round_cap_multiplier = 2
//! ```

use serde::{Deserialize, Serialize};
use trophic_data::Energy;

/// Scenario generator parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Bounded retry budget before `GenerationExhausted`.
    pub max_attempts: usize,
    /// Highest trophic level a consumer may be placed at.
    pub max_trophic_level: u32,
    /// Fraction of species that are producers (at least one is always placed).
    pub producer_fraction: f32,
    /// Inclusive range of `max_out_degree` drawn for each species.
    pub out_degree_range: (u32, u32),
    /// Most feeding sources a consumer is connected to in the hidden solution.
    pub max_sources: u32,
    /// Extra in-degree slack beyond the hidden solution's in-degree.
    pub in_degree_slack: u32,
    /// Extra energy added on top of the in-degree when drawing `min_intake`.
    pub intake_floor_spread: Energy,
    /// Width drawn for `max_intake - min_intake`.
    pub intake_band_width: Energy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            max_trophic_level: 3,
            producer_fraction: 0.3,
            out_degree_range: (1, 3),
            max_sources: 2,
            in_degree_slack: 1,
            intake_floor_spread: 2,
            intake_band_width: 3,
        }
    }
}

impl GeneratorConfig {
    /// Checks the ranges the generator draws from.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_attempts > 0, "Max attempts must be positive");
        anyhow::ensure!(self.max_attempts <= 10_000, "Max attempts too large (max 10000)");
        anyhow::ensure!(self.max_trophic_level >= 1, "Max trophic level must be at least 1");
        anyhow::ensure!(
            self.producer_fraction > 0.0 && self.producer_fraction < 1.0,
            "Producer fraction must be in (0.0, 1.0)"
        );
        anyhow::ensure!(
            self.out_degree_range.0 >= 1 && self.out_degree_range.0 <= self.out_degree_range.1,
            "Out degree range must be non-empty and start at 1 or more"
        );
        anyhow::ensure!(self.max_sources >= 1, "Max sources must be at least 1");
        anyhow::ensure!(self.in_degree_slack <= 64, "In-degree slack too large (max 64)");
        anyhow::ensure!(
            self.intake_floor_spread <= 10_000 && self.intake_band_width <= 10_000,
            "Intake spread and band width must be at most 10000"
        );
        Ok(())
    }
}

/// Solution search parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Yield only completions that pass full validation.
    pub validate_leaves: bool,
    /// Default result limit when the caller passes none.
    pub default_limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            validate_leaves: true,
            default_limit: None,
        }
    }
}

/// Feeding simulator parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Round cap is this multiple of the species count.
    pub round_cap_multiplier: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            round_cap_multiplier: 2,
        }
    }
}

impl SimulationConfig {
    /// Hard round cap for a web of `node_count` species (never below 1).
    #[must_use]
    pub fn round_cap(&self, node_count: usize) -> usize {
        (self.round_cap_multiplier * node_count).max(1)
    }
}

/// Weights of the solution score.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub caloric_efficiency: f64,
    pub relationship_complexity: f64,
    pub producer_ratio: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            caloric_efficiency: 0.4,
            relationship_complexity: 0.4,
            producer_ratio: 0.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PuzzleConfig {
    pub generator: GeneratorConfig,
    pub search: SearchConfig,
    pub simulation: SimulationConfig,
    pub scoring: ScoringConfig,
}

impl PuzzleConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.generator.validate()?;

        anyhow::ensure!(
            self.simulation.round_cap_multiplier >= 1,
            "Round cap multiplier must be at least 1"
        );
        if let Some(limit) = self.search.default_limit {
            anyhow::ensure!(limit > 0, "Default search limit must be positive");
        }

        let s = &self.scoring;
        for (name, w) in [
            ("caloric efficiency", s.caloric_efficiency),
            ("relationship complexity", s.relationship_complexity),
            ("producer ratio", s.producer_ratio),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&w),
                "Weight for {name} must be in [0.0, 1.0]"
            );
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing sections fall back to defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable hash of every parameter that influences generated puzzles.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.generator).as_bytes());
        hasher.update(format!("{:?}", self.simulation).as_bytes());
        hex::encode(hasher.finalize())
    }
}
