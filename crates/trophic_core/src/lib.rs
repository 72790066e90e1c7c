//! # Trophic Core
//!
//! The puzzle engine for Trophic - a feeding-network puzzle where species must
//! be wired together so that every consumer is sustained once energy settles.
//!
//! This crate contains the deterministic engine logic, including:
//! - An arena graph model with reversible edge insertion
//! - Seeded generation of solvable scenarios
//! - Backtracking enumeration of completions with forward checking
//! - A round-based feeding simulator and the validator built on it
//! - Scoring and ranking of valid completions
//! - Configuration, metrics and structured logging
//!
//! ## Architecture
//!
//! - **Explicit configuration**: every component takes its config section as a value
//! - **Resumable search**: enumeration is a stack of choice points behind an `Iterator`
//! - **Parallel processing**: root branches can be spread across Rayon workers
//! - **Deterministic generation**: seeded ChaCha RNG for reproducible puzzles
//!
//! ## Example
//!
//! ```
//! use trophic_core::generator::generate;
//! use trophic_core::search::enumerate;
//! use trophic_core::validator::validate;
//!
//! let scenario = generate(42, 6, 1).unwrap();
//! let first = enumerate(&scenario, Some(1)).unwrap().next().unwrap();
//! assert!(validate(&scenario, &first).valid);
//! ```

/// Configuration records for generator, search, simulation and scoring
pub mod config;
/// Engine error type and result alias
pub mod error;
/// Seeded scenario generation
pub mod generator;
/// Atomic counters and logging setup
pub mod metrics;
/// Solution scoring and ranking
pub mod scoring;
/// Backtracking enumeration of completions
pub mod search;
/// Round-based feeding simulation
pub mod simulator;
/// Structural and sustainability validation of candidates
pub mod validator;
/// Arena graph model with invariant checks
pub mod web;

pub use config::PuzzleConfig;
pub use error::{Result, TrophicError};
pub use generator::{generate, Generator};
pub use scoring::{rank, score, Scorer, SolutionScore};
pub use search::{enumerate, CancellationToken, Search, Solutions};
pub use simulator::{FeedingSimulator, Simulate};
pub use validator::{validate, Report, Validator};
pub use web::FoodWeb;
