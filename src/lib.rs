//! # Trophic
//!
//! Feeding-network puzzles: generate a partial food web, search for every
//! sustainable completion, and explain why a proposed completion fails.
//!
//! The heavy lifting lives in the workspace crates; this crate wires them
//! together behind [`engine::PuzzleEngine`] and re-exports them under
//! [`model`] for outer layers.

pub mod engine;
pub mod model;

pub use engine::{init_logging, PuzzleEngine};
