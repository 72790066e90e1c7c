//! Plain data records shared by the puzzle engine and its outer layers.
//!
//! Everything here is pure data: no validation beyond what the type system
//! enforces, no randomness and no simulation. The engine itself lives in
//! `trophic_core`.

pub mod data;

pub use data::edge::FeedingEdge;
pub use data::scenario::{CandidateSolution, Scenario};
pub use data::species::{Energy, Role, Species};
pub use data::trace::{RoundEnergies, SimulationTrace};
pub use data::validation::{ValidationResult, Violation, ViolationKind};
