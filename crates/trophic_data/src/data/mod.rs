//! Core data structures for the feeding-network puzzle.

pub mod edge;
pub mod scenario;
pub mod species;
pub mod trace;
pub mod validation;
