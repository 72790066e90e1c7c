//! # Trophic IO
//!
//! Exchange layer for Trophic puzzles.
//!
//! This crate provides:
//! - Structured error handling with a dedicated error type
//! - JSON encoding of scenarios, candidates, traces and validation results
//! - Hex share codes for pasting a record as one token
//! - Checked scenario import/export and scenario fingerprints

/// Error types and result alias for exchange operations
pub mod error;
/// Checked scenario files, share-code import and fingerprints
pub mod puzzle;
/// JSON and share-code helpers
pub mod serialization;

pub use error::{IoError, Result};
pub use puzzle::{
    check_scenario, load_scenario, save_scenario, scenario_fingerprint, scenario_from_share_code,
};
pub use serialization::{
    from_json, from_share_code, is_valid_share_code, read_json_file, to_json, to_json_pretty,
    to_share_code, write_json_file,
};
