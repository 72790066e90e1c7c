//! Scenario import and export for outer layers.
//!
//! Imported scenarios are checked against the graph model before they are
//! handed back, so a caller never starts a search on a broken puzzle.

use crate::error::{IoError, Result};
use crate::serialization::{from_share_code, read_json_file, to_json, write_json_file};
use sha2::{Digest, Sha256};
use std::path::Path;
use trophic_core::web::FoodWeb;
use trophic_data::Scenario;

/// Stable identity of a scenario: hex SHA-256 of its compact JSON.
pub fn scenario_fingerprint(scenario: &Scenario) -> Result<String> {
    let json = to_json(scenario)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

/// Rejects scenarios whose fixed edges already break a structural invariant.
pub fn check_scenario(scenario: &Scenario) -> Result<()> {
    if scenario.nodes.is_empty() {
        return Err(IoError::validation("Scenario has no species"));
    }
    FoodWeb::from_scenario(scenario).map_err(|e| IoError::validation(e.to_string()))?;
    Ok(())
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let scenario: Scenario = read_json_file(&path)?;
    check_scenario(&scenario)
        .map_err(|e| e.with_context(format!("checking {}", path.as_ref().display())))?;
    tracing::info!(
        path = %path.as_ref().display(),
        species = scenario.nodes.len(),
        required = scenario.required_edge_count,
        "Scenario loaded"
    );
    Ok(scenario)
}

pub fn save_scenario<P: AsRef<Path>>(scenario: &Scenario, path: P) -> Result<()> {
    check_scenario(scenario)?;
    write_json_file(scenario, path)
}

/// Decodes and checks a scenario share code.
pub fn scenario_from_share_code(code: &str) -> Result<Scenario> {
    let scenario: Scenario = from_share_code(code)?;
    check_scenario(&scenario)?;
    Ok(scenario)
}
