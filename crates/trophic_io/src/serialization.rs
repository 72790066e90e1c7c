//! JSON and share-code encoding of puzzle records.
//!
//! A share code is the compact JSON of a record, hex encoded, so a scenario or
//! an answer can be pasted as a single token.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON encoding failed: {e}")))
}

pub fn to_json_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON encoding failed: {e}")))
}

/// Decodes a record. Blank input is a validation error, not a parse error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON document"));
    }
    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON decoding failed: {e}")))
}

pub fn to_share_code<T: Serialize>(data: &T) -> Result<String> {
    Ok(hex::encode(to_json(data)?.as_bytes()))
}

pub fn from_share_code<T>(code: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let code = code.trim();
    if code.is_empty() {
        return Err(IoError::validation("Empty share code"));
    }
    let bytes =
        hex::decode(code).map_err(|e| IoError::validation(format!("Invalid share code: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| IoError::validation(format!("Share code is not UTF-8: {e}")))?;
    from_json(&json)
}

/// Cheap syntactic check; does not decode the record.
#[must_use]
pub fn is_valid_share_code(code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && hex::decode(code).is_ok()
}

pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing {}", path.as_ref().display()))
    })?;
    tracing::debug!(path = %path.as_ref().display(), "Record written");
    Ok(())
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading {}", path.as_ref().display()))
    })?;
    from_json(&json).map_err(|e| e.with_context(format!("parsing {}", path.as_ref().display())))
}
