//! JSON input documents → entities.
//!
//! Both documents are arrays. Every entry is constructed eagerly, and the
//! first malformed entry aborts the load with its index.

use serde_json::Value;

use crate::error::CheckError;
use crate::model::{CheckMode, Expectation, Fields, ObservedMessage};

const MESSAGE: &str = "message";
const EXPECTATION: &str = "expectation";

/// Parse a recorded-messages document.
pub fn parse_messages(json: &str) -> Result<Vec<ObservedMessage>, CheckError> {
    entries(json, MESSAGE)?
        .iter()
        .enumerate()
        .map(|(i, v)| ObservedMessage::from_json(i, v))
        .collect()
}

/// Parse an expectations document.
pub fn parse_expectations(json: &str) -> Result<Vec<Expectation>, CheckError> {
    entries(json, EXPECTATION)?
        .iter()
        .enumerate()
        .map(|(i, v)| Expectation::from_json(i, v))
        .collect()
}

fn entries(json: &str, what: &'static str) -> Result<Vec<Value>, CheckError> {
    let doc: Value = serde_json::from_str(json).map_err(|e| CheckError::Json(e.to_string()))?;
    match doc {
        Value::Array(items) => Ok(items),
        _ => Err(CheckError::NotAnArray { what }),
    }
}

impl ObservedMessage {
    /// `{"name": .., "time": .., "message": {..}}`
    pub fn from_json(index: usize, entry: &Value) -> Result<Self, CheckError> {
        let build = || -> Result<Self, CheckError> {
            Ok(Self::new(name(entry)?, number(entry, "time")?, fields(entry)?))
        };
        build().map_err(|e| e.at(MESSAGE, index))
    }
}

impl Expectation {
    /// `{"name", "time", "tolerance", "checkMode", "fieldsToCheck", "message"}`
    pub fn from_json(index: usize, entry: &Value) -> Result<Self, CheckError> {
        let build = || -> Result<Self, CheckError> {
            let check_mode = CheckMode::parse(string(entry, "checkMode")?)?;
            let fields_to_check = string_list(entry, "fieldsToCheck")?;
            Self::new(
                name(entry)?,
                number(entry, "time")?,
                number(entry, "tolerance")?,
                check_mode,
                &fields(entry)?,
                fields_to_check.as_slice(),
            )
        };
        build().map_err(|e| e.at(EXPECTATION, index))
    }
}

fn require<'a>(entry: &'a Value, key: &'static str) -> Result<&'a Value, CheckError> {
    entry.get(key).ok_or(CheckError::MissingKey(key))
}

fn string<'a>(entry: &'a Value, key: &'static str) -> Result<&'a str, CheckError> {
    require(entry, key)?
        .as_str()
        .ok_or(CheckError::InvalidType { key, expected: "a string" })
}

fn name(entry: &Value) -> Result<String, CheckError> {
    string(entry, "name").map(str::to_string)
}

/// Numbers or numeric strings (`"100"`).
fn number(entry: &Value, key: &'static str) -> Result<f64, CheckError> {
    let value = require(entry, key)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| !n.is_nan())
        .ok_or_else(|| CheckError::NumberParse { key, value: value.to_string() })
}

fn fields(entry: &Value) -> Result<Fields, CheckError> {
    match require(entry, "message")? {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(CheckError::InvalidType { key: "message", expected: "an object" }),
    }
}

fn string_list(entry: &Value, key: &'static str) -> Result<Vec<String>, CheckError> {
    let invalid = || CheckError::InvalidType { key, expected: "an array of strings" };
    require(entry, key)?
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}
