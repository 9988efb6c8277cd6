//! Parsing JSON text into [`JsonValue`] trees

use super::value::{JsonObject, JsonValue};
use crate::error::{DecodeError, Result};
use std::io::Read;

/// Parse a complete JSON document
pub fn from_str(text: &str) -> Result<JsonValue> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a JSON document read from `reader`
pub fn from_reader<R: Read>(reader: R) -> Result<JsonValue> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse a document whose top level must be a mapping
pub fn text_to_object(text: &str) -> Result<JsonObject> {
    match from_str(text)? {
        JsonValue::Object(obj) => Ok(obj),
        other => Err(DecodeError::ExpectedObject(other.to_json_string())),
    }
}
