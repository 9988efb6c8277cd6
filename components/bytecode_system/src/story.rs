//! Top-level compiled story document

use crate::codec::Codec;
use crate::error::{DecodeError, Result};
use crate::json::{self, JsonObject, JsonValue, JsonWriter};
use crate::object::{NodeId, Tree};
use std::io::{self, Write};
use tracing::debug;

/// Format version this build writes
pub const CURRENT_VERSION: i32 = 12;
/// Oldest format version this build still reads
pub const MINIMUM_COMPATIBLE_VERSION: i32 = 11;

const VERSION_KEY: &str = "inkVersion";
const ROOT_KEY: &str = "root";

/// A compiled story: `{"inkVersion": <int>, "root": <container>}`
#[derive(Debug, Clone)]
pub struct StoryDocument {
    /// Arena holding the story content
    pub tree: Tree,
    /// Root content container
    pub root: NodeId,
    /// Format version the document was written with
    pub version: i32,
}

impl StoryDocument {
    /// Wrap a compiled tree at the current format version
    pub fn new(tree: Tree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            version: CURRENT_VERSION,
        }
    }

    /// Names of the flows held as named-only content of the root
    pub fn flow_names(&self) -> Vec<&str> {
        self.tree
            .container(self.root)
            .map(|c| c.named_only_content().map(|(name, _)| name).collect())
            .unwrap_or_default()
    }

    /// Encode as a generic value tree
    pub fn to_json(&self, codec: &Codec) -> JsonValue {
        JsonObject::new()
            .with(VERSION_KEY, self.version)
            .with(ROOT_KEY, codec.write_runtime_container(&self.tree, self.root, false))
            .into()
    }

    /// Stream the document into a writer
    pub fn write_to<W: Write>(&self, codec: &Codec, writer: &mut JsonWriter<W>) -> io::Result<()> {
        writer.write_object(|w| {
            w.write_int_property(VERSION_KEY, self.version)?;
            w.write_property(ROOT_KEY, |w| {
                codec.stream_runtime_container(w, &self.tree, self.root, false)
            })
        })?;
        debug!(bytes = writer.bytes_written(), "story written");
        Ok(())
    }

    /// Encode to JSON text
    pub fn to_json_string(&self, codec: &Codec) -> io::Result<String> {
        let mut writer = JsonWriter::new();
        self.write_to(codec, &mut writer)?;
        Ok(writer.into_string())
    }

    /// Decode from a generic value tree
    pub fn from_json(codec: &Codec, value: &JsonValue) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| DecodeError::ExpectedObject(truncated(value)))?;

        let version = match obj.get(VERSION_KEY) {
            Some(JsonValue::Int(v)) => *v,
            Some(_) => {
                return Err(DecodeError::InvalidField {
                    field: VERSION_KEY,
                    token: truncated(value),
                })
            }
            None => {
                return Err(DecodeError::MissingField {
                    field: VERSION_KEY,
                    token: truncated(value),
                })
            }
        };
        if version > CURRENT_VERSION {
            return Err(DecodeError::VersionTooNew {
                found: version,
                current: CURRENT_VERSION,
            });
        }
        if version < MINIMUM_COMPATIBLE_VERSION {
            return Err(DecodeError::VersionTooOld {
                found: version,
                minimum: MINIMUM_COMPATIBLE_VERSION,
            });
        }

        let root_token = obj.get(ROOT_KEY).ok_or_else(|| DecodeError::MissingField {
            field: ROOT_KEY,
            token: truncated(value),
        })?;
        let (tree, root) = codec.decode(root_token)?;
        if tree.container(root).is_none() {
            return Err(DecodeError::RootNotContainer(root_token.to_json_string()));
        }

        debug!(version, nodes = tree.len(), "story decoded");
        Ok(Self { tree, root, version })
    }

    /// Decode from JSON text
    pub fn from_str(codec: &Codec, text: &str) -> Result<Self> {
        Self::from_json(codec, &json::from_str(text)?)
    }
}

// Whole documents are too large to quote in an error
fn truncated(value: &JsonValue) -> String {
    const LIMIT: usize = 200;
    let text = value.to_json_string();
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
