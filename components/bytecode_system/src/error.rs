//! Error types for tree manipulation and decoding

use crate::object::NodeId;
use thiserror::Error;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Structural misuse of a [`Tree`](crate::Tree)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node was expected to be a container
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),

    /// A sibling with the same name already exists
    #[error("container already has content named '{0}'")]
    DuplicateName(String),

    /// Named-only content must be a container with a non-empty name
    #[error("node {0} has no name and cannot be added as named-only content")]
    UnnamedContent(NodeId),

    /// The child is the container itself or one of its ancestors
    #[error("cannot add node {0} inside itself")]
    Cycle(NodeId),

    /// Positional slot does not exist
    #[error("index {index} out of range for container with {len} items")]
    IndexOutOfRange {
        /// Requested slot
        index: usize,
        /// Number of positional items
        len: usize,
    },

    /// Containers own children and cannot be swapped in place
    #[error("node {0} is a container and cannot be replaced in place")]
    ContainerReplacement(NodeId),
}

/// Failure while turning JSON into runtime objects.
///
/// Every variant aborts the decode call that produced it; the offending
/// token is rendered as compact JSON so incompatible save formats can be
/// diagnosed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No opcode has this wire shape
    #[error("failed to convert token to runtime object: {0}")]
    UnrecognizedToken(String),

    /// A known key carried a value of the wrong type
    #[error("field '{field}' has the wrong type in {token}")]
    InvalidField {
        /// Offending key
        field: &'static str,
        /// The whole mapping the key belongs to
        token: String,
    },

    /// A required key is absent
    #[error("missing field '{field}' in {token}")]
    MissingField {
        /// Missing key
        field: &'static str,
        /// The mapping that lacks it
        token: String,
    },

    /// A container array had no terminator element
    #[error("container array is missing its terminator")]
    MissingTerminator,

    /// The last element of a container array was neither null nor a mapping
    #[error("invalid container terminator: {0}")]
    InvalidTerminator(String),

    /// Named-only content decoded to something other than a container
    #[error("named content '{0}' is not a container")]
    NamedContentNotContainer(String),

    /// The document root is not a mapping
    #[error("expected a JSON object at top level, found {0}")]
    ExpectedObject(String),

    /// The document's root content is not a container
    #[error("root content is not a container: {0}")]
    RootNotContainer(String),

    /// Document written by a newer format version
    #[error("format version {found} is newer than the supported version {current}")]
    VersionTooNew {
        /// Version recorded in the document
        found: i32,
        /// Version this build writes
        current: i32,
    },

    /// Document written by a format version too old to load
    #[error("format version {found} is older than the minimum compatible version {minimum}")]
    VersionTooOld {
        /// Version recorded in the document
        found: i32,
        /// Oldest version this build reads
        minimum: i32,
    },

    /// A control command has no wire token
    #[error("control command {0} is not accounted for in serialization")]
    IncompleteCommandTable(String),

    /// Two control commands share a wire token
    #[error("wire token '{0}' is shared by more than one control command")]
    DuplicateCommandToken(String),

    /// Decoded content violated tree invariants (e.g. duplicate names)
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Text was not well-formed JSON
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
