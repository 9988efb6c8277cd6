//! Story bytecode: node tree, opcodes and the JSON wire format
//!
//! This crate provides the intermediate representation compiled stories
//! are built from and the codec that persists it.
//!
//! # Features
//!
//! - Arena tree of runtime objects with single-parent ownership
//! - Paths that address any node by name or position
//! - Closed opcode alphabet (values, control commands, diverts, ...)
//! - JSON codec with a streaming writer for large save states
//!
//! # Example
//!
//! ```
//! use bytecode_system::{Codec, Container, ControlCommand, Opcode, StoryDocument, Tree, Value};
//!
//! let mut tree = Tree::new();
//! let root = tree.add(Container::new());
//! let opcodes: [Opcode; 3] = [Value::Int(1).into(), Value::Int(6).into(), ControlCommand::Random.into()];
//! for opcode in opcodes {
//!     let id = tree.add(opcode);
//!     tree.add_content(root, id).unwrap();
//! }
//!
//! let codec = Codec::new().unwrap();
//! let json = codec.write_runtime_object(&tree, root);
//! assert_eq!(json.to_string(), r#"[1,6,"rnd",null]"#);
//!
//! // Encode the whole document and read it back
//! let text = StoryDocument::new(tree, root).to_json_string(&codec).unwrap();
//! let restored = StoryDocument::from_str(&codec, &text).unwrap();
//! assert_eq!(restored.tree.content(restored.root).len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod container;
pub mod control_command;
pub mod divert;
pub mod error;
pub mod json;
pub mod native;
pub mod object;
pub mod opcode;
pub mod path;
pub mod state;
pub mod story;
pub mod value;

// Re-export main types at crate root
pub use codec::{Codec, CommandTokens};
pub use container::{Container, CountFlags};
pub use control_command::ControlCommand;
pub use divert::{Divert, DivertTarget, PushPopType};
pub use error::{DecodeError, Result, TreeError};
pub use json::{JsonObject, JsonValue, JsonWriter};
pub use native::NativeFunctionCall;
pub use object::{Node, NodeId, Tree};
pub use opcode::{Choice, ChoicePoint, Opcode, Tag, VariableAssignment, VariableReference};
pub use path::{Component, Path};
pub use state::SaveState;
pub use story::{StoryDocument, CURRENT_VERSION, MINIMUM_COMPATIBLE_VERSION};
pub use value::{StringValue, Value, VariablePointer};
