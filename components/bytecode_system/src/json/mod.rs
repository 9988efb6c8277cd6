//! JSON support: the generic value tree, a streaming writer and a reader

pub mod reader;
pub mod value;
pub mod writer;

pub use reader::{from_reader, from_str, text_to_object};
pub use value::{JsonObject, JsonValue};
pub use writer::{format_float, JsonWriter};
