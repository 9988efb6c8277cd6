//! Persisted mid-story state

use crate::codec::Codec;
use crate::error::{DecodeError, Result};
use crate::json::{self, JsonObject, JsonValue, JsonWriter};
use crate::object::{NodeId, Tree};
use crate::opcode::Choice;
use std::io::{self, Write};
use tracing::debug;

const TURN_INDEX_KEY: &str = "turnIdx";
const STORY_SEED_KEY: &str = "storySeed";
const CURRENT_CHOICES_KEY: &str = "currentChoices";
const EVAL_STACK_KEY: &str = "evalStack";
const VARIABLES_KEY: &str = "variablesState";
const VISIT_COUNTS_KEY: &str = "visitCounts";
const TURN_INDICES_KEY: &str = "turnIndices";

/// Snapshot of a running story.
///
/// Runtime objects on the evaluation stack and in variables live in
/// `tree`; choices are plain records.
#[derive(Debug, Clone, Default)]
pub struct SaveState {
    /// Arena for evaluation stack entries and variable values
    pub tree: Tree,
    /// Current turn
    pub turn_index: i32,
    /// Seed of the story's random generator
    pub story_seed: i32,
    /// Choices presented and not yet taken
    pub current_choices: Vec<Choice>,
    /// Evaluation stack, bottom first
    pub eval_stack: Vec<NodeId>,
    /// Global variables
    pub variables: Vec<(String, NodeId)>,
    /// Visit count per container path
    pub visit_counts: Vec<(String, i32)>,
    /// Turn of the latest visit per container path
    pub turn_indices: Vec<(String, i32)>,
}

impl SaveState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode as a generic value tree
    pub fn to_json(&self, codec: &Codec) -> JsonValue {
        JsonObject::new()
            .with(TURN_INDEX_KEY, self.turn_index)
            .with(STORY_SEED_KEY, self.story_seed)
            .with(
                CURRENT_CHOICES_KEY,
                self.current_choices
                    .iter()
                    .map(Codec::write_choice)
                    .collect::<Vec<_>>(),
            )
            .with(EVAL_STACK_KEY, codec.write_list_runtime_objs(&self.tree, &self.eval_stack))
            .with(
                VARIABLES_KEY,
                codec.write_dictionary_runtime_objs(&self.tree, &self.variables),
            )
            .with(VISIT_COUNTS_KEY, Codec::write_int_dictionary(&self.visit_counts))
            .with(TURN_INDICES_KEY, Codec::write_int_dictionary(&self.turn_indices))
            .into()
    }

    /// Stream the state into a writer without building a value tree
    pub fn write_to<W: Write>(&self, codec: &Codec, writer: &mut JsonWriter<W>) -> io::Result<()> {
        writer.write_object(|w| {
            w.write_int_property(TURN_INDEX_KEY, self.turn_index)?;
            w.write_int_property(STORY_SEED_KEY, self.story_seed)?;
            w.write_property(CURRENT_CHOICES_KEY, |w| {
                w.write_array(|w| {
                    for choice in &self.current_choices {
                        w.write_value(&Codec::write_choice(choice))?;
                    }
                    Ok(())
                })
            })?;
            w.write_property(EVAL_STACK_KEY, |w| {
                codec.stream_list_runtime_objs(w, &self.tree, &self.eval_stack)
            })?;
            w.write_property(VARIABLES_KEY, |w| {
                codec.stream_dictionary_runtime_objs(w, &self.tree, &self.variables)
            })?;
            w.write_property(VISIT_COUNTS_KEY, |w| {
                Codec::stream_int_dictionary(w, &self.visit_counts)
            })?;
            w.write_property(TURN_INDICES_KEY, |w| {
                Codec::stream_int_dictionary(w, &self.turn_indices)
            })
        })?;
        debug!(bytes = writer.bytes_written(), "save state written");
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
            .ok_or_else(|| DecodeError::ExpectedObject(value.type_name().to_string()))?;

        let mut state = SaveState {
            turn_index: int_field(obj, TURN_INDEX_KEY)?,
            story_seed: int_field(obj, STORY_SEED_KEY)?,
            current_choices: Codec::read_choices(array_field(obj, CURRENT_CHOICES_KEY)?)?,
            ..SaveState::default()
        };

        state.eval_stack = codec.read_list_runtime_objs(&mut state.tree, array_field(obj, EVAL_STACK_KEY)?)?;
        state.variables =
            codec.read_dictionary_runtime_objs(&mut state.tree, object_field(obj, VARIABLES_KEY)?)?;

        if obj.contains_key(VISIT_COUNTS_KEY) {
            state.visit_counts = Codec::read_int_dictionary(object_field(obj, VISIT_COUNTS_KEY)?)?;
        }
        if obj.contains_key(TURN_INDICES_KEY) {
            state.turn_indices = Codec::read_int_dictionary(object_field(obj, TURN_INDICES_KEY)?)?;
        }

        debug!(
            choices = state.current_choices.len(),
            stack = state.eval_stack.len(),
            variables = state.variables.len(),
            "save state decoded"
        );
        Ok(state)
    }

    /// Decode from JSON text
    pub fn from_str(codec: &Codec, text: &str) -> Result<Self> {
        Self::from_json(codec, &json::from_str(text)?)
    }
}

fn field<'a>(obj: &'a JsonObject, key: &'static str) -> Result<&'a JsonValue> {
    obj.get(key).ok_or_else(|| DecodeError::MissingField {
        field: key,
        token: key.to_string(),
    })
}

fn wrong_type(key: &'static str, value: &JsonValue) -> DecodeError {
    DecodeError::InvalidField {
        field: key,
        token: value.to_json_string(),
    }
}

fn int_field(obj: &JsonObject, key: &'static str) -> Result<i32> {
    let value = field(obj, key)?;
    value.as_int().ok_or_else(|| wrong_type(key, value))
}

fn array_field<'a>(obj: &'a JsonObject, key: &'static str) -> Result<&'a [JsonValue]> {
    let value = field(obj, key)?;
    value.as_array().ok_or_else(|| wrong_type(key, value))
}

fn object_field<'a>(obj: &'a JsonObject, key: &'static str) -> Result<&'a JsonObject> {
    let value = field(obj, key)?;
    value.as_object().ok_or_else(|| wrong_type(key, value))
}
