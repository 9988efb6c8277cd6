//! Two-way mapping between runtime objects and JSON
//!
//! Encoding produces either a [`JsonValue`] tree or streams straight into a
//! [`JsonWriter`]; both give the same text. Decoding classifies each token
//! by shape and fails on anything it does not recognize.

use crate::container::{Container, CountFlags};
use crate::control_command::ControlCommand;
use crate::divert::{Divert, DivertTarget, PushPopType};
use crate::error::{DecodeError, Result};
use crate::json::{JsonObject, JsonValue, JsonWriter};
use crate::native::NativeFunctionCall;
use crate::object::{NodeId, Tree};
use crate::opcode::{Choice, ChoicePoint, Opcode, Tag, VariableAssignment, VariableReference};
use crate::path::Path;
use crate::value::{StringValue, Value, VariablePointer};
use std::io::{self, Write};
use tracing::trace;

/// Terminator key holding a container's count flags
pub const COUNT_FLAGS_KEY: &str = "#f";
/// Terminator key holding a container's own name
pub const NAME_KEY: &str = "#n";

const GLUE_TOKEN: &str = "<>";
const VOID_TOKEN: &str = "void";
const STRING_MARKER: char = '^';
const INTERSECT_ALIAS: &str = "L^";

/// Wire token for every [`ControlCommand`], checked complete and unique
#[derive(Debug, Clone)]
pub struct CommandTokens {
    tokens: [&'static str; ControlCommand::COUNT],
}

impl CommandTokens {
    /// Build the table and verify it
    pub fn new() -> Result<Self> {
        let mut tokens = [""; ControlCommand::COUNT];
        for command in ControlCommand::ALL {
            tokens[command.index()] = Self::token_for(command);
        }

        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(DecodeError::IncompleteCommandTable(
                    ControlCommand::ALL[i].to_string(),
                ));
            }
            if tokens[..i].contains(token) {
                return Err(DecodeError::DuplicateCommandToken(token.to_string()));
            }
        }

        Ok(Self { tokens })
    }

    fn token_for(command: ControlCommand) -> &'static str {
        match command {
            ControlCommand::EvalStart => "ev",
            ControlCommand::EvalOutput => "out",
            ControlCommand::EvalEnd => "/ev",
            ControlCommand::Duplicate => "du",
            ControlCommand::PopEvaluatedValue => "pop",
            ControlCommand::PopFunction => "~ret",
            ControlCommand::PopTunnel => "->->",
            ControlCommand::BeginString => "str",
            ControlCommand::EndString => "/str",
            ControlCommand::NoOp => "nop",
            ControlCommand::ChoiceCount => "choiceCnt",
            ControlCommand::Turns => "turn",
            ControlCommand::TurnsSince => "turns",
            ControlCommand::ReadCount => "readc",
            ControlCommand::Random => "rnd",
            ControlCommand::SeedRandom => "srnd",
            ControlCommand::VisitIndex => "visit",
            ControlCommand::SequenceShuffleIndex => "seq",
            ControlCommand::StartThread => "thread",
            ControlCommand::Done => "done",
            ControlCommand::End => "end",
        }
    }

    /// Token written for `command`
    pub fn token(&self, command: ControlCommand) -> &'static str {
        self.tokens[command.index()]
    }

    /// Command a token stands for
    pub fn command(&self, token: &str) -> Option<ControlCommand> {
        self.tokens
            .iter()
            .position(|t| *t == token)
            .map(|i| ControlCommand::ALL[i])
    }

    /// `(command, token)` pairs in command order
    pub fn iter(&self) -> impl Iterator<Item = (ControlCommand, &'static str)> + '_ {
        ControlCommand::ALL.iter().map(move |c| (*c, self.tokens[c.index()]))
    }
}

/// Encoder and decoder for runtime objects.
///
/// Built once and passed by reference; it owns the command token table.
#[derive(Debug, Clone)]
pub struct Codec {
    commands: CommandTokens,
}

impl Codec {
    /// Create a codec, verifying its token table
    pub fn new() -> Result<Self> {
        Ok(Self {
            commands: CommandTokens::new()?,
        })
    }

    /// The control command token table
    pub fn command_tokens(&self) -> &CommandTokens {
        &self.commands
    }

    // ---------------------------------------------------------------
    // Encoding to JsonValue
    // ---------------------------------------------------------------

    /// Encode a node and everything it owns
    pub fn write_runtime_object(&self, tree: &Tree, id: NodeId) -> JsonValue {
        match tree.opcode(id) {
            Opcode::Container(_) => self.write_runtime_container(tree, id, false),
            Opcode::Value(value) => Self::write_value(value),
            Opcode::Command(command) => self.commands.token(*command).into(),
            Opcode::Divert(divert) => Self::write_divert(divert),
            Opcode::ChoicePoint(cp) => JsonObject::new()
                .with("*", cp.path_on_choice.components_string())
                .with("flg", cp.flags as i32)
                .into(),
            Opcode::VariableReference(VariableReference::Named(name)) => {
                JsonObject::new().with("VAR?", name.as_str()).into()
            }
            Opcode::VariableReference(VariableReference::ReadCount(path)) => {
                JsonObject::new().with("CNT?", path.components_string()).into()
            }
            Opcode::VariableAssignment(assignment) => {
                let key = if assignment.is_global { "VAR=" } else { "temp=" };
                let mut obj = JsonObject::new().with(key, assignment.variable_name.as_str());
                if !assignment.is_new_declaration {
                    obj.insert("re", true);
                }
                obj.into()
            }
            Opcode::NativeFunctionCall(call) => {
                if call.name() == NativeFunctionCall::INTERSECT {
                    INTERSECT_ALIAS.into()
                } else {
                    call.name().into()
                }
            }
            Opcode::Glue => GLUE_TOKEN.into(),
            Opcode::Tag(tag) => JsonObject::new().with("#", tag.text.as_str()).into(),
            Opcode::Void => VOID_TOKEN.into(),
            Opcode::Choice(choice) => Self::write_choice(choice),
        }
    }

    fn write_value(value: &Value) -> JsonValue {
        match value {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Int(*i),
            Value::Float(f) => JsonValue::Float(*f),
            Value::String(s) if s.is_newline => "\n".into(),
            Value::String(s) => format!("{}{}", STRING_MARKER, s.value).into(),
            Value::DivertTarget(path) => JsonObject::new()
                .with("^->", path.components_string())
                .into(),
            Value::VariablePointer(ptr) => JsonObject::new()
                .with("^var", ptr.variable_name.as_str())
                .with("ci", ptr.context_index)
                .into(),
        }
    }

    fn write_divert(divert: &Divert) -> JsonValue {
        let key = if divert.is_external {
            "x()"
        } else {
            match divert.stack_push {
                Some(PushPopType::Function) => "f()",
                Some(PushPopType::Tunnel) => "->t->",
                None => "->",
            }
        };

        let mut obj = JsonObject::new().with(key, divert.target_string());
        if divert.has_variable_target() {
            obj.insert("var", true);
        }
        if divert.is_conditional {
            obj.insert("c", true);
        }
        if divert.external_args > 0 {
            obj.insert("exArgs", divert.external_args as i32);
        }
        obj.into()
    }

    /// Encode a container as `[content..., terminator]`.
    ///
    /// With `without_name` the own name is left out; named-only children
    /// are written that way since their key already carries it.
    pub fn write_runtime_container(&self, tree: &Tree, id: NodeId, without_name: bool) -> JsonValue {
        let Some(container) = tree.container(id) else {
            return self.write_runtime_object(tree, id);
        };

        let mut items: Vec<JsonValue> = container
            .content()
            .iter()
            .map(|child| self.write_runtime_object(tree, *child))
            .collect();

        let mut terminator = JsonObject::new();
        for (name, child) in container.named_only_content() {
            terminator.insert(name, self.write_runtime_container(tree, child, true));
        }
        if !container.count_flags().is_empty() {
            terminator.insert(COUNT_FLAGS_KEY, container.count_flags().bits() as i32);
        }
        if let Some(name) = container.name().filter(|_| !without_name) {
            terminator.insert(NAME_KEY, name);
        }

        items.push(if terminator.is_empty() {
            JsonValue::Null
        } else {
            terminator.into()
        });
        JsonValue::Array(items)
    }

    /// Encode a list of runtime objects
    pub fn write_list_runtime_objs(&self, tree: &Tree, ids: &[NodeId]) -> JsonValue {
        ids.iter()
            .map(|id| self.write_runtime_object(tree, *id))
            .collect::<Vec<_>>()
            .into()
    }

    /// Encode a name to runtime object mapping
    pub fn write_dictionary_runtime_objs(&self, tree: &Tree, entries: &[(String, NodeId)]) -> JsonValue {
        entries
            .iter()
            .map(|(name, id)| (name.as_str(), self.write_runtime_object(tree, *id)))
            .collect::<JsonObject>()
            .into()
    }

    /// Encode a name to int mapping
    pub fn write_int_dictionary(entries: &[(String, i32)]) -> JsonValue {
        entries
            .iter()
            .map(|(name, n)| (name.as_str(), *n))
            .collect::<JsonObject>()
            .into()
    }

    /// Encode a presented choice
    pub fn write_choice(choice: &Choice) -> JsonValue {
        JsonObject::new()
            .with("text", choice.text.as_str())
            .with("index", choice.index)
            .with("originalChoicePath", choice.source_path.as_str())
            .with("originalThreadIndex", choice.original_thread_index)
            .with("targetPath", choice.target_path.components_string())
            .into()
    }

    // ---------------------------------------------------------------
    // Streaming
    // ---------------------------------------------------------------

    /// Stream a node straight into a writer
    pub fn stream_runtime_object<W: Write>(
        &self,
        writer: &mut JsonWriter<W>,
        tree: &Tree,
        id: NodeId,
    ) -> io::Result<()> {
        if tree.container(id).is_some() {
            self.stream_runtime_container(writer, tree, id, false)
        } else {
            writer.write_value(&self.write_runtime_object(tree, id))
        }
    }

    /// Stream a container straight into a writer
    pub fn stream_runtime_container<W: Write>(
        &self,
        writer: &mut JsonWriter<W>,
        tree: &Tree,
        id: NodeId,
        without_name: bool,
    ) -> io::Result<()> {
        let Some(container) = tree.container(id) else {
            return self.stream_runtime_object(writer, tree, id);
        };

        writer.write_array_start()?;
        for child in container.content() {
            self.stream_runtime_object(writer, tree, *child)?;
        }

        let flags = container.count_flags();
        let own_name = container.name().filter(|_| !without_name);
        if !container.has_named_only_content() && flags.is_empty() && own_name.is_none() {
            writer.write_null()?;
        } else {
            writer.write_object_start()?;
            for (name, child) in container.named_only_content() {
                writer.write_property(name, |w| self.stream_runtime_container(w, tree, child, true))?;
            }
            if !flags.is_empty() {
                writer.write_int_property(COUNT_FLAGS_KEY, flags.bits() as i32)?;
            }
            if let Some(name) = own_name {
                writer.write_str_property(NAME_KEY, name)?;
            }
            writer.write_object_end()?;
        }

        writer.write_array_end()
    }

    /// Stream a list of runtime objects
    pub fn stream_list_runtime_objs<W: Write>(
        &self,
        writer: &mut JsonWriter<W>,
        tree: &Tree,
        ids: &[NodeId],
    ) -> io::Result<()> {
        writer.write_array(|w| {
            for id in ids {
                self.stream_runtime_object(w, tree, *id)?;
            }
            Ok(())
        })
    }

    /// Stream a name to runtime object mapping
    pub fn stream_dictionary_runtime_objs<W: Write>(
        &self,
        writer: &mut JsonWriter<W>,
        tree: &Tree,
        entries: &[(String, NodeId)],
    ) -> io::Result<()> {
        writer.write_object(|w| {
            for (name, id) in entries {
                w.write_property(name, |w| self.stream_runtime_object(w, tree, *id))?;
            }
            Ok(())
        })
    }

    /// Stream a name to int mapping
    pub fn stream_int_dictionary<W: Write>(
        writer: &mut JsonWriter<W>,
        entries: &[(String, i32)],
    ) -> io::Result<()> {
        writer.write_object(|w| {
            for (name, n) in entries {
                w.write_int_property(name, *n)?;
            }
            Ok(())
        })
    }

    // ---------------------------------------------------------------
    // Decoding
    // ---------------------------------------------------------------

    /// Decode a token into a fresh tree, returning the tree and the node
    pub fn decode(&self, token: &JsonValue) -> Result<(Tree, NodeId)> {
        let mut tree = Tree::new();
        let id = self.read_runtime_object(&mut tree, token)?;
        Ok((tree, id))
    }

    /// Decode a token into `tree`.
    ///
    /// On failure every node allocated by this call is removed again, so
    /// the tree is left as it was.
    pub fn read_runtime_object(&self, tree: &mut Tree, token: &JsonValue) -> Result<NodeId> {
        Self::transactional(tree, |tree| self.token_to_runtime_object(tree, token))
    }

    /// Decode the elements of an array into `tree`
    pub fn read_list_runtime_objs(&self, tree: &mut Tree, items: &[JsonValue]) -> Result<Vec<NodeId>> {
        Self::transactional(tree, |tree| {
            items
                .iter()
                .map(|item| self.token_to_runtime_object(tree, item))
                .collect()
        })
    }

    /// Decode a name to runtime object mapping into `tree`
    pub fn read_dictionary_runtime_objs(
        &self,
        tree: &mut Tree,
        obj: &JsonObject,
    ) -> Result<Vec<(String, NodeId)>> {
        Self::transactional(tree, |tree| {
            obj.iter()
                .map(|(name, item)| Ok((name.to_string(), self.token_to_runtime_object(tree, item)?)))
                .collect()
        })
    }

    /// Decode a name to int mapping
    pub fn read_int_dictionary(obj: &JsonObject) -> Result<Vec<(String, i32)>> {
        obj.iter()
            .map(|(name, value)| match value.as_int() {
                Some(n) => Ok((name.to_string(), n)),
                None => Err(DecodeError::InvalidField {
                    field: "value",
                    token: JsonValue::Object(obj.clone()).to_json_string(),
                }),
            })
            .collect()
    }

    /// Decode a presented choice
    pub fn read_choice(obj: &JsonObject) -> Result<Choice> {
        Ok(Choice {
            text: required_str(obj, "text")?.to_string(),
            index: required_int(obj, "index")?,
            source_path: required_str(obj, "originalChoicePath")?.to_string(),
            original_thread_index: required_int(obj, "originalThreadIndex")?,
            target_path: Path::parse(required_str(obj, "targetPath")?),
        })
    }

    /// Decode an array of presented choices
    pub fn read_choices(items: &[JsonValue]) -> Result<Vec<Choice>> {
        items
            .iter()
            .map(|item| match item {
                JsonValue::Object(obj) => Self::read_choice(obj),
                other => Err(DecodeError::UnrecognizedToken(other.to_json_string())),
            })
            .collect()
    }

    fn transactional<T>(tree: &mut Tree, f: impl FnOnce(&mut Tree) -> Result<T>) -> Result<T> {
        let mark = tree.len();
        let result = f(tree);
        if result.is_err() {
            tree.truncate(mark);
        }
        result
    }

    fn token_to_runtime_object(&self, tree: &mut Tree, token: &JsonValue) -> Result<NodeId> {
        match token {
            JsonValue::Int(i) => Ok(tree.add(Value::Int(*i))),
            JsonValue::Float(f) => Ok(tree.add(Value::Float(*f))),
            JsonValue::Bool(b) => Ok(tree.add(Value::Bool(*b))),
            JsonValue::String(s) => self.string_to_opcode(s).map(|op| tree.add(op)),
            JsonValue::Object(obj) => Self::object_to_opcode(obj).map(|op| tree.add(op)),
            JsonValue::Array(items) => self.array_to_container(tree, items),
            JsonValue::Null => Err(DecodeError::UnrecognizedToken(token.to_json_string())),
        }
    }

    fn string_to_opcode(&self, s: &str) -> Result<Opcode> {
        if s == "\n" {
            return Ok(Value::String(StringValue::new("\n")).into());
        }
        if let Some(text) = s.strip_prefix(STRING_MARKER) {
            return Ok(Value::string(text).into());
        }
        if s == GLUE_TOKEN {
            return Ok(Opcode::Glue);
        }
        if let Some(command) = self.commands.command(s) {
            return Ok(command.into());
        }

        // Not a string, so the alias can only mean the operator
        let name = if s == INTERSECT_ALIAS { NativeFunctionCall::INTERSECT } else { s };
        if let Some(call) = NativeFunctionCall::with_name(name) {
            return Ok(call.into());
        }
        if s == VOID_TOKEN {
            return Ok(Opcode::Void);
        }

        Err(DecodeError::UnrecognizedToken(JsonValue::from(s).to_json_string()))
    }

    fn object_to_opcode(obj: &JsonObject) -> Result<Opcode> {
        if let Some(target) = obj.get("^->") {
            let path = field_str(obj, "^->", target)?;
            return Ok(Value::divert_target(Path::parse(path)).into());
        }

        if let Some(name) = obj.get("^var") {
            let name = field_str(obj, "^var", name)?;
            let mut pointer = VariablePointer::new(name);
            if let Some(ci) = obj.get("ci") {
                pointer.context_index = field_int(obj, "ci", ci)?;
            }
            return Ok(Value::VariablePointer(pointer).into());
        }

        let divert_kind = [
            ("->", None, false),
            ("f()", Some(PushPopType::Function), false),
            ("->t->", Some(PushPopType::Tunnel), false),
            ("x()", None, true),
        ]
        .into_iter()
        .find_map(|(key, push, external)| obj.get(key).map(|v| (key, v, push, external)));

        if let Some((key, target, stack_push, is_external)) = divert_kind {
            let target = field_str(obj, key, target)?;
            let target = if flag(obj, "var")? {
                DivertTarget::Variable(target.to_string())
            } else {
                DivertTarget::Path(Path::parse(target))
            };
            let external_args = match (is_external, obj.get("exArgs")) {
                (true, Some(args)) => u32::try_from(field_int(obj, "exArgs", args)?)
                    .map_err(|_| invalid(obj, "exArgs"))?,
                _ => 0,
            };
            return Ok(Divert {
                target,
                stack_push,
                is_external,
                external_args,
                is_conditional: flag(obj, "c")?,
            }
            .into());
        }

        if let Some(path) = obj.get("*") {
            let path = field_str(obj, "*", path)?;
            let flags = match obj.get("flg") {
                Some(flg) => u32::try_from(field_int(obj, "flg", flg)?).map_err(|_| invalid(obj, "flg"))?,
                None => 0,
            };
            return Ok(ChoicePoint::new(Path::parse(path), flags).into());
        }

        if let Some(name) = obj.get("VAR?") {
            let name = field_str(obj, "VAR?", name)?;
            return Ok(VariableReference::Named(name.to_string()).into());
        }
        if let Some(path) = obj.get("CNT?") {
            let path = field_str(obj, "CNT?", path)?;
            return Ok(VariableReference::ReadCount(Path::parse(path)).into());
        }

        let assignment = [("VAR=", true), ("temp=", false)]
            .into_iter()
            .find_map(|(key, global)| obj.get(key).map(|v| (key, v, global)));
        if let Some((key, name, is_global)) = assignment {
            let name = field_str(obj, key, name)?;
            return Ok(VariableAssignment {
                variable_name: name.to_string(),
                is_global,
                is_new_declaration: !obj.contains_key("re"),
            }
            .into());
        }

        if let Some(text) = obj.get("#") {
            return Ok(Tag::new(field_str(obj, "#", text)?).into());
        }

        if obj.contains_key("originalChoicePath") {
            return Ok(Self::read_choice(obj)?.into());
        }

        Err(DecodeError::UnrecognizedToken(
            JsonValue::Object(obj.clone()).to_json_string(),
        ))
    }

    fn array_to_container(&self, tree: &mut Tree, items: &[JsonValue]) -> Result<NodeId> {
        let (terminator, content) = items.split_last().ok_or(DecodeError::MissingTerminator)?;
        let terminator = match terminator {
            JsonValue::Null => None,
            JsonValue::Object(obj) => Some(obj),
            other => return Err(DecodeError::InvalidTerminator(other.to_json_string())),
        };

        let mut container = Container::new();
        if let Some(obj) = terminator {
            if let Some(flags) = obj.get(COUNT_FLAGS_KEY) {
                let bits = u32::try_from(field_int(obj, COUNT_FLAGS_KEY, flags)?)
                    .map_err(|_| invalid(obj, COUNT_FLAGS_KEY))?;
                container.set_count_flags(CountFlags::from_bits(bits));
            }
            if let Some(name) = obj.get(NAME_KEY) {
                container.name = Some(field_str(obj, NAME_KEY, name)?.to_string());
            }
        }

        let id = tree.add(container);
        for item in content {
            let child = self.token_to_runtime_object(tree, item)?;
            tree.add_content(id, child)?;
        }

        if let Some(obj) = terminator {
            for (key, value) in obj.iter() {
                if key == COUNT_FLAGS_KEY || key == NAME_KEY {
                    continue;
                }
                let child = self.token_to_runtime_object(tree, value)?;
                if tree.container(child).is_none() {
                    return Err(DecodeError::NamedContentNotContainer(key.to_string()));
                }
                tree.set_name(child, Some(key.to_string()))?;
                tree.add_to_named_content_only(id, child)?;
            }
        }

        trace!(node = %id, items = content.len(), "decoded container");
        Ok(id)
    }
}

fn invalid(obj: &JsonObject, field: &'static str) -> DecodeError {
    DecodeError::InvalidField {
        field,
        token: JsonValue::Object(obj.clone()).to_json_string(),
    }
}

fn missing(obj: &JsonObject, field: &'static str) -> DecodeError {
    DecodeError::MissingField {
        field,
        token: JsonValue::Object(obj.clone()).to_json_string(),
    }
}

fn field_str<'a>(obj: &JsonObject, field: &'static str, value: &'a JsonValue) -> Result<&'a str> {
    value.as_str().ok_or_else(|| invalid(obj, field))
}

fn field_int(obj: &JsonObject, field: &'static str, value: &JsonValue) -> Result<i32> {
    value.as_int().ok_or_else(|| invalid(obj, field))
}

fn required_str<'a>(obj: &'a JsonObject, field: &'static str) -> Result<&'a str> {
    let value = obj.get(field).ok_or_else(|| missing(obj, field))?;
    field_str(obj, field, value)
}

fn required_int(obj: &JsonObject, field: &'static str) -> Result<i32> {
    let value = obj.get(field).ok_or_else(|| missing(obj, field))?;
    field_int(obj, field, value)
}

// Marker keys only ever carry `true`; absence means false
fn flag(obj: &JsonObject, field: &'static str) -> Result<bool> {
    match obj.get(field) {
        None => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| invalid(obj, field)),
    }
}
