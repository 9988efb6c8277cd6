//! Streaming JSON writer
//!
//! A push-down state machine that writes well-formed JSON text
//! incrementally. Nesting discipline is checked with `debug_assert!`:
//! mismatched begin/end calls are bugs in the caller and abort debug
//! builds; release builds skip the checks.

use super::value::JsonValue;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Object,
    Array,
    Property,
    PropertyName,
    String,
}

#[derive(Debug, Clone, Copy)]
struct StateElement {
    state: State,
    child_count: usize,
}

/// Incremental JSON writer over any [`io::Write`] sink.
///
/// # Examples
///
/// ```
/// use bytecode_system::JsonWriter;
///
/// let mut writer = JsonWriter::new();
/// writer.write_object(|w| {
///     w.write_int_property("turnIdx", 3)?;
///     w.write_property("evalStack", |w| w.write_array(|w| w.write_float(5.0)))
/// }).unwrap();
/// assert_eq!(writer.into_string(), r#"{"turnIdx":3,"evalStack":[5.0]}"#);
/// ```
pub struct JsonWriter<W: Write = Vec<u8>> {
    out: W,
    stack: Vec<StateElement>,
    top_level_written: bool,
    bytes_written: usize,
}

impl JsonWriter<Vec<u8>> {
    /// Writer into an in-memory buffer
    pub fn new() -> Self {
        Self::from_writer(Vec::new())
    }

    /// Finished text
    pub fn into_string(self) -> String {
        match String::from_utf8(self.out) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

impl Default for JsonWriter<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> JsonWriter<W> {
    /// Writer into an arbitrary sink
    pub fn from_writer(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            top_level_written: false,
            bytes_written: 0,
        }
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Bytes emitted so far
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Check if exactly one top-level value has been fully written
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.top_level_written
    }

    /// Write `{`
    pub fn write_object_start(&mut self) -> io::Result<()> {
        self.start_new_value()?;
        self.push(State::Object);
        self.raw("{")
    }

    /// Write `}`
    pub fn write_object_end(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::Object, "object end outside an object");
        self.stack.pop();
        self.raw("}")
    }

    /// Write a whole object, filled in by `inner`
    pub fn write_object<F>(&mut self, inner: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.write_object_start()?;
        inner(self)?;
        self.write_object_end()
    }

    /// Write `"name":` and expect exactly one value next
    pub fn write_property_start(&mut self, name: &str) -> io::Result<()> {
        debug_assert!(self.state() == State::Object, "property outside an object");
        if self.child_count() > 0 {
            self.raw(",")?;
        }
        self.raw("\"")?;
        self.write_escaped(name)?;
        self.raw("\":")?;
        self.increment_child_count();
        self.push(State::Property);
        Ok(())
    }

    /// Close a property after its value
    pub fn write_property_end(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::Property, "property end outside a property");
        debug_assert!(self.child_count() == 1, "property must have exactly one value");
        self.stack.pop();
        Ok(())
    }

    /// Write a property whose value is produced by `inner`
    pub fn write_property<F>(&mut self, name: &str, inner: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.write_property_start(name)?;
        inner(self)?;
        self.write_property_end()
    }

    /// Write a string-valued property
    pub fn write_str_property(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.write_property(name, |w| w.write_str(value))
    }

    /// Write an int-valued property
    pub fn write_int_property(&mut self, name: &str, value: i32) -> io::Result<()> {
        self.write_property(name, |w| w.write_int(value))
    }

    /// Write a bool-valued property
    pub fn write_bool_property(&mut self, name: &str, value: bool) -> io::Result<()> {
        self.write_property(name, |w| w.write_bool(value))
    }

    /// Begin a property name that is streamed in pieces
    pub fn write_property_name_start(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::Object, "property outside an object");
        if self.child_count() > 0 {
            self.raw(",")?;
        }
        self.raw("\"")?;
        self.increment_child_count();
        self.push(State::Property);
        self.push(State::PropertyName);
        Ok(())
    }

    /// Append to the property name being streamed
    pub fn write_property_name_inner(&mut self, text: &str) -> io::Result<()> {
        debug_assert!(self.state() == State::PropertyName, "not inside a property name");
        self.write_escaped(text)
    }

    /// Finish the property name; its value comes next
    pub fn write_property_name_end(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::PropertyName, "not inside a property name");
        self.stack.pop();
        self.raw("\":")
    }

    /// Write `[`
    pub fn write_array_start(&mut self) -> io::Result<()> {
        self.start_new_value()?;
        self.push(State::Array);
        self.raw("[")
    }

    /// Write `]`
    pub fn write_array_end(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::Array, "array end outside an array");
        self.stack.pop();
        self.raw("]")
    }

    /// Write a whole array, filled in by `inner`
    pub fn write_array<F>(&mut self, inner: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.write_array_start()?;
        inner(self)?;
        self.write_array_end()
    }

    /// Write an integer
    pub fn write_int(&mut self, value: i32) -> io::Result<()> {
        self.start_new_value()?;
        self.raw(&value.to_string())
    }

    /// Write a float, always in a form that reads back as a float
    pub fn write_float(&mut self, value: f32) -> io::Result<()> {
        self.start_new_value()?;
        self.raw(&format_float(value))
    }

    /// Write an escaped string
    pub fn write_str(&mut self, value: &str) -> io::Result<()> {
        self.start_new_value()?;
        self.raw("\"")?;
        self.write_escaped(value)?;
        self.raw("\"")
    }

    /// Write `true` or `false`
    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.start_new_value()?;
        self.raw(if value { "true" } else { "false" })
    }

    /// Write `null`
    pub fn write_null(&mut self) -> io::Result<()> {
        self.start_new_value()?;
        self.raw("null")
    }

    /// Begin a string value that is streamed in pieces
    pub fn write_string_start(&mut self) -> io::Result<()> {
        self.start_new_value()?;
        self.push(State::String);
        self.raw("\"")
    }

    /// Append escaped text to the string being streamed
    pub fn write_string_inner(&mut self, text: &str) -> io::Result<()> {
        debug_assert!(self.state() == State::String, "not inside a string");
        self.write_escaped(text)
    }

    /// Close the string being streamed
    pub fn write_string_end(&mut self) -> io::Result<()> {
        debug_assert!(self.state() == State::String, "not inside a string");
        self.stack.pop();
        self.raw("\"")
    }

    /// Write a generic value tree
    pub fn write_value(&mut self, value: &JsonValue) -> io::Result<()> {
        match value {
            JsonValue::Null => self.write_null(),
            JsonValue::Bool(b) => self.write_bool(*b),
            JsonValue::Int(i) => self.write_int(*i),
            JsonValue::Float(f) => self.write_float(*f),
            JsonValue::String(s) => self.write_str(s),
            JsonValue::Array(items) => self.write_array(|w| {
                for item in items {
                    w.write_value(item)?;
                }
                Ok(())
            }),
            JsonValue::Object(obj) => self.write_object(|w| {
                for (key, item) in obj.iter() {
                    w.write_property(key, |w| w.write_value(item))?;
                }
                Ok(())
            }),
        }
    }

    fn state(&self) -> State {
        self.stack.last().map_or(State::None, |el| el.state)
    }

    fn child_count(&self) -> usize {
        self.stack.last().map_or(0, |el| el.child_count)
    }

    fn push(&mut self, state: State) {
        self.stack.push(StateElement {
            state,
            child_count: 0,
        });
    }

    fn increment_child_count(&mut self) {
        debug_assert!(!self.stack.is_empty(), "no enclosing state");
        if let Some(el) = self.stack.last_mut() {
            el.child_count += 1;
        }
    }

    fn start_new_value(&mut self) -> io::Result<()> {
        let state = self.state();
        debug_assert!(
            matches!(state, State::None | State::Array | State::Property),
            "value written in state {:?}",
            state
        );
        match state {
            State::None => {
                debug_assert!(!self.top_level_written, "second top-level value");
                self.top_level_written = true;
            }
            State::Property => {
                debug_assert!(self.child_count() == 0, "property already has a value");
                self.increment_child_count();
            }
            State::Array => {
                if self.child_count() > 0 {
                    self.raw(",")?;
                }
                self.increment_child_count();
            }
            _ => {}
        }
        Ok(())
    }

    fn raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.bytes_written += text.len();
        Ok(())
    }

    fn write_escaped(&mut self, text: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in text.char_indices() {
            let replacement = match c {
                '\\' => "\\\\",
                '"' => "\\\"",
                '\n' => "\\n",
                '\t' => "\\t",
                c if c < ' ' => "",
                _ => continue,
            };
            self.raw(&text[start..i])?;
            self.raw(replacement)?;
            start = i + c.len_utf8();
        }
        self.raw(&text[start..])
    }
}

/// Locale-independent float text that always reads back as a float.
///
/// JSON has no non-finite numbers: infinities become the largest finite
/// `f32` of the same sign and NaN becomes `0.0`.
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "0.0".to_string();
    }
    let finite = if value == f32::INFINITY {
        f32::MAX
    } else if value == f32::NEG_INFINITY {
        f32::MIN
    } else {
        value
    };

    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(finite);
    if text.contains(&['.', 'e', 'E'][..]) {
        text.to_string()
    } else {
        format!("{}.0", text)
    }
}
