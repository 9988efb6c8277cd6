//! Tests for the streaming JSON writer

use bytecode_system::json::{self, format_float};
use bytecode_system::{JsonObject, JsonValue, JsonWriter};

#[test]
fn test_nested_document() {
    let mut w = JsonWriter::new();
    w.write_object(|w| {
        w.write_str_property("name", "story")?;
        w.write_bool_property("ok", true)?;
        w.write_property("items", |w| {
            w.write_array(|w| {
                w.write_int(1)?;
                w.write_array(|w| w.write_null())?;
                w.write_object(|_| Ok(()))
            })
        })
    })
    .unwrap();
    assert!(w.is_complete());
    assert_eq!(w.into_string(), r#"{"name":"story","ok":true,"items":[1,[null],{}]}"#);
}

#[test]
fn test_written_text_parses_back() {
    let value = JsonValue::Object(
        JsonObject::new()
            .with("text", "line one\nline \"two\"\t\\")
            .with("float", 0.1f32)
            .with("list", vec![JsonValue::Int(-3), JsonValue::Bool(false)]),
    );
    let text = value.to_json_string();
    assert_eq!(json::from_str(&text).unwrap(), value);
}

#[test]
fn test_integer_valued_float_keeps_point() {
    assert_eq!(format_float(5.0), "5.0");
    assert_eq!(format_float(0.0), "0.0");
    assert_eq!(format_float(-1.0), "-1.0");
}

#[test]
fn test_writer_into_custom_sink() {
    let mut sink: Vec<u8> = Vec::new();
    {
        let mut w = JsonWriter::from_writer(&mut sink);
        w.write_array(|w| w.write_str("a")).unwrap();
        assert_eq!(w.bytes_written(), 5);
    }
    assert_eq!(sink, b"[\"a\"]");
}

#[test]
fn test_property_names_are_escaped() {
    let mut w = JsonWriter::new();
    w.write_object(|w| w.write_int_property("a\"b", 1)).unwrap();
    assert_eq!(w.into_string(), r#"{"a\"b":1}"#);
}
