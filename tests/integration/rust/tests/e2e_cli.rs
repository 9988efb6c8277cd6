//! End-to-End CLI Integration Tests
//!
//! Drives the storyc tool over files on disk, from the built-in sample
//! through inspection and a second round trip.

use bytecode_system::{Codec, StoryDocument};
use std::fs;
use story_cli::{Command, StoryTool};
use tempfile::TempDir;

/// Test: sample, round trip, inspect
#[test]
fn test_e2e_sample_round_trip() {
    let dir = TempDir::new().unwrap();
    let sample = dir.path().join("sample.json");
    let copy = dir.path().join("copy.json");

    let tool = StoryTool::new().unwrap();
    tool.run(&Command::Sample {
        output: Some(sample.clone()),
    })
    .unwrap();

    let report = tool.roundtrip_file(&sample, Some(&copy)).unwrap();
    assert!(report.same_structure);
    assert_eq!(fs::read_to_string(&sample).unwrap(), fs::read_to_string(&copy).unwrap());

    let summary = tool
        .run(&Command::Inspect { file: copy.clone() })
        .unwrap();
    assert!(summary.contains("flows: greet, cellar, global decl"));
}

/// Test: the sample printed to stdout is a valid story
#[test]
fn test_e2e_sample_text() {
    let tool = StoryTool::new().unwrap();
    let text = tool.run(&Command::Sample { output: None }).unwrap();
    let codec = Codec::new().unwrap();
    let document = StoryDocument::from_str(&codec, &text).unwrap();
    assert_eq!(document.to_json_string(&codec).unwrap(), text);
}

/// Test: malformed JSON is reported, not panicked on
#[test]
fn test_e2e_malformed_json() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "{\"inkVersion\": 12, \"root\": [").unwrap();

    let tool = StoryTool::new().unwrap();
    let err = tool.run(&Command::Inspect { file }).unwrap_err();
    assert!(err.to_string().starts_with("Incompatible or malformed document"));
}
