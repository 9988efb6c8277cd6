//! Unit tests for compiler

mod test_lowering;
mod test_resolution;
mod test_story_layout;
