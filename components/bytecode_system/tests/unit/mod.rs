//! Unit tests for bytecode_system

mod test_paths;
mod test_save_state;
mod test_writer;
