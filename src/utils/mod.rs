//! Utility functions for code generation.
//!
//! - [`code_generator`] - Character pools and the default candidate source

pub mod code_generator;
