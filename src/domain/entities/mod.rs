//! Core domain entities representing the attendance code model.
//!
//! Entities are plain data structures with light validation helpers.
//!
//! # Entity Types
//!
//! - [`CodeShape`] - Segment lengths and numeric mode of a class of codes
//! - [`AttendanceCode`] - An issued code with its issuance timestamp

pub mod attendance_code;
pub mod code_shape;

pub use attendance_code::AttendanceCode;
pub use code_shape::{CodeShape, MAX_CODE_LENGTH, MAX_NUMERIC_LENGTH};
