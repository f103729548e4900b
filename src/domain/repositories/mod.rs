//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for testing.
//!
//! # Available Repositories
//!
//! - [`AttendanceCodeRepository`] - Issued codes, read per day and appended on issue

pub mod attendance_code_repository;

pub use attendance_code_repository::AttendanceCodeRepository;

#[cfg(test)]
pub use attendance_code_repository::MockAttendanceCodeRepository;
