//! Application layer services implementing the issuance logic.
//!
//! This layer coordinates the domain pieces: it owns the process-wide
//! allocator and records issued codes through the repository trait.
//!
//! # Available Services
//!
//! - [`services::code_allocator::CodeAllocator`] - Unique, banned-pattern-free code allocation
//! - [`services::attendance_code_service::AttendanceCodeService`] - Issue-then-persist flow

pub mod services;
