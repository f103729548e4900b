//! # Attendance Codes
//!
//! Short, human-readable security codes for check-in labels: unique for the
//! day, free of banned patterns, and safe to request from many kiosks at once.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Code shapes, banned patterns, day window, repository traits
//! - **Application Layer** ([`application`]) - The allocator and the issue-then-persist service
//! - **Infrastructure Layer** ([`infrastructure`]) - Repository implementations
//! - **Utilities** ([`utils`]) - Character pools and the candidate generator
//!
//! ## Features
//!
//! - Three-segment codes: alphanumeric, alpha, numeric
//! - Random or sequential numeric segments
//! - Substring-based banned-pattern filtering
//! - Bounded search that fails loudly when the code space is exhausted
//! - Day rollover against an injected clock
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use attendance_codes::prelude::*;
//!
//! let repository = Arc::new(MemoryCodeRepository::new());
//! let allocator = CodeAllocator::new(repository, default_banned_patterns());
//! let code = allocator.issue(&CodeShape::alpha_numeric(2, 4, true))?;
//! ```
//!
//! ## Configuration
//!
//! The binary reads its defaults from environment variables via [`config::Config`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod utils;

pub use error::AppError;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AttendanceCodeService, CodeAllocator, MAX_ATTEMPTS};
    pub use crate::domain::banned_patterns::{BannedPatterns, default_banned_patterns};
    pub use crate::domain::candidate_source::{
        CandidateRequest, CandidateSource, ScriptedCandidates,
    };
    pub use crate::domain::clock::{Clock, SystemClock};
    pub use crate::domain::entities::{AttendanceCode, CodeShape};
    pub use crate::domain::repositories::AttendanceCodeRepository;
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::MemoryCodeRepository;
    pub use crate::utils::code_generator::CodeGenerator;
}
