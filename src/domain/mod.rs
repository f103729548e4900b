//! Domain layer containing the attendance code model.
//!
//! Defines entities, the banned-pattern set, the per-day registry and the
//! traits the allocator depends on, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Code shapes and issued codes
//! - [`banned_patterns`] - Substrings no issued code may contain
//! - [`day_window`] - Codes issued since the start of the current day
//! - [`candidate_source`] - Pluggable candidate producers
//! - [`clock`] - Injected time source
//! - [`repositories`] - Data access trait definitions
//!
//! # Issuance Flow
//!
//! 1. A caller asks [`crate::application::services::AttendanceCodeService`] for a code
//! 2. [`crate::application::services::CodeAllocator`] checks the [`day_window::DayWindow`]
//!    is current, reloading it via [`repositories::AttendanceCodeRepository`] if not
//! 3. Candidates from a [`candidate_source::CandidateSource`] are validated against
//!    [`banned_patterns::BannedPatterns`] and the window
//! 4. The accepted code is committed to the window, returned, and persisted by the service

pub mod banned_patterns;
pub mod candidate_source;
pub mod clock;
pub mod day_window;
pub mod entities;
pub mod repositories;
