//! Business logic services for the application layer.

pub mod attendance_code_service;
pub mod code_allocator;

pub use attendance_code_service::AttendanceCodeService;
pub use code_allocator::{CodeAllocator, MAX_ATTEMPTS};
