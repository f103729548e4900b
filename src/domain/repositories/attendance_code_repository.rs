//! Repository trait for issued attendance codes.

use crate::domain::entities::AttendanceCode;
use crate::error::AppError;
use chrono::NaiveDate;

/// Storage of codes that have already been handed out.
///
/// The allocator only reads from it when a new day's window has to be
/// loaded. Writing is the caller's job once a code has been issued, which
/// keeps storage and transactions out of the allocator's critical section.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryCodeRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait AttendanceCodeRepository: Send + Sync {
    /// Returns every code issued on `date` (local calendar day).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the codes cannot be read.
    fn codes_issued_on(&self, date: NaiveDate) -> Result<Vec<String>, AppError>;

    /// Stores an issued code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the code cannot be written.
    fn save(&self, code: &AttendanceCode) -> Result<(), AppError>;
}
