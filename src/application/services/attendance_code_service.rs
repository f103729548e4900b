//! Attendance code issuance service.

use std::sync::Arc;

use tracing::warn;

use crate::application::services::code_allocator::CodeAllocator;
use crate::domain::candidate_source::CandidateSource;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{AttendanceCode, CodeShape};
use crate::domain::repositories::AttendanceCodeRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Service that issues attendance codes and records them.
///
/// Wraps a shared [`CodeAllocator`] and stores each issued code with the
/// issuance time the allocator committed it at, so allocators started later the same day (after a restart,
/// or on another instance) reload it and never hand it out again.
pub struct AttendanceCodeService<R, C = SystemClock, S = CodeGenerator>
where
    R: AttendanceCodeRepository,
    C: Clock,
    S: CandidateSource,
{
    allocator: Arc<CodeAllocator<R, C, S>>,
    repository: Arc<R>,
}

impl<R, C, S> AttendanceCodeService<R, C, S>
where
    R: AttendanceCodeRepository,
    C: Clock,
    S: CandidateSource,
{
    /// Creates a new attendance code service.
    pub fn new(allocator: Arc<CodeAllocator<R, C, S>>, repository: Arc<R>) -> Self {
        Self {
            allocator,
            repository,
        }
    }

    /// Issues and stores a new code for `shape`.
    ///
    /// # Errors
    ///
    /// Returns the allocator's errors unchanged (see [`CodeAllocator::issue`]).
    /// Returns [`AppError::Storage`] if the code cannot be saved. The code
    /// stays reserved in today's window in that case and is not issued again.
    pub fn get_new(&self, shape: &CodeShape) -> Result<AttendanceCode, AppError> {
        let attendance_code = self.allocator.issue_code(shape)?;

        if let Err(e) = self.repository.save(&attendance_code) {
            warn!(code = %attendance_code.code, "Failed to save attendance code: {e}");
            return Err(e);
        }

        Ok(attendance_code)
    }

    /// Issues a code made of `length` alphanumeric characters.
    ///
    /// # Errors
    ///
    /// See [`Self::get_new`].
    pub fn get_new_alphanumeric(&self, length: usize) -> Result<AttendanceCode, AppError> {
        self.get_new(&CodeShape::alphanumeric(length))
    }

    /// Issues a code of `alpha_length` letters followed by `numeric_length` digits.
    ///
    /// # Errors
    ///
    /// See [`Self::get_new`].
    pub fn get_new_alpha_numeric(
        &self,
        alpha_length: usize,
        numeric_length: usize,
        randomized: bool,
    ) -> Result<AttendanceCode, AppError> {
        self.get_new(&CodeShape::alpha_numeric(alpha_length, numeric_length, randomized))
    }

    /// Clears today's codes. See [`CodeAllocator::flush_todays_codes`].
    pub fn flush_todays_codes(&self, reset_baseline: bool) {
        self.allocator.flush_todays_codes(reset_baseline);
    }

    pub fn allocator(&self) -> &Arc<CodeAllocator<R, C, S>> {
        &self.allocator
    }
}
