//! In-memory implementation of [`AttendanceCodeRepository`].

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entities::AttendanceCode;
use crate::domain::repositories::AttendanceCodeRepository;
use crate::error::AppError;

/// Keeps issued codes in process memory.
///
/// Suitable for a single process and for tests; everything is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryCodeRepository {
    codes: RwLock<Vec<AttendanceCode>>,
}

impl MemoryCodeRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-filled with `codes`.
    pub fn with_codes(codes: impl IntoIterator<Item = AttendanceCode>) -> Self {
        Self {
            codes: RwLock::new(codes.into_iter().collect()),
        }
    }

    /// Returns every stored code, oldest first.
    pub fn all(&self) -> Vec<AttendanceCode> {
        self.codes.read().clone()
    }

    pub fn len(&self) -> usize {
        self.codes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.read().is_empty()
    }
}

impl AttendanceCodeRepository for MemoryCodeRepository {
    fn codes_issued_on(&self, date: NaiveDate) -> Result<Vec<String>, AppError> {
        let codes: Vec<String> = self
            .codes
            .read()
            .iter()
            .filter(|c| c.issue_date() == date)
            .map(|c| c.code.clone())
            .collect();

        debug!(%date, count = codes.len(), "Read issued attendance codes");
        Ok(codes)
    }

    fn save(&self, code: &AttendanceCode) -> Result<(), AppError> {
        self.codes.write().push(code.clone());
        Ok(())
    }
}
