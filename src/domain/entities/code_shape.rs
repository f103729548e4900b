//! Code shape: segment lengths and numeric generation mode.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Largest supported numeric segment. Sequential values are tracked as `u64`.
pub const MAX_NUMERIC_LENGTH: usize = 18;

/// Longest code a shape may describe, all segments together.
pub const MAX_CODE_LENGTH: usize = 64;

/// Describes one class of attendance codes.
///
/// A code is the concatenation `[alphanumeric][alpha][numeric]`, in that fixed
/// order, so its length is always the sum of the three segment lengths.
///
/// Only the numeric segment honours `randomized`. With `randomized == false`
/// the numeric segment counts upward from the highest value already issued
/// today for codes of the same total length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeShape {
    pub alphanumeric_length: usize,
    pub alpha_length: usize,
    pub numeric_length: usize,
    pub randomized: bool,
}

impl CodeShape {
    pub fn new(
        alphanumeric_length: usize,
        alpha_length: usize,
        numeric_length: usize,
        randomized: bool,
    ) -> Self {
        Self {
            alphanumeric_length,
            alpha_length,
            numeric_length,
            randomized,
        }
    }

    /// A code made only of alphanumeric characters.
    pub fn alphanumeric(length: usize) -> Self {
        Self::new(length, 0, 0, false)
    }

    /// Alpha characters followed by numeric characters.
    pub fn alpha_numeric(alpha_length: usize, numeric_length: usize, randomized: bool) -> Self {
        Self::new(0, alpha_length, numeric_length, randomized)
    }

    /// Sum of the segment lengths, saturating at `usize::MAX`.
    pub fn total_length(&self) -> usize {
        self.checked_total_length().unwrap_or(usize::MAX)
    }

    fn checked_total_length(&self) -> Option<usize> {
        self.alphanumeric_length
            .checked_add(self.alpha_length)?
            .checked_add(self.numeric_length)
    }

    /// Number of distinct codes this shape can produce, ignoring banned patterns.
    ///
    /// Returns `None` when the count does not fit in a `u128`.
    pub fn capacity(&self) -> Option<u128> {
        let pow = |base: u128, exp: usize| -> Option<u128> {
            u32::try_from(exp).ok().and_then(|e| base.checked_pow(e))
        };

        pow(27, self.alphanumeric_length)?
            .checked_mul(pow(17, self.alpha_length)?)?
            .checked_mul(pow(10, self.numeric_length)?)
    }

    /// Rejects shapes that can never yield a valid code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - every segment is empty
    /// - the code would be longer than [`MAX_CODE_LENGTH`]
    /// - the numeric segment is longer than [`MAX_NUMERIC_LENGTH`]
    pub fn validate(&self) -> Result<(), AppError> {
        let total = self.checked_total_length();

        if total == Some(0) {
            return Err(AppError::validation(
                "Attendance code shape must have at least one character",
                json!({ "shape": self }),
            ));
        }

        if total.is_none_or(|t| t > MAX_CODE_LENGTH) {
            return Err(AppError::validation(
                format!("Attendance code cannot be longer than {MAX_CODE_LENGTH} characters"),
                json!({ "shape": self }),
            ));
        }

        if self.numeric_length > MAX_NUMERIC_LENGTH {
            return Err(AppError::validation(
                format!("Numeric segment cannot be longer than {MAX_NUMERIC_LENGTH} digits"),
                json!({ "numeric_length": self.numeric_length }),
            ));
        }

        Ok(())
    }
}

impl Default for CodeShape {
    fn default() -> Self {
        Self::alpha_numeric(2, 4, true)
    }
}
