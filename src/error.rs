//! Error types shared by the generator, the allocator and the services.

use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A code shape or configuration value was rejected before any work started.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The bounded candidate search gave up.
    #[error(
        "Too many attempts ({attempts}) to create a unique attendance code. \
         There is almost certainly a check-in 'Security Code Length' configuration problem."
    )]
    AllocationTimeout { attempts: u32 },

    /// The issued-code repository failed.
    #[error("{message}")]
    Storage { message: String, details: Value },
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn allocation_timeout(attempts: u32) -> Self {
        Self::AllocationTimeout { attempts }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    /// Returns true for the exhaustion failure that signals a misconfigured code space.
    pub fn is_allocation_timeout(&self) -> bool {
        matches!(self, AppError::AllocationTimeout { .. })
    }

    /// Structured context attached to the error, for logs and JSON output.
    pub fn details(&self) -> Value {
        match self {
            AppError::Validation { details, .. } | AppError::Storage { details, .. } => {
                details.clone()
            }
            AppError::AllocationTimeout { attempts } => json!({ "attempts": attempts }),
        }
    }
}
