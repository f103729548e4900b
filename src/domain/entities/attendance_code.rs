//! Attendance code entity representing an issued security code.

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

/// A security code handed to one check-in, with the moment it was issued.
///
/// The code string is the only identity; `issued_at` decides which day's
/// window the code belongs to when the allocator reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceCode {
    pub code: String,
    pub issued_at: DateTime<Local>,
}

impl AttendanceCode {
    /// Creates a new AttendanceCode instance.
    pub fn new(code: String, issued_at: DateTime<Local>) -> Self {
        Self { code, issued_at }
    }

    /// Calendar day (local time) this code was issued on.
    pub fn issue_date(&self) -> NaiveDate {
        self.issued_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_attendance_code_creation() {
        let issued_at = Local.with_ymd_and_hms(2024, 3, 10, 9, 15, 0).unwrap();
        let code = AttendanceCode::new("BK2048".to_string(), issued_at);

        assert_eq!(code.code, "BK2048");
        assert_eq!(code.issued_at, issued_at);
        assert_eq!(code.issue_date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_attendance_code_serializes() {
        let issued_at = Local.with_ymd_and_hms(2024, 3, 10, 9, 15, 0).unwrap();
        let code = AttendanceCode::new("667".to_string(), issued_at);

        let value = serde_json::to_value(&code).unwrap();

        assert_eq!(value["code"], "667");
        assert!(value["issued_at"].as_str().unwrap().starts_with("2024-03-10T09:15:00"));
    }
}
