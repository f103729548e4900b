//! Time source used to decide which day's window is authoritative.

use chrono::{DateTime, Local, NaiveDate};

/// Provides the current local time.
///
/// Injected into the allocator so day rollover can be tested
/// without waiting for midnight.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Calendar day of `clock` in local time.
pub fn today(clock: &dyn Clock) -> NaiveDate {
    clock.now().date_naive()
}
