#![allow(dead_code)]

use attendance_codes::prelude::*;
use chrono::{DateTime, Duration, Local, TimeZone};
use parking_lot::Mutex;
use std::sync::Arc;

/// Clock that only moves when a test advances it.
pub struct ManualClock(Mutex<DateTime<Local>>);

impl ManualClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self(Mutex::new(
            Local
                .with_ymd_and_hms(year, month, day, hour, 0, 0)
                .unwrap(),
        ))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock()
    }
}

pub type TestAllocator<S = CodeGenerator> = CodeAllocator<MemoryCodeRepository, ManualClock, S>;

pub fn morning_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at(2024, 3, 10, 8))
}

/// Allocator over an empty in-memory repository with a seeded generator.
pub fn create_allocator(banned: BannedPatterns) -> TestAllocator {
    CodeAllocator::with_parts(
        Arc::new(MemoryCodeRepository::new()),
        morning_clock(),
        CodeGenerator::seeded(2024),
        banned,
    )
}

/// Allocator replaying `codes` as its candidates.
pub fn create_scripted_allocator(codes: &[&str]) -> TestAllocator<ScriptedCandidates> {
    CodeAllocator::with_parts(
        Arc::new(MemoryCodeRepository::new()),
        morning_clock(),
        ScriptedCandidates::new(codes.iter().copied()),
        BannedPatterns::empty(),
    )
}

/// Issues `count` codes of `shape`, panicking on failure.
pub fn issue_many<S: CandidateSource>(
    allocator: &TestAllocator<S>,
    shape: CodeShape,
    count: usize,
) -> Vec<String> {
    (0..count).map(|_| allocator.issue(&shape).unwrap()).collect()
}
