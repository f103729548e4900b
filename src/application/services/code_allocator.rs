//! Process-wide allocation of unique attendance codes.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::banned_patterns::BannedPatterns;
use crate::domain::candidate_source::{CandidateRequest, CandidateSource};
use crate::domain::clock::{self, Clock, SystemClock};
use crate::domain::day_window::DayWindow;
use crate::domain::entities::{AttendanceCode, CodeShape};
use crate::domain::repositories::AttendanceCodeRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Candidates examined by one issuance before it fails.
///
/// Even close to the capacity of a shape an issuance rarely needs more than a
/// few thousand attempts; a million means the configured code space is too
/// small for the demand.
pub const MAX_ATTEMPTS: u32 = 1_000_000;

struct AllocatorState<S> {
    window: DayWindow,
    banned: BannedPatterns,
    source: S,
}

/// Hands out codes that are unique for the day and free of banned patterns.
///
/// One allocator is shared per process (`Arc<CodeAllocator<..>>`). A single
/// lock covers day rollover, candidate generation, validation and commit, so
/// two callers can never receive the same code and no caller sees a code that
/// was validated but not yet recorded.
///
/// The allocator never persists codes. Callers store the code after
/// [`CodeAllocator::issue`] returns (see
/// [`crate::application::services::AttendanceCodeService`]).
pub struct CodeAllocator<R, C = SystemClock, S = CodeGenerator>
where
    R: AttendanceCodeRepository,
    C: Clock,
    S: CandidateSource,
{
    repository: Arc<R>,
    clock: Arc<C>,
    state: Mutex<AllocatorState<S>>,
}

impl<R: AttendanceCodeRepository> CodeAllocator<R> {
    /// Creates an allocator on the system clock with the default generator.
    pub fn new(repository: Arc<R>, banned: BannedPatterns) -> Self {
        Self::with_parts(repository, Arc::new(SystemClock), CodeGenerator::new(), banned)
    }
}

impl<R, C, S> CodeAllocator<R, C, S>
where
    R: AttendanceCodeRepository,
    C: Clock,
    S: CandidateSource,
{
    /// Creates an allocator with an explicit clock and candidate source.
    ///
    /// The window starts stale, so the first issuance loads today's codes
    /// from `repository`.
    pub fn with_parts(
        repository: Arc<R>,
        clock: Arc<C>,
        source: S,
        banned: BannedPatterns,
    ) -> Self {
        Self {
            repository,
            clock,
            state: Mutex::new(AllocatorState {
                window: DayWindow::stale(),
                banned,
                source,
            }),
        }
    }

    /// Issues a new code for `shape`.
    ///
    /// # Errors
    ///
    /// See [`Self::issue_code`].
    pub fn issue(&self, shape: &CodeShape) -> Result<String, AppError> {
        self.issue_code(shape).map(|issued| issued.code)
    }

    /// Issues a new code for `shape`, stamped with the time it was committed.
    ///
    /// The clock is read once, under the lock: the same instant picks the
    /// day's window and becomes `issued_at`, so a code committed just before
    /// midnight is never recorded as issued on the next day.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the shape is invalid.
    /// Returns [`AppError::Storage`] if today's codes cannot be loaded.
    /// Returns [`AppError::AllocationTimeout`] if no acceptable candidate was
    /// found within [`MAX_ATTEMPTS`], or the candidate source ran dry.
    pub fn issue_code(&self, shape: &CodeShape) -> Result<AttendanceCode, AppError> {
        shape.validate()?;

        let mut state = self.state.lock();
        let now = self.clock.now();
        self.ensure_current_day(&mut state, now.date_naive())?;

        let AllocatorState {
            window,
            banned,
            source,
        } = &mut *state;

        let (code, attempts) = match find_candidate(source, shape, window, banned) {
            Ok(found) => found,
            Err(e) => {
                metrics::counter!("attendance_code_allocation_timeouts_total").increment(1);
                error!(
                    details = %shape_details(shape),
                    issued_today = window.len(),
                    "{e}"
                );
                return Err(e);
            }
        };

        window.insert(code.clone());

        metrics::counter!("attendance_codes_issued_total").increment(1);
        metrics::histogram!("attendance_code_attempts").record(f64::from(attempts));
        debug!(%code, attempts, issued_today = window.len(), "Issued attendance code");

        Ok(AttendanceCode::new(code, now))
    }

    /// Clears today's codes.
    ///
    /// With `reset_baseline` the empty window stays authoritative for today,
    /// so codes already in the repository are ignored until the next day.
    /// Without it the next issuance reloads today's codes from the repository.
    pub fn flush_todays_codes(&self, reset_baseline: bool) {
        let mut state = self.state.lock();
        let baseline = reset_baseline.then(|| self.today());
        state.window.flush(baseline);

        info!(reset_baseline, "Flushed today's attendance codes");
    }

    /// Seeds the window with codes already issued today.
    ///
    /// A window that is not current for today is replaced first; the
    /// repository is not consulted.
    pub fn load_todays_codes<I, T>(&self, codes: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut state = self.state.lock();
        let today = self.today();

        if !state.window.is_current(today) {
            state.window = DayWindow::load(today, Vec::<String>::new());
        }
        state.window.extend(codes);

        debug!(issued_today = state.window.len(), "Seeded today's attendance codes");
    }

    /// Adds banned patterns. They apply to every issuance from now on.
    pub fn ban_patterns<I, T>(&self, patterns: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let added = self.state.lock().banned.extend(patterns);
        info!(added, "Extended banned patterns");
        added
    }

    /// Snapshot of the banned patterns in effect.
    pub fn banned_patterns(&self) -> BannedPatterns {
        self.state.lock().banned.clone()
    }

    /// Number of codes in the current window.
    pub fn issued_count(&self) -> usize {
        self.state.lock().window.len()
    }

    fn today(&self) -> NaiveDate {
        clock::today(self.clock.as_ref())
    }

    /// Reloads the window when it is stale or belongs to an earlier day.
    fn ensure_current_day(
        &self,
        state: &mut AllocatorState<S>,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        if state.window.is_current(today) {
            return Ok(());
        }

        let codes = self.repository.codes_issued_on(today)?;
        let previous = state.window.date();
        state.window = DayWindow::load(today, codes);

        metrics::counter!("attendance_code_window_reloads_total").increment(1);
        info!(
            %today,
            ?previous,
            issued_today = state.window.len(),
            "Loaded today's attendance codes"
        );

        Ok(())
    }
}

/// Pulls candidates until one is non-empty, clean and unused.
///
/// Returns the code and the number of attempts it took.
fn find_candidate<S: CandidateSource>(
    source: &mut S,
    shape: &CodeShape,
    window: &DayWindow,
    banned: &BannedPatterns,
) -> Result<(String, u32), AppError> {
    let mut candidates = source.candidates(CandidateRequest {
        shape,
        issued: window.codes(),
        banned,
    });

    let mut attempts = 0;
    loop {
        attempts += 1;
        if attempts > MAX_ATTEMPTS {
            return Err(AppError::allocation_timeout(attempts - 1));
        }

        let Some(code) = candidates.next() else {
            return Err(AppError::allocation_timeout(attempts - 1));
        };

        if code.is_empty() || banned.matches(&code) || window.contains(&code) {
            continue;
        }

        return Ok((code, attempts));
    }
}

impl<R, C, S> std::fmt::Debug for CodeAllocator<R, C, S>
where
    R: AttendanceCodeRepository,
    C: Clock,
    S: CandidateSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CodeAllocator")
            .field("day", &state.window.date())
            .field("issued_today", &state.window.len())
            .field("banned_patterns", &state.banned.len())
            .finish_non_exhaustive()
    }
}

/// Shape and capacity, for logs and error payloads.
pub(crate) fn shape_details(shape: &CodeShape) -> serde_json::Value {
    json!({
        "shape": shape,
        "capacity": shape.capacity().map(|c| c.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::banned_patterns::default_banned_patterns;
    use crate::domain::candidate_source::ScriptedCandidates;
    use crate::domain::clock::MockClock;
    use crate::domain::repositories::MockAttendanceCodeRepository;
    use crate::utils::code_generator::ALPHA_CHARACTERS;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use std::collections::HashSet;

    /// Clock whose time only moves when the test says so.
    struct ManualClock(Mutex<DateTime<Local>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()))
        }

        fn advance_days(&self, days: i64) {
            *self.0.lock() += Duration::days(days);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.0.lock()
        }
    }

    fn fixed_clock() -> Arc<MockClock> {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap());
        Arc::new(clock)
    }

    fn empty_repository() -> Arc<MockAttendanceCodeRepository> {
        let mut repository = MockAttendanceCodeRepository::new();
        repository.expect_codes_issued_on().returning(|_| Ok(vec![]));
        Arc::new(repository)
    }

    fn scripted_allocator(
        codes: &[&str],
        banned: BannedPatterns,
    ) -> CodeAllocator<MockAttendanceCodeRepository, MockClock, ScriptedCandidates> {
        let allocator = CodeAllocator::with_parts(
            empty_repository(),
            fixed_clock(),
            ScriptedCandidates::new(codes.iter().copied()),
            banned,
        );
        allocator.flush_todays_codes(true);
        allocator
    }

    fn generator_allocator(
        banned: BannedPatterns,
    ) -> CodeAllocator<MockAttendanceCodeRepository, MockClock, CodeGenerator> {
        let allocator = CodeAllocator::with_parts(
            empty_repository(),
            fixed_clock(),
            CodeGenerator::seeded(5),
            banned,
        );
        allocator.flush_todays_codes(true);
        allocator
    }

    #[test]
    fn test_skip_banned_codes() {
        let banned = default_banned_patterns();
        let first_banned = banned.iter().next().unwrap().to_string();
        let allocator = scripted_allocator(&[first_banned.as_str(), "AB12"], banned);

        let code = allocator.issue(&CodeShape::default()).unwrap();

        assert_eq!(code, "AB12");
    }

    #[test]
    fn test_skip_codes_containing_banned_pattern() {
        let allocator = scripted_allocator(&["B666X", "", "BKX"], BannedPatterns::new(["666"]));

        let code = allocator.issue(&CodeShape::default()).unwrap();

        assert_eq!(code, "BKX");
    }

    #[test]
    fn test_skip_duplicates() {
        let allocator = scripted_allocator(
            &["ABC", "ABC", "DEF", "ABC", "GHI", "DEF"],
            BannedPatterns::empty(),
        );
        let shape = CodeShape::default();

        let issued: Vec<String> = (0..3).map(|_| allocator.issue(&shape).unwrap()).collect();

        assert_eq!(issued, ["ABC", "DEF", "GHI"]);
        assert_eq!(allocator.issued_count(), 3);
    }

    #[test]
    fn test_exhausted_script_fails_like_timeout() {
        let allocator = scripted_allocator(&["ABC", "ABC"], BannedPatterns::empty());
        let shape = CodeShape::default();

        allocator.issue(&shape).unwrap();
        let result = allocator.issue(&shape);

        assert!(matches!(result, Err(AppError::AllocationTimeout { attempts: 1 })));
        assert_eq!(allocator.issued_count(), 1);
    }

    #[test]
    fn test_invalid_shape_is_rejected_before_loading() {
        let mut repository = MockAttendanceCodeRepository::new();
        repository.expect_codes_issued_on().times(0);
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            fixed_clock(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );

        let result = allocator.issue(&CodeShape::new(0, 0, 0, true));

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_sequential_codes_from_empty_window() {
        let allocator = generator_allocator(BannedPatterns::empty());
        let shape = CodeShape::new(0, 0, 3, false);

        let issued: Vec<String> = (0..5).map(|_| allocator.issue(&shape).unwrap()).collect();

        assert_eq!(issued, ["001", "002", "003", "004", "005"]);
    }

    #[test]
    fn test_sequential_wraps_after_largest_value() {
        let allocator = generator_allocator(BannedPatterns::empty());
        let shape = CodeShape::new(0, 0, 3, false);

        let issued: Vec<String> = (0..1000).map(|_| allocator.issue(&shape).unwrap()).collect();

        assert_eq!(issued[998], "999");
        assert_eq!(issued[999], "000");
    }

    #[test]
    fn test_skip_banned_numeric_value() {
        let allocator = generator_allocator(BannedPatterns::new(["666"]));
        allocator.load_todays_codes(["665"]);

        let code = allocator.issue(&CodeShape::new(0, 0, 3, false)).unwrap();

        assert_eq!(code, "667");
    }

    #[test]
    fn test_numeric_code_cycles_after_9999() {
        let allocator = generator_allocator(BannedPatterns::empty());
        allocator.load_todays_codes(["9999"]);
        let shape = CodeShape::new(0, 0, 4, false);

        let issued: Vec<String> = (0..3).map(|_| allocator.issue(&shape).unwrap()).collect();

        assert_eq!(issued, ["0000", "0001", "0002"]);
    }

    #[test]
    fn test_skip_duplicates_while_incrementing() {
        let allocator = generator_allocator(BannedPatterns::empty());
        allocator.load_todays_codes(["0000", "9999"]);

        let code = allocator.issue(&CodeShape::new(0, 0, 4, false)).unwrap();

        assert_eq!(code, "0001");
    }

    #[test]
    fn test_skip_banned_combined_codes() {
        // Neither part is banned on its own, only the combination.
        let banned = BannedPatterns::new(
            ALPHA_CHARACTERS
                .iter()
                .map(|c| format!("{}1", char::from(*c))),
        );
        let allocator = generator_allocator(banned);

        let code = allocator.issue(&CodeShape::new(0, 1, 1, false)).unwrap();

        assert!(code.ends_with('2'), "got {code}");
    }

    #[test]
    fn test_requesting_more_codes_than_possible_times_out() {
        let allocator = generator_allocator(BannedPatterns::empty());
        let shape = CodeShape::new(0, 0, 2, false);

        let issued: HashSet<String> = (0..100).map(|_| allocator.issue(&shape).unwrap()).collect();
        assert_eq!(issued.len(), 100);

        let result = allocator.issue(&shape);

        match result {
            Err(AppError::AllocationTimeout { attempts }) => assert_eq!(attempts, MAX_ATTEMPTS),
            other => panic!("expected allocation timeout, got {other:?}"),
        }
        assert_eq!(allocator.issued_count(), 100);
    }

    #[test]
    fn test_codes_unique_across_shapes() {
        let allocator = generator_allocator(default_banned_patterns());
        let shapes = [
            CodeShape::new(0, 0, 3, false),
            CodeShape::new(0, 1, 2, true),
            CodeShape::new(3, 0, 0, true),
            CodeShape::new(0, 2, 1, false),
        ];

        let mut seen = HashSet::new();
        for i in 0..400 {
            let shape = shapes[i % shapes.len()];
            let code = allocator.issue(&shape).unwrap();
            assert_eq!(code.len(), shape.total_length());
            assert!(!allocator.banned_patterns().matches(&code), "{code}");
            assert!(seen.insert(code));
        }
    }

    #[test]
    fn test_first_issue_loads_todays_codes() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut repository = MockAttendanceCodeRepository::new();
        repository
            .expect_codes_issued_on()
            .withf(move |date| *date == today)
            .times(1)
            .returning(|_| Ok(vec!["001".to_string(), "002".to_string()]));
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            fixed_clock(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );
        let shape = CodeShape::new(0, 0, 3, false);

        assert_eq!(allocator.issue(&shape).unwrap(), "003");
        assert_eq!(allocator.issue(&shape).unwrap(), "004");
        assert_eq!(allocator.issued_count(), 4);
    }

    #[test]
    fn test_day_rollover_reloads_once_per_day() {
        let mut repository = MockAttendanceCodeRepository::new();
        repository
            .expect_codes_issued_on()
            .times(2)
            .returning(|_| Ok(vec![]));
        let clock = Arc::new(ManualClock::new());
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            clock.clone(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );
        let shape = CodeShape::new(0, 0, 3, false);

        assert_eq!(allocator.issue(&shape).unwrap(), "001");
        assert_eq!(allocator.issue(&shape).unwrap(), "002");

        clock.advance_days(1);

        assert_eq!(allocator.issue(&shape).unwrap(), "001");
        assert_eq!(allocator.issued_count(), 1);
    }

    #[test]
    fn test_flush_without_baseline_reloads_from_repository() {
        let mut repository = MockAttendanceCodeRepository::new();
        repository
            .expect_codes_issued_on()
            .times(2)
            .returning(|_| Ok(vec!["041".to_string()]));
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            fixed_clock(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );
        let shape = CodeShape::new(0, 0, 3, false);

        assert_eq!(allocator.issue(&shape).unwrap(), "042");
        allocator.flush_todays_codes(false);
        assert_eq!(allocator.issued_count(), 0);

        assert_eq!(allocator.issue(&shape).unwrap(), "042");
    }

    #[test]
    fn test_flush_with_baseline_ignores_repository() {
        let mut repository = MockAttendanceCodeRepository::new();
        repository.expect_codes_issued_on().times(0);
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            fixed_clock(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );

        allocator.flush_todays_codes(true);

        assert_eq!(allocator.issue(&CodeShape::new(0, 0, 3, false)).unwrap(), "001");
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut repository = MockAttendanceCodeRepository::new();
        repository
            .expect_codes_issued_on()
            .returning(|_| Err(AppError::storage("Database unavailable", json!({}))));
        let allocator = CodeAllocator::with_parts(
            Arc::new(repository),
            fixed_clock(),
            CodeGenerator::seeded(1),
            BannedPatterns::empty(),
        );

        let result = allocator.issue(&CodeShape::default());

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[test]
    fn test_ban_patterns_applies_immediately() {
        let allocator = scripted_allocator(&["BK1", "BK2"], BannedPatterns::empty());

        let added = allocator.ban_patterns(["k1"]);

        assert_eq!(added, 1);
        assert!(allocator.banned_patterns().contains("K1"));
        assert_eq!(allocator.issue(&CodeShape::default()).unwrap(), "BK2");
    }

    #[test]
    fn test_shape_details() {
        let details = shape_details(&CodeShape::new(0, 0, 2, false));

        assert_eq!(details["capacity"], "100");
        assert_eq!(details["shape"]["numeric_length"], 2);
    }
}
