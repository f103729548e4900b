//! Registry of the codes issued during one calendar day.

use chrono::NaiveDate;
use std::collections::HashSet;

/// Codes issued since the start of `date`.
///
/// `date == None` marks a window that has to be reloaded from the repository
/// before the next issuance. The set only shrinks through [`DayWindow::flush`]
/// or by being replaced on day rollover.
#[derive(Debug, Clone, Default)]
pub struct DayWindow {
    date: Option<NaiveDate>,
    codes: HashSet<String>,
}

impl DayWindow {
    /// A window that must be loaded before use.
    pub fn stale() -> Self {
        Self::default()
    }

    /// A window for `date` holding `codes`.
    pub fn load<I, S>(date: NaiveDate, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            date: Some(date),
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns true if this window is the authoritative registry for `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date == Some(today)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Records a code. Returns false if it was already present.
    pub fn insert(&mut self, code: String) -> bool {
        self.codes.insert(code)
    }

    pub fn extend<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes.extend(codes.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &HashSet<String> {
        &self.codes
    }

    /// Clears every code.
    ///
    /// With `Some(date)` the empty window stays authoritative for that date;
    /// with `None` it becomes stale and will be reloaded.
    pub fn flush(&mut self, baseline: Option<NaiveDate>) {
        self.codes.clear();
        self.date = baseline;
    }
}
