//! Substrings that must never appear inside an issued code.

use std::collections::BTreeSet;

/// Patterns rejected out of the box: profanity look-alikes and numbers with
/// unwanted connotations.
pub const DEFAULT_BANNED_PATTERNS: &[&str] = &[
    "4NL", "4SS", "455", "5CK", "5HT", "5LT", "5NM", "5TD", "5XX", "666", "BCH", "CLT", "CNT",
    "D4M", "D5H", "DCK", "DMN", "DSH", "F4G", "FCK", "FGT", "G4Y", "GZZ", "H8R", "JNK", "JZZ",
    "KKK", "KLT", "KNT", "L5D", "LCK", "LSD", "MFF", "MLF", "ND5", "NDS", "NDZ", "NGR", "P55",
    "PCP", "PHC", "PHK", "PHQ", "PM5", "PMS", "PN5", "PNS", "PRC", "PRK", "PRN", "PRQ", "PSS",
    "RCK", "SCK", "S3X", "SHT", "SLT", "SNM", "STD", "SXX", "THC", "V4G", "WCK", "XTC", "XXX",
    "911", "999",
];

/// Set of banned substrings.
///
/// A code is banned when *any* pattern occurs anywhere inside it, not only
/// when it equals a pattern. Patterns are stored trimmed and uppercased; blank
/// patterns are dropped since they would match every code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedPatterns {
    patterns: BTreeSet<String>,
}

impl BannedPatterns {
    /// An empty set that bans nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut banned = Self::empty();
        banned.extend(patterns);
        banned
    }

    /// Adds patterns. Returns how many were not already present.
    pub fn extend<I, S>(&mut self, patterns: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.patterns.len();

        for pattern in patterns {
            let normalized = pattern.as_ref().trim().to_ascii_uppercase();
            if !normalized.is_empty() {
                self.patterns.insert(normalized);
            }
        }

        self.patterns.len() - before
    }

    /// Returns true if any banned pattern occurs inside `code`.
    pub fn matches(&self, code: &str) -> bool {
        self.patterns.iter().any(|p| code.contains(p.as_str()))
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(&pattern.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

/// Builds the set from [`DEFAULT_BANNED_PATTERNS`].
pub fn default_banned_patterns() -> BannedPatterns {
    BannedPatterns::new(DEFAULT_BANNED_PATTERNS)
}
