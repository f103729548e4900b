//! Attendance code generation.
//!
//! Builds candidate codes from three segments: random alphanumeric characters,
//! random alpha characters, then a numeric part that is either random or
//! sequential. Candidates are not checked for uniqueness here; that is the
//! allocator's job.

use crate::domain::banned_patterns::BannedPatterns;
use crate::domain::candidate_source::{CandidateRequest, CandidateSource};
use crate::domain::entities::{CodeShape, MAX_CODE_LENGTH};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Letters allowed in codes. Vowels and easily confused letters are left out.
pub const ALPHA_CHARACTERS: &[u8] = b"BCDFGHJKLMNPRSTXZ";

/// Digits allowed in codes.
pub const NUMERIC_CHARACTERS: &[u8] = b"0123456789";

/// Union of [`ALPHA_CHARACTERS`] and [`NUMERIC_CHARACTERS`].
pub const ALPHANUMERIC_CHARACTERS: &[u8] = b"BCDFGHJKLMNPRSTXZ0123456789";

/// Default candidate source.
///
/// Owns its random number generator; it holds no knowledge of issued codes
/// beyond what each [`CodeGenerator::codes`] call is handed.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    rng: StdRng,
}

impl CodeGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a generator with a fixed seed, for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Starts an endless stream of candidates for `shape`.
    ///
    /// In sequential mode the stream counts upward from the highest numeric
    /// suffix among `issued` codes of the same total length, skipping values
    /// whose digits contain a banned pattern. The counter advances on every
    /// item, so rejected candidates are followed by the next value.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let banned = BannedPatterns::new(["666"]);
    /// let mut generator = CodeGenerator::new();
    /// let mut codes = generator.codes(CodeShape::new(0, 0, 3, false), ["665"], &banned);
    /// assert_eq!(codes.next_code(), "667");
    /// ```
    pub fn codes<'a, I, S>(
        &'a mut self,
        shape: CodeShape,
        issued: I,
        banned: &'a BannedPatterns,
    ) -> Codes<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sequence = (!shape.randomized && shape.numeric_length > 0)
            .then(|| NumericSequence::resume(&shape, issued));

        Codes {
            rng: &mut self.rng,
            shape,
            banned,
            sequence,
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSource for CodeGenerator {
    fn candidates<'a>(
        &'a mut self,
        request: CandidateRequest<'a>,
    ) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(self.codes(*request.shape, request.issued, request.banned))
    }
}

/// Candidate stream returned by [`CodeGenerator::codes`].
pub struct Codes<'a> {
    rng: &'a mut StdRng,
    shape: CodeShape,
    banned: &'a BannedPatterns,
    sequence: Option<NumericSequence>,
}

impl Codes<'_> {
    /// Produces the next candidate.
    pub fn next_code(&mut self) -> String {
        let mut code = String::with_capacity(self.shape.total_length().min(MAX_CODE_LENGTH));

        let shape = self.shape;
        push_random(&mut code, self.rng, ALPHANUMERIC_CHARACTERS, shape.alphanumeric_length);
        push_random(&mut code, self.rng, ALPHA_CHARACTERS, shape.alpha_length);

        match self.sequence.as_mut() {
            Some(sequence) => code.push_str(&sequence.advance(self.banned)),
            None => push_random(&mut code, self.rng, NUMERIC_CHARACTERS, shape.numeric_length),
        }

        code
    }
}

impl Iterator for Codes<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_code())
    }
}

fn push_random(code: &mut String, rng: &mut StdRng, pool: &[u8], length: usize) {
    code.extend((0..length).map(|_| char::from(pool[rng.random_range(0..pool.len())])));
}

/// Counter behind the sequential numeric segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumericSequence {
    last: u64,
    modulus: u64,
    width: usize,
}

impl NumericSequence {
    /// Picks up after the highest numeric suffix among codes whose total length
    /// matches `shape`.
    ///
    /// Matching on total length rather than on the full shape means two shapes
    /// of equal length share one sequence.
    fn resume<I, S>(shape: &CodeShape, issued: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let width = shape.numeric_length;
        let total = shape.total_length();

        // Widths past u64 range (unvalidated shapes) count within u64 instead.
        let modulus = u32::try_from(width)
            .ok()
            .and_then(|w| 10u64.checked_pow(w))
            .unwrap_or(u64::MAX);

        let last = issued
            .into_iter()
            .filter(|code| code.as_ref().len() == total)
            .map(|code| numeric_suffix(code.as_ref(), width))
            .max()
            .unwrap_or(0);

        Self {
            last: last % modulus,
            modulus,
            width,
        }
    }

    /// Moves to the next value whose digits contain no banned pattern.
    ///
    /// Wraps to zero past the largest value. The scan gives up after one full
    /// cycle and returns whatever value it stopped on; such a value still
    /// contains a banned pattern, so the allocator rejects it.
    fn advance(&mut self, banned: &BannedPatterns) -> String {
        let mut value = (self.last + 1) % self.modulus;
        let mut digits = self.format(value);
        let mut skipped = 0;

        while banned.matches(&digits) && skipped < self.modulus {
            value = (value + 1) % self.modulus;
            digits = self.format(value);
            skipped += 1;
        }

        self.last = value;
        digits
    }

    fn format(&self, value: u64) -> String {
        format!("{value:0width$}", width = self.width)
    }
}

/// Numeric value of the last `width` characters of `code`; 0 if they are not all digits.
fn numeric_suffix(code: &str, width: usize) -> u64 {
    code.len()
        .checked_sub(width)
        .and_then(|start| code.get(start..))
        .filter(|suffix| suffix.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0)
}
