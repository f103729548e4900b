//! Pluggable supply of candidate codes for the allocator.

use crate::domain::banned_patterns::BannedPatterns;
use crate::domain::entities::CodeShape;
use std::collections::{HashSet, VecDeque};

/// Allocator state a source may look at while producing candidates.
///
/// Everything is borrowed read-only; sources never mutate the registry.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRequest<'a> {
    pub shape: &'a CodeShape,
    pub issued: &'a HashSet<String>,
    pub banned: &'a BannedPatterns,
}

/// Produces candidate codes, valid or not, for one issuance.
///
/// The allocator calls [`CandidateSource::candidates`] once per `issue` and
/// pulls from the returned iterator until a candidate passes validation or
/// the attempt ceiling is hit. An iterator that ends early fails the
/// issuance the same way the ceiling does.
///
/// # Implementations
///
/// - [`crate::utils::code_generator::CodeGenerator`] - Random and sequential codes
/// - [`ScriptedCandidates`] - Replays a fixed list, for deterministic tests
pub trait CandidateSource: Send {
    fn candidates<'a>(
        &'a mut self,
        request: CandidateRequest<'a>,
    ) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// Hands out a predefined list of codes in order, across issuances.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCandidates {
    queue: VecDeque<String>,
}

impl ScriptedCandidates {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of scripted codes not handed out yet.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl CandidateSource for ScriptedCandidates {
    fn candidates<'a>(
        &'a mut self,
        _request: CandidateRequest<'a>,
    ) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(std::iter::from_fn(move || self.queue.pop_front()))
    }
}
