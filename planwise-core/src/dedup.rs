//! Repeat-utterance guard
//!
//! The chat layer can hand the same utterance to the pipeline more than once
//! (re-renders, retries). A turn is keyed on the utterance plus the head of
//! the prior response, so asking the same thing again after the assistant
//! has said something new still goes through.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Characters of the prior response text that take part in the key
pub const PRIOR_PREFIX_CHARS: usize = 20;

/// Set of already-processed turn keys, owned by one session.
#[derive(Debug, Default)]
pub struct DedupGuard {
    seen: Mutex<HashSet<String>>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for one turn
    pub fn key(utterance: &str, prior_text: Option<&str>) -> String {
        let head: String = prior_text
            .unwrap_or_default()
            .chars()
            .take(PRIOR_PREFIX_CHARS)
            .collect();
        format!("{}{}", utterance, head)
    }

    /// Record the turn and return true, or false when it was already seen.
    pub fn should_process(&self, utterance: &str, prior_text: Option<&str>) -> bool {
        let key = Self::key(utterance, prior_text);
        let fresh = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        if !fresh {
            tracing::debug!(utterance, "Skipping repeated utterance");
        }
        fresh
    }

    /// Forget every recorded turn (end of session).
    pub fn reset(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
