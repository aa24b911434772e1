//! Ranked recognition results
//!
//! Ordered set of candidate transcripts for one listening attempt. Rank 0 is
//! the primary, committable entry; the user may promote an alternate into
//! its place before committing. The set serializes to an ordered list of
//! strings for state restoration across a suspend/resume boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of candidates kept: one primary plus three alternates.
/// The engine may deliver up to five; extras are dropped.
pub const MAX_RESULTS: usize = 4;

/// One candidate transcript with its display rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    rank: usize,
}

impl Transcript {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// Errors from constructing or mutating a result set
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResultSetError {
    #[error("Recognizer returned no usable results")]
    NoResults,

    #[error("Promote index {index} out of range (1..{len})")]
    PromoteOutOfRange { index: usize, len: usize },
}

/// Ordered candidate transcripts, rank 0 first
///
/// Invariant: ranks are contiguous `0..len` and unique, so rank always
/// equals position. Holds at most [`MAX_RESULTS`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<Transcript>,
}

impl ResultSet {
    /// Build a ranked set from the engine's best-first final transcripts
    ///
    /// Blank candidates are skipped. Fails with
    /// [`ResultSetError::NoResults`] when nothing usable remains; the
    /// session treats that exactly like a recognition error.
    pub fn from_final(transcripts: &[String]) -> Result<Self, ResultSetError> {
        let entries: Vec<Transcript> = transcripts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .take(MAX_RESULTS)
            .enumerate()
            .map(|(rank, text)| Transcript {
                text: text.clone(),
                rank,
            })
            .collect();

        if entries.is_empty() {
            return Err(ResultSetError::NoResults);
        }
        Ok(Self { entries })
    }

    /// Rebuild a set from previously persisted strings
    ///
    /// Produces state identical to having built the set from a `Final`
    /// event carrying the same strings.
    pub fn from_saved(saved: &SavedResults) -> Result<Self, ResultSetError> {
        Self::from_final(&saved.0)
    }

    /// The committable rank-0 transcript text
    pub fn primary(&self) -> &str {
        &self.entries[0].text
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidate texts in rank order, for display
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Make the alternate at `index` the new primary
    ///
    /// Swaps the rank-0 and rank-`index` texts in place, O(1). Applying the
    /// same promote twice restores the original ordering. Requires
    /// `0 < index < len`.
    pub fn promote(&mut self, index: usize) -> Result<(), ResultSetError> {
        if index == 0 || index >= self.entries.len() {
            return Err(ResultSetError::PromoteOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.entries.swap(0, index);
        self.entries[0].rank = 0;
        self.entries[index].rank = index;
        Ok(())
    }

    /// Ordered strings for persistence; rank is implied by position
    pub fn snapshot(&self) -> SavedResults {
        SavedResults(self.texts())
    }
}

/// Persisted shape of a result set: ordered strings, rank by position
///
/// Absent or empty means the session resumes in the listening phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedResults(pub Vec<String>);

impl SavedResults {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_final_ranks_by_position() {
        let set = ResultSet::from_final(&strings(&["a", "b", "c"])).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.primary(), "a");
        assert_eq!(set.texts(), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_from_final_empty_fails() {
        assert_eq!(
            ResultSet::from_final(&[]).unwrap_err(),
            ResultSetError::NoResults
        );
    }

    #[test]
    fn test_from_final_all_blank_fails() {
        let err = ResultSet::from_final(&strings(&["", "   "])).unwrap_err();
        assert_eq!(err, ResultSetError::NoResults);
    }

    #[test]
    fn test_from_final_skips_blanks_and_caps_size() {
        let set =
            ResultSet::from_final(&strings(&["a", " ", "b", "c", "d", "e"])).unwrap();
        assert_eq!(set.len(), MAX_RESULTS);
        assert_eq!(set.texts(), strings(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_promote_swaps_primary() {
        let mut set = ResultSet::from_final(&strings(&["a", "b", "c"])).unwrap();
        set.promote(2).unwrap();
        assert_eq!(set.primary(), "c");
        assert_eq!(set.texts(), strings(&["c", "b", "a"]));
    }

    #[test]
    fn test_promote_is_its_own_inverse() {
        let mut set = ResultSet::from_final(&strings(&["a", "b", "c"])).unwrap();
        let original = set.clone();
        set.promote(1).unwrap();
        set.promote(1).unwrap();
        assert_eq!(set, original);
    }

    #[test]
    fn test_promote_out_of_range() {
        let mut set = ResultSet::from_final(&strings(&["a", "b"])).unwrap();
        assert!(set.promote(0).is_err());
        assert!(set.promote(2).is_err());
        // Set unchanged after rejected promotes
        assert_eq!(set.texts(), strings(&["a", "b"]));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let set = ResultSet::from_final(&strings(&["a", "b", "c"])).unwrap();
        let restored = ResultSet::from_saved(&set.snapshot()).unwrap();
        assert_eq!(restored, set);
    }

    #[test]
    fn test_ranks_stay_contiguous_after_promote() {
        let mut set = ResultSet::from_final(&strings(&["a", "b", "c"])).unwrap();
        set.promote(1).unwrap();
        for (position, entry) in set.entries.iter().enumerate() {
            assert_eq!(entry.rank(), position);
        }
    }

    #[test]
    fn test_saved_results_serializes_as_plain_strings() {
        let saved = SavedResults(strings(&["a", "b"]));
        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: SavedResults = serde_json::from_str(&json).unwrap();
        assert_eq!(back, saved);
    }
}
