//! Genomic sequence ranges
//!
//! # Coordinate System
//!
//! [`SequenceRange`] intervals are **0-based, half-open** `[start, end)`,
//! the convention used throughout the crate. 1-based coordinates appear
//! only at the statement-grammar and display boundaries.

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::sequence::reverse_complement;

/// A range of base pairs to be extracted from the genome.
///
/// The optional `mutation` payload marks a range whose genome bases are
/// replaced with a different sequence when the probe is resolved; the
/// optional `reference` records the bases expected at that location for
/// validation.
///
/// When `reverse_complement` is true and a mutation payload is supplied,
/// the payload is stored already reverse-complemented. The flag never
/// re-transforms a stored mutation at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRange {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reverse_complement: bool,
    pub reference: Option<String>,
    pub mutation: Option<String>,
}

impl SequenceRange {
    /// Create a plain range with no orientation flag or payloads.
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Self {
        Self::with_tags(chromosome, start, end, false, None, None)
    }

    /// Create a range to be reverse-complemented at resolution time.
    pub fn reversed(chromosome: impl Into<String>, start: u64, end: u64) -> Self {
        Self::with_tags(chromosome, start, end, true, None, None)
    }

    /// Create a range with the full set of tags.
    ///
    /// The mutation payload, if any, is reverse-complemented here when the
    /// flag is set, so the stored payload is always genome-oriented.
    pub fn with_tags(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        rc: bool,
        reference: Option<String>,
        mutation: Option<String>,
    ) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        let mutation = match mutation {
            Some(bases) if rc => Some(reverse_complement(&bases)),
            other => other,
        };
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reverse_complement: rc,
            reference,
            mutation,
        }
    }

    /// Number of bases covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when this range ends where `other` starts, or vice versa.
    ///
    /// The chromosome, mutation payload, and orientation flag must agree on
    /// both sides.
    pub fn adjacent(&self, other: &SequenceRange) -> bool {
        self.chromosome == other.chromosome
            && self.mutation == other.mutation
            && self.reverse_complement == other.reverse_complement
            && (self.start == other.end || self.end == other.start)
    }

    /// The combined region of two adjacent ranges.
    ///
    /// Fails with [`ProbeError::Adjacency`] when the ranges are not
    /// adjacent.
    pub fn concat(&self, other: &SequenceRange) -> Result<SequenceRange, ProbeError> {
        if !self.adjacent(other) {
            return Err(ProbeError::Adjacency {
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        let (start, end) = if self.end == other.start {
            (self.start, other.end)
        } else {
            (other.start, self.end)
        };
        Ok(SequenceRange {
            chromosome: self.chromosome.clone(),
            start,
            end,
            reverse_complement: self.reverse_complement,
            reference: self.reference.clone(),
            mutation: self.mutation.clone(),
        })
    }

    /// Fold a sequence of ranges into maximal adjacent runs.
    ///
    /// Consecutive adjacent ranges are merged greedily left to right; the
    /// order of the input is preserved. An empty input condenses to an
    /// empty output.
    pub fn condense(ranges: &[SequenceRange]) -> Vec<SequenceRange> {
        let mut condensed: Vec<SequenceRange> = Vec::new();
        for range in ranges {
            match condensed.last_mut() {
                Some(chunk) if chunk.adjacent(range) => {
                    // Adjacency was just checked, so concat cannot fail.
                    *chunk = chunk
                        .concat(range)
                        .expect("adjacent ranges must concatenate");
                }
                _ => condensed.push(range.clone()),
            }
        }
        condensed
    }
}

impl std::fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:[{}, {})", self.chromosome, self.start, self.end)?;
        if self.reverse_complement {
            write!(f, " (rc)")?;
        }
        Ok(())
    }
}
