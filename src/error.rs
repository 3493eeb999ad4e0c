//! Error types for probegen
//!
//! Failures fall into two classes with different routing:
//!
//! - [`ProbeError`]: the input is structurally unusable. File-level errors
//!   abort the whole run; [`ProbeError::InvalidStatement`] aborts the one
//!   statement it names.
//! - [`CandidateError`]: one candidate of an expansion (one transcript, one
//!   degenerate-codon combination) cannot be resolved. The candidate is
//!   skipped and its siblings continue; the failure is reported through the
//!   [`Warning`] side channel rather than propagated.

use thiserror::Error;

/// Fatal errors: abort the current unit of work without partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No statement grammar accepts the input line.
    #[error("could not parse statement {statement:?}")]
    InvalidStatement { statement: String },

    /// The reference genome file violates the multi-FASTA format.
    #[error("invalid genome file: {msg}")]
    InvalidGenomeFile { msg: String },

    /// The annotation table violates the UCSC format assumptions.
    #[error("invalid annotation file: {msg}")]
    InvalidAnnotationFile { msg: String },

    /// Two non-adjacent sequence ranges were concatenated.
    #[error("cannot concatenate non-adjacent ranges {left} and {right}")]
    Adjacency { left: String, right: String },

    /// File I/O failure.
    #[error("I/O error: {msg}")]
    Io { msg: String },
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io {
            msg: err.to_string(),
        }
    }
}

/// Recoverable, per-candidate errors raised during expansion or resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    /// A transcript-relative index falls outside the coding region.
    #[error("base {index} is outside the range of transcript {transcript:?}")]
    OutOfRange { index: u64, transcript: String },

    /// An exon number exceeds the transcript's exon count.
    #[error("no exon {exon} in transcript {transcript:?} ({count} exons)")]
    NoFeature {
        exon: u64,
        transcript: String,
        count: usize,
    },

    /// The chromosome is absent from the reference genome.
    #[error("no such chromosome: {chromosome:?}")]
    MissingChromosome { chromosome: String },

    /// A genomic slice extends past the end of its chromosome.
    #[error("range [{start}, {end}) outside the range of chromosome {chromosome:?}")]
    NonContainedRange {
        chromosome: String,
        start: u64,
        end: u64,
    },

    /// The genome disagrees with the declared reference bases.
    #[error(
        "reference {expected:?} does not match genome bases {found:?} at {chromosome}:{position}"
    )]
    ReferenceMismatch {
        chromosome: String,
        /// 1-based coordinate of the first base of the mutation range.
        position: u64,
        expected: String,
        found: String,
    },

    /// An indel region is split across an exon junction.
    #[error(
        "region c.{start}-c.{end} of transcript {transcript:?} is split across an exon junction"
    )]
    DiscontinuousIndelRegion {
        start: u64,
        end: u64,
        transcript: String,
    },
}

/// One skipped expansion candidate, with enough context to locate the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The statement text that produced the candidate.
    pub statement: String,
    /// The transcript under consideration, when one was involved.
    pub transcript: Option<String>,
    /// Why the candidate was skipped.
    pub error: CandidateError,
}

impl Warning {
    pub fn new(statement: &str, transcript: Option<&str>, error: CandidateError) -> Self {
        Self {
            statement: statement.to_string(),
            transcript: transcript.map(str::to_string),
            error,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.transcript {
            Some(name) => write!(
                f,
                "{} (transcript {:?}) in statement {:?}",
                self.error, name, self.statement
            ),
            None => write!(f, "{} in statement {:?}", self.error, self.statement),
        }
    }
}
