//! Probe statements: grammars, expansion, and sequence resolution
//!
//! One submodule per statement kind. Every kind owns a parser for its
//! fixed-format grammar (the grammars are mutually exclusive over their
//! accepted languages) and an `explode` entry point that expands the
//! parsed statement, over matching transcripts, wildcard fields, and
//! degenerate codons, into concrete [`Probe`] values. Recoverable
//! per-candidate failures are pushed onto the caller's warning list;
//! only [`ProbeError::InvalidStatement`] escapes as an error.

pub mod amino_acid;
pub mod amino_acid_indel;
pub mod coordinate;
pub mod exon;
pub mod genome_snp;
mod parse;
pub mod transcript_indel;
pub mod transcript_snp;

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::error::{CandidateError, ProbeError, Warning};
use crate::genome::Genome;
use crate::range::SequenceRange;
use crate::sequence::reverse_complement;
use crate::transcript::Strand;

pub use amino_acid::AminoAcidProbe;
pub use amino_acid_indel::AminoAcidIndelProbe;
pub use coordinate::CoordinateProbe;
pub use exon::ExonProbe;
pub use genome_snp::GenomeSnpProbe;
pub use transcript_indel::TranscriptIndelProbe;
pub use transcript_snp::TranscriptSnpProbe;

/// The end of a feature a fusion half-probe is taken from, in
/// transcription terms: `+` is the transcription-start end, `-` the
/// transcription-end end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Start,
    End,
}

impl Side {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Side::Start),
            '-' => Some(Side::End),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Start => write!(f, "+"),
            Side::End => write!(f, "-"),
        }
    }
}

/// Whether a side, interpreted on a strand, names the genome-left end of
/// its feature.
pub(crate) fn keep_left(side: Side, strand: Strand) -> bool {
    (side == Side::Start) == (strand == Strand::Plus)
}

/// Whether a fusion joins its halves head-to-head or tail-to-tail, i.e.
/// one half must be reverse-complemented to bring the 5' and 3' ends
/// together: same side on the same strand, or different sides on
/// different strands.
pub fn inverted(side1: Side, strand1: Strand, side2: Side, strand2: Strand) -> bool {
    (side1 == side2) == (strand1 == strand2)
}

/// Orientation flag for one half of a fusion probe.
///
/// A half is reverse-complemented when its junction falls on the
/// genome-left edge of its kept range: the first half reads into the
/// junction, the second half reads out of it. `flip(first) XOR
/// flip(second)` equals [`inverted`].
pub(crate) fn flip(side: Side, strand: Strand, first_half: bool) -> bool {
    if first_half {
        keep_left(side, strand)
    } else {
        !keep_left(side, strand)
    }
}

/// 1-based coordinate of the junction-adjacent base of a kept range.
pub(crate) fn breakpoint(range: &SequenceRange, side: Side, strand: Strand) -> u64 {
    if keep_left(side, strand) {
        range.start + 1
    } else {
        range.end
    }
}

/// A fully-resolved probe candidate: its genomic ranges plus the metadata
/// needed to print its canonical label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Coordinate(CoordinateProbe),
    GenomeSnp(GenomeSnpProbe),
    TranscriptSnp(TranscriptSnpProbe),
    TranscriptIndel(TranscriptIndelProbe),
    AminoAcid(AminoAcidProbe),
    AminoAcidIndel(AminoAcidIndelProbe),
    Exon(ExonProbe),
}

impl Probe {
    /// The ordered genomic ranges whose bases concatenate into the probe.
    pub fn ranges(&self) -> &[SequenceRange] {
        match self {
            Probe::Coordinate(probe) => probe.ranges(),
            Probe::GenomeSnp(probe) => probe.ranges(),
            Probe::TranscriptSnp(probe) => probe.ranges(),
            Probe::TranscriptIndel(probe) => probe.ranges(),
            Probe::AminoAcid(probe) => probe.ranges(),
            Probe::AminoAcidIndel(probe) => probe.ranges(),
            Probe::Exon(probe) => probe.ranges(),
        }
    }

    /// Resolve the probe against a reference genome.
    pub fn sequence(&self, genome: &Genome) -> Result<String, CandidateError> {
        resolve(self.ranges(), genome)
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probe::Coordinate(probe) => probe.fmt(f),
            Probe::GenomeSnp(probe) => probe.fmt(f),
            Probe::TranscriptSnp(probe) => probe.fmt(f),
            Probe::TranscriptIndel(probe) => probe.fmt(f),
            Probe::AminoAcid(probe) => probe.fmt(f),
            Probe::AminoAcidIndel(probe) => probe.fmt(f),
            Probe::Exon(probe) => probe.fmt(f),
        }
    }
}

/// Parse one statement and expand it into concrete probes.
///
/// Each grammar is tried in turn; the grammars are mutually exclusive, so
/// at most one accepts. Recoverable per-candidate failures land in
/// `warnings`; a statement no grammar accepts is
/// [`ProbeError::InvalidStatement`].
pub fn explode(
    statement: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    if coordinate::parse(statement).is_ok() {
        return coordinate::explode(statement);
    }
    if genome_snp::parse(statement).is_ok() {
        return genome_snp::explode(statement, warnings);
    }
    if transcript_snp::parse(statement).is_ok() {
        return transcript_snp::explode(statement, annotation, warnings);
    }
    if transcript_indel::parse(statement).is_ok() {
        return transcript_indel::explode(statement, annotation, warnings);
    }
    if amino_acid::parse(statement).is_ok() {
        return amino_acid::explode(statement, annotation, warnings);
    }
    if amino_acid_indel::parse(statement).is_ok() {
        return amino_acid_indel::explode(statement, annotation, warnings);
    }
    if exon::parse(statement).is_ok() {
        return exon::explode(statement, annotation, warnings);
    }
    Err(ProbeError::InvalidStatement {
        statement: statement.to_string(),
    })
}

/// Concatenate the bases of each range against the genome.
///
/// Plain ranges slice the reference, reverse-complemented when flagged.
/// Mutation ranges first validate the genome slice against the declared
/// reference (case-insensitively, accepting the exact complement
/// counterpart), then emit the stored mutation payload instead.
pub(crate) fn resolve(
    ranges: &[SequenceRange],
    genome: &Genome,
) -> Result<String, CandidateError> {
    let mut sequence = String::new();
    for range in ranges {
        let bases = genome.range_bases(range)?;
        match &range.mutation {
            Some(mutation) => {
                if let Some(reference) = &range.reference {
                    check_reference(range, reference, bases)?;
                }
                sequence.push_str(mutation);
            }
            None if range.reverse_complement => {
                sequence.push_str(&reverse_complement(bases));
            }
            None => sequence.push_str(bases),
        }
    }
    Ok(sequence)
}

fn check_reference(
    range: &SequenceRange,
    reference: &str,
    found: &str,
) -> Result<(), CandidateError> {
    if found.eq_ignore_ascii_case(reference)
        || found.eq_ignore_ascii_case(&reverse_complement(reference))
    {
        return Ok(());
    }
    Err(CandidateError::ReferenceMismatch {
        chromosome: range.chromosome.clone(),
        position: range.start + 1,
        expected: reference.to_string(),
        found: found.to_string(),
    })
}
