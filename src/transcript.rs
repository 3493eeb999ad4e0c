//! Transcript model over one annotation row
//!
//! # Coordinate Systems
//!
//! Genomic coordinates are 0-based half-open (see [`crate::range`]).
//! Transcript-relative coordinates, the `c.` positions of statements, are
//! **1-based** over the coding sequence in transcription order: base 1 is
//! the first base of the CDS of the 5'-most coding exon, regardless of
//! strand.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CandidateError, ProbeError};
use crate::range::SequenceRange;

/// Fields every usable annotation row must carry.
const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "exonStarts",
    "exonEnds",
    "cdsStart",
    "cdsEnd",
    "chrom",
    "strand",
];

/// The column names that may hold the gene id, depending on the table
/// flavor (RefSeq Genes uses `name2`, UCSC Genes uses `proteinID`).
/// Exactly one must be present.
const GENE_NAME_FIELDS: &[&str] = &["name2", "proteinID"];

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// One transcript isoform: the exon/CDS structure of a single row of a
/// UCSC gene table.
///
/// Constructed once at load time and never mutated; many variants may
/// reference the same transcript during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique transcript identifier (the table's `name` column).
    pub name: String,
    /// Non-unique gene identifier (`name2` or `proteinID`).
    pub gene_id: String,
    /// Chromosome, with any leading `chr` prefix stripped.
    pub chromosome: String,
    pub strand: Strand,
    /// CDS bounds, 0-based half-open in genome coordinates.
    pub cds_start: u64,
    pub cds_end: u64,
    /// Exon bounds in genome order, 0-based half-open, parallel lists.
    exon_starts: Vec<u64>,
    exon_ends: Vec<u64>,
}

impl Transcript {
    /// Build a transcript from one annotation row (column name to value).
    ///
    /// Fails with [`ProbeError::InvalidAnnotationFile`] when required
    /// fields are missing, when the gene-id column is absent or ambiguous,
    /// or when the row's coordinates violate the exon/CDS invariants.
    pub fn from_row(row: &HashMap<String, String>) -> Result<Self, ProbeError> {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !row.contains_key(**field))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ProbeError::InvalidAnnotationFile {
                msg: format!("annotation row is missing required fields: {missing:?}"),
            });
        }
        let gene_fields: Vec<&str> = GENE_NAME_FIELDS
            .iter()
            .filter(|field| row.contains_key(**field))
            .copied()
            .collect();
        if gene_fields.len() != 1 {
            return Err(ProbeError::InvalidAnnotationFile {
                msg: format!(
                    "annotation row contains gene id fields {gene_fields:?}; \
                     expected exactly one of {GENE_NAME_FIELDS:?}"
                ),
            });
        }

        let name = row["name"].clone();
        let gene_id = row[gene_fields[0]].clone();
        let chromosome = row["chrom"]
            .strip_prefix("chr")
            .unwrap_or(&row["chrom"])
            .to_string();
        let strand = match row["strand"].as_str() {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            other => {
                return Err(ProbeError::InvalidAnnotationFile {
                    msg: format!("unrecognized strand {other:?} in row {name:?}"),
                })
            }
        };
        let cds_start = parse_coordinate(&row["cdsStart"], "cdsStart", &name)?;
        let cds_end = parse_coordinate(&row["cdsEnd"], "cdsEnd", &name)?;
        let exon_starts = parse_coordinate_list(&row["exonStarts"], "exonStarts", &name)?;
        let exon_ends = parse_coordinate_list(&row["exonEnds"], "exonEnds", &name)?;

        let transcript = Self {
            name,
            gene_id,
            chromosome,
            strand,
            cds_start,
            cds_end,
            exon_starts,
            exon_ends,
        };
        transcript.check_invariants()?;
        Ok(transcript)
    }

    fn check_invariants(&self) -> Result<(), ProbeError> {
        if self.exon_starts.len() != self.exon_ends.len() {
            return Err(ProbeError::InvalidAnnotationFile {
                msg: format!(
                    "row {:?} has {} exon starts but {} exon ends",
                    self.name,
                    self.exon_starts.len(),
                    self.exon_ends.len()
                ),
            });
        }
        if self.exon_starts.is_empty() {
            return Err(ProbeError::InvalidAnnotationFile {
                msg: format!("row {:?} has no exons", self.name),
            });
        }
        for (start, end) in self.exon_starts.iter().zip(&self.exon_ends) {
            if start >= end {
                return Err(ProbeError::InvalidAnnotationFile {
                    msg: format!(
                        "row {:?} has an empty or inverted exon [{start}, {end})",
                        self.name
                    ),
                });
            }
        }
        let envelope_start = *self.exon_starts.iter().min().expect("non-empty");
        let envelope_end = *self.exon_ends.iter().max().expect("non-empty");
        if self.cds_start > self.cds_end
            || self.cds_start < envelope_start
            || self.cds_end > envelope_end
        {
            return Err(ProbeError::InvalidAnnotationFile {
                msg: format!(
                    "row {:?} CDS [{}, {}) lies outside the exon envelope [{envelope_start}, {envelope_end})",
                    self.name, self.cds_start, self.cds_end
                ),
            });
        }
        Ok(())
    }

    pub fn is_plus_strand(&self) -> bool {
        self.strand == Strand::Plus
    }

    /// Exon ranges in transcription order.
    ///
    /// UCSC tables store exons left-to-right along the plus strand; for a
    /// minus-strand transcript the genome-order list is reversed so that
    /// "first exon" always means 5'-most.
    pub fn exons(&self) -> Vec<SequenceRange> {
        let mut exons: Vec<SequenceRange> = self
            .exon_starts
            .iter()
            .zip(&self.exon_ends)
            .map(|(start, end)| SequenceRange::new(&self.chromosome, *start, *end))
            .collect();
        if !self.is_plus_strand() {
            exons.reverse();
        }
        exons
    }

    /// The exon at a 1-based index in transcription order.
    pub fn exon(&self, index: u64) -> Result<SequenceRange, CandidateError> {
        let exons = self.exons();
        if index == 0 || index as usize > exons.len() {
            return Err(CandidateError::NoFeature {
                exon: index,
                transcript: self.name.clone(),
                count: exons.len(),
            });
        }
        Ok(exons[index as usize - 1].clone())
    }

    pub fn exon_count(&self) -> usize {
        self.exon_starts.len()
    }

    /// As [`Transcript::exons`], but clipped to the CDS.
    ///
    /// Exons entirely outside `[cds_start, cds_end)` are dropped; boundary
    /// exons are trimmed, and an exon containing the entire CDS is clipped
    /// on both ends.
    pub fn coding_exons(&self) -> Vec<SequenceRange> {
        let mut exons: Vec<SequenceRange> = self
            .exon_starts
            .iter()
            .zip(&self.exon_ends)
            .filter_map(|(start, end)| {
                let clipped_start = (*start).max(self.cds_start);
                let clipped_end = (*end).min(self.cds_end);
                (clipped_start < clipped_end)
                    .then(|| SequenceRange::new(&self.chromosome, clipped_start, clipped_end))
            })
            .collect();
        if !self.is_plus_strand() {
            exons.reverse();
        }
        exons
    }

    /// Total coding-nucleotide count.
    pub fn coding_len(&self) -> u64 {
        self.coding_exons().iter().map(SequenceRange::len).sum()
    }

    /// Genomic coordinate of the 1-based coding nucleotide `index`,
    /// counting in transcription order (reversed within minus-strand
    /// exons).
    fn coding_coordinate(&self, index: u64) -> Result<u64, CandidateError> {
        if index >= 1 {
            let mut remaining = index - 1;
            for exon in self.coding_exons() {
                let length = exon.len();
                if remaining < length {
                    return Ok(match self.strand {
                        Strand::Plus => exon.start + remaining,
                        Strand::Minus => exon.end - 1 - remaining,
                    });
                }
                remaining -= length;
            }
        }
        Err(CandidateError::OutOfRange {
            index,
            transcript: self.name.clone(),
        })
    }

    /// The 1-base genomic range of the coding nucleotide at a 1-based
    /// transcript index.
    pub fn nucleotide_index(&self, index: u64) -> Result<SequenceRange, CandidateError> {
        let coordinate = self.coding_coordinate(index)?;
        Ok(SequenceRange::new(
            &self.chromosome,
            coordinate,
            coordinate + 1,
        ))
    }

    /// The 3-base genomic range of the codon at a 1-based codon index.
    ///
    /// Resolves the codon's first nucleotide (`3i - 2`) and widens to the
    /// codon window: downstream on the plus strand, upstream (with the
    /// reverse-complement flag set) on the minus strand. The optional
    /// reference and mutation payloads are tagged onto the range for later
    /// substitution checking.
    pub fn codon_index(
        &self,
        index: u64,
        reference: Option<String>,
        mutation: Option<String>,
    ) -> Result<SequenceRange, CandidateError> {
        let first = index
            .checked_mul(3)
            .and_then(|n| n.checked_sub(2))
            .ok_or_else(|| CandidateError::OutOfRange {
                index,
                transcript: self.name.clone(),
            })?;
        if first + 2 > self.coding_len() {
            return Err(CandidateError::OutOfRange {
                index: first,
                transcript: self.name.clone(),
            });
        }
        let coordinate = self.coding_coordinate(first)?;
        Ok(match self.strand {
            Strand::Plus => SequenceRange::with_tags(
                &self.chromosome,
                coordinate,
                coordinate + 3,
                false,
                reference,
                mutation,
            ),
            Strand::Minus => {
                let start =
                    coordinate
                        .checked_sub(2)
                        .ok_or_else(|| CandidateError::OutOfRange {
                            index: first,
                            transcript: self.name.clone(),
                        })?;
                SequenceRange::with_tags(
                    &self.chromosome,
                    start,
                    coordinate + 1,
                    true,
                    reference,
                    mutation,
                )
            }
        })
    }

    /// Inverse of [`Transcript::nucleotide_index`] by linear scan.
    ///
    /// Returns the 1-based transcript position of the range's first base
    /// in transcription order: the genomic `start` on the plus strand, the
    /// base at `end - 1` on the minus strand. Fails with `OutOfRange` when
    /// the coordinate is not a coding base of this transcript.
    pub fn base_index(&self, range: &SequenceRange) -> Result<u64, CandidateError> {
        let target = match self.strand {
            Strand::Plus => range.start,
            Strand::Minus => range.end.saturating_sub(1),
        };
        let mut position = 1u64;
        for exon in self.coding_exons() {
            if target >= exon.start && target < exon.end {
                let offset = match self.strand {
                    Strand::Plus => target - exon.start,
                    Strand::Minus => exon.end - 1 - target,
                };
                return Ok(position + offset);
            }
            position += exon.len();
        }
        Err(CandidateError::OutOfRange {
            index: target,
            transcript: self.name.clone(),
        })
    }

    /// The condensed genomic ranges covering the 1-based half-open
    /// transcript interval `[start, end)`, in transcription order.
    ///
    /// The covering may span exon junctions, in which case more than one
    /// range is returned. An empty interval yields an empty list.
    pub fn transcript_range(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<SequenceRange>, CandidateError> {
        if start < 1 || start > end || end > self.coding_len() + 1 {
            return Err(CandidateError::OutOfRange {
                index: if start < 1 { start } else { end.saturating_sub(1) },
                transcript: self.name.clone(),
            });
        }
        let mut bases = Vec::with_capacity((end - start) as usize);
        for index in start..end {
            let coordinate = self.coding_coordinate(index)?;
            bases.push(SequenceRange::new(
                &self.chromosome,
                coordinate,
                coordinate + 1,
            ));
        }
        Ok(SequenceRange::condense(&bases))
    }
}

fn parse_coordinate(value: &str, field: &str, row: &str) -> Result<u64, ProbeError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProbeError::InvalidAnnotationFile {
            msg: format!("row {row:?} has unparsable {field} value {value:?}"),
        })
}

/// Parse a UCSC comma-separated coordinate list, tolerating the trailing
/// comma the table format always carries.
fn parse_coordinate_list(value: &str, field: &str, row: &str) -> Result<Vec<u64>, ProbeError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| parse_coordinate(token, field, row))
        .collect()
}
