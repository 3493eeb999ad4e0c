//! Substitution variants and buffer computation
//!
//! A [`Variant`] represents an arbitrary-length sequence substitution
//! (one-for-one for SNPs, three-for-three for codon substitutions,
//! n-for-m for indels) plus the reference flanks ("buffers") that pad
//! the probe to its requested total length. Variants are built during statement
//! expansion, asked once for their sequence ranges, and discarded; probes
//! keep the computed ranges, not the variant.

use crate::error::CandidateError;
use crate::range::SequenceRange;
use crate::transcript::Transcript;

/// Where flank bases are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// Straight genomic arithmetic around the mutation site; flanks may
    /// run into introns.
    Genome,
    /// Flanks follow the spliced transcript and may cross exon junctions.
    Transcript,
}

/// A substitution at a genomic index, with the desired total probe length.
///
/// `index` is the minimal range spanning the mutated bases (zero-width for
/// pure insertions). `reference` and `mutation` are kept in transcription
/// orientation; orientation is applied once, when the mutation range is
/// constructed. Callers guarantee `length >= mutation.len()`.
#[derive(Debug, Clone)]
pub struct Variant<'a> {
    pub transcript: &'a Transcript,
    pub index: SequenceRange,
    pub reference: String,
    pub mutation: String,
    pub length: u64,
    pub buffer: Buffer,
}

impl<'a> Variant<'a> {
    pub fn new(
        transcript: &'a Transcript,
        index: SequenceRange,
        reference: impl Into<String>,
        mutation: impl Into<String>,
        length: u64,
        buffer: Buffer,
    ) -> Self {
        let reference = reference.into();
        let mutation = mutation.into();
        debug_assert!(index.len() == reference.len() as u64);
        debug_assert!(length >= mutation.len() as u64);
        Self {
            transcript,
            index,
            reference,
            mutation,
            length,
            buffer,
        }
    }

    /// 1-based genomic coordinate of the index start, as printed in probe
    /// labels.
    pub fn coordinate(&self) -> u64 {
        self.index.start + 1
    }

    /// Split the non-mutation budget into left/right flank lengths.
    ///
    /// The split is floor-division: for even budgets the mutation sits
    /// just left of center, in genome orientation.
    fn flank_lengths(&self) -> (u64, u64) {
        let total = self.length - self.mutation.len() as u64;
        let left = total / 2;
        (left, total - left)
    }

    /// The mutation segment, tagged with both payloads and oriented by the
    /// transcript's strand.
    fn mutation_range(&self) -> SequenceRange {
        SequenceRange::with_tags(
            &self.index.chromosome,
            self.index.start,
            self.index.end,
            !self.transcript.is_plus_strand(),
            Some(self.reference.clone()),
            Some(self.mutation.clone()),
        )
    }

    /// The ordered ranges (left flank, mutation, right flank) whose bases
    /// concatenate into the probe.
    ///
    /// Ranges ascend in genome coordinates regardless of strand; on the
    /// minus strand the mutation payload is stored reverse-complemented,
    /// so the emitted probe reads along the plus strand.
    pub fn sequence_ranges(&self) -> Result<Vec<SequenceRange>, CandidateError> {
        match self.buffer {
            Buffer::Genome => self.genome_ranges(),
            Buffer::Transcript => self.transcript_ranges(),
        }
    }

    fn genome_ranges(&self) -> Result<Vec<SequenceRange>, CandidateError> {
        let (left, right) = self.flank_lengths();
        let chromosome = &self.index.chromosome;
        // A left flank running past the chromosome start cannot be
        // represented as a half-open range.
        let left_start =
            self.index
                .start
                .checked_sub(left)
                .ok_or(CandidateError::NonContainedRange {
                    chromosome: chromosome.clone(),
                    start: 0,
                    end: self.index.start,
                })?;
        Ok(vec![
            SequenceRange::new(chromosome, left_start, self.index.start),
            self.mutation_range(),
            SequenceRange::new(chromosome, self.index.end, self.index.end + right),
        ])
    }

    fn transcript_ranges(&self) -> Result<Vec<SequenceRange>, CandidateError> {
        let (mut left, mut right) = self.flank_lengths();
        if !self.transcript.is_plus_strand() {
            // Genome order is reversed relative to transcription order, so
            // the flank lengths swap before lookup.
            std::mem::swap(&mut left, &mut right);
        }
        let base = self.transcript.base_index(&self.index)?;
        let reference_len = self.reference.len() as u64;

        let left_start = base.checked_sub(left).unwrap_or(0);
        let mut ranges = self.transcript.transcript_range(left_start, base)?;
        ranges.push(self.mutation_range());
        ranges.extend(self.transcript.transcript_range(
            base + reference_len,
            base + reference_len + right,
        )?);
        if !self.transcript.is_plus_strand() {
            ranges.reverse();
        }
        Ok(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Transcript;
    use std::collections::HashMap;

    fn transcript(fields: &[(&str, &str)]) -> Transcript {
        let row: HashMap<String, String> = fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Transcript::from_row(&row).unwrap()
    }

    /// Plus strand, coding exons [3, 6), [12, 15), [18, 21) on chrom 3.
    fn frob() -> Transcript {
        transcript(&[
            ("name", "FROB"),
            ("name2", "MNO"),
            ("chrom", "chr3"),
            ("strand", "+"),
            ("cdsStart", "3"),
            ("cdsEnd", "21"),
            ("exonStarts", "3,12,18,"),
            ("exonEnds", "6,15,21,"),
        ])
    }

    /// Minus strand, coding exons [10, 15) and [21, 24) on chrom 3.
    fn baz() -> Transcript {
        transcript(&[
            ("name", "BAZ"),
            ("name2", "GHI"),
            ("chrom", "chr3"),
            ("strand", "-"),
            ("cdsStart", "10"),
            ("cdsEnd", "24"),
            ("exonStarts", "10,21,"),
            ("exonEnds", "15,24,"),
        ])
    }

    #[test]
    fn test_genome_buffered_odd_length() {
        let tx = baz();
        let index = tx
            .codon_index(2, Some("CCC".to_string()), Some("ATG".to_string()))
            .unwrap();
        let variant = Variant::new(&tx, index, "CCC", "ATG", 9, Buffer::Genome);
        let ranges = variant.sequence_ranges().unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], SequenceRange::new("3", 9, 12));
        assert_eq!(ranges[1].start, 12);
        assert_eq!(ranges[1].end, 15);
        assert!(ranges[1].reverse_complement);
        // Payload stored genome-oriented.
        assert_eq!(ranges[1].mutation.as_deref(), Some("CAT"));
        assert_eq!(ranges[2], SequenceRange::new("3", 15, 18));
    }

    #[test]
    fn test_genome_buffered_even_length_floors_left() {
        let tx = baz();
        let index = tx.codon_index(2, None, None).unwrap();
        let variant = Variant::new(&tx, index, "CCC", "ATG", 8, Buffer::Genome);
        let ranges = variant.sequence_ranges().unwrap();
        // budget 5: left 2, right 3.
        assert_eq!(ranges[0], SequenceRange::new("3", 10, 12));
        assert_eq!(ranges[2], SequenceRange::new("3", 15, 18));
    }

    #[test]
    fn test_genome_buffered_flank_past_chromosome_start() {
        let tx = frob();
        let index = tx.nucleotide_index(1).unwrap(); // coordinate 3
        let variant = Variant::new(&tx, index, "a", "t", 9, Buffer::Genome);
        assert!(matches!(
            variant.sequence_ranges(),
            Err(CandidateError::NonContainedRange { .. })
        ));
    }

    #[test]
    fn test_transcript_buffered_plus_strand_crosses_junctions() {
        let tx = frob();
        let index = tx
            .codon_index(2, Some("GGG".to_string()), Some("ATG".to_string()))
            .unwrap();
        let variant = Variant::new(&tx, index, "GGG", "ATG", 9, Buffer::Transcript);
        let ranges = variant.sequence_ranges().unwrap();
        // Flanks come from the neighboring exons, not the introns.
        assert_eq!(
            ranges,
            vec![
                SequenceRange::new("3", 3, 6),
                SequenceRange::with_tags(
                    "3",
                    12,
                    15,
                    false,
                    Some("GGG".to_string()),
                    Some("ATG".to_string()),
                ),
                SequenceRange::new("3", 18, 21),
            ]
        );
    }

    #[test]
    fn test_transcript_buffered_minus_strand_swaps_and_reverses() {
        let tx = baz();
        let index = tx
            .codon_index(2, Some("CCC".to_string()), Some("ATG".to_string()))
            .unwrap();
        let variant = Variant::new(&tx, index, "CCC", "ATG", 8, Buffer::Transcript);
        let ranges = variant.sequence_ranges().unwrap();
        // budget 5: genome-left flank gets the floor share after the swap,
        // and the list comes back in ascending genome order.
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], SequenceRange::new("3", 10, 12));
        assert!(ranges[1].reverse_complement);
        assert_eq!(ranges[1].mutation.as_deref(), Some("CAT"));
        assert_eq!(ranges[2], SequenceRange::new("3", 21, 24));
    }

    #[test]
    fn test_transcript_buffered_flank_past_transcript_start() {
        let tx = frob();
        let index = tx.codon_index(1, None, None).unwrap();
        let variant = Variant::new(&tx, index, "AAA", "TTT", 9, Buffer::Transcript);
        assert!(matches!(
            variant.sequence_ranges(),
            Err(CandidateError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_width_insertion_index() {
        let tx = frob();
        // Insert before coding base 4 (genome 12).
        let index = SequenceRange::new("3", 12, 12);
        let variant = Variant::new(&tx, index, "", "AA", 6, Buffer::Transcript);
        let ranges = variant.sequence_ranges().unwrap();
        assert_eq!(
            ranges,
            vec![
                SequenceRange::new("3", 4, 6),
                SequenceRange::with_tags(
                    "3",
                    12,
                    12,
                    false,
                    Some(String::new()),
                    Some("AA".to_string()),
                ),
                SequenceRange::new("3", 12, 14),
            ]
        );
    }

    #[test]
    fn test_coordinate_is_one_based() {
        let tx = frob();
        let index = tx.codon_index(2, None, None).unwrap();
        let variant = Variant::new(&tx, index, "GGG", "ATG", 9, Buffer::Genome);
        assert_eq!(variant.coordinate(), 13);
    }
}
