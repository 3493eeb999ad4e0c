//! Transcript-relative indel probes
//!
//! ```text
//! <gene>:c.<pos>[del<seq>][ins<seq>][ [trans]]/<length>
//! ```
//!
//! At least one of the `del`/`ins` clauses must be present. The deleted
//! bases are given in transcription orientation starting at the 1-based
//! coding position; an `ins` without a `del` inserts 5' of that position.

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{all_consuming, opt};
use nom::IResult;
use nom::Parser;

use crate::annotation::Annotation;
use crate::error::{CandidateError, ProbeError, Warning};
use crate::probe::parse::{
    comment_tail, gene_name, nucleotide_sequence, position, trans_marker, ws,
};
use crate::probe::Probe;
use crate::range::SequenceRange;
use crate::transcript::Transcript;
use crate::variant::{Buffer, Variant};

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptIndelSpec {
    gene: String,
    /// 1-based coding-nucleotide position of the first affected base.
    base: u64,
    /// Deleted bases, transcription orientation; empty for pure insertions.
    deletion: String,
    /// Inserted bases, transcription orientation; empty for pure deletions.
    insertion: String,
    trans: bool,
    length: u64,
    comment: String,
}

/// A probe for an insertion/deletion at a transcript-relative position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptIndelProbe {
    ranges: Vec<SequenceRange>,
    gene: String,
    base: u64,
    deletion: String,
    insertion: String,
    trans: bool,
    length: u64,
    transcript: String,
    chromosome: String,
    coordinate: u64,
    comment: String,
}

impl TranscriptIndelProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }
}

impl std::fmt::Display for TranscriptIndelProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:c.{}", self.gene, self.base)?;
        if !self.deletion.is_empty() {
            write!(f, "del{}", self.deletion)?;
        }
        if !self.insertion.is_empty() {
            write!(f, "ins{}", self.insertion)?;
        }
        write!(
            f,
            "{}/{}_{}_{}:{}{}",
            if self.trans { "[trans]" } else { "" },
            self.length,
            self.transcript,
            self.chromosome,
            self.coordinate,
            self.comment
        )
    }
}

fn clause<'a>(keyword: &'static str) -> impl Parser<&'a str, Output = String, Error = nom::error::Error<&'a str>> {
    move |input: &'a str| {
        let (input, _) = ws(input)?;
        let (input, _) = tag(keyword).parse(input)?;
        let (input, _) = ws(input)?;
        let (input, bases) = nucleotide_sequence(input)?;
        Ok((input, bases.to_string()))
    }
}

fn statement(input: &str) -> IResult<&str, TranscriptIndelSpec> {
    let (input, _) = ws(input)?;
    let (input, gene) = gene_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = tag("c.").parse(input)?;
    let (input, base) = position(input)?;
    let (input, deletion) = opt(clause("del")).parse(input)?;
    let (input, insertion) = opt(clause("ins")).parse(input)?;
    let (input, trans) = trans_marker(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, length) = position(input)?;
    let (input, comment) = comment_tail(input)?;
    if deletion.is_none() && insertion.is_none() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alt,
        )));
    }
    Ok((
        input,
        TranscriptIndelSpec {
            gene: gene.to_string(),
            base,
            deletion: deletion.unwrap_or_default(),
            insertion: insertion.unwrap_or_default(),
            trans,
            length,
            comment,
        },
    ))
}

/// Parse a transcript indel statement.
pub fn parse(text: &str) -> Result<TranscriptIndelSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

/// The minimal genomic range spanning the affected bases of one
/// transcript: a zero-width insertion point, or the condensed deletion
/// span (which must not cross an exon junction).
fn indel_index(
    transcript: &Transcript,
    base: u64,
    deletion_len: u64,
) -> Result<SequenceRange, CandidateError> {
    if deletion_len == 0 {
        let site = transcript.nucleotide_index(base)?;
        let boundary = if transcript.is_plus_strand() {
            site.start
        } else {
            site.end
        };
        return Ok(SequenceRange::new(&transcript.chromosome, boundary, boundary));
    }
    let ranges = transcript.transcript_range(base, base + deletion_len)?;
    match <[SequenceRange; 1]>::try_from(ranges) {
        Ok([range]) => Ok(range),
        Err(_) => Err(CandidateError::DiscontinuousIndelRegion {
            start: base,
            end: base + deletion_len - 1,
            transcript: transcript.name.clone(),
        }),
    }
}

/// Expand a transcript indel statement over the gene's transcripts.
pub fn explode(
    text: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    if spec.length < spec.insertion.len() as u64 {
        return Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        });
    }
    let buffer = if spec.trans {
        Buffer::Transcript
    } else {
        Buffer::Genome
    };

    let mut seen: Vec<SequenceRange> = Vec::new();
    let mut probes = Vec::new();
    for transcript in annotation.lookup_gene(&spec.gene) {
        let index = match indel_index(transcript, spec.base, spec.deletion.len() as u64) {
            Ok(index) => index,
            Err(error) => {
                warnings.push(Warning::new(text, Some(&transcript.name), error));
                continue;
            }
        };
        if seen.contains(&index) {
            continue;
        }
        let variant = Variant::new(
            transcript,
            index.clone(),
            spec.deletion.clone(),
            spec.insertion.clone(),
            spec.length,
            buffer,
        );
        let ranges = match variant.sequence_ranges() {
            Ok(ranges) => ranges,
            Err(error) => {
                warnings.push(Warning::new(text, Some(&transcript.name), error));
                continue;
            }
        };
        seen.push(index);
        probes.push(Probe::TranscriptIndel(TranscriptIndelProbe {
            ranges,
            gene: spec.gene.clone(),
            base: spec.base,
            deletion: spec.deletion.clone(),
            insertion: spec.insertion.clone(),
            trans: spec.trans,
            length: spec.length,
            transcript: transcript.name.clone(),
            chromosome: transcript.chromosome.clone(),
            coordinate: variant.coordinate(),
            comment: spec.comment.clone(),
        }));
    }
    Ok(probes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Genome;
    use std::io::Cursor;

    const TABLE: &str = "#name\tchrom\tstrand\tcdsStart\tcdsEnd\texonStarts\texonEnds\tname2\n\
                         BAR\tchr1\t+\t1\t7\t0,6,\t4,8,\tDEF\n\
                         BAZ\tchr3\t-\t10\t24\t10,21,\t15,24,\tGHI\n";

    fn annotation() -> Annotation {
        Annotation::from_reader(Cursor::new(TABLE)).unwrap()
    }

    fn genome() -> Genome {
        Genome::from_pairs([("1", "acgtacgt"), ("3", "aaaaaaaaacccgggcccaaaggg")])
    }

    #[test]
    fn test_parse_deletion_and_insertion() {
        let spec = parse("DEF:c.2delgt insAA [trans]/40 -- note").unwrap();
        assert_eq!(spec.base, 2);
        assert_eq!(spec.deletion, "gt");
        assert_eq!(spec.insertion, "AA");
        assert!(spec.trans);
        assert_eq!(spec.length, 40);
        assert_eq!(spec.comment, "-- note");
    }

    #[test]
    fn test_parse_requires_del_or_ins() {
        assert!(parse("DEF:c.2/40").is_err());
        assert!(parse("DEF:c.2 [trans]/40").is_err());
    }

    #[test]
    fn test_parse_rejects_other_grammars() {
        assert!(parse("DEF:c.2g>t/40").is_err());
        assert!(parse("1:3g>a/4").is_err());
    }

    #[test]
    fn test_deletion_sequence() {
        let mut warnings = Vec::new();
        let probes = explode("DEF:c.2delgt/4", &annotation(), &mut warnings).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].to_string(), "DEF:c.2delgt/4_BAR_1:3");
        assert_eq!(probes[0].sequence(&genome()).unwrap(), "acta");
    }

    #[test]
    fn test_pure_insertion_sequence() {
        let mut warnings = Vec::new();
        let probes = explode("DEF:c.2insaa/6", &annotation(), &mut warnings).unwrap();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].sequence(&genome()).unwrap(), "acaagt");
    }

    #[test]
    fn test_transcript_buffered_deletion_crosses_junction_flanks() {
        let mut warnings = Vec::new();
        let probes = explode("DEF:c.2delgt [trans]/2", &annotation(), &mut warnings).unwrap();
        assert_eq!(probes.len(), 1);
        // Right flank comes from the next exon, skipping the intron.
        assert_eq!(probes[0].sequence(&genome()).unwrap(), "cg");
    }

    #[test]
    fn test_deletion_split_across_junction_warns() {
        let mut warnings = Vec::new();
        let probes = explode("DEF:c.3delta/4", &annotation(), &mut warnings).unwrap();
        assert!(probes.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0].error,
            CandidateError::DiscontinuousIndelRegion { start: 3, end: 4, .. }
        ));
    }

    #[test]
    fn test_minus_strand_deletion() {
        let mut warnings = Vec::new();
        let probes = explode("GHI:c.2delcc/2", &annotation(), &mut warnings).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].to_string(), "GHI:c.2delcc/2_BAZ_3:22");
        assert_eq!(probes[0].sequence(&genome()).unwrap(), "ag");
    }

    #[test]
    fn test_deletion_mismatch_is_non_fatal() {
        let mut warnings = Vec::new();
        let probes = explode("DEF:c.2delaa/4", &annotation(), &mut warnings).unwrap();
        assert!(matches!(
            probes[0].sequence(&genome()),
            Err(CandidateError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn test_length_shorter_than_insertion_is_invalid() {
        let mut warnings = Vec::new();
        assert!(matches!(
            explode("DEF:c.2insaaaa/2", &annotation(), &mut warnings),
            Err(ProbeError::InvalidStatement { .. })
        ));
    }
}
