//! Transcript-relative point-mutation probes
//!
//! ```text
//! <gene>:c.<pos><ref>><mut>[ [trans]]/<length>
//! ```
//!
//! `c.<pos>` is the 1-based coding-nucleotide position. One probe is
//! produced per matching transcript whose coding region contains the
//! position; `[trans]` switches the flanks from genomic to spliced
//! transcript sequence.

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::IResult;
use nom::Parser;

use crate::annotation::Annotation;
use crate::error::{ProbeError, Warning};
use crate::probe::parse::{comment_tail, gene_name, nucleotide, position, trans_marker, ws};
use crate::probe::Probe;
use crate::range::SequenceRange;
use crate::variant::{Buffer, Variant};

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSnpSpec {
    gene: String,
    /// 1-based coding-nucleotide position.
    base: u64,
    reference: char,
    mutation: char,
    trans: bool,
    length: u64,
    comment: String,
}

/// A probe for a point mutation at a transcript-relative position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSnpProbe {
    ranges: Vec<SequenceRange>,
    gene: String,
    base: u64,
    reference: char,
    mutation: char,
    trans: bool,
    length: u64,
    transcript: String,
    chromosome: String,
    /// 1-based genomic coordinate of the mutated base.
    coordinate: u64,
    comment: String,
}

impl TranscriptSnpProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }
}

impl std::fmt::Display for TranscriptSnpProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:c.{}{}>{}{}/{}_{}_{}:{}{}",
            self.gene,
            self.base,
            self.reference,
            self.mutation,
            if self.trans { "[trans]" } else { "" },
            self.length,
            self.transcript,
            self.chromosome,
            self.coordinate,
            self.comment
        )
    }
}

fn statement(input: &str) -> IResult<&str, TranscriptSnpSpec> {
    let (input, _) = ws(input)?;
    let (input, gene) = gene_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = tag("c.").parse(input)?;
    let (input, base) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, reference) = nucleotide(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('>').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, mutation) = nucleotide(input)?;
    let (input, trans) = trans_marker(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, length) = position(input)?;
    let (input, comment) = comment_tail(input)?;
    Ok((
        input,
        TranscriptSnpSpec {
            gene: gene.to_string(),
            base,
            reference,
            mutation,
            trans,
            length,
            comment,
        },
    ))
}

/// Parse a transcript point-mutation statement.
pub fn parse(text: &str) -> Result<TranscriptSnpSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

/// Expand a transcript point-mutation statement over the gene's
/// transcripts, deduplicating coordinate-identical candidates.
pub fn explode(
    text: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    let buffer = if spec.trans {
        Buffer::Transcript
    } else {
        Buffer::Genome
    };

    let mut seen: Vec<SequenceRange> = Vec::new();
    let mut probes = Vec::new();
    for transcript in annotation.lookup_gene(&spec.gene) {
        let index = match transcript.nucleotide_index(spec.base) {
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
            spec.reference.to_string(),
            spec.mutation.to_string(),
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
        probes.push(Probe::TranscriptSnp(TranscriptSnpProbe {
            ranges,
            gene: spec.gene.clone(),
            base: spec.base,
            reference: spec.reference,
            mutation: spec.mutation,
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
