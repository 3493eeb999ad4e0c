//! Exon-fusion probes
//!
//! ```text
//! <gene>#exon[<n|*>](+|-|*)<n|*>(/|->)<gene>#exon[<n|*>](+|-|*)<n|*>
//! ```
//!
//! Each half names an exon (1-based in transcription order, `*` for every
//! exon), the end of that exon the probe bases hug (`+` the transcription
//! start, `-` the transcription end, `*` for both), and a base count (`*`
//! for the whole exon). `->` marks a read-through fusion; it parses the
//! same as `/`.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, one_of};
use nom::combinator::all_consuming;
use nom::IResult;
use nom::Parser;

use crate::annotation::Annotation;
use crate::error::{CandidateError, ProbeError, Warning};
use crate::probe::parse::{comment_tail, gene_name, position, ws};
use crate::probe::{breakpoint, flip, keep_left, Probe, Side};
use crate::range::SequenceRange;
use crate::transcript::{Strand, Transcript};

/// A field that may be a concrete value or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glob<T> {
    Concrete(T),
    Wildcard,
}

impl<T: std::fmt::Display> std::fmt::Display for Glob<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Glob::Concrete(value) => value.fmt(f),
            Glob::Wildcard => write!(f, "*"),
        }
    }
}

/// One parsed half of an exon-fusion statement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HalfSpec {
    gene: String,
    exon: Glob<u64>,
    side: Glob<Side>,
    bases: Glob<u64>,
}

/// Statement separator; `->` marks read-through fusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Slash,
    Arrow,
}

impl std::fmt::Display for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Separator::Slash => write!(f, "/"),
            Separator::Arrow => write!(f, "->"),
        }
    }
}

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExonSpec {
    first: HalfSpec,
    second: HalfSpec,
    separator: Separator,
    comment: String,
}

/// A probe fusing the kept ends of two exons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExonProbe {
    ranges: Vec<SequenceRange>,
    gene1: String,
    exon1: u64,
    side1: Side,
    bases1: Glob<u64>,
    gene2: String,
    exon2: u64,
    side2: Side,
    bases2: Glob<u64>,
    separator: Separator,
    breakpoint1: (String, u64),
    breakpoint2: (String, u64),
    transcript1: String,
    transcript2: String,
    comment: String,
}

impl ExonProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }
}

impl std::fmt::Display for ExonProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#exon[{}]{}{}{}{}#exon[{}]{}{}_{}:{}/{}:{}_{}_{}{}",
            self.gene1,
            self.exon1,
            self.side1,
            self.bases1,
            self.separator,
            self.gene2,
            self.exon2,
            self.side2,
            self.bases2,
            self.breakpoint1.0,
            self.breakpoint1.1,
            self.breakpoint2.0,
            self.breakpoint2.1,
            self.transcript1,
            self.transcript2,
            self.comment
        )
    }
}

fn glob_position(input: &str) -> IResult<&str, Glob<u64>> {
    if let Some(rest) = input.strip_prefix('*') {
        return Ok((rest, Glob::Wildcard));
    }
    let (input, value) = position(input)?;
    Ok((input, Glob::Concrete(value)))
}

fn half(input: &str) -> IResult<&str, HalfSpec> {
    let (input, _) = ws(input)?;
    let (input, gene) = gene_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('#').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = tag("exon").parse(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('[').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, exon) = glob_position(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(']').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, side) = one_of("+-*").parse(input)?;
    let (input, _) = ws(input)?;
    let (input, bases) = glob_position(input)?;
    let side = match Side::from_char(side) {
        Some(side) => Glob::Concrete(side),
        None => Glob::Wildcard,
    };
    Ok((
        input,
        HalfSpec {
            gene: gene.to_string(),
            exon,
            side,
            bases,
        },
    ))
}

fn separator(input: &str) -> IResult<&str, Separator> {
    let (input, _) = ws(input)?;
    let (input, token) = alt((tag("->"), tag("/"))).parse(input)?;
    let separator = if token == "->" {
        Separator::Arrow
    } else {
        Separator::Slash
    };
    Ok((input, separator))
}

fn statement(input: &str) -> IResult<&str, ExonSpec> {
    let (input, first) = half(input)?;
    let (input, sep) = separator(input)?;
    let (input, second) = half(input)?;
    let (input, comment) = comment_tail(input)?;
    Ok((
        input,
        ExonSpec {
            first,
            second,
            separator: sep,
            comment,
        },
    ))
}

/// Parse an exon-fusion statement.
pub fn parse(text: &str) -> Result<ExonSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

fn expand_sides(side: Glob<Side>) -> Vec<Side> {
    match side {
        Glob::Concrete(side) => vec![side],
        Glob::Wildcard => vec![Side::Start, Side::End],
    }
}

fn expand_exons(exon: Glob<u64>, count: usize) -> Vec<u64> {
    match exon {
        Glob::Concrete(number) => vec![number],
        Glob::Wildcard => (1..=count as u64).collect(),
    }
}

/// The kept portion of an exon: the whole exon for a `*` count, otherwise
/// `bases` bases hugging the junction end named by the side.
///
/// The count is not clamped to the exon; a larger count reads through the
/// exon boundary.
fn kept_range(
    exon: &SequenceRange,
    side: Side,
    strand: Strand,
    bases: Glob<u64>,
) -> Result<(u64, u64), CandidateError> {
    let (start, end) = match bases {
        Glob::Wildcard => (exon.start, exon.end),
        Glob::Concrete(count) => {
            if keep_left(side, strand) {
                (exon.start, exon.start + count)
            } else {
                let start = exon.end.checked_sub(count).ok_or_else(|| {
                    CandidateError::NonContainedRange {
                        chromosome: exon.chromosome.clone(),
                        start: 0,
                        end: exon.end,
                    }
                })?;
                (start, exon.end)
            }
        }
    };
    Ok((start, end))
}

fn half_range(
    transcript: &Transcript,
    exon_number: u64,
    side: Side,
    bases: Glob<u64>,
    first_half: bool,
) -> Result<SequenceRange, CandidateError> {
    let exon = transcript.exon(exon_number)?;
    let (start, end) = kept_range(&exon, side, transcript.strand, bases)?;
    Ok(if flip(side, transcript.strand, first_half) {
        SequenceRange::reversed(&transcript.chromosome, start, end)
    } else {
        SequenceRange::new(&transcript.chromosome, start, end)
    })
}

/// Expand an exon-fusion statement: every combination of matching
/// transcripts, wildcard sides, and wildcard exon numbers, deduplicated
/// first-wins on the kept coordinates and sides.
pub fn explode(
    text: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    let first_transcripts: Vec<&Transcript> = annotation.lookup_gene(&spec.first.gene).collect();
    let second_transcripts: Vec<&Transcript> = annotation.lookup_gene(&spec.second.gene).collect();

    let mut seen: Vec<(SequenceRange, Side, SequenceRange, Side)> = Vec::new();
    let mut probes = Vec::new();
    for t1 in &first_transcripts {
        for t2 in &second_transcripts {
            for exon1 in expand_exons(spec.first.exon, t1.exon_count()) {
                for exon2 in expand_exons(spec.second.exon, t2.exon_count()) {
                    for &side1 in &expand_sides(spec.first.side) {
                        for &side2 in &expand_sides(spec.second.side) {
                            let range1 =
                                match half_range(t1, exon1, side1, spec.first.bases, true) {
                                    Ok(range) => range,
                                    Err(error) => {
                                        warnings.push(Warning::new(text, Some(&t1.name), error));
                                        continue;
                                    }
                                };
                            let range2 =
                                match half_range(t2, exon2, side2, spec.second.bases, false) {
                                    Ok(range) => range,
                                    Err(error) => {
                                        warnings.push(Warning::new(text, Some(&t2.name), error));
                                        continue;
                                    }
                                };
                            let key = (range1.clone(), side1, range2.clone(), side2);
                            if seen.contains(&key) {
                                continue;
                            }
                            seen.push(key);
                            let breakpoint1 = (
                                t1.chromosome.clone(),
                                breakpoint(&range1, side1, t1.strand),
                            );
                            let breakpoint2 = (
                                t2.chromosome.clone(),
                                breakpoint(&range2, side2, t2.strand),
                            );
                            probes.push(Probe::Exon(ExonProbe {
                                ranges: vec![range1, range2],
                                gene1: spec.first.gene.clone(),
                                exon1,
                                side1,
                                bases1: spec.first.bases,
                                gene2: spec.second.gene.clone(),
                                exon2,
                                side2,
                                bases2: spec.second.bases,
                                separator: spec.separator,
                                breakpoint1,
                                breakpoint2,
                                transcript1: t1.name.clone(),
                                transcript2: t2.name.clone(),
                                comment: spec.comment.clone(),
                            }));
                        }
                    }
                }
            }
        }
    }
    Ok(probes)
}
